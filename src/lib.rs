//! An RTCP packet codec: parses (compound) RTCP datagrams into typed packets and builds packets
//! to be written back onto the wire.
//!
//! ```
//! use rtcp_parse::{parse_rtcp_packets, SomeRtcpPacket};
//!
//! let datagram = [0x81, 0xca, 0x00, 0x00];
//! let packets = parse_rtcp_packets(&datagram).unwrap();
//! assert!(matches!(packets[0], SomeRtcpPacket::RtcpSdesPacket(_)));
//! ```

pub mod error;
pub mod field_buffer;
pub mod packet_buffer;
pub mod rtcp;
pub mod util;

pub use rtcp::{
    rtcp_bye::{RtcpByePacket, RtcpByeReason},
    rtcp_header::{RtcpHeader, RtcpPacketType},
    rtcp_packet::{parse_rtcp_packets, serialize_rtcp_packets, SomeRtcpPacket},
    rtcp_receiver_report::ReceiverReport,
    rtcp_rr::RtcpRrPacket,
    rtcp_sdes::{RtcpSdesPacket, SdesChunk, SdesItem, SdesItemType},
    rtcp_sender_report::SenderReport,
    rtcp_sr::RtcpSrPacket,
};

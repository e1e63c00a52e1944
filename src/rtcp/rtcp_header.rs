use std::fmt::Display;

use anyhow::{Context, Result};
use bitvec::prelude::*;
use bytes::{BufMut, BytesMut};

use crate::{
    error::{
        CountOverflow, InvalidLengthValue, InvalidVersion, PayloadTooLarge, UnrecognizedPacketType,
    },
    packet_buffer::PacketBuffer,
};

/// The RTCP packet types this codec knows how to parse and build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RtcpPacketType {
    SenderReport = 200,
    ReceiverReport = 201,
    Sdes = 202,
    Bye = 203,
}

impl TryFrom<u8> for RtcpPacketType {
    type Error = UnrecognizedPacketType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            200 => Ok(RtcpPacketType::SenderReport),
            201 => Ok(RtcpPacketType::ReceiverReport),
            202 => Ok(RtcpPacketType::Sdes),
            203 => Ok(RtcpPacketType::Bye),
            pt => Err(UnrecognizedPacketType(pt)),
        }
    }
}

impl From<RtcpPacketType> for u8 {
    fn from(value: RtcpPacketType) -> Self {
        value as u8
    }
}

impl Display for RtcpPacketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RtcpPacketType::SenderReport => "SR",
            RtcpPacketType::ReceiverReport => "RR",
            RtcpPacketType::Sdes => "SDES",
            RtcpPacketType::Bye => "BYE",
        };
        write!(f, "{name}")
    }
}

/// https://datatracker.ietf.org/doc/html/rfc3550#section-6.1
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|    SC   |  PT=SDES=202  |             length            |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
///
/// length: 16 bits
///   The length of this RTCP packet in 32-bit words minus one,
///   including the header and any padding.  (The offset of one makes
///   zero a valid length and avoids a possible infinite loop in
///   scanning a compound RTCP packet, while counting 32-bit words
///   avoids a validity check for a multiple of 4.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcpHeader {
    pub version: u8,
    pub has_padding: bool,
    pub report_count: u8,
    pub packet_type: RtcpPacketType,
    pub length_field: u16,
}

impl RtcpHeader {
    pub const SIZE_BYTES: usize = 4;
    pub const VERSION: u8 = 2;
    pub const MAX_COUNT: usize = 31;

    pub fn new(packet_type: RtcpPacketType) -> Self {
        Self {
            version: Self::VERSION,
            has_padding: false,
            report_count: 0,
            packet_type,
            length_field: 0,
        }
    }

    /// Build the header for a packet with `count` entries (report blocks, chunks or SSRCs) and
    /// a word aligned payload of `payload_length_bytes`.
    pub fn for_payload(
        packet_type: RtcpPacketType,
        count: usize,
        payload_length_bytes: usize,
    ) -> Result<Self> {
        if count > Self::MAX_COUNT {
            return Err(CountOverflow { count }).context("report_count");
        }
        let length_field = u16::try_from(payload_length_bytes / 4)
            .map_err(|_| PayloadTooLarge(payload_length_bytes))
            .context("length_field")?;
        Ok(Self {
            report_count: count as u8,
            length_field,
            ..Self::new(packet_type)
        })
    }

    /// The length of the entire RTCP packet, including this header, in bytes
    pub fn length_bytes(&self) -> usize {
        (self.length_field as usize + 1) * 4
    }

    /// The length of this RTCP packet's payload (i.e. excluding the header) in bytes
    pub fn payload_length_bytes(&self) -> usize {
        self.length_field as usize * 4
    }
}

/// Read and validate an RTCP header.  Fails if the buffer can't hold the header, if the version
/// isn't 2, if the packet type isn't one we recognize or if the length field describes a packet
/// larger than what's left in the buffer.
pub fn parse_rtcp_header(buf: &mut PacketBuffer) -> Result<RtcpHeader> {
    let max_packet_size = buf.bytes_remaining();
    let first_byte = buf.read_u8().context("version/padding/count")?;
    let bits = first_byte.view_bits::<Msb0>();
    let version: u8 = bits[0..2].load_be();
    if version != RtcpHeader::VERSION {
        return Err(InvalidVersion(version)).context("version");
    }
    let has_padding = bits[2];
    let report_count: u8 = bits[3..].load_be();
    let packet_type =
        RtcpPacketType::try_from(buf.read_u8().context("packet_type")?).context("packet_type")?;
    let length_field = buf.read_u16().context("length_field")?;

    let header = RtcpHeader {
        version,
        has_padding,
        report_count,
        packet_type,
        length_field,
    };
    if header.length_bytes() > max_packet_size {
        return Err(InvalidLengthValue {
            length_field_bytes: header.length_bytes(),
            buf_remaining_bytes: max_packet_size,
        })
        .context("length_field");
    }

    Ok(header)
}

pub fn write_rtcp_header(buf: &mut BytesMut, header: &RtcpHeader) -> Result<()> {
    if header.version != RtcpHeader::VERSION {
        return Err(InvalidVersion(header.version)).context("version");
    }
    if header.report_count as usize > RtcpHeader::MAX_COUNT {
        return Err(CountOverflow {
            count: header.report_count as usize,
        })
        .context("report_count");
    }
    let mut first_byte = 0u8;
    let bits = first_byte.view_bits_mut::<Msb0>();
    bits[0..2].store_be(header.version);
    bits.set(2, header.has_padding);
    bits[3..].store_be(header.report_count);

    buf.put_u8(first_byte);
    buf.put_u8(header.packet_type.into());
    buf.put_u16(header.length_field);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unusual_byte_groupings, clippy::bool_assert_comparison)]
mod tests {
    use super::*;

    fn root_cause_is<T: std::error::Error + PartialEq + 'static>(
        err: &anyhow::Error,
        expected: T,
    ) -> bool {
        err.root_cause().downcast_ref::<T>() == Some(&expected)
    }

    #[test]
    fn test_read_rtcp_header() {
        let data: Vec<u8> = vec![0b10_0_00001, 202, 0, 0];
        let mut buf = PacketBuffer::new(&data);

        let header = parse_rtcp_header(&mut buf).unwrap();
        assert_eq!(header.version, 2);
        assert_eq!(header.has_padding, false);
        assert_eq!(header.report_count, 1);
        assert_eq!(header.packet_type, RtcpPacketType::Sdes);
        assert_eq!(header.length_field, 0);
        assert_eq!(header.length_bytes(), 4);
        assert_eq!(buf.position(), RtcpHeader::SIZE_BYTES);
    }

    #[test]
    fn test_read_rtcp_header_all_bits() {
        let data: Vec<u8> = vec![0b10_1_11111, 203, 0, 1, 0, 0, 0, 0];
        let mut buf = PacketBuffer::new(&data);

        let header = parse_rtcp_header(&mut buf).unwrap();
        assert_eq!(header.has_padding, true);
        assert_eq!(header.report_count, 31);
        assert_eq!(header.packet_type, RtcpPacketType::Bye);
        assert_eq!(header.payload_length_bytes(), 4);
    }

    #[test]
    fn test_read_rtcp_header_too_short() {
        let data: Vec<u8> = vec![0x81, 0xca, 0x00];
        let mut buf = PacketBuffer::new(&data);
        assert!(parse_rtcp_header(&mut buf).is_err());
    }

    #[test]
    fn test_read_rtcp_header_bad_version() {
        for first_byte in [0b00_0_00001, 0b01_0_00001, 0b11_0_00001] {
            let data: Vec<u8> = vec![first_byte, 0xca, 0x00, 0x00];
            let mut buf = PacketBuffer::new(&data);
            let err = parse_rtcp_header(&mut buf).unwrap_err();
            assert!(root_cause_is(&err, InvalidVersion(first_byte >> 6)));
        }
    }

    #[test]
    fn test_read_rtcp_header_unknown_type() {
        let data: Vec<u8> = vec![0x81, 0x00, 0x00, 0x00];
        let mut buf = PacketBuffer::new(&data);
        let err = parse_rtcp_header(&mut buf).unwrap_err();
        assert!(root_cause_is(&err, UnrecognizedPacketType(0)));
    }

    #[test]
    fn test_read_rtcp_header_length_too_large() {
        let data: Vec<u8> = vec![0x81, 0xca, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00];
        let mut buf = PacketBuffer::new(&data);
        let err = parse_rtcp_header(&mut buf).unwrap_err();
        assert!(root_cause_is(
            &err,
            InvalidLengthValue {
                length_field_bytes: 20,
                buf_remaining_bytes: 8,
            }
        ));
    }

    #[test]
    fn test_write_rtcp_header() {
        let header = RtcpHeader {
            version: 2,
            has_padding: true,
            report_count: 3,
            packet_type: RtcpPacketType::ReceiverReport,
            length_field: 13,
        };

        let mut buf = BytesMut::new();
        write_rtcp_header(&mut buf, &header).expect("successful write");
        assert_eq!(&buf[..], &[0b10_1_00011, 201, 0, 13]);
    }

    #[test]
    fn test_for_payload() {
        let header = RtcpHeader::for_payload(RtcpPacketType::SenderReport, 2, 72).unwrap();
        assert_eq!(header.version, 2);
        assert_eq!(header.has_padding, false);
        assert_eq!(header.report_count, 2);
        assert_eq!(header.length_field, 18);
        assert_eq!(header.length_bytes(), 76);

        let err = RtcpHeader::for_payload(RtcpPacketType::Sdes, 32, 0).unwrap_err();
        assert!(root_cause_is(&err, CountOverflow { count: 32 }));

        let err = RtcpHeader::for_payload(RtcpPacketType::Bye, 0, 4 * 65536).unwrap_err();
        assert!(root_cause_is(&err, PayloadTooLarge(4 * 65536)));
    }

    #[test]
    fn test_write_rtcp_header_count_overflow() {
        let header = RtcpHeader {
            report_count: 32,
            ..RtcpHeader::new(RtcpPacketType::Sdes)
        };
        let mut buf = BytesMut::new();
        assert!(write_rtcp_header(&mut buf, &header).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_write_rtcp_header_bad_version() {
        for version in [0, 1, 3, 4] {
            let header = RtcpHeader {
                version,
                ..RtcpHeader::new(RtcpPacketType::ReceiverReport)
            };
            let mut buf = BytesMut::new();
            let err = write_rtcp_header(&mut buf, &header).unwrap_err();
            assert!(root_cause_is(&err, InvalidVersion(version)));
            assert!(buf.is_empty());
        }
    }
}

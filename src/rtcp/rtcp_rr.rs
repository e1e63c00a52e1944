use anyhow::{Context, Result};
use bytes::{BufMut, BytesMut};

use crate::packet_buffer::PacketBuffer;

use super::{
    rtcp_header::{write_rtcp_header, RtcpHeader, RtcpPacketType},
    rtcp_receiver_report::{read_receiver_reports, ReceiverReport},
};

/// https://datatracker.ietf.org/doc/html/rfc3550#section-6.4.2
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// header |V=2|P|    RC   |   PT=RR=201   |             length            |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                     SSRC of packet sender                     |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// report |                 SSRC_1 (SSRC of first source)                 |
/// block  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///   1    | fraction lost |       cumulative number of packets lost       |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |           extended highest sequence number received           |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                      interarrival jitter                      |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         last SR (LSR)                         |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                   delay since last SR (DLSR)                  |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// report |                 SSRC_2 (SSRC of second source)                |
/// block  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///   2    :                               ...                             :
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtcpRrPacket<'a> {
    pub sender_ssrc: u32,
    pub report_blocks: Vec<ReceiverReport<'a>>,
}

impl<'a> RtcpRrPacket<'a> {
    pub const PT: RtcpPacketType = RtcpPacketType::ReceiverReport;

    pub fn new(sender_ssrc: u32) -> Self {
        Self {
            sender_ssrc,
            report_blocks: Vec::new(),
        }
    }

    pub fn add_report_block(&mut self, report_block: ReceiverReport<'a>) {
        self.report_blocks.push(report_block);
    }

    pub fn payload_length_bytes(&self) -> usize {
        4 + self.report_blocks.len() * ReceiverReport::SIZE_BYTES
    }

    pub fn header(&self) -> Result<RtcpHeader> {
        RtcpHeader::for_payload(
            Self::PT,
            self.report_blocks.len(),
            self.payload_length_bytes(),
        )
    }

    pub fn into_owned(self) -> RtcpRrPacket<'static> {
        RtcpRrPacket {
            sender_ssrc: self.sender_ssrc,
            report_blocks: self
                .report_blocks
                .into_iter()
                .map(ReceiverReport::into_owned)
                .collect(),
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) -> Result<()> {
        let header = self.header().context("rtcp rr header")?;
        write_rtcp_header(buf, &header).context("rtcp rr header")?;
        buf.put_u32(self.sender_ssrc);
        for report_block in &self.report_blocks {
            report_block.write_to(buf);
        }

        Ok(())
    }
}

/// Parse the payload of an RR packet.  `buf` must cover exactly the packet's payload.
pub fn parse_rtcp_rr<'a>(
    header: &RtcpHeader,
    buf: &mut PacketBuffer<'a>,
) -> Result<RtcpRrPacket<'a>> {
    Ok(RtcpRrPacket {
        sender_ssrc: buf.read_u32().context("sender ssrc")?,
        report_blocks: read_receiver_reports(header.report_count as usize, buf)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rr_header(report_count: u8) -> RtcpHeader {
        RtcpHeader {
            report_count,
            length_field: 1 + 6 * report_count as u16,
            ..RtcpHeader::new(RtcpPacketType::ReceiverReport)
        }
    }

    #[test]
    fn test_parse_rtcp_rr_no_blocks() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF];
        let mut buf = PacketBuffer::new(&data);
        let rr = parse_rtcp_rr(&rr_header(0), &mut buf).expect("successful parse");
        assert_eq!(rr.sender_ssrc, 0xDEADBEEF);
        assert!(rr.report_blocks.is_empty());
    }

    #[test]
    fn test_parse_rtcp_rr_missing_sender_ssrc() {
        let data = [0xDE, 0xAD];
        let mut buf = PacketBuffer::new(&data);
        assert!(parse_rtcp_rr(&rr_header(0), &mut buf).is_err());
    }

    #[test]
    fn test_write_rtcp_rr() {
        let mut rr = RtcpRrPacket::new(1);
        for ssrc in [2, 3] {
            let mut block = ReceiverReport::new();
            block.set_ssrc(ssrc);
            block.set_jitter(100);
            block.set_total_lost(7);
            rr.add_report_block(block);
        }

        let mut buf = BytesMut::new();
        rr.write_to(&mut buf).expect("successful write");
        assert_eq!(buf.len(), 4 + 4 + 48);
        assert_eq!(&buf[..8], &[0x82, 201, 0x00, 0x0D, 0x00, 0x00, 0x00, 0x01]);

        let mut read_buf = PacketBuffer::new(&buf[4..]);
        let read_rr = parse_rtcp_rr(&rr_header(2), &mut read_buf).unwrap();
        assert_eq!(read_rr, rr);
        assert_eq!(read_rr.report_blocks[1].ssrc(), 3);
        assert_eq!(read_rr.report_blocks[1].total_lost(), 7);
    }
}

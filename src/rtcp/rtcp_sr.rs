use anyhow::{Context, Result};
use bytes::BytesMut;

use crate::packet_buffer::PacketBuffer;

use super::{
    rtcp_header::{write_rtcp_header, RtcpHeader, RtcpPacketType},
    rtcp_receiver_report::{read_receiver_reports, ReceiverReport},
    rtcp_sender_report::{read_sender_report, SenderReport},
};

/// https://datatracker.ietf.org/doc/html/rfc3550#section-6.4.1
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// header |V=2|P|    RC   |   PT=SR=200   |             length            |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         SSRC of sender                        |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// sender |              NTP timestamp, most significant word             |
/// info   +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        :                              ...                              :
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// report |                 SSRC_1 (SSRC of first source)                 |
/// block  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///   1    :                               ...                             :
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtcpSrPacket<'a> {
    pub sender_report: SenderReport<'a>,
    pub report_blocks: Vec<ReceiverReport<'a>>,
}

impl<'a> RtcpSrPacket<'a> {
    pub const PT: RtcpPacketType = RtcpPacketType::SenderReport;

    pub fn new(sender_report: SenderReport<'a>) -> Self {
        Self {
            sender_report,
            report_blocks: Vec::new(),
        }
    }

    pub fn add_report_block(&mut self, report_block: ReceiverReport<'a>) {
        self.report_blocks.push(report_block);
    }

    pub fn payload_length_bytes(&self) -> usize {
        SenderReport::SIZE_BYTES + self.report_blocks.len() * ReceiverReport::SIZE_BYTES
    }

    pub fn header(&self) -> Result<RtcpHeader> {
        RtcpHeader::for_payload(
            Self::PT,
            self.report_blocks.len(),
            self.payload_length_bytes(),
        )
    }

    pub fn into_owned(self) -> RtcpSrPacket<'static> {
        RtcpSrPacket {
            sender_report: self.sender_report.into_owned(),
            report_blocks: self
                .report_blocks
                .into_iter()
                .map(ReceiverReport::into_owned)
                .collect(),
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) -> Result<()> {
        let header = self.header().context("rtcp sr header")?;
        write_rtcp_header(buf, &header).context("rtcp sr header")?;
        self.sender_report.write_to(buf);
        for report_block in &self.report_blocks {
            report_block.write_to(buf);
        }

        Ok(())
    }
}

/// Parse the payload of an SR packet.  `buf` must cover exactly the packet's payload.
pub fn parse_rtcp_sr<'a>(
    header: &RtcpHeader,
    buf: &mut PacketBuffer<'a>,
) -> Result<RtcpSrPacket<'a>> {
    Ok(RtcpSrPacket {
        sender_report: read_sender_report(buf)?,
        report_blocks: read_receiver_reports(header.report_count as usize, buf)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const SR_PAYLOAD: [u8; 48] = [
        // sender report
        0x00, 0x00, 0x00, 0x01,
        0x00, 0x00, 0x00, 0x02,
        0x00, 0x00, 0x00, 0x03,
        0x00, 0x00, 0x00, 0x04,
        0x00, 0x00, 0x00, 0x05,
        0x00, 0x00, 0x00, 0x06,
        // report block
        0x00, 0x00, 0x00, 0x07,
        0x10, 0x00, 0x00, 0x02,
        0x00, 0x00, 0x00, 0x08,
        0x00, 0x00, 0x00, 0x09,
        0x00, 0x00, 0x00, 0x0A,
        0x00, 0x00, 0x00, 0x0B,
    ];

    fn sr_header(report_count: u8) -> RtcpHeader {
        RtcpHeader {
            report_count,
            length_field: 12,
            ..RtcpHeader::new(RtcpPacketType::SenderReport)
        }
    }

    #[test]
    fn test_parse_rtcp_sr() {
        let mut buf = PacketBuffer::new(&SR_PAYLOAD);
        let sr = parse_rtcp_sr(&sr_header(1), &mut buf).expect("successful parse");

        assert_eq!(sr.sender_report.ssrc(), 1);
        assert_eq!(sr.sender_report.octet_count(), 6);
        assert_eq!(sr.report_blocks.len(), 1);
        let block = &sr.report_blocks[0];
        assert_eq!(block.ssrc(), 7);
        assert_eq!(block.fraction_lost(), 0x10);
        assert_eq!(block.total_lost(), 2);
        assert_eq!(block.delay_since_last_sender_report(), 0x0B);
        assert_eq!(buf.bytes_remaining(), 0);
    }

    #[test]
    fn test_parse_rtcp_sr_missing_report_block() {
        let mut buf = PacketBuffer::new(&SR_PAYLOAD);
        assert!(parse_rtcp_sr(&sr_header(2), &mut buf).is_err());
    }

    #[test]
    fn test_write_rtcp_sr() {
        let mut sender_report = SenderReport::new();
        sender_report.set_ssrc(42);
        let mut sr = RtcpSrPacket::new(sender_report);
        let mut block = ReceiverReport::new();
        block.set_ssrc(43);
        sr.add_report_block(block);

        let mut buf = BytesMut::new();
        sr.write_to(&mut buf).expect("successful write");
        assert_eq!(buf.len(), 4 + 24 + 24);
        assert_eq!(&buf[..4], &[0x81, 200, 0x00, 0x0C]);

        let mut read_buf = PacketBuffer::new(&buf[4..]);
        let read_sr = parse_rtcp_sr(&sr.header().unwrap(), &mut read_buf).unwrap();
        assert_eq!(read_sr, sr);
    }

    #[test]
    fn test_write_rtcp_sr_too_many_blocks() {
        let mut sr = RtcpSrPacket::default();
        for _ in 0..32 {
            sr.add_report_block(ReceiverReport::new());
        }
        let mut buf = BytesMut::new();
        assert!(sr.write_to(&mut buf).is_err());
    }
}

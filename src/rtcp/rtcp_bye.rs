use anyhow::{Context, Result};
use bytes::{BufMut, BytesMut};

use crate::{
    error::ByeReasonTooLong,
    packet_buffer::PacketBuffer,
    util::{add_padding, consume_padding, padding_to_word_boundary},
};

use super::rtcp_header::{write_rtcp_header, RtcpHeader, RtcpPacketType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcpByeReason(String);

impl RtcpByeReason {
    pub const MAX_LENGTH_BYTES: usize = u8::MAX as usize;

    pub fn new(reason: &str) -> Self {
        Self(reason.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn length_bytes(&self) -> usize {
        self.0.len()
    }
}

impl PartialEq<&str> for RtcpByeReason {
    fn eq(&self, other: &&str) -> bool {
        &self.0 == other
    }
}

/// Note that this assumes it's been checked that there is data remaining in this buffer
fn read_bye_reason(buf: &mut PacketBuffer) -> Result<RtcpByeReason> {
    let length_bytes = buf.read_u8().context("Reading reason length bytes")?;
    let data = buf
        .read_bytes(length_bytes as usize)
        .context("Reading reason data")?;
    let reason_str = String::from_utf8(data.to_vec()).context("Converting reason data to string")?;
    Ok(RtcpByeReason(reason_str))
}

/// https://datatracker.ietf.org/doc/html/rfc3550#section-6.6
///        0                   1                   2                   3
///        0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///       |V=2|P|    SC   |   PT=BYE=203  |             length            |
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///       |                           SSRC/CSRC                           |
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///       :                              ...                              :
///       +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// (opt) |     length    |               reason for leaving            ...
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtcpByePacket {
    pub ssrcs: Vec<u32>,
    pub reason: Option<RtcpByeReason>,
}

impl RtcpByePacket {
    pub const PT: RtcpPacketType = RtcpPacketType::Bye;

    pub fn payload_length_bytes(&self) -> usize {
        // The payload's length in bytes is the number of ssrcs * 4 plus the reason length and the
        // leading byte to describe its length (if there is a reason)
        let payload_length_bytes =
            self.ssrcs.len() * 4 + self.reason.as_ref().map_or(0, |r| r.length_bytes() + 1);
        payload_length_bytes + padding_to_word_boundary(payload_length_bytes)
    }

    pub fn header(&self) -> Result<RtcpHeader> {
        if let Some(reason) = &self.reason {
            if reason.length_bytes() > RtcpByeReason::MAX_LENGTH_BYTES {
                return Err(ByeReasonTooLong(reason.length_bytes())).context("reason");
            }
        }
        RtcpHeader::for_payload(Self::PT, self.ssrcs.len(), self.payload_length_bytes())
    }

    pub fn add_ssrc(mut self, ssrc: u32) -> Self {
        self.ssrcs.push(ssrc);
        self
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(RtcpByeReason::new(reason));
        self
    }

    pub fn write_to(&self, buf: &mut BytesMut) -> Result<()> {
        let header = self.header().context("rtcp bye header")?;
        write_rtcp_header(buf, &header).context("rtcp bye header")?;
        let start = buf.len();
        for ssrc in &self.ssrcs {
            buf.put_u32(*ssrc);
        }
        if let Some(reason) = &self.reason {
            let length = u8::try_from(reason.length_bytes())
                .map_err(|_| ByeReasonTooLong(reason.length_bytes()))
                .context("Writing reason string length")?;
            buf.put_u8(length);
            buf.put_slice(reason.as_str().as_bytes());
        }
        add_padding(buf, start);

        Ok(())
    }
}

/// Parse the payload of a BYE packet.  `buf` must cover exactly the packet's payload.
pub fn parse_rtcp_bye(header: &RtcpHeader, buf: &mut PacketBuffer) -> Result<RtcpByePacket> {
    let start = buf.position();
    let ssrcs = (0..header.report_count)
        .map(|i| buf.read_u32().with_context(|| format!("ssrc {}", i + 1)))
        .collect::<Result<Vec<u32>>>()?;
    let reason = if buf.bytes_remaining() > 0 {
        let reason = read_bye_reason(buf).context("reason")?;
        consume_padding(buf, start);
        Some(reason)
    } else {
        None
    };

    Ok(RtcpByePacket { ssrcs, reason })
}

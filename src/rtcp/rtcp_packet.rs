use anyhow::{Context, Result};
use bytes::{Bytes, BytesMut};
use log::{debug, trace};

use crate::{
    error::{BufferTooShort, InvalidPadding, UnconsumedPayload},
    packet_buffer::PacketBuffer,
};

use super::{
    rtcp_bye::{parse_rtcp_bye, RtcpByePacket},
    rtcp_header::{parse_rtcp_header, RtcpHeader, RtcpPacketType},
    rtcp_rr::{parse_rtcp_rr, RtcpRrPacket},
    rtcp_sdes::{parse_rtcp_sdes, RtcpSdesPacket},
    rtcp_sr::{parse_rtcp_sr, RtcpSrPacket},
};

/// One packet out of a (possibly compound) RTCP datagram.  Report blocks and SDES values of
/// parsed packets borrow from the datagram; call `into_owned` to detach them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SomeRtcpPacket<'a> {
    RtcpSrPacket(RtcpSrPacket<'a>),
    RtcpRrPacket(RtcpRrPacket<'a>),
    RtcpSdesPacket(RtcpSdesPacket<'a>),
    RtcpByePacket(RtcpByePacket),
}

impl<'a> SomeRtcpPacket<'a> {
    pub fn packet_type(&self) -> RtcpPacketType {
        match self {
            SomeRtcpPacket::RtcpSrPacket(_) => RtcpSrPacket::PT,
            SomeRtcpPacket::RtcpRrPacket(_) => RtcpRrPacket::PT,
            SomeRtcpPacket::RtcpSdesPacket(_) => RtcpSdesPacket::PT,
            SomeRtcpPacket::RtcpByePacket(_) => RtcpByePacket::PT,
        }
    }

    /// The size of this packet when written, header included
    pub fn length_bytes(&self) -> usize {
        let payload_length_bytes = match self {
            SomeRtcpPacket::RtcpSrPacket(sr) => sr.payload_length_bytes(),
            SomeRtcpPacket::RtcpRrPacket(rr) => rr.payload_length_bytes(),
            SomeRtcpPacket::RtcpSdesPacket(sdes) => sdes.payload_length_bytes(),
            SomeRtcpPacket::RtcpByePacket(bye) => bye.payload_length_bytes(),
        };
        RtcpHeader::SIZE_BYTES + payload_length_bytes
    }

    pub fn into_owned(self) -> SomeRtcpPacket<'static> {
        match self {
            SomeRtcpPacket::RtcpSrPacket(sr) => SomeRtcpPacket::RtcpSrPacket(sr.into_owned()),
            SomeRtcpPacket::RtcpRrPacket(rr) => SomeRtcpPacket::RtcpRrPacket(rr.into_owned()),
            SomeRtcpPacket::RtcpSdesPacket(sdes) => {
                SomeRtcpPacket::RtcpSdesPacket(sdes.into_owned())
            }
            SomeRtcpPacket::RtcpByePacket(bye) => SomeRtcpPacket::RtcpByePacket(bye),
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            SomeRtcpPacket::RtcpSrPacket(sr) => sr.write_to(buf).context("rtcp sr"),
            SomeRtcpPacket::RtcpRrPacket(rr) => rr.write_to(buf).context("rtcp rr"),
            SomeRtcpPacket::RtcpSdesPacket(sdes) => sdes.write_to(buf).context("rtcp sdes"),
            SomeRtcpPacket::RtcpByePacket(bye) => bye.write_to(buf).context("rtcp bye"),
        }
    }
}

impl<'a> From<RtcpSrPacket<'a>> for SomeRtcpPacket<'a> {
    fn from(value: RtcpSrPacket<'a>) -> Self {
        SomeRtcpPacket::RtcpSrPacket(value)
    }
}

impl<'a> From<RtcpRrPacket<'a>> for SomeRtcpPacket<'a> {
    fn from(value: RtcpRrPacket<'a>) -> Self {
        SomeRtcpPacket::RtcpRrPacket(value)
    }
}

impl<'a> From<RtcpSdesPacket<'a>> for SomeRtcpPacket<'a> {
    fn from(value: RtcpSdesPacket<'a>) -> Self {
        SomeRtcpPacket::RtcpSdesPacket(value)
    }
}

impl From<RtcpByePacket> for SomeRtcpPacket<'_> {
    fn from(value: RtcpByePacket) -> Self {
        SomeRtcpPacket::RtcpByePacket(value)
    }
}

/// Parse every packet in a compound RTCP datagram, in the order they appear.  A problem with any
/// one of them fails the entire datagram: no partial results are returned.
pub fn parse_rtcp_packets(data: &[u8]) -> Result<Vec<SomeRtcpPacket<'_>>> {
    let result = parse_compound(data);
    if let Err(e) = &result {
        debug!("Dropping RTCP datagram of {} bytes: {:#}", data.len(), e);
    }
    result
}

fn parse_compound(data: &[u8]) -> Result<Vec<SomeRtcpPacket<'_>>> {
    if data.len() < RtcpHeader::SIZE_BYTES {
        return Err(BufferTooShort {
            needed: RtcpHeader::SIZE_BYTES,
            remaining: data.len(),
        })
        .context("rtcp header");
    }
    let mut buf = PacketBuffer::new(data);
    let mut packets: Vec<SomeRtcpPacket> = Vec::new();

    let mut packet_num = 1;
    while buf.bytes_remaining() > 0 {
        let packet =
            parse_single_rtcp_packet(&mut buf).with_context(|| format!("sub packet {packet_num}"))?;
        trace!(
            "Parsed RTCP {} packet {} of {} bytes",
            packet.packet_type(),
            packet_num,
            packet.length_bytes()
        );
        packets.push(packet);
        packet_num += 1;
    }

    Ok(packets)
}

/// Parse the packet starting at the current position of `buf` and advance past it.
pub fn parse_single_rtcp_packet<'a>(buf: &mut PacketBuffer<'a>) -> Result<SomeRtcpPacket<'a>> {
    let header = parse_rtcp_header(buf).context("rtcp header")?;
    let mut payload = payload_buffer(&header, buf).context("payload")?;

    let packet = match header.packet_type {
        RtcpPacketType::SenderReport => SomeRtcpPacket::RtcpSrPacket(
            parse_rtcp_sr(&header, &mut payload).context("rtcp sr")?,
        ),
        RtcpPacketType::ReceiverReport => SomeRtcpPacket::RtcpRrPacket(
            parse_rtcp_rr(&header, &mut payload).context("rtcp rr")?,
        ),
        RtcpPacketType::Sdes => SomeRtcpPacket::RtcpSdesPacket(
            parse_rtcp_sdes(&header, &mut payload).context("rtcp sdes")?,
        ),
        RtcpPacketType::Bye => SomeRtcpPacket::RtcpByePacket(
            parse_rtcp_bye(&header, &mut payload).context("rtcp bye")?,
        ),
    };

    if payload.bytes_remaining() > 0 {
        return Err(UnconsumedPayload {
            remaining: payload.bytes_remaining(),
        })
        .with_context(|| format!("rtcp {}", header.packet_type));
    }

    Ok(packet)
}

/// Take the packet's payload out of `buf`, minus any padding signalled by the header's P bit.
fn payload_buffer<'a>(header: &RtcpHeader, buf: &mut PacketBuffer<'a>) -> Result<PacketBuffer<'a>> {
    let payload = buf.read_bytes(header.payload_length_bytes())?;
    if !header.has_padding {
        return Ok(PacketBuffer::new(payload));
    }
    // The last octet of the padding is a count of how many padding octets should be ignored,
    // including itself
    let padding_bytes = payload.last().copied().unwrap_or(0) as usize;
    if padding_bytes == 0 || padding_bytes > payload.len() {
        return Err(InvalidPadding {
            padding_bytes,
            payload_bytes: payload.len(),
        }
        .into());
    }
    Ok(PacketBuffer::new(&payload[..payload.len() - padding_bytes]))
}

/// Write all of `packets` back to back as one compound datagram
pub fn serialize_rtcp_packets(packets: &[SomeRtcpPacket]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(packets.iter().map(SomeRtcpPacket::length_bytes).sum());
    for (i, packet) in packets.iter().enumerate() {
        packet
            .write_to(&mut buf)
            .with_context(|| format!("sub packet {}", i + 1))?;
    }

    Ok(buf.freeze())
}

use std::{borrow::Cow, fmt::Display, str::from_utf8};

use anyhow::{Context, Result};
use bytes::{BufMut, BytesMut};

use crate::{
    error::{SdesValueTooLong, UnrecognizedSdesItemType},
    packet_buffer::PacketBuffer,
    util::{add_padding, consume_padding, padding_to_word_boundary},
};

use super::rtcp_header::{write_rtcp_header, RtcpHeader, RtcpPacketType};

/// https://datatracker.ietf.org/doc/html/rfc3550#section-6.5
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// header |V=2|P|    SC   |  PT=SDES=202  |             length            |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// chunk  |                          SSRC/CSRC_1                          |
///   1    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                           SDES items                          |
///        |                              ...                              |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// chunk  |                          SSRC/CSRC_2                          |
///   2    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                           SDES items                          |
///        |                              ...                              |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
///   Items are contiguous, i.e., items are not individually padded to a
///     32-bit boundary.  Text is not null terminated because some multi-
///     octet encodings include null octets.  The list of items in each chunk
///     MUST be terminated by one or more null octets, the first of which is
///     interpreted as an item type of zero to denote the end of the list.
///     No length octet follows the null item type octet, but additional null
///     octets MUST be included if needed to pad until the next 32-bit
///     boundary.  Note that this padding is separate from that indicated by
///     the P bit in the RTCP header.  A chunk with zero items (four null
///     octets) is valid but useless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtcpSdesPacket<'a> {
    pub chunks: Vec<SdesChunk<'a>>,
}

impl<'a> RtcpSdesPacket<'a> {
    pub const PT: RtcpPacketType = RtcpPacketType::Sdes;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chunk(&mut self, chunk: SdesChunk<'a>) {
        self.chunks.push(chunk);
    }

    pub fn payload_length_bytes(&self) -> usize {
        self.chunks.iter().map(SdesChunk::size_bytes).sum()
    }

    pub fn header(&self) -> Result<RtcpHeader> {
        RtcpHeader::for_payload(Self::PT, self.chunks.len(), self.payload_length_bytes())
    }

    pub fn into_owned(self) -> RtcpSdesPacket<'static> {
        RtcpSdesPacket {
            chunks: self.chunks.into_iter().map(SdesChunk::into_owned).collect(),
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) -> Result<()> {
        let header = self.header().context("rtcp sdes header")?;
        write_rtcp_header(buf, &header).context("rtcp sdes header")?;
        for chunk in &self.chunks {
            chunk.write_to(buf);
        }

        Ok(())
    }
}

/// Parse the payload of an SDES packet.  Reads up to `report_count` chunks, stopping early if the
/// payload runs out.
pub fn parse_rtcp_sdes<'a>(
    header: &RtcpHeader,
    buf: &mut PacketBuffer<'a>,
) -> Result<RtcpSdesPacket<'a>> {
    let mut chunks = Vec::new();
    while chunks.len() < header.report_count as usize && buf.bytes_remaining() > 0 {
        let chunk =
            read_sdes_chunk(buf).with_context(|| format!("sdes chunk {}", chunks.len() + 1))?;
        chunks.push(chunk);
    }

    Ok(RtcpSdesPacket { chunks })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SdesItemType {
    Cname = 1,
    Name = 2,
    Email = 3,
    Phone = 4,
    Loc = 5,
    Tool = 6,
    Note = 7,
    Priv = 8,
}

impl TryFrom<u8> for SdesItemType {
    type Error = UnrecognizedSdesItemType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SdesItemType::Cname),
            2 => Ok(SdesItemType::Name),
            3 => Ok(SdesItemType::Email),
            4 => Ok(SdesItemType::Phone),
            5 => Ok(SdesItemType::Loc),
            6 => Ok(SdesItemType::Tool),
            7 => Ok(SdesItemType::Note),
            8 => Ok(SdesItemType::Priv),
            t => Err(UnrecognizedSdesItemType(t)),
        }
    }
}

impl From<SdesItemType> for u8 {
    fn from(value: SdesItemType) -> Self {
        value as u8
    }
}

impl Display for SdesItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SdesItemType::Cname => "CNAME",
            SdesItemType::Name => "NAME",
            SdesItemType::Email => "EMAIL",
            SdesItemType::Phone => "PHONE",
            SdesItemType::Loc => "LOC",
            SdesItemType::Tool => "TOOL",
            SdesItemType::Note => "NOTE",
            SdesItemType::Priv => "PRIV",
        };
        write!(f, "{name}")
    }
}

/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      ID       |     length    | value                       ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///
/// The value is kept as raw bytes: a parsed item borrows them from the datagram, a constructed
/// item owns a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdesItem<'a> {
    item_type: SdesItemType,
    value: Cow<'a, [u8]>,
}

impl<'a> SdesItem<'a> {
    pub const MAX_VALUE_LENGTH: usize = u8::MAX as usize;

    pub fn new(item_type: SdesItemType, value: &[u8]) -> Result<SdesItem<'static>> {
        if value.len() > Self::MAX_VALUE_LENGTH {
            return Err(SdesValueTooLong(value.len()).into());
        }
        Ok(SdesItem {
            item_type,
            value: Cow::Owned(value.to_vec()),
        })
    }

    pub fn parse(data: &'a [u8]) -> Result<Self> {
        read_sdes_item(&mut PacketBuffer::new(data))
    }

    pub fn item_type(&self) -> SdesItemType {
        self.item_type
    }

    /// Length of the value in bytes
    pub fn length(&self) -> u8 {
        self.value.len() as u8
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The value as text, if it's valid UTF-8
    pub fn value_str(&self) -> Option<&str> {
        from_utf8(&self.value).ok()
    }

    /// Size of this item on the wire, excluding any chunk padding
    pub fn size_bytes(&self) -> usize {
        2 + self.value.len()
    }

    pub fn into_owned(self) -> SdesItem<'static> {
        SdesItem {
            item_type: self.item_type,
            value: Cow::Owned(self.value.into_owned()),
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u8(self.item_type.into());
        buf.put_u8(self.length());
        buf.put_slice(&self.value);
    }
}

/// Read a single item.  The list terminator (type zero) is handled by the chunk, so here a zero
/// type is an error like any other unrecognized type.
pub fn read_sdes_item<'a>(buf: &mut PacketBuffer<'a>) -> Result<SdesItem<'a>> {
    let item_type = SdesItemType::try_from(buf.read_u8().context("id")?).context("id")?;
    let length = buf.read_u8().context("length")? as usize;
    let value = buf.read_bytes(length).context("value")?;

    Ok(SdesItem {
        item_type,
        value: Cow::Borrowed(value),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdesChunk<'a> {
    ssrc: u32,
    items: Vec<SdesItem<'a>>,
}

impl<'a> SdesChunk<'a> {
    pub fn new(ssrc: u32) -> Self {
        Self {
            ssrc,
            items: Vec::new(),
        }
    }

    pub fn parse(data: &'a [u8]) -> Result<Self> {
        read_sdes_chunk(&mut PacketBuffer::new(data))
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn add_item(&mut self, item: SdesItem<'a>) {
        self.items.push(item);
    }

    pub fn with_item(mut self, item: SdesItem<'a>) -> Self {
        self.add_item(item);
        self
    }

    /// The items in the order they were parsed or added
    pub fn items(&self) -> &[SdesItem<'a>] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SdesItem<'a>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Size of this chunk on the wire: ssrc, items, terminator and padding
    pub fn size_bytes(&self) -> usize {
        let unpadded = 4 + self.items.iter().map(SdesItem::size_bytes).sum::<usize>() + 1;
        unpadded + padding_to_word_boundary(unpadded)
    }

    pub fn into_owned(self) -> SdesChunk<'static> {
        SdesChunk {
            ssrc: self.ssrc,
            items: self.items.into_iter().map(SdesItem::into_owned).collect(),
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        let start = buf.len();
        buf.put_u32(self.ssrc);
        for item in &self.items {
            item.write_to(buf);
        }
        buf.put_u8(0x00);
        add_padding(buf, start);
    }
}

impl<'a, 'b> IntoIterator for &'b SdesChunk<'a> {
    type Item = &'b SdesItem<'a>;
    type IntoIter = std::slice::Iter<'b, SdesItem<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Read a chunk: the ssrc followed by items until a terminator or the end of the buffer, then any
/// padding up to the next word boundary relative to the start of the chunk.
pub fn read_sdes_chunk<'a>(buf: &mut PacketBuffer<'a>) -> Result<SdesChunk<'a>> {
    let start = buf.position();
    let ssrc = buf.read_u32().context("ssrc")?;
    let mut items = Vec::new();
    while let Some(id) = buf.peek_u8() {
        if id == 0x00 {
            buf.skip(1).context("terminator")?;
            break;
        }
        let item = read_sdes_item(buf).with_context(|| format!("item {}", items.len() + 1))?;
        items.push(item);
    }
    consume_padding(buf, start);

    Ok(SdesChunk { ssrc, items })
}

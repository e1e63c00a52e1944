use anyhow::{Context, Result};
use bytes::{BufMut, BytesMut};

use crate::{field_buffer::FieldBuffer, packet_buffer::PacketBuffer};

const SENDER_REPORT_SIZE: usize = 24;

/// The fixed part of an SR packet following the RTCP header: the sender's SSRC and the sender
/// info block.
///
/// https://datatracker.ietf.org/doc/html/rfc3550#section-6.4.1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         SSRC of sender                        |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// sender |              NTP timestamp, most significant word             |
/// info   +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |             NTP timestamp, least significant word             |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         RTP timestamp                         |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                     sender's packet count                     |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                      sender's octet count                     |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
///
/// A parsed report is a view over the datagram it came from; setters copy it into a buffer of
/// its own first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderReport<'a> {
    buf: FieldBuffer<'a, SENDER_REPORT_SIZE>,
}

impl<'a> SenderReport<'a> {
    pub const SIZE_BYTES: usize = SENDER_REPORT_SIZE;

    const SSRC: usize = 0;
    const NTP_SEC: usize = 4;
    const NTP_FRAC: usize = 8;
    const RTP_TS: usize = 12;
    const PACKET_COUNT: usize = 16;
    const OCTET_COUNT: usize = 20;

    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret the start of `data` as a sender report without copying it.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        read_sender_report(&mut PacketBuffer::new(data))
    }

    pub fn ssrc(&self) -> u32 {
        self.buf.read_u32(Self::SSRC)
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        self.buf.write_u32(Self::SSRC, ssrc);
    }

    pub fn ntp_sec(&self) -> u32 {
        self.buf.read_u32(Self::NTP_SEC)
    }

    pub fn set_ntp_sec(&mut self, ntp_sec: u32) {
        self.buf.write_u32(Self::NTP_SEC, ntp_sec);
    }

    pub fn ntp_frac(&self) -> u32 {
        self.buf.read_u32(Self::NTP_FRAC)
    }

    pub fn set_ntp_frac(&mut self, ntp_frac: u32) {
        self.buf.write_u32(Self::NTP_FRAC, ntp_frac);
    }

    /// The full 64 bit NTP timestamp (32.32 fixed point)
    pub fn ntp_timestamp(&self) -> u64 {
        ((self.ntp_sec() as u64) << 32) | self.ntp_frac() as u64
    }

    pub fn set_ntp_timestamp(&mut self, ntp_timestamp: u64) {
        self.set_ntp_sec((ntp_timestamp >> 32) as u32);
        self.set_ntp_frac(ntp_timestamp as u32);
    }

    pub fn rtp_ts(&self) -> u32 {
        self.buf.read_u32(Self::RTP_TS)
    }

    pub fn set_rtp_ts(&mut self, rtp_ts: u32) {
        self.buf.write_u32(Self::RTP_TS, rtp_ts);
    }

    pub fn packet_count(&self) -> u32 {
        self.buf.read_u32(Self::PACKET_COUNT)
    }

    pub fn set_packet_count(&mut self, packet_count: u32) {
        self.buf.write_u32(Self::PACKET_COUNT, packet_count);
    }

    pub fn octet_count(&self) -> u32 {
        self.buf.read_u32(Self::OCTET_COUNT)
    }

    pub fn set_octet_count(&mut self, octet_count: u32) {
        self.buf.write_u32(Self::OCTET_COUNT, octet_count);
    }

    /// The wire representation of the current field values, whatever buffer currently backs them
    pub fn raw(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// Make sure this report owns its bytes and return them
    pub fn serialize(&mut self) -> &[u8] {
        &self.buf.to_mut()[..]
    }

    pub fn is_borrowed(&self) -> bool {
        self.buf.is_borrowed()
    }

    pub fn into_owned(self) -> SenderReport<'static> {
        SenderReport {
            buf: self.buf.into_owned(),
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_slice(self.raw());
    }
}

pub fn read_sender_report<'a>(buf: &mut PacketBuffer<'a>) -> Result<SenderReport<'a>> {
    let bytes = buf.read_array::<SENDER_REPORT_SIZE>().context("sender report")?;
    Ok(SenderReport {
        buf: FieldBuffer::Borrowed(bytes),
    })
}

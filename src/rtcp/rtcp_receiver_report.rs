use anyhow::{Context, Result};
use bytes::{BufMut, BytesMut};

use crate::{field_buffer::FieldBuffer, packet_buffer::PacketBuffer};

const RECEIVER_REPORT_SIZE: usize = 24;

/// A single reception report block, as carried by both SR and RR packets.
///
/// https://datatracker.ietf.org/doc/html/rfc3550#section-6.4.1
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
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverReport<'a> {
    buf: FieldBuffer<'a, RECEIVER_REPORT_SIZE>,
}

impl<'a> ReceiverReport<'a> {
    pub const SIZE_BYTES: usize = RECEIVER_REPORT_SIZE;
    pub const MAX_TOTAL_LOST: i32 = 0x7F_FFFF;
    pub const MIN_TOTAL_LOST: i32 = -0x80_0000;

    const SSRC: usize = 0;
    const FRACTION_LOST: usize = 4;
    const TOTAL_LOST: usize = 5;
    const LAST_SEQ: usize = 8;
    const JITTER: usize = 12;
    const LSR: usize = 16;
    const DLSR: usize = 20;

    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret the start of `data` as a report block without copying it.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        read_receiver_report(&mut PacketBuffer::new(data))
    }

    /// SSRC of the source this block reports on
    pub fn ssrc(&self) -> u32 {
        self.buf.read_u32(Self::SSRC)
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        self.buf.write_u32(Self::SSRC, ssrc);
    }

    /// Fraction of packets lost since the previous report, as a fixed point number with the
    /// binary point at the left edge
    pub fn fraction_lost(&self) -> u8 {
        self.buf.read_u8(Self::FRACTION_LOST)
    }

    pub fn set_fraction_lost(&mut self, fraction_lost: u8) {
        self.buf.write_u8(Self::FRACTION_LOST, fraction_lost);
    }

    /// Cumulative number of packets lost.  This is a signed 24 bit field: duplicates can make the
    /// count go negative.
    pub fn total_lost(&self) -> i32 {
        self.buf.read_i24(Self::TOTAL_LOST)
    }

    /// Values outside of the 24 bit range are clamped
    pub fn set_total_lost(&mut self, total_lost: i32) {
        let total_lost = total_lost.clamp(Self::MIN_TOTAL_LOST, Self::MAX_TOTAL_LOST);
        self.buf.write_i24(Self::TOTAL_LOST, total_lost);
    }

    /// Extended highest sequence number received
    pub fn last_seq(&self) -> u32 {
        self.buf.read_u32(Self::LAST_SEQ)
    }

    pub fn set_last_seq(&mut self, last_seq: u32) {
        self.buf.write_u32(Self::LAST_SEQ, last_seq);
    }

    pub fn jitter(&self) -> u32 {
        self.buf.read_u32(Self::JITTER)
    }

    pub fn set_jitter(&mut self, jitter: u32) {
        self.buf.write_u32(Self::JITTER, jitter);
    }

    /// The middle 32 bits of the NTP timestamp of the last SR received from this source
    pub fn last_sender_report(&self) -> u32 {
        self.buf.read_u32(Self::LSR)
    }

    pub fn set_last_sender_report(&mut self, lsr: u32) {
        self.buf.write_u32(Self::LSR, lsr);
    }

    /// In units of 1/65536 seconds
    pub fn delay_since_last_sender_report(&self) -> u32 {
        self.buf.read_u32(Self::DLSR)
    }

    pub fn set_delay_since_last_sender_report(&mut self, dlsr: u32) {
        self.buf.write_u32(Self::DLSR, dlsr);
    }

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

    pub fn into_owned(self) -> ReceiverReport<'static> {
        ReceiverReport {
            buf: self.buf.into_owned(),
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_slice(self.raw());
    }
}

pub fn read_receiver_report<'a>(buf: &mut PacketBuffer<'a>) -> Result<ReceiverReport<'a>> {
    let bytes = buf
        .read_array::<RECEIVER_REPORT_SIZE>()
        .context("receiver report")?;
    Ok(ReceiverReport {
        buf: FieldBuffer::Borrowed(bytes),
    })
}

pub fn read_receiver_reports<'a>(
    num_reports: usize,
    buf: &mut PacketBuffer<'a>,
) -> Result<Vec<ReceiverReport<'a>>> {
    (0..num_reports)
        .map(|i| read_receiver_report(buf).with_context(|| format!("report block {}", i + 1)))
        .collect()
}

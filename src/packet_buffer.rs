use byteorder::{ByteOrder, NetworkEndian};

use crate::error::BufferTooShort;

/// A read cursor over a borrowed byte slice.  Every read is bounds checked and anything handed
/// out (slices, fixed size arrays) borrows from the original data rather than copying it.
#[derive(Debug, Clone)]
pub struct PacketBuffer<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> PacketBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Return the current cursor position of this buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// How many bytes remaining in this buffer.
    pub fn bytes_remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    /// Consume the next byte only if it equals `value`.  Returns whether it was consumed.
    pub fn next_if_eq(&mut self, value: u8) -> bool {
        if self.peek_u8() == Some(value) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], BufferTooShort> {
        let remaining = self.bytes_remaining();
        if len > remaining {
            return Err(BufferTooShort {
                needed: len,
                remaining,
            });
        }
        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<&'a [u8; N], BufferTooShort> {
        let remaining = self.bytes_remaining();
        let bytes = self.read_bytes(N)?;
        bytes.try_into().map_err(|_| BufferTooShort {
            needed: N,
            remaining,
        })
    }

    pub fn read_u8(&mut self) -> Result<u8, BufferTooShort> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, BufferTooShort> {
        Ok(NetworkEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, BufferTooShort> {
        Ok(NetworkEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn skip(&mut self, len: usize) -> Result<(), BufferTooShort> {
        self.read_bytes(len).map(|_| ())
    }

    /// Get a sub buffer of this one covering the next `len` bytes.  This buffer's position is
    /// advanced past them; reads on the sub buffer can never go beyond its end.
    pub fn sub_buffer(&mut self, len: usize) -> Result<PacketBuffer<'a>, BufferTooShort> {
        self.read_bytes(len).map(PacketBuffer::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance_position() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut buf = PacketBuffer::new(&data);

        assert_eq!(buf.read_u8().unwrap(), 0x01);
        assert_eq!(buf.read_u16().unwrap(), 0x0203);
        assert_eq!(buf.read_u32().unwrap(), 0x04050607);
        assert_eq!(buf.position(), 7);
        assert_eq!(buf.bytes_remaining(), 0);
        assert!(buf.peek_u8().is_none());
    }

    #[test]
    fn test_read_past_end() {
        let data = [0x01, 0x02, 0x03];
        let mut buf = PacketBuffer::new(&data);

        let err = buf.read_u32().unwrap_err();
        assert_eq!(
            err,
            BufferTooShort {
                needed: 4,
                remaining: 3
            }
        );
        // A failed read doesn't move the cursor
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_sub_buffer() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut buf = PacketBuffer::new(&data);
        buf.skip(1).unwrap();

        let mut sub = buf.sub_buffer(2).unwrap();
        assert_eq!(buf.position(), 3);
        assert_eq!(sub.read_u16().unwrap(), 0x0203);
        assert!(sub.read_u8().is_err());

        assert!(buf.sub_buffer(3).is_err());
    }

    #[test]
    fn test_read_array_borrows() {
        let data = [0xAA, 0xBB, 0xCC, 0xDD];
        let mut buf = PacketBuffer::new(&data);
        let arr: &[u8; 4] = buf.read_array().unwrap();
        assert!(std::ptr::eq(arr.as_ptr(), data.as_ptr()));
    }

    #[test]
    fn test_next_if_eq() {
        let data = [0x00, 0x07];
        let mut buf = PacketBuffer::new(&data);
        assert!(buf.next_if_eq(0x00));
        assert!(!buf.next_if_eq(0x00));
        assert_eq!(buf.position(), 1);
        assert!(buf.next_if_eq(0x07));
        assert!(!buf.next_if_eq(0x07));
        assert_eq!(buf.bytes_remaining(), 0);
    }
}

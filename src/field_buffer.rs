use byteorder::{ByteOrder, NetworkEndian};

/// Backing storage for a fixed layout record: either a view over bytes owned by the caller
/// (zero-copy, tied to the lifetime of the parsed datagram) or a buffer owned by the record.
///
/// Any write turns a borrowed buffer into an owned one first, so the caller's data is never
/// modified.
#[derive(Debug, Clone)]
pub enum FieldBuffer<'a, const N: usize> {
    Borrowed(&'a [u8; N]),
    Owned([u8; N]),
}

impl<const N: usize> Default for FieldBuffer<'_, N> {
    fn default() -> Self {
        FieldBuffer::Owned([0; N])
    }
}

impl<'a, const N: usize> FieldBuffer<'a, N> {
    pub fn as_bytes(&self) -> &[u8; N] {
        match self {
            FieldBuffer::Borrowed(bytes) => bytes,
            FieldBuffer::Owned(bytes) => bytes,
        }
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, FieldBuffer::Borrowed(_))
    }

    /// Get mutable access to the bytes, copying them out of the borrowed source first if needed
    pub fn to_mut(&mut self) -> &mut [u8; N] {
        if let FieldBuffer::Borrowed(bytes) = *self {
            *self = FieldBuffer::Owned(*bytes);
        }
        match self {
            FieldBuffer::Owned(bytes) => bytes,
            FieldBuffer::Borrowed(_) => unreachable!("buffer was just made owned"),
        }
    }

    pub fn into_owned(self) -> FieldBuffer<'static, N> {
        FieldBuffer::Owned(*self.as_bytes())
    }

    pub fn read_u8(&self, offset: usize) -> u8 {
        self.as_bytes()[offset]
    }

    pub fn read_i24(&self, offset: usize) -> i32 {
        NetworkEndian::read_i24(&self.as_bytes()[offset..offset + 3])
    }

    pub fn read_u32(&self, offset: usize) -> u32 {
        NetworkEndian::read_u32(&self.as_bytes()[offset..offset + 4])
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) {
        self.to_mut()[offset] = value;
    }

    pub fn write_i24(&mut self, offset: usize, value: i32) {
        NetworkEndian::write_i24(&mut self.to_mut()[offset..offset + 3], value);
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) {
        NetworkEndian::write_u32(&mut self.to_mut()[offset..offset + 4], value);
    }
}

impl<const N: usize> PartialEq for FieldBuffer<'_, N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> Eq for FieldBuffer<'_, N> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_copies_borrowed() {
        let data = [0u8, 0, 0, 1];
        let mut buf = FieldBuffer::Borrowed(&data);
        assert!(buf.is_borrowed());
        assert_eq!(buf.read_u32(0), 1);

        buf.write_u32(0, 42);
        assert!(!buf.is_borrowed());
        assert_eq!(buf.read_u32(0), 42);
        assert_eq!(data, [0, 0, 0, 1]);
    }

    #[test]
    fn test_i24_sign_extension() {
        let mut buf = FieldBuffer::<4>::default();
        buf.write_i24(1, -2);
        assert_eq!(buf.as_bytes(), &[0x00, 0xFF, 0xFF, 0xFE]);
        assert_eq!(buf.read_i24(1), -2);
    }

    #[test]
    fn test_equality_ignores_ownership() {
        let data = [1u8, 2, 3];
        assert_eq!(FieldBuffer::Borrowed(&data), FieldBuffer::Owned([1, 2, 3]));
    }
}

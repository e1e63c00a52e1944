use bytes::{BufMut, BytesMut};

use crate::packet_buffer::PacketBuffer;

/// How many bytes are needed to bring `len` up to the next multiple of 4.
pub fn padding_to_word_boundary(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Consume zero bytes from `buf` until it sits on a word boundary relative to `start`.  Stops
/// early at the first non-zero byte or the end of the buffer.
pub fn consume_padding(buf: &mut PacketBuffer, start: usize) {
    let mut pending = padding_to_word_boundary(buf.position() - start);
    while pending > 0 && buf.next_if_eq(0x00) {
        pending -= 1;
    }
}

/// Write zero bytes to `buf` until the data written since `start` is a multiple of 4 bytes.
pub fn add_padding(buf: &mut BytesMut, start: usize) {
    buf.put_bytes(0x00, padding_to_word_boundary(buf.len() - start));
}

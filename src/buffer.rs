//! Per-datagram packet buffer. The request is decoded from it and the
//! response is built back into it in place, so it carries both cursor
//! reads and positioned writes.

/// RFC 1035 limit for UDP messages.
pub const MAX_PACK_LEN: usize = 512;

/// The reply repeats the question as the answer name, so the worst case is
/// the question twice plus ttl, rdlength and a full-length encoded name.
const BUF_CAP: usize = MAX_PACK_LEN * 2 + 4 + 2 + 256;

pub struct PacketBuffer {
    buf: [u8; BUF_CAP],
    current: usize,
}

impl PacketBuffer {
    pub fn new() -> Self {
        PacketBuffer {
            buf: [0u8; BUF_CAP],
            current: 0,
        }
    }

    /// One byte past MAX_PACK_LEN so an oversized datagram is detectable
    /// from the received length alone.
    pub fn as_recv_slice(&mut self) -> &mut [u8] {
        &mut self.buf[..MAX_PACK_LEN + 1]
    }

    pub fn at(&mut self, index: usize) {
        self.current = index;
    }

    pub fn take(&mut self) -> u8 {
        let result: u8 = self.buf[self.current];
        self.current += 1;
        result
    }

    pub fn get_current_index(&self) -> usize {
        self.current
    }

    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        &self.buf[start..end]
    }

    pub fn set_u16(&mut self, index: usize, value: u16) {
        self.buf[index..index + 2].copy_from_slice(&value.to_be_bytes());
    }

    pub fn put_u16(&mut self, value: u16) {
        self.put_slice(&value.to_be_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.put_slice(&value.to_be_bytes());
    }

    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf[self.current..self.current + bytes.len()].copy_from_slice(bytes);
        self.current += bytes.len();
    }

    /// Copies `len` bytes starting at `start` to the cursor position and
    /// advances past them.
    pub fn copy_forward(&mut self, start: usize, len: usize) {
        self.buf.copy_within(start..start + len, self.current);
        self.current += len;
    }
}

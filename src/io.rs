//! The I/O boundary between the encoder/decoder core and wherever a
//! source object's bytes actually live, generalized from a raw C `ioctx`
//! pointer contract into a safe trait plus an in-memory adapter for
//! tests.

/// A seekable byte sink/source. Short reads are expected at the tail of
/// an object (the caller zero-pads); short writes should not happen for
/// an in-bounds seek.
pub trait IoContext {
    /// Moves the cursor to `offset`. Returns `false` if `offset` is
    /// beyond anything this context can address.
    fn seek(&mut self, offset: u64) -> bool;

    /// Reads up to `buf.len()` bytes, returning how many were read. A
    /// return below `buf.len()` means end-of-data, not an error.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Writes `buf.len()` bytes at the cursor, returning how many were
    /// written.
    fn write(&mut self, buf: &[u8]) -> usize;
}

/// An in-memory [`IoContext`] over an owned byte buffer, growing on
/// write past the current end.
#[derive(Clone, Debug, Default)]
pub struct SliceIo {
    buf: Vec<u8>,
    pos: usize,
}

impl SliceIo {
    /// Wraps existing bytes, e.g. a source object to encode from.
    pub fn new(data: Vec<u8>) -> Self {
        Self { buf: data, pos: 0 }
    }

    /// An all-zero buffer of the given length, e.g. a decode target.
    pub fn with_capacity(len: usize) -> Self {
        Self { buf: vec![0u8; len], pos: 0 }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl IoContext for SliceIo {
    fn seek(&mut self, offset: u64) -> bool {
        let offset = offset as usize;
        if offset > self.buf.len() {
            return false;
        }
        self.pos = offset;
        true
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let avail = self.buf.len().saturating_sub(self.pos);
        let n = avail.min(buf.len());
        buf[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        let end = self.pos + buf.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        buf.len()
    }
}

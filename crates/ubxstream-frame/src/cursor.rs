use bytes::{Buf, BytesMut};

/// Input buffer with a read cursor that can be rewound to a retained mark.
///
/// `base` is the absolute stream offset of `buf[0]`. Bytes are only released
/// by [`ScanBuffer::compact`], so anything at or after a live mark can be
/// re-read after a rewind without copying the unread tail.
#[derive(Debug)]
pub(crate) struct ScanBuffer {
    buf: BytesMut,
    pos: usize,
    base: u64,
}

impl ScanBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            pos: 0,
            base: 0,
        }
    }

    pub(crate) fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    pub(crate) fn next_byte(&mut self) -> Option<u8> {
        let byte = self.buf.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }

    /// Absolute stream offset of the next unread byte.
    pub(crate) fn position(&self) -> u64 {
        self.base + self.pos as u64
    }

    /// Bytes retained between `mark` and the cursor.
    pub(crate) fn since(&self, mark: u64) -> &[u8] {
        let start = self.index_of(mark);
        &self.buf[start..self.pos]
    }

    /// Move the cursor back to `mark`. Returns the number of bytes rewound.
    pub(crate) fn rewind_to(&mut self, mark: u64) -> usize {
        let start = self.index_of(mark);
        let rewound = self.pos - start;
        self.pos = start;
        rewound
    }

    /// Release consumed bytes, keeping everything from `keep_from` onward.
    /// With no mark, every consumed byte is released.
    pub(crate) fn compact(&mut self, keep_from: Option<u64>) {
        let drop = match keep_from {
            Some(mark) => self.index_of(mark),
            None => self.pos,
        };
        if drop == 0 {
            return;
        }
        self.buf.advance(drop);
        self.pos -= drop;
        self.base += drop as u64;
    }

    /// Drop all buffered bytes, read or not.
    pub(crate) fn clear(&mut self) {
        self.base += self.buf.len() as u64;
        self.buf.clear();
        self.pos = 0;
    }

    pub(crate) fn retained(&self) -> usize {
        self.buf.len()
    }

    fn index_of(&self, mark: u64) -> usize {
        debug_assert!(mark >= self.base, "mark released before rewind");
        debug_assert!(mark <= self.position(), "mark ahead of cursor");
        (mark - self.base) as usize
    }
}

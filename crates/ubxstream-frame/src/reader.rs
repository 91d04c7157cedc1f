use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::config::DecoderConfig;
use crate::decoder::FrameDecoder;
use crate::error::{FrameError, Result};
use crate::event::DecodeEvent;
use crate::lengths::{KnownLengths, LengthTable};

const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Pulls bytes from any `Read` source and yields decode events.
///
/// Handles partial reads internally. End of stream is not an error: a
/// partial frame is dropped and [`FrameReader::next_event`] returns `None`.
pub struct FrameReader<T, L = KnownLengths> {
    inner: T,
    decoder: FrameDecoder<L>,
    pending: VecDeque<DecodeEvent>,
    read_buf: Vec<u8>,
    eof: bool,
}

impl<T: Read> FrameReader<T, KnownLengths> {
    /// Create a reader with the default configuration and built-in lengths.
    pub fn new(inner: T) -> Self {
        Self::with_decoder(inner, FrameDecoder::new(DecoderConfig::default()))
    }
}

impl<T: Read, L: LengthTable> FrameReader<T, L> {
    /// Create a reader around an existing decoder.
    pub fn with_decoder(inner: T, decoder: FrameDecoder<L>) -> Self {
        Self {
            inner,
            decoder,
            pending: VecDeque::new(),
            read_buf: vec![0u8; READ_CHUNK_SIZE],
            eof: false,
        }
    }

    /// Limit how many bytes are requested per `read` call. Minimum 1.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.read_buf.resize(chunk_size.max(1), 0);
        self
    }

    /// Read until the next event is available (blocking).
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    pub fn next_event(&mut self) -> Result<Option<DecodeEvent>> {
        let mut events = Vec::new();

        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if self.eof {
                return Ok(None);
            }

            let read = match self.inner.read(&mut self.read_buf) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.eof = true;
                self.decoder.finish();
                continue;
            }

            self.decoder.feed_into(&self.read_buf[..read], &mut events);
            self.pending.extend(events.drain(..));
        }
    }

    /// Iterate over events until end of stream or the first I/O error.
    pub fn events(&mut self) -> Events<'_, T, L> {
        Events { reader: self }
    }

    /// The decoder driving this reader.
    pub fn decoder(&self) -> &FrameDecoder<L> {
        &self.decoder
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

/// Iterator returned by [`FrameReader::events`].
pub struct Events<'a, T, L> {
    reader: &'a mut FrameReader<T, L>,
}

impl<T: Read, L: LengthTable> Iterator for Events<'_, T, L> {
    type Item = Result<DecodeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_event().transpose()
    }
}

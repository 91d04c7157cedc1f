//! `tokio_util` codec adapter over [`FrameDecoder`].

use std::collections::VecDeque;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::config::DecoderConfig;
use crate::decoder::FrameDecoder;
use crate::error::FrameError;
use crate::event::DecodeEvent;
use crate::lengths::{KnownLengths, LengthTable};

/// Decodes UBX events from a framed async byte stream.
///
/// Every byte handed to [`Decoder::decode`] is consumed immediately; the
/// frame in progress lives inside the wrapped [`FrameDecoder`].
pub struct UbxCodec<L = KnownLengths> {
    decoder: FrameDecoder<L>,
    pending: VecDeque<DecodeEvent>,
}

impl UbxCodec<KnownLengths> {
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_decoder(FrameDecoder::new(config))
    }
}

impl Default for UbxCodec<KnownLengths> {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl<L: LengthTable> UbxCodec<L> {
    pub fn with_decoder(decoder: FrameDecoder<L>) -> Self {
        Self {
            decoder,
            pending: VecDeque::new(),
        }
    }

    pub fn decoder(&self) -> &FrameDecoder<L> {
        &self.decoder
    }

    fn drain_into_decoder(&mut self, src: &mut BytesMut) {
        if src.is_empty() {
            return;
        }
        let mut events = Vec::new();
        self.decoder.feed_into(&src[..], &mut events);
        src.clear();
        self.pending.extend(events);
    }
}

impl<L: LengthTable> Decoder for UbxCodec<L> {
    type Item = DecodeEvent;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.drain_into_decoder(src);
        Ok(self.pending.pop_front())
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.drain_into_decoder(buf);
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }
        self.decoder.finish();
        Ok(None)
    }
}

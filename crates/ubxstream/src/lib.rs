//! Decode UBX frames from raw serial captures and byte streams.
//!
//! ubxstream turns an unaligned byte stream into validated UBX packets and
//! diagnostic events, resynchronising after noise and corrupt frames.
//!
//! # Crate Structure
//!
//! - [`frame`]: the resynchronising frame decoder, length tables and
//!   blocking/async stream adapters

/// Re-export frame decoder types.
pub mod frame {
    pub use ubxstream_frame::*;
}

pub use ubxstream_frame::{DecodeEvent, DecoderConfig, FrameDecoder, Packet};

//! Resynchronising frame decoder for UBX-style binary streams.
//!
//! Every frame on the wire is laid out as:
//! - A 2-byte sync marker (`0xB5 0x62`)
//! - A class byte and an id byte
//! - A 2-byte little-endian payload length
//! - The payload
//! - A 2-byte Fletcher-8 checksum over class, id, length and payload
//!
//! Bytes may arrive in chunks of any size. The decoder never surfaces a
//! partial frame, and a frame that fails its checksum is re-scanned from just
//! past its sync marker so an embedded frame is not lost.

pub mod checksum;
#[cfg(feature = "async")]
pub mod codec;
pub mod config;
mod cursor;
pub mod decoder;
pub mod error;
pub mod event;
pub mod lengths;
pub mod reader;

pub use checksum::{fletcher8, frame_checksum, ChecksumCalc};
#[cfg(feature = "async")]
pub use codec::UbxCodec;
pub use config::{DecoderConfig, DEFAULT_MAX_PAYLOAD};
pub use decoder::{DecoderStats, FrameDecoder, SYNC_CHAR_1, SYNC_CHAR_2};
pub use error::{FrameError, LengthTableError, Result};
pub use event::{DecodeEvent, FrameSnapshot, Packet};
pub use lengths::{KnownLengths, LengthOverrides, LengthTable, NoLengths};
pub use reader::FrameReader;

/// Errors raised by decoder construction and the stream adapters.
///
/// Malformed input is never an error: it is reported as a
/// [`DecodeEvent`](crate::DecodeEvent) and the decoder resynchronises.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The decoder configuration was rejected at construction.
    #[error("invalid decoder configuration: {0}")]
    InvalidConfig(String),

    /// An I/O error occurred while reading from the byte source.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while loading an expected-length table.
#[derive(Debug, thiserror::Error)]
pub enum LengthTableError {
    /// The table file could not be read.
    #[error("failed to read length table: {0}")]
    Read(#[from] std::io::Error),

    /// The table document is not valid JSON or has the wrong shape.
    #[error("length table is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The same (class, id) pair was listed twice with different lengths.
    #[error("conflicting entries for class 0x{class:02X} id 0x{id:02X}: {first} vs {second}")]
    Conflict {
        class: u8,
        id: u8,
        first: u16,
        second: u16,
    },
}

pub type Result<T> = std::result::Result<T, FrameError>;

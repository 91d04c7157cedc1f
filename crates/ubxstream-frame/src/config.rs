use crate::error::{FrameError, Result};

/// Default maximum payload length in bytes.
pub const DEFAULT_MAX_PAYLOAD: usize = 300;

/// Configuration for the frame decoder. Fixed for the decoder's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest accepted declared payload length. `0` disables the check.
    pub max_payload_length: usize,
}

impl DecoderConfig {
    /// Configuration with an explicit payload limit.
    pub fn new(max_payload_length: usize) -> Self {
        Self { max_payload_length }
    }

    /// Configuration without a payload limit.
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    /// Build a configuration from a signed limit, as supplied by callers that
    /// parse untyped input. Negative limits are rejected.
    pub fn from_signed(max_payload_length: i64) -> Result<Self> {
        usize::try_from(max_payload_length)
            .map(Self::new)
            .map_err(|_| {
                FrameError::InvalidConfig(format!(
                    "max payload length must be >= 0 (got {max_payload_length})"
                ))
            })
    }

    /// True when `length` exceeds the configured limit.
    pub fn exceeds_limit(&self, length: u16) -> bool {
        self.max_payload_length != 0 && usize::from(length) > self.max_payload_length
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD)
    }
}

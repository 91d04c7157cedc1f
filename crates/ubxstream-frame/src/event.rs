use std::fmt;

use bytes::Bytes;

/// A validated frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub class: u8,
    pub id: u8,
    pub payload: Bytes,
}

impl Packet {
    pub fn new(class: u8, id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            class,
            id,
            payload: payload.into(),
        }
    }
}

/// The state of a frame at the moment it terminated.
///
/// Fields the decoder had not reached yet keep their empty value: a frame
/// rejected on its length has an empty payload and no received checksum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSnapshot {
    pub class: u8,
    pub id: u8,
    /// Declared payload length.
    pub length: u16,
    pub payload: Bytes,
    pub received_checksum: Option<u16>,
    /// Absolute stream offset of the frame's first sync byte.
    pub offset: u64,
}

impl FrameSnapshot {
    /// Rebuild the bytes consumed for this frame after the sync marker:
    /// `[class, id, len_lo, len_hi, payload.., ck_lo, ck_hi]`.
    pub fn body_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + self.payload.len());
        out.push(self.class);
        out.push(self.id);
        out.extend_from_slice(&self.length.to_le_bytes());
        out.extend_from_slice(&self.payload);
        if let Some(checksum) = self.received_checksum {
            out.extend_from_slice(&checksum.to_le_bytes());
        }
        out
    }
}

/// One decoding outcome, in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// A frame with a non-empty payload and a matching checksum.
    Packet(Packet),

    /// The declared length exceeds the configured maximum.
    PayloadTooLarge {
        frame: FrameSnapshot,
        max_payload_length: usize,
    },

    /// The declared length disagrees with the known length for the message type.
    WrongPayloadLength {
        frame: FrameSnapshot,
        expected_length: u16,
    },

    /// The received checksum does not match the computed one.
    FailedChecksum {
        frame: FrameSnapshot,
        computed_checksum: u16,
    },

    /// A zero-length frame with a matching checksum.
    PollingMessage { frame: FrameSnapshot },
}

impl DecodeEvent {
    pub fn is_packet(&self) -> bool {
        matches!(self, DecodeEvent::Packet(_))
    }

    pub fn is_diagnostic(&self) -> bool {
        !self.is_packet()
    }

    /// True for outcomes where a frame was thrown away.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DecodeEvent::PayloadTooLarge { .. }
                | DecodeEvent::WrongPayloadLength { .. }
                | DecodeEvent::FailedChecksum { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DecodeEvent::Packet(_) => "packet",
            DecodeEvent::PayloadTooLarge { .. } => "payload_too_large",
            DecodeEvent::WrongPayloadLength { .. } => "wrong_payload_length",
            DecodeEvent::FailedChecksum { .. } => "failed_checksum",
            DecodeEvent::PollingMessage { .. } => "polling_message",
        }
    }

    /// Message class and id of the frame this event describes.
    pub fn message_id(&self) -> (u8, u8) {
        match self {
            DecodeEvent::Packet(packet) => (packet.class, packet.id),
            DecodeEvent::PayloadTooLarge { frame, .. }
            | DecodeEvent::WrongPayloadLength { frame, .. }
            | DecodeEvent::FailedChecksum { frame, .. }
            | DecodeEvent::PollingMessage { frame } => (frame.class, frame.id),
        }
    }

    pub fn into_packet(self) -> Option<Packet> {
        match self {
            DecodeEvent::Packet(packet) => Some(packet),
            _ => None,
        }
    }
}

impl fmt::Display for DecodeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (class, id) = self.message_id();
        match self {
            DecodeEvent::Packet(packet) => write!(
                f,
                "packet {class:#04x}/{id:#04x} ({} bytes)",
                packet.payload.len()
            ),
            DecodeEvent::PayloadTooLarge {
                frame,
                max_payload_length,
            } => write!(
                f,
                "payload too large for {class:#04x}/{id:#04x}: {} > {max_payload_length}",
                frame.length
            ),
            DecodeEvent::WrongPayloadLength {
                frame,
                expected_length,
            } => write!(
                f,
                "wrong payload length for {class:#04x}/{id:#04x}: {} != {expected_length}",
                frame.length
            ),
            DecodeEvent::FailedChecksum {
                frame,
                computed_checksum,
            } => write!(
                f,
                "checksum mismatch for {class:#04x}/{id:#04x}: received {:#06x}, computed {computed_checksum:#06x}",
                frame.received_checksum.unwrap_or_default()
            ),
            DecodeEvent::PollingMessage { .. } => write!(f, "poll {class:#04x}/{id:#04x}"),
        }
    }
}

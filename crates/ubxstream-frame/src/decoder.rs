//! Byte-driven UBX frame state machine.
//!
//! ```text
//! ┌────────┬────────┬───────┬──────┬──────────┬─────────────┬──────┬──────┐
//! │ 0xB5   │ 0x62   │ Class │ Id   │ Length   │ Payload     │ CK_A │ CK_B │
//! │ sync 1 │ sync 2 │ (1B)  │ (1B) │ (2B LE)  │ (Length B)  │ (1B) │ (1B) │
//! └────────┴────────┴───────┴──────┴──────────┴─────────────┴──────┴──────┘
//! ```
//!
//! The decoder owns one frame in progress at a time and always returns to
//! scanning after a frame terminates. Length rejections drop the header and
//! continue with the next byte. A checksum failure rewinds the cursor to the
//! class byte so a sync marker inside the rejected frame is still found.

use bytes::Bytes;

use crate::checksum::frame_checksum;
use crate::config::DecoderConfig;
use crate::cursor::ScanBuffer;
use crate::event::{DecodeEvent, FrameSnapshot, Packet};
use crate::lengths::{KnownLengths, LengthTable};

/// First sync byte.
pub const SYNC_CHAR_1: u8 = 0xB5;

/// Second sync byte.
pub const SYNC_CHAR_2: u8 = 0x62;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Sync marker length; the rewind anchor sits this far past the frame offset.
const SYNC_LEN: u64 = 2;

/// Header fields of a frame whose length has been validated.
#[derive(Debug, Clone, Copy)]
struct Header {
    class: u8,
    id: u8,
    length: u16,
    offset: u64,
}

impl Header {
    fn anchor(&self) -> u64 {
        self.offset + SYNC_LEN
    }

    fn snapshot(&self, payload: Bytes, received_checksum: Option<u16>) -> FrameSnapshot {
        FrameSnapshot {
            class: self.class,
            id: self.id,
            length: self.length,
            payload,
            received_checksum,
            offset: self.offset,
        }
    }
}

/// Decoder state. Only the variants after length validation own a payload.
#[derive(Debug)]
enum State {
    ScanningForSync,
    ExpectSyncTrailer {
        offset: u64,
    },
    ExpectClass {
        offset: u64,
    },
    ExpectId {
        offset: u64,
        class: u8,
    },
    ExpectLengthLow {
        offset: u64,
        class: u8,
        id: u8,
    },
    ExpectLengthHigh {
        offset: u64,
        class: u8,
        id: u8,
        length_low: u8,
    },
    AccumulatingPayload {
        header: Header,
        payload: Vec<u8>,
    },
    ExpectChecksumLow {
        header: Header,
        payload: Vec<u8>,
    },
    ExpectChecksumHigh {
        header: Header,
        payload: Vec<u8>,
        checksum_low: u8,
    },
}

impl State {
    /// Stream offset bytes must be retained from, if a frame body has started.
    fn anchor(&self) -> Option<u64> {
        match self {
            State::ScanningForSync | State::ExpectSyncTrailer { .. } => None,
            State::ExpectClass { offset }
            | State::ExpectId { offset, .. }
            | State::ExpectLengthLow { offset, .. }
            | State::ExpectLengthHigh { offset, .. } => Some(offset + SYNC_LEN),
            State::AccumulatingPayload { header, .. }
            | State::ExpectChecksumLow { header, .. }
            | State::ExpectChecksumHigh { header, .. } => Some(header.anchor()),
        }
    }
}

/// Running counters, for callers that want totals rather than events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecoderStats {
    pub packets: u64,
    pub polls: u64,
    pub payload_too_large: u64,
    pub wrong_length: u64,
    pub checksum_failures: u64,
    /// Bytes skipped while scanning for the first sync byte.
    pub discarded_bytes: u64,
    /// `0xB5` bytes not followed by `0xB5` or `0x62`.
    pub aborted_syncs: u64,
    /// Bytes queued for re-scanning after checksum failures.
    pub rewound_bytes: u64,
    /// Partial frames dropped at stream end.
    pub truncated_frames: u64,
}

/// Stateful decoder turning arbitrary byte chunks into [`DecodeEvent`]s.
///
/// Feeding the same bytes split at any boundaries yields the same events in
/// the same order.
pub struct FrameDecoder<L = KnownLengths> {
    state: State,
    buf: ScanBuffer,
    config: DecoderConfig,
    lengths: L,
    stats: DecoderStats,
}

impl FrameDecoder<KnownLengths> {
    /// Create a decoder backed by the built-in length table.
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_length_table(config, KnownLengths)
    }
}

impl Default for FrameDecoder<KnownLengths> {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl<L: LengthTable> FrameDecoder<L> {
    /// Create a decoder with an explicit expected-length table.
    pub fn with_length_table(config: DecoderConfig, lengths: L) -> Self {
        Self {
            state: State::ScanningForSync,
            buf: ScanBuffer::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            lengths,
            stats: DecoderStats::default(),
        }
    }

    /// Decode a chunk and return the events it completed, in stream order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        self.feed_into(chunk, &mut events);
        events
    }

    /// Decode a chunk, appending completed events to `out`.
    pub fn feed_into(&mut self, chunk: &[u8], out: &mut Vec<DecodeEvent>) {
        self.buf.extend(chunk);
        while let Some(byte) = self.buf.next_byte() {
            if let Some(event) = self.step(byte) {
                out.push(event);
            }
        }
        self.buf.compact(self.state.anchor());
    }

    /// Signal end of stream. Any partial frame is dropped without an event.
    pub fn finish(&mut self) {
        if !self.is_idle() {
            self.stats.truncated_frames += 1;
            tracing::debug!(
                position = self.buf.position(),
                retained = self.buf.retained(),
                "stream ended mid-frame, discarding partial frame"
            );
        }
        self.reset();
    }

    /// Drop the frame in progress and any buffered bytes.
    pub fn reset(&mut self) {
        self.state = State::ScanningForSync;
        self.buf.clear();
    }

    /// True when no frame is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::ScanningForSync)
    }

    /// Absolute offset of the next byte to be examined.
    pub fn position(&self) -> u64 {
        self.buf.position()
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn length_table(&self) -> &L {
        &self.lengths
    }

    fn step(&mut self, byte: u8) -> Option<DecodeEvent> {
        let offset_of_byte = self.buf.position() - 1;
        let state = std::mem::replace(&mut self.state, State::ScanningForSync);

        let (next, event) = match state {
            State::ScanningForSync => {
                if byte == SYNC_CHAR_1 {
                    let next = State::ExpectSyncTrailer {
                        offset: offset_of_byte,
                    };
                    (next, None)
                } else {
                    self.stats.discarded_bytes += 1;
                    tracing::trace!(byte, offset = offset_of_byte, "discarding byte outside frame");
                    (State::ScanningForSync, None)
                }
            }
            State::ExpectSyncTrailer { offset } => match byte {
                SYNC_CHAR_2 => (State::ExpectClass { offset }, None),
                SYNC_CHAR_1 => {
                    let next = State::ExpectSyncTrailer {
                        offset: offset_of_byte,
                    };
                    (next, None)
                }
                _ => {
                    self.stats.aborted_syncs += 1;
                    tracing::trace!(byte, offset, "sync trailer missing, resuming scan");
                    (State::ScanningForSync, None)
                }
            },
            State::ExpectClass { offset } => (State::ExpectId { offset, class: byte }, None),
            State::ExpectId { offset, class } => {
                let next = State::ExpectLengthLow {
                    offset,
                    class,
                    id: byte,
                };
                (next, None)
            }
            State::ExpectLengthLow { offset, class, id } => {
                let next = State::ExpectLengthHigh {
                    offset,
                    class,
                    id,
                    length_low: byte,
                };
                (next, None)
            }
            State::ExpectLengthHigh {
                offset,
                class,
                id,
                length_low,
            } => {
                let header = Header {
                    class,
                    id,
                    length: u16::from_le_bytes([length_low, byte]),
                    offset,
                };
                self.validate(header)
            }
            State::AccumulatingPayload {
                header,
                mut payload,
            } => {
                payload.push(byte);
                if payload.len() == usize::from(header.length) {
                    (State::ExpectChecksumLow { header, payload }, None)
                } else {
                    (State::AccumulatingPayload { header, payload }, None)
                }
            }
            State::ExpectChecksumLow { header, payload } => {
                let next = State::ExpectChecksumHigh {
                    header,
                    payload,
                    checksum_low: byte,
                };
                (next, None)
            }
            State::ExpectChecksumHigh {
                header,
                payload,
                checksum_low,
            } => {
                let received = u16::from_le_bytes([checksum_low, byte]);
                (State::ScanningForSync, Some(self.verify(header, payload, received)))
            }
        };

        self.state = next;
        event
    }

    /// Judge the declared length once, before any payload byte is read.
    fn validate(&mut self, header: Header) -> (State, Option<DecodeEvent>) {
        if self.config.exceeds_limit(header.length) {
            self.stats.payload_too_large += 1;
            tracing::debug!(
                class = header.class,
                id = header.id,
                length = header.length,
                max = self.config.max_payload_length,
                "rejecting oversized frame"
            );
            let event = DecodeEvent::PayloadTooLarge {
                frame: header.snapshot(Bytes::new(), None),
                max_payload_length: self.config.max_payload_length,
            };
            return (State::ScanningForSync, Some(event));
        }

        if header.length == 0 {
            let next = State::ExpectChecksumLow {
                header,
                payload: Vec::new(),
            };
            return (next, None);
        }

        if let Some(expected) = self.lengths.expected_length(header.class, header.id) {
            if expected != header.length {
                self.stats.wrong_length += 1;
                tracing::debug!(
                    class = header.class,
                    id = header.id,
                    length = header.length,
                    expected,
                    "rejecting frame with unexpected length"
                );
                let event = DecodeEvent::WrongPayloadLength {
                    frame: header.snapshot(Bytes::new(), None),
                    expected_length: expected,
                };
                return (State::ScanningForSync, Some(event));
            }
        }

        let next = State::AccumulatingPayload {
            header,
            payload: Vec::with_capacity(usize::from(header.length)),
        };
        (next, None)
    }

    /// Compare checksums; on mismatch rewind to just past the sync marker.
    fn verify(&mut self, header: Header, payload: Vec<u8>, received: u16) -> DecodeEvent {
        let computed = frame_checksum(header.class, header.id, &payload);

        if computed == received {
            if header.length == 0 {
                self.stats.polls += 1;
                return DecodeEvent::PollingMessage {
                    frame: header.snapshot(Bytes::new(), Some(received)),
                };
            }
            self.stats.packets += 1;
            return DecodeEvent::Packet(Packet {
                class: header.class,
                id: header.id,
                payload: Bytes::from(payload),
            });
        }

        let frame = header.snapshot(Bytes::from(payload), Some(received));
        debug_assert_eq!(self.buf.since(header.anchor()), frame.body_bytes().as_slice());

        let rewound = self.buf.rewind_to(header.anchor());
        self.stats.checksum_failures += 1;
        self.stats.rewound_bytes += rewound as u64;
        tracing::warn!(
            class = header.class,
            id = header.id,
            received,
            computed,
            resume_at = self.buf.position(),
            rewound,
            "checksum mismatch, re-scanning frame body"
        );

        DecodeEvent::FailedChecksum {
            frame,
            computed_checksum: computed,
        }
    }
}

//! Expected fixed payload lengths per message type.
//!
//! The decoder consults a [`LengthTable`] once per frame, after both length
//! bytes are known. A missing entry means the length is unconstrained.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::LengthTableError;

/// Read-only lookup from `(class, id)` to an expected payload length.
pub trait LengthTable {
    fn expected_length(&self, class: u8, id: u8) -> Option<u16>;
}

impl<T: LengthTable + ?Sized> LengthTable for &T {
    fn expected_length(&self, class: u8, id: u8) -> Option<u16> {
        (**self).expected_length(class, id)
    }
}

impl<T: LengthTable + ?Sized> LengthTable for Box<T> {
    fn expected_length(&self, class: u8, id: u8) -> Option<u16> {
        (**self).expected_length(class, id)
    }
}

impl LengthTable for HashMap<(u8, u8), u16> {
    fn expected_length(&self, class: u8, id: u8) -> Option<u16> {
        self.get(&(class, id)).copied()
    }
}

/// A table with no entries: every length is unconstrained.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLengths;

impl LengthTable for NoLengths {
    fn expected_length(&self, _class: u8, _id: u8) -> Option<u16> {
        None
    }
}

/// Built-in lengths of common fixed-size UBX output messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct KnownLengths;

const KNOWN: &[(u8, u8, u16)] = &[
    (0x01, 0x01, 20), // NAV-POSECEF
    (0x01, 0x02, 28), // NAV-POSLLH
    (0x01, 0x03, 16), // NAV-STATUS
    (0x01, 0x04, 18), // NAV-DOP
    (0x01, 0x06, 52), // NAV-SOL
    (0x01, 0x07, 92), // NAV-PVT
    (0x01, 0x12, 36), // NAV-VELNED
    (0x01, 0x14, 36), // NAV-HPPOSLLH
    (0x01, 0x20, 16), // NAV-TIMEGPS
    (0x01, 0x21, 20), // NAV-TIMEUTC
    (0x01, 0x22, 20), // NAV-CLOCK
    (0x01, 0x61, 4),  // NAV-EOE
    (0x05, 0x00, 2),  // ACK-NAK
    (0x05, 0x01, 2),  // ACK-ACK
    (0x06, 0x08, 6),  // CFG-RATE
    (0x0A, 0x09, 60), // MON-HW
];

impl KnownLengths {
    /// All built-in `(class, id, length)` entries.
    pub fn entries() -> &'static [(u8, u8, u16)] {
        KNOWN
    }
}

impl LengthTable for KnownLengths {
    fn expected_length(&self, class: u8, id: u8) -> Option<u16> {
        KNOWN
            .iter()
            .find(|(c, i, _)| *c == class && *i == id)
            .map(|(_, _, len)| *len)
    }
}

#[derive(Debug, Deserialize)]
struct LengthEntry {
    class: u8,
    id: u8,
    length: u16,
}

/// Caller-supplied entries, optionally layered over [`KnownLengths`].
///
/// Caller entries win over built-in ones for the same `(class, id)`.
#[derive(Debug, Default, Clone)]
pub struct LengthOverrides {
    entries: HashMap<(u8, u8), u16>,
    include_known: bool,
}

impl LengthOverrides {
    /// Empty overrides on top of the built-in table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            include_known: true,
        }
    }

    /// Empty overrides with no built-in fallback.
    pub fn without_known() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: u8, id: u8, length: u16) -> Option<u16> {
        self.entries.insert((class, id), length)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add entries from a JSON array of `{"class", "id", "length"}` objects.
    ///
    /// Listing a pair twice is allowed only when both entries agree.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize, LengthTableError> {
        let parsed: Vec<LengthEntry> = serde_json::from_str(json)?;
        let mut seen: HashMap<(u8, u8), u16> = HashMap::with_capacity(parsed.len());

        for entry in &parsed {
            if let Some(first) = seen.insert((entry.class, entry.id), entry.length) {
                if first != entry.length {
                    return Err(LengthTableError::Conflict {
                        class: entry.class,
                        id: entry.id,
                        first,
                        second: entry.length,
                    });
                }
            }
        }

        let added = seen.len();
        self.entries.extend(seen);
        tracing::debug!(added, total = self.entries.len(), "loaded length table entries");
        Ok(added)
    }

    /// Add entries from a JSON file.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<usize, LengthTableError> {
        let json = std::fs::read_to_string(path)?;
        self.extend_from_json(&json)
    }
}

impl LengthTable for LengthOverrides {
    fn expected_length(&self, class: u8, id: u8) -> Option<u16> {
        match self.entries.get(&(class, id)) {
            Some(len) => Some(*len),
            None if self.include_known => KnownLengths.expected_length(class, id),
            None => None,
        }
    }
}

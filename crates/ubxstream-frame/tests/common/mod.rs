#![allow(dead_code)]

use fastrand::Rng;
use ubxstream_frame::{frame_checksum, SYNC_CHAR_1, SYNC_CHAR_2};

/// Build a well-formed wire frame.
pub fn frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
    let checksum = frame_checksum(class, id, payload);
    frame_with_checksum(class, id, payload, checksum)
}

/// Build a wire frame with an arbitrary checksum.
pub fn frame_with_checksum(class: u8, id: u8, payload: &[u8], checksum: u16) -> Vec<u8> {
    let mut out = vec![SYNC_CHAR_1, SYNC_CHAR_2, class, id];
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum.to_le_bytes());
    out
}

pub fn random_bytes(rng: &mut Rng, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    rng.fill(&mut out);
    out
}

/// Split `data` at random boundaries, including empty chunks.
pub fn random_chunks<'a>(rng: &mut Rng, data: &'a [u8]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        let take = rng.usize(..=rest.len().min(17));
        let (head, tail) = rest.split_at(take);
        chunks.push(head);
        rest = tail;
    }
    chunks
}

//! Fletcher-8 checksum used by UBX frames.
//!
//! The checksum covers class, id, both length bytes and the payload. It is
//! transmitted as `ck_a` then `ck_b`, so reading the two bytes as a
//! little-endian `u16` gives `(ck_b << 8) | ck_a`.

/// Running two-accumulator checksum.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumCalc {
    ck_a: u8,
    ck_b: u8,
}

impl ChecksumCalc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_byte(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.update_byte(byte);
        }
    }

    /// The `(ck_a, ck_b)` pair in wire order.
    pub fn result(self) -> (u8, u8) {
        (self.ck_a, self.ck_b)
    }

    /// The checksum combined the same way the received bytes are.
    pub fn value(self) -> u16 {
        u16::from_le_bytes([self.ck_a, self.ck_b])
    }
}

/// Checksum an arbitrary byte sequence.
pub fn fletcher8(bytes: &[u8]) -> (u8, u8) {
    let mut calc = ChecksumCalc::new();
    calc.update(bytes);
    calc.result()
}

/// Checksum of a complete frame body: `[class, id, len_lo, len_hi, payload..]`.
///
/// The length field is derived from `payload.len()` and truncated to 16 bits.
pub fn frame_checksum(class: u8, id: u8, payload: &[u8]) -> u16 {
    let len = (payload.len() as u16).to_le_bytes();
    let mut calc = ChecksumCalc::new();
    calc.update(&[class, id, len[0], len[1]]);
    calc.update(payload);
    calc.value()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_fletcher8(bytes: &[u8]) -> (u8, u8) {
        let mut a: u32 = 0;
        let mut b: u32 = 0;
        for &v in bytes {
            a = (a + u32::from(v)) % 256;
            b = (b + a) % 256;
        }
        (a as u8, b as u8)
    }

    #[test]
    fn empty_payload_poll_frame() {
        // NAV-PVT poll: class 0x01, id 0x07, length 0.
        let (ck_a, ck_b) = fletcher8(&[0x01, 0x07, 0x00, 0x00]);
        assert_eq!((ck_a, ck_b), (0x08, 0x19));
        assert_eq!(frame_checksum(0x01, 0x07, &[]), 0x1908);
    }

    #[test]
    fn known_cfg_msg_frame() {
        // B5 62 06 01 03 00 F0 01 00 FB 11 disables NMEA GLL.
        let value = frame_checksum(0x06, 0x01, &[0xF0, 0x01, 0x00]);
        assert_eq!(value.to_le_bytes(), [0xFB, 0x11]);
    }

    #[test]
    fn matches_modular_reference() {
        let mut data = Vec::new();
        for i in 0..1024u32 {
            data.push((i.wrapping_mul(2654435761) >> 13) as u8);
            assert_eq!(fletcher8(&data), reference_fletcher8(&data));
        }
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data: Vec<u8> = (0..=255u8).rev().collect();
        let mut calc = ChecksumCalc::new();
        for chunk in data.chunks(7) {
            calc.update(chunk);
        }
        assert_eq!(calc.result(), fletcher8(&data));
    }

    #[test]
    fn value_is_little_endian_combination() {
        let mut calc = ChecksumCalc::new();
        calc.update(&[0x0A, 0x09, 0x03, 0x00, 0x01, 0x02, 0x03]);
        let (ck_a, ck_b) = calc.result();
        assert_eq!(calc.value(), (u16::from(ck_b) << 8) | u16::from(ck_a));
    }
}

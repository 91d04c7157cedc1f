use serde::Serialize;
use ubxstream_frame::frame_checksum;

use crate::cmd::ChecksumArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{message_label, OutputFormat};

#[derive(Debug, Serialize)]
struct ChecksumOutput {
    class: u8,
    id: u8,
    length: usize,
    ck_a: u8,
    ck_b: u8,
}

fn compute(class: u8, id: u8, payload_hex: &str) -> CliResult<ChecksumOutput> {
    let payload = hex::decode(payload_hex.trim())
        .map_err(|err| CliError::new(USAGE, format!("invalid --payload hex: {err}")))?;
    if u16::try_from(payload.len()).is_err() {
        return Err(CliError::new(
            USAGE,
            format!("payload of {} bytes exceeds the 16-bit length field", payload.len()),
        ));
    }

    let [ck_a, ck_b] = frame_checksum(class, id, &payload).to_le_bytes();
    Ok(ChecksumOutput {
        class,
        id,
        length: payload.len(),
        ck_a,
        ck_b,
    })
}

pub fn run(args: ChecksumArgs, format: OutputFormat) -> CliResult<i32> {
    let out = compute(args.class, args.id, &args.payload)?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Raw => crate::output::print_raw(&[out.ck_a, out.ck_b]),
        OutputFormat::Table | OutputFormat::Pretty => println!(
            "{} length={} ck_a={:#04x} ck_b={:#04x}",
            message_label(out.class, out.id),
            out.length,
            out.ck_a,
            out.ck_b
        ),
    }

    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_cfg_msg_frame() {
        let out = compute(0x06, 0x01, "f00100").expect("valid payload");
        assert_eq!((out.ck_a, out.ck_b), (0xFB, 0x11));
        assert_eq!(out.length, 3);
    }

    #[test]
    fn empty_payload_is_a_poll_checksum() {
        let out = compute(0x06, 0x08, "").expect("empty payload");
        let expected = frame_checksum(0x06, 0x08, &[]).to_le_bytes();
        assert_eq!([out.ck_a, out.ck_b], expected);
        assert_eq!(out.length, 0);
    }

    #[test]
    fn rejects_bad_hex_and_oversize_payload() {
        let err = compute(0x06, 0x01, "zz").expect_err("bad hex");
        assert_eq!(err.code, USAGE);

        let oversize = "00".repeat(usize::from(u16::MAX) + 1);
        let err = compute(0x06, 0x01, &oversize).expect_err("too long");
        assert_eq!(err.code, USAGE);
    }
}

#![cfg(feature = "cli")]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use ubxstream::frame::{frame_checksum, SYNC_CHAR_1, SYNC_CHAR_2};

fn frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![SYNC_CHAR_1, SYNC_CHAR_2, class, id];
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&frame_checksum(class, id, payload).to_le_bytes());
    out
}

fn capture_file(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file should be creatable");
    file.write_all(bytes).expect("capture should be writable");
    file.flush().expect("capture should flush");
    file
}

fn ubxstream(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ubxstream"));
    cmd.env_remove("UBXSTREAM_MAX_PAYLOAD")
        .arg("--log-level")
        .arg("error")
        .args(args);
    cmd
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

#[test]
fn decode_file_prints_json_events() {
    let mut wire = vec![0x00, 0x01];
    wire.extend(frame(0x0B, 0x01, b"hi"));
    wire.extend(frame(0x06, 0x08, &[]));
    let capture = capture_file(&wire);

    let output = ubxstream(&["--format", "json", "decode"])
        .arg(capture.path())
        .output()
        .expect("decode should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let events = json_lines(&output);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["kind"], "packet");
    assert_eq!(events[0]["payload"], "6869");
    assert_eq!(events[1]["kind"], "polling_message");
    assert_eq!(events[1]["offset"], 12);
}

#[test]
fn decode_stdin_recovers_after_checksum_failure() {
    let inner = frame(0x0B, 0x02, b"ok");
    let mut outer_payload = vec![0x10];
    outer_payload.extend_from_slice(&inner);
    let mut wire = vec![SYNC_CHAR_1, SYNC_CHAR_2, 0x0B, 0x01];
    wire.extend_from_slice(&(outer_payload.len() as u16).to_le_bytes());
    wire.extend_from_slice(&outer_payload);
    wire.extend_from_slice(&[0x00, 0x00]);

    let mut child = ubxstream(&["--format", "json", "decode", "-", "--stats"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("decode should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(&wire)
        .expect("stdin should accept capture");
    let output = child.wait_with_output().expect("decode should finish");

    assert!(output.status.success());
    let events = json_lines(&output);
    let kinds: Vec<&str> = events.iter().map(|e| e["kind"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["failed_checksum", "packet", "stats"]);
    assert_eq!(events[1]["payload"], "6f6b");
    assert_eq!(events[2]["stats"]["checksum_failures"], 1);
    assert_eq!(events[2]["stats"]["packets"], 1);
}

#[test]
fn negative_max_payload_is_usage_error() {
    let capture = capture_file(&[]);
    let output = ubxstream(&["decode", "--max-payload", "-5"])
        .arg(capture.path())
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("max payload length"));
}

#[test]
fn fail_on_diagnostics_reports_rejections() {
    let capture = capture_file(&frame(0x0B, 0x01, &[0u8; 10]));
    let output = ubxstream(&[
        "--format",
        "json",
        "decode",
        "--max-payload",
        "4",
        "--fail-on-diagnostics",
    ])
    .arg(capture.path())
    .output()
    .expect("decode should run");

    assert_eq!(output.status.code(), Some(60));
    let events = json_lines(&output);
    assert_eq!(events[0]["kind"], "payload_too_large");
    assert_eq!(events[0]["max_payload_length"], 4);
}

#[test]
fn length_table_file_applies_expected_lengths() {
    let table = capture_file(br#"[{"class": 2, "id": 1, "length": 8}]"#);
    let capture = capture_file(&frame(0x02, 0x01, &[0u8; 6]));

    let output = ubxstream(&["--format", "json", "decode", "--packets-only"])
        .arg(capture.path())
        .arg("--length-table")
        .arg(table.path())
        .output()
        .expect("decode should run");
    assert!(output.status.success());
    assert!(json_lines(&output).is_empty());

    let output = ubxstream(&["--format", "json", "decode"])
        .arg(capture.path())
        .arg("--length-table")
        .arg(table.path())
        .output()
        .expect("decode should run");
    let events = json_lines(&output);
    assert_eq!(events[0]["kind"], "wrong_payload_length");
    assert_eq!(events[0]["expected_length"], 8);
}

#[test]
fn raw_format_writes_payload_bytes() {
    let mut wire = frame(0x0B, 0x01, b"abc");
    wire.extend(frame(0x0B, 0x02, b"def"));
    let capture = capture_file(&wire);

    let output = ubxstream(&["--format", "raw", "decode"])
        .arg(capture.path())
        .output()
        .expect("decode should run");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"abcdef");
}

#[test]
fn count_stops_early() {
    let mut wire = Vec::new();
    for id in 0..5u8 {
        wire.extend(frame(0x0B, id, &[id]));
    }
    let capture = capture_file(&wire);

    let output = ubxstream(&["--format", "json", "decode", "--count", "2"])
        .arg(capture.path())
        .output()
        .expect("decode should run");
    assert_eq!(json_lines(&output).len(), 2);
}

#[test]
fn missing_input_fails() {
    let output = ubxstream(&["decode", "/nonexistent/ubxstream/capture.ubx"])
        .output()
        .expect("decode should run");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn checksum_command_matches_known_frame() {
    let output = ubxstream(&[
        "--format",
        "json",
        "checksum",
        "--class",
        "0x06",
        "--id",
        "0x01",
        "--payload",
        "f00100",
    ])
    .output()
    .expect("checksum should run");

    assert!(output.status.success());
    let out = &json_lines(&output)[0];
    assert_eq!(out["ck_a"], 0xFB);
    assert_eq!(out["ck_b"], 0x11);
    assert_eq!(out["length"], 3);
}

use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use ubxstream_frame::{DecodeEvent, DecoderStats, FrameSnapshot};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize, Default)]
struct EventOutput {
    kind: &'static str,
    class: u8,
    id: u8,
    length: usize,
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_payload_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    received_checksum: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    computed_checksum: Option<u16>,
}

impl EventOutput {
    fn from_frame(kind: &'static str, frame: &FrameSnapshot) -> Self {
        Self {
            kind,
            class: frame.class,
            id: frame.id,
            length: usize::from(frame.length),
            payload: hex::encode(&frame.payload),
            offset: Some(frame.offset),
            received_checksum: frame.received_checksum,
            ..Self::default()
        }
    }
}

impl From<&DecodeEvent> for EventOutput {
    fn from(event: &DecodeEvent) -> Self {
        match event {
            DecodeEvent::Packet(packet) => Self {
                kind: event.kind(),
                class: packet.class,
                id: packet.id,
                length: packet.payload.len(),
                payload: hex::encode(&packet.payload),
                ..Self::default()
            },
            DecodeEvent::PayloadTooLarge {
                frame,
                max_payload_length,
            } => Self {
                max_payload_length: Some(*max_payload_length),
                ..Self::from_frame(event.kind(), frame)
            },
            DecodeEvent::WrongPayloadLength {
                frame,
                expected_length,
            } => Self {
                expected_length: Some(*expected_length),
                ..Self::from_frame(event.kind(), frame)
            },
            DecodeEvent::FailedChecksum {
                frame,
                computed_checksum,
            } => Self {
                computed_checksum: Some(*computed_checksum),
                ..Self::from_frame(event.kind(), frame)
            },
            DecodeEvent::PollingMessage { frame } => Self::from_frame(event.kind(), frame),
        }
    }
}

pub fn print_event(event: &DecodeEvent, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EventOutput::from(event);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let out = EventOutput::from(event);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "MESSAGE", "LENGTH", "DETAIL", "PAYLOAD"])
                .add_row(vec![
                    out.kind.to_string(),
                    message_label(out.class, out.id),
                    out.length.to_string(),
                    detail(&out),
                    payload_preview(&out.payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let out = EventOutput::from(event);
            if out.payload.is_empty() {
                println!("{event}");
            } else {
                println!("{event} payload={}", payload_preview(&out.payload));
            }
        }
        OutputFormat::Raw => {
            if let DecodeEvent::Packet(packet) = event {
                print_raw(&packet.payload);
            }
        }
    }
}

pub fn print_stats(stats: &DecoderStats, format: OutputFormat) {
    let rows = [
        ("packets", stats.packets),
        ("polls", stats.polls),
        ("payload_too_large", stats.payload_too_large),
        ("wrong_length", stats.wrong_length),
        ("checksum_failures", stats.checksum_failures),
        ("discarded_bytes", stats.discarded_bytes),
        ("aborted_syncs", stats.aborted_syncs),
        ("rewound_bytes", stats.rewound_bytes),
        ("truncated_frames", stats.truncated_frames),
    ];

    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = rows
                .iter()
                .map(|(name, value)| (name.to_string(), serde_json::Value::from(*value)))
                .collect();
            let out = serde_json::json!({ "kind": "stats", "stats": map });
            println!("{out}");
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COUNTER", "VALUE"]);
            for (name, value) in rows {
                table.add_row(vec![name.to_string(), value.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line: Vec<String> = rows
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            println!("stats {}", line.join(" "));
        }
        // Raw stdout carries payload bytes only.
        OutputFormat::Raw => {
            let line: Vec<String> = rows
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            eprintln!("stats {}", line.join(" "));
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn message_label(class: u8, id: u8) -> String {
    match class_name(class) {
        Some(name) => format!("{name} {class:#04x}/{id:#04x}"),
        None => format!("{class:#04x}/{id:#04x}"),
    }
}

fn class_name(class: u8) -> Option<&'static str> {
    match class {
        0x01 => Some("NAV"),
        0x02 => Some("RXM"),
        0x04 => Some("INF"),
        0x05 => Some("ACK"),
        0x06 => Some("CFG"),
        0x09 => Some("UPD"),
        0x0A => Some("MON"),
        0x0D => Some("TIM"),
        0x10 => Some("ESF"),
        0x13 => Some("MGA"),
        0x21 => Some("LOG"),
        0x27 => Some("SEC"),
        0x28 => Some("HNR"),
        _ => None,
    }
}

fn detail(out: &EventOutput) -> String {
    if let Some(max) = out.max_payload_length {
        return format!("max {max}");
    }
    if let Some(expected) = out.expected_length {
        return format!("expected {expected}");
    }
    if let Some(computed) = out.computed_checksum {
        return format!(
            "received {:#06x} computed {computed:#06x}",
            out.received_checksum.unwrap_or_default()
        );
    }
    String::new()
}

const PREVIEW_HEX_CHARS: usize = 64;

fn payload_preview(payload_hex: &str) -> String {
    if payload_hex.len() <= PREVIEW_HEX_CHARS {
        payload_hex.to_string()
    } else {
        format!(
            "{}.. ({} bytes)",
            &payload_hex[..PREVIEW_HEX_CHARS],
            payload_hex.len() / 2
        )
    }
}

#[cfg(test)]
mod tests {
    use ubxstream_frame::Packet;

    use super::*;

    #[test]
    fn packet_output_has_no_frame_fields() {
        let event = DecodeEvent::Packet(Packet::new(0x01, 0x07, vec![0xAB, 0xCD]));
        let json = serde_json::to_value(EventOutput::from(&event)).unwrap();
        assert_eq!(json["kind"], "packet");
        assert_eq!(json["payload"], "abcd");
        assert_eq!(json["length"], 2);
        assert!(json.get("offset").is_none());
    }

    #[test]
    fn checksum_failure_output_carries_both_checksums() {
        let event = DecodeEvent::FailedChecksum {
            frame: FrameSnapshot {
                class: 0x0B,
                id: 0x01,
                length: 1,
                payload: vec![0x10].into(),
                received_checksum: Some(0x1234),
                offset: 40,
            },
            computed_checksum: 0x1C17,
        };
        let out = EventOutput::from(&event);
        assert_eq!(out.offset, Some(40));
        assert_eq!(detail(&out), "received 0x1234 computed 0x1c17");
    }

    #[test]
    fn labels_known_classes() {
        assert_eq!(message_label(0x01, 0x07), "NAV 0x01/0x07");
        assert_eq!(message_label(0xF0, 0x00), "0xf0/0x00");
    }

    #[test]
    fn long_payloads_are_truncated_in_previews() {
        let hex = "ab".repeat(100);
        assert_eq!(payload_preview(&hex), format!("{}.. (100 bytes)", "ab".repeat(32)));
    }
}

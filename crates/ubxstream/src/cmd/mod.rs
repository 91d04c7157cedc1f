use clap::{Args, Subcommand};
use std::path::PathBuf;

use ubxstream_frame::DEFAULT_MAX_PAYLOAD;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod checksum;
pub mod decode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode UBX frames from a capture file or stdin.
    Decode(DecodeArgs),
    /// Compute the checksum of a frame body.
    Checksum(ChecksumArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Checksum(args) => checksum::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to read. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,
    /// Largest accepted payload length; 0 disables the check.
    #[arg(
        long,
        env = "UBXSTREAM_MAX_PAYLOAD",
        default_value_t = DEFAULT_MAX_PAYLOAD as i64,
        allow_negative_numbers = true
    )]
    pub max_payload: i64,
    /// JSON file of expected lengths: [{"class": 1, "id": 7, "length": 92}].
    #[arg(long, value_name = "FILE")]
    pub length_table: Option<PathBuf>,
    /// Do not apply the built-in expected-length table.
    #[arg(long)]
    pub no_known_lengths: bool,
    /// Bytes requested per read from the input.
    #[arg(long, default_value_t = 4096)]
    pub chunk_size: usize,
    /// Exit after printing N events.
    #[arg(long)]
    pub count: Option<usize>,
    /// Print decoded packets only, suppressing diagnostics.
    #[arg(long)]
    pub packets_only: bool,
    /// Print decoder counters after the stream ends.
    #[arg(long)]
    pub stats: bool,
    /// Exit with a data error if any frame was rejected.
    #[arg(long)]
    pub fail_on_diagnostics: bool,
}

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Message class (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_u8)]
    pub class: u8,
    /// Message id (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_u8)]
    pub id: u8,
    /// Payload as hex. Empty for a poll frame.
    #[arg(long, default_value = "")]
    pub payload: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_u8(value: &str) -> Result<u8, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse::<u8>(),
    };
    parsed.map_err(|err| format!("invalid byte value {value:?}: {err}"))
}

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ubxstream_frame::{DecoderConfig, FrameDecoder, FrameReader, LengthOverrides};

use crate::cmd::DecodeArgs;
use crate::exit::{
    frame_error, io_error, length_table_error, CliResult, DATA_INVALID, SUCCESS,
};
use crate::output::{print_event, print_stats, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = DecoderConfig::from_signed(args.max_payload)
        .map_err(|err| frame_error("invalid --max-payload", err))?;
    let lengths = load_lengths(&args)?;
    let input = open_input(args.input.as_deref())?;

    let decoder = FrameDecoder::with_length_table(config, lengths);
    let mut reader = FrameReader::with_decoder(input, decoder).with_chunk_size(args.chunk_size);

    let mut printed = 0usize;
    let mut rejected = 0u64;

    while let Some(event) = reader
        .next_event()
        .map_err(|err| frame_error("read failed", err))?
    {
        if event.is_rejection() {
            rejected += 1;
        }
        if args.packets_only && !event.is_packet() {
            continue;
        }

        print_event(&event, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    let stats = reader.decoder().stats();
    tracing::info!(
        packets = stats.packets,
        rejected,
        discarded_bytes = stats.discarded_bytes,
        "decode finished"
    );
    if args.stats {
        print_stats(stats, format);
    }

    if args.fail_on_diagnostics && rejected > 0 {
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}

fn load_lengths(args: &DecodeArgs) -> CliResult<LengthOverrides> {
    let mut lengths = if args.no_known_lengths {
        LengthOverrides::without_known()
    } else {
        LengthOverrides::new()
    };

    if let Some(path) = &args.length_table {
        let added = lengths
            .extend_from_file(path)
            .map_err(|err| length_table_error(&format!("{}", path.display()), err))?;
        tracing::debug!(path = %path.display(), added, "applied length table");
    }

    Ok(lengths)
}

fn open_input(path: Option<&Path>) -> CliResult<Box<dyn Read>> {
    match path {
        None => Ok(Box::new(std::io::stdin().lock())),
        Some(path) if path.as_os_str() == "-" => Ok(Box::new(std::io::stdin().lock())),
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("open {}", path.display()), err))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

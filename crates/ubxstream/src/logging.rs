use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log targets owned by this workspace; everything else is capped at warn.
const DECODER_TARGETS: &[&str] = &["ubxstream_frame", "ubxstream"];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// Per-byte decoder events only make sense with the emitting module shown.
    fn shows_target(self) -> bool {
        matches!(self, LogLevel::Debug | LogLevel::Trace)
    }
}

/// Apply `level` to the decoder crates and never go below warn elsewhere.
pub fn decoder_filter(level: LogLevel) -> Targets {
    let level = level.as_filter();
    DECODER_TARGETS
        .iter()
        .fold(Targets::new(), |targets, target| {
            targets.with_target(*target, level)
        })
        .with_default(level.min(LevelFilter::WARN))
}

/// Decoder diagnostics go to stderr so stdout stays clean for events.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(level.shows_target());
    let registry = tracing_subscriber::registry().with(decoder_filter(level));

    let _ = match format {
        LogFormat::Text => registry.with(fmt).try_init(),
        LogFormat::Json => registry.with(fmt.json()).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn trace_reaches_decoder_but_not_dependencies() {
        let filter = decoder_filter(LogLevel::Trace);
        assert!(filter.would_enable("ubxstream_frame::decoder", &Level::TRACE));
        assert!(filter.would_enable("ubxstream::cmd::decode", &Level::TRACE));
        assert!(!filter.would_enable("tokio_util::codec", &Level::DEBUG));
        assert!(filter.would_enable("tokio_util::codec", &Level::WARN));
    }

    #[test]
    fn quiet_levels_apply_everywhere() {
        let filter = decoder_filter(LogLevel::Error);
        assert!(!filter.would_enable("ubxstream_frame::decoder", &Level::WARN));
        assert!(!filter.would_enable("other_crate", &Level::WARN));
        assert!(filter.would_enable("other_crate", &Level::ERROR));
    }

    #[test]
    fn target_shown_only_when_verbose() {
        assert!(LogLevel::Trace.shows_target());
        assert!(!LogLevel::Warn.shows_target());
    }
}

//! Log level parsing and subscriber setup.

use tracing::{Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Levels accepted in `LOG_LEVEL`.
pub const VALID_LEVELS: &str = "debug, info, warn, error, fatal, panic";

/// Result of parsing a `LOG_LEVEL` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelChoice {
    /// Level to log at.
    pub level: Level,
    /// The rejected input, if it was not a valid level.
    pub rejected: Option<String>,
}

/// Parses a `LOG_LEVEL` value, case-insensitively.
///
/// Unset or empty means `info`. `fatal` and `panic` log at `error`.
/// Anything unrecognised falls back to `info` and is reported back.
pub fn parse_level(raw: Option<&str>) -> LevelChoice {
    let value = raw.map(str::trim).unwrap_or_default().to_ascii_lowercase();

    let level = match value.as_str() {
        "" | "info" => Some(Level::INFO),
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "warn" | "warning" => Some(Level::WARN),
        "error" | "fatal" | "panic" => Some(Level::ERROR),
        _ => None,
    };

    match level {
        Some(level) => LevelChoice {
            level,
            rejected: None,
        },
        None => LevelChoice {
            level: Level::INFO,
            rejected: Some(value),
        },
    }
}

/// Name of the output format, reported when logging is configured.
pub const LOG_FORMAT: &str = "text";

/// Builds the subscriber: plain text lines, no ANSI colours, RFC 3339 timestamps,
/// event fields rendered as `key=value`. `RUST_LOG` directives refine the level.
fn subscriber<W>(level: Level, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer),
    )
}

fn announce(choice: &LevelChoice) {
    if let Some(rejected) = &choice.rejected {
        tracing::warn!(
            "Invalid LOG_LEVEL '{rejected}', defaulting to 'info'. Valid levels: {VALID_LEVELS}"
        );
    }
    tracing::info!(log_level = %choice.level, format = %LOG_FORMAT, "Logging configured");
}

/// Installs the global subscriber writing to stdout.
pub fn init(raw: Option<&str>) -> Level {
    let choice = parse_level(raw);
    subscriber(choice.level, std::io::stdout).init();
    announce(&choice);
    choice.level
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    /// Shared buffer standing in for stdout.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    fn configured_output(raw: Option<&str>) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let choice = parse_level(raw);
        tracing::subscriber::with_default(subscriber(choice.level, move || writer.clone()), || {
            announce(&choice);
        });
        capture.text()
    }

    #[test]
    fn test_default_is_info() {
        assert_eq!(parse_level(None).level, Level::INFO);
        assert_eq!(parse_level(Some("")).level, Level::INFO);
        assert!(parse_level(Some("")).rejected.is_none());
    }

    #[test]
    fn test_levels_are_case_insensitive() {
        assert_eq!(parse_level(Some("DEBUG")).level, Level::DEBUG);
        assert_eq!(parse_level(Some("Warning")).level, Level::WARN);
        assert_eq!(parse_level(Some("warn")).level, Level::WARN);
        assert_eq!(parse_level(Some("trace")).level, Level::TRACE);
    }

    #[test]
    fn test_fatal_and_panic_map_to_error() {
        assert_eq!(parse_level(Some("fatal")).level, Level::ERROR);
        assert_eq!(parse_level(Some("panic")).level, Level::ERROR);
        assert_eq!(parse_level(Some("error")).level, Level::ERROR);
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let choice = parse_level(Some("Verbose"));
        assert_eq!(choice.level, Level::INFO);
        assert_eq!(choice.rejected.as_deref(), Some("verbose"));
    }

    #[test]
    fn test_configured_event_fields() {
        let output = configured_output(Some("info"));
        let line = output
            .lines()
            .find(|line| line.contains("Logging configured"))
            .unwrap();

        assert!(line.contains("INFO"));
        assert!(line.contains("log_level=INFO"));
        assert!(line.contains("format=text"));
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_invalid_level_is_reported() {
        let output = configured_output(Some("verbose"));
        assert!(output.contains("WARN"));
        assert!(output.contains("Invalid LOG_LEVEL 'verbose'"));
        assert!(output.contains("log_level=INFO"));
    }
}

//! Utility functions for the CLI

use crate::error::CliResult;
use colored::{ColoredString, Colorize};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize tracing with proper filtering. Logs go to stderr: stdout is
/// reserved for protocol frames when serving over stdio.
pub fn init_tracing(verbose: bool) -> CliResult<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        crate::error::CliError::General(format!("Failed to set tracing subscriber: {}", e))
    })?;

    Ok(())
}

/// Utility for colored console output
pub struct ColoredOutput;

impl ColoredOutput {
    pub fn success(msg: &str) -> ColoredString {
        msg.green().bold()
    }

    pub fn error(msg: &str) -> ColoredString {
        msg.red().bold()
    }

    pub fn warning(msg: &str) -> ColoredString {
        msg.yellow().bold()
    }

    pub fn dim(msg: &str) -> ColoredString {
        msg.dimmed()
    }
}

/// Format duration in a human-readable way
pub fn format_duration(duration: std::time::Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{:.1}m", ms as f64 / 60_000.0)
    }
}

/// Parse the `--args` JSON of a one-shot call
pub fn parse_arguments(raw: Option<&str>) -> CliResult<serde_json::Value> {
    match raw {
        None => Ok(serde_json::json!({})),
        Some(raw) => {
            let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
                crate::error::CliError::InvalidArgument(format!("Invalid JSON arguments: {}", e))
            })?;
            if !value.is_object() {
                return Err(crate::error::CliError::InvalidArgument(
                    "Arguments must be a JSON object".to_string(),
                ));
            }
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn arguments_must_be_object() {
        assert!(parse_arguments(Some("[1,2]")).is_err());
        assert!(parse_arguments(Some("{oops")).is_err());
        assert_eq!(parse_arguments(None).unwrap(), serde_json::json!({}));
        assert_eq!(parse_arguments(Some(r#"{"prompt":"cat"}"#)).unwrap()["prompt"], "cat");
    }
}

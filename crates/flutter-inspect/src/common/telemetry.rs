#![expect(clippy::print_stderr, reason = "Tracing not initialized yet")]

//! Tracing subscriber setup for the CLI.
//!
//! Logs go to stderr by default so that stdout stays reserved for the UI
//! snapshot. `FLUTTER_INSPECT_LOG` redirects them to a file through a
//! non-blocking appender.

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const LOG_FILE_ENV: &str = "FLUTTER_INSPECT_LOG";
const LOG_FORMAT_ENV: &str = "FLUTTER_INSPECT_LOG_FORMAT";
const LOG_STREAM_ENV: &str = "FLUTTER_INSPECT_LOG_STREAM";

/// Keeps the file appender flushing until dropped.
#[derive(Debug)]
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

impl TelemetryGuard {
    fn disabled() -> Self {
        Self { _guard: None }
    }
}

pub fn init_tracing(default_level: &str) -> TelemetryGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (writer, guard, ansi) = match log_file_path_from_env() {
        Some(path) => match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                (BoxMakeWriter::new(non_blocking), Some(guard), false)
            }
            Err(err) => {
                eprintln!(
                    "Warning: failed to open log file {}: {}",
                    path.display(),
                    err
                );
                stream_writer(LogStream::Stderr)
            }
        },
        None => stream_writer(log_stream_from_env()),
    };

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = match log_format_from_env() {
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_ansi(false)
                .json()
                .with_writer(writer)
                .finish(),
        ),
        LogFormat::Text => Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(writer)
                .finish(),
        ),
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return TelemetryGuard::disabled();
    }

    TelemetryGuard { _guard: guard }
}

fn stream_writer(stream: LogStream) -> (BoxMakeWriter, Option<WorkerGuard>, bool) {
    match stream {
        LogStream::Stdout => (
            BoxMakeWriter::new(std::io::stdout),
            None,
            std::io::stdout().is_terminal(),
        ),
        LogStream::Stderr => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            std::io::stderr().is_terminal(),
        ),
    }
}

fn log_file_path_from_env() -> Option<PathBuf> {
    std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogStream {
    Stderr,
    Stdout,
}

fn normalized_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_lowercase())
}

fn log_format_from_env() -> LogFormat {
    match normalized_env(LOG_FORMAT_ENV).as_deref() {
        Some("json") => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

fn log_stream_from_env() -> LogStream {
    match normalized_env(LOG_STREAM_ENV).as_deref() {
        Some("stdout") => LogStream::Stdout,
        _ => LogStream::Stderr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::EnvGuard;

    #[test]
    fn test_log_format_parsing() {
        let _lock = crate::test_support::env_lock();
        let _guard = EnvGuard::set(LOG_FORMAT_ENV, " JSON ");
        assert_eq!(log_format_from_env(), LogFormat::Json);

        let _guard = EnvGuard::set(LOG_FORMAT_ENV, "text");
        assert_eq!(log_format_from_env(), LogFormat::Text);
    }

    #[test]
    fn test_log_stream_parsing() {
        let _lock = crate::test_support::env_lock();
        let _guard = EnvGuard::set(LOG_STREAM_ENV, "stdout");
        assert_eq!(log_stream_from_env(), LogStream::Stdout);

        let _guard = EnvGuard::set(LOG_STREAM_ENV, "anything-else");
        assert_eq!(log_stream_from_env(), LogStream::Stderr);
    }

    #[test]
    fn test_log_defaults() {
        let _lock = crate::test_support::env_lock();
        let _format = EnvGuard::remove(LOG_FORMAT_ENV);
        let _stream = EnvGuard::remove(LOG_STREAM_ENV);
        let _file = EnvGuard::remove(LOG_FILE_ENV);
        assert_eq!(log_format_from_env(), LogFormat::Text);
        assert_eq!(log_stream_from_env(), LogStream::Stderr);
        assert!(log_file_path_from_env().is_none());
    }

    #[test]
    fn test_blank_log_file_is_ignored() {
        let _lock = crate::test_support::env_lock();
        let _guard = EnvGuard::set(LOG_FILE_ENV, "   ");
        assert!(log_file_path_from_env().is_none());
    }
}

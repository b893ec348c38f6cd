//! # LogWriter: timestamped event printer
//!
//! Renders incoming [`Event`]s as operator-facing lines on stdout (dropped-event
//! warnings go to stderr). Operation output arrives as events too, so it is
//! interleaved with lifecycle lines in publish order. Every line starts with a
//! UTC timestamp carrying milliseconds and the offset.
//!
//! ## Example output
//! ```text
//! 2026-10-16 09:14:02.118 +00:00 get-twin starting
//! 2026-10-16 09:14:02.119 +00:00 Listening for shutdown request... (ctrl-c, sigterm, sigquit)
//! 2026-10-16 09:14:02.731 +00:00 Next get-twin run in 60s
//! 2026-10-16 09:14:40.004 +00:00 Termination requested, initiating shutdown
//! 2026-10-16 09:14:40.004 +00:00 Waiting for cleanup to finish...
//! 2026-10-16 09:14:40.005 +00:00 Worker stopped after 1 run(s)
//! 2026-10-16 09:14:40.005 +00:00 Done with cleanup, shutting down
//! ```

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders the message part of a log line, or `None` for silent events.
    pub fn render(e: &Event) -> Option<String> {
        let op = e.operation.as_deref().unwrap_or("operation");
        let line = match e.kind {
            EventKind::ProbeStarting => format!("{op} starting"),
            EventKind::ListeningForShutdown => match e.reason.as_deref() {
                Some(names) if !names.is_empty() => {
                    format!("Listening for shutdown request... ({names})")
                }
                _ => "Listening for shutdown request...".to_string(),
            },
            EventKind::SourceFailed => format!(
                "Termination source '{op}' failed: {}",
                e.reason.as_deref().unwrap_or("unknown")
            ),
            EventKind::ShutdownRequested => "Termination requested, initiating shutdown".into(),
            EventKind::AwaitingCompletion => "Waiting for cleanup to finish...".into(),
            EventKind::CleanupFinished => "Done with cleanup, shutting down".into(),
            EventKind::GraceExceeded => {
                "Timed out waiting for cleanup to finish, shutting down".into()
            }
            EventKind::OperationTimedOut => format!(
                "{op} run {} exceeded its timeout of {:?}",
                e.run.unwrap_or_default(),
                Duration::from_millis(e.timeout_ms.unwrap_or_default())
            ),
            EventKind::OperationFailed => format!(
                "{op} failed on run {}: {}, shutting down",
                e.run.unwrap_or_default(),
                e.reason.as_deref().unwrap_or("unknown error")
            ),
            EventKind::WaitScheduled => format!(
                "Next {op} run in {:?}",
                Duration::from_millis(e.delay_ms.unwrap_or_default())
            ),
            EventKind::OperationOutput => e.reason.as_deref().unwrap_or_default().to_string(),
            EventKind::EventsDropped => format!(
                "Event listener fell behind, {} event(s) dropped",
                e.skipped.unwrap_or_default()
            ),
            EventKind::WorkerStopped => {
                format!("Worker stopped after {} run(s)", e.run.unwrap_or_default())
            }
            EventKind::OperationStarting | EventKind::ProbeStopped => return None,
        };
        Some(line)
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let Some(msg) = Self::render(e) else {
            return;
        };
        match e.kind {
            EventKind::EventsDropped => eprintln!("{}", stamped(e.at, &msg)),
            _ => println!("{}", stamped(e.at, &msg)),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

/// Formats `msg` behind a `YYYY-MM-DD HH:MM:SS.fff +00:00` UTC timestamp.
pub fn stamped(at: SystemTime, msg: &str) -> String {
    let at: DateTime<Utc> = at.into();
    format!("{} {msg}", at.format("%Y-%m-%d %H:%M:%S%.3f %:z"))
}

/// Prints `msg` to stderr with the current timestamp.
pub fn eprint_line(msg: &str) {
    eprintln!("{}", stamped(SystemTime::now(), msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_has_millis_and_offset() {
        let at = SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(
            stamped(at, "hello"),
            "2023-11-14 22:13:20.123 +00:00 hello"
        );
    }

    #[test]
    fn renders_shutdown_transitions_distinctly() {
        let finished = LogWriter::render(&Event::new(EventKind::CleanupFinished)).unwrap();
        let timed_out = LogWriter::render(&Event::new(EventKind::GraceExceeded)).unwrap();
        assert_eq!(finished, "Done with cleanup, shutting down");
        assert_eq!(
            timed_out,
            "Timed out waiting for cleanup to finish, shutting down"
        );
    }

    #[test]
    fn renders_operation_details() {
        let failed = Event::new(EventKind::OperationFailed)
            .with_operation("fetch-url")
            .with_run(2)
            .with_reason("operation failed: 503");
        assert_eq!(
            LogWriter::render(&failed).unwrap(),
            "fetch-url failed on run 2: operation failed: 503, shutting down"
        );

        let wait = Event::new(EventKind::WaitScheduled)
            .with_operation("get-twin")
            .with_delay(Duration::from_secs(60));
        assert_eq!(LogWriter::render(&wait).unwrap(), "Next get-twin run in 60s");

        let listening = Event::new(EventKind::ListeningForShutdown).with_reason("");
        assert_eq!(
            LogWriter::render(&listening).unwrap(),
            "Listening for shutdown request..."
        );
        assert!(LogWriter::render(&Event::new(EventKind::ProbeStopped)).is_none());
    }

    #[test]
    fn renders_output_and_dropped_events() {
        let output = Event::new(EventKind::OperationOutput)
            .with_operation("fetch-url")
            .with_reason("MIT License");
        assert_eq!(LogWriter::render(&output).unwrap(), "MIT License");

        let dropped = Event::new(EventKind::EventsDropped).with_skipped(3);
        assert_eq!(
            LogWriter::render(&dropped).unwrap(),
            "Event listener fell behind, 3 event(s) dropped"
        );
    }
}

//! Integration tests for logging system

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_path, LogFormat, LoggingConfig,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for RecordingSink {
    async fn log(&self, entry: LogEntry) -> BridgeResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Warn
    }
}

#[test]
fn test_global_init_forwards_to_sink_once() {
    // The global subscriber can only be installed once per process
    let sink = Arc::new(RecordingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_filter("logging_integration=debug")
        .with_logger_sink(sink.clone());

    init_logging(config.clone()).unwrap();
    assert!(init_logging(config).is_err());

    tracing::info!(source = "Embedded", "below sink level");
    tracing::warn!(source = "AZLyrics", password = "hunter2", "Lyrics source failed");

    let entries = sink.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "Lyrics source failed");
    assert_eq!(entries[0].fields.get("source"), Some(&"AZLyrics".to_string()));
    assert_eq!(entries[0].fields.get("password"), Some(&"[REDACTED]".to_string()));
}

#[test]
fn test_pii_redaction_secrets() {
    assert_eq!(redact_if_sensitive("session_key", "d580d57f"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("lastfm_api_key", "abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("shared_secret", "abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("Password", "pw"), "[REDACTED]");
}

#[test]
fn test_pii_redaction_emails() {
    let redacted = redact_if_sensitive("username", "listener@example.com");

    assert!(redacted.starts_with('l'));
    assert!(redacted.contains("[REDACTED]"));
    assert!(!redacted.contains("example.com"));
}

#[test]
fn test_pii_redaction_normal_values() {
    assert_eq!(redact_if_sensitive("track_id", "12345"), "12345");
    assert_eq!(redact_if_sensitive("title", "Glory Box"), "Glory Box");
    assert_eq!(redact_if_sensitive("artist", "@ease"), "@ease");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/home/user/music/song.mp3"), "song.mp3");
    assert_eq!(strip_path("/home/user/music/song.lrc"), "song.lrc");
    assert_eq!(strip_path("C:\\Users\\Sam\\Music\\song.mp3"), "song.mp3");
    assert_eq!(strip_path("filename.txt"), "filename.txt");
    assert_eq!(strip_path("/var/log/"), "");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

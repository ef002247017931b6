//! # Host Bridge Traits
//!
//! Platform abstraction traits that the player core requires from its host.
//!
//! ## Overview
//!
//! This crate defines the contract between the player core and the desktop
//! shell. Each trait represents a capability that the core needs but that the
//! host provides: outbound HTTP, sidecar file access, persisted settings,
//! credential storage, a time source and a log sink.
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Async HTTP GET/POST against metadata and lyrics sites
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Reading `.lrc`/`.srt` sidecars, settings files
//!
//! ### Security & Storage
//! - [`SecureStore`](storage::SecureStore) - Last.fm session key persistence
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences (sort orders, selections, toggles)
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Host
//! implementations should convert platform-specific errors to `BridgeError`
//! and include context (file paths, status codes) in the message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks behind an `Arc`.

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::{FileMetadata, FileSystemAccess, SecureStore, SettingsStore};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};

//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the player core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the service crates depend
//! on. It establishes the logging conventions and the dependency-injection
//! container ([`config::CoreConfig`]) through which host bridges reach the
//! lyrics, artist information and scrobbling services.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};

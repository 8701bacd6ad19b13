//! Ottstream - OTT video streaming server.
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod ingest;
pub mod pool;
pub mod server;
pub mod streaming;
pub mod thumbs;

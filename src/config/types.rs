//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub database: DatabaseConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Worker threads for the blocking task pool.
    pub workers: usize,
    /// Directory with the bundled web UI, served as static files.
    pub web_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: 4,
            web_dir: None,
        }
    }
}

/// Media storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Where ingested video files are copied to.
    pub video_dir: PathBuf,
    /// Where generated thumbnails are written.
    pub thumbnail_dir: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::from("./media/videos"),
            thumbnail_dir: PathBuf::from("./media/thumbnails"),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./app.db"),
        }
    }
}

//! Ottstream-Common: shared types, ids, and error handling.
//!
//! This crate provides functionality used across ottstream:
//!
//! - **Typed IDs**: type-safe UUID wrappers for users, videos, files, and thumbnails
//! - **Media helpers**: MIME type lookup by file extension
//! - **Error handling**: the common error type and result alias
//!
//! # Examples
//!
//! ```
//! use ottstream_common::{Error, Result, VideoId};
//! use ottstream_common::media::mime_type_for_path;
//! use std::path::Path;
//!
//! let id = VideoId::new();
//! assert_eq!(mime_type_for_path(Path::new("movie.mp4")), "video/mp4");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("video"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod media;

pub use error::{Error, Result};
pub use ids::*;

//! Error types for the setup paths of the font subsystem.
//!
//! Rendering operations never fail with these; they degrade to empty
//! results instead. Only discovery and explicit font opening report errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::pattern::FontId;

#[derive(Error, Debug)]
pub enum FontError {
    // ========================================================================
    // Discovery
    // ========================================================================
    #[error("Font directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // ========================================================================
    // Faces
    // ========================================================================
    #[error("No usable face {index} in {}", path.display())]
    InvalidFont { path: PathBuf, index: u32 },

    #[error("Font id {0} is not registered")]
    UnknownFont(FontId),
}

pub type Result<T> = std::result::Result<T, FontError>;

//! Artifact writing: PNG images, pretty JSON, and plain text files
//!
//! Every writer creates missing parent directories first, so callers can
//! point outputs at directories that do not exist yet.

use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error while creating directories or writing a file
    Io(PathBuf, io::Error),
    /// Image encoding error
    Image(PathBuf, image::ImageError),
    /// JSON serialization error
    Json(serde_json::Error),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(path, e) => write!(f, "IO error writing {}: {}", path.display(), e),
            OutputError::Image(path, e) => {
                write!(f, "Image error writing {}: {}", path.display(), e)
            }
            OutputError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(_, e) => Some(e),
            OutputError::Image(_, e) => Some(e),
            OutputError::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        OutputError::Json(e)
    }
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| OutputError::Io(parent.to_path_buf(), e))?;
        }
    }
    Ok(())
}

/// Save an RGBA image to a PNG file.
///
/// The PNG encoder is used regardless of the path's extension.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent_dir(path)?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| OutputError::Image(path.to_path_buf(), e))
}

/// Serialize a value as 2-space indented JSON and write it to `path`.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(value)?;
    write_text(path, &json)
}

/// Write a text file, replacing any existing content.
pub fn write_text(path: &Path, content: &str) -> Result<(), OutputError> {
    ensure_parent_dir(path)?;
    std::fs::write(path, content).map_err(|e| OutputError::Io(path.to_path_buf(), e))
}

//! Engine export formats for packed atlases.
//!
//! # Supported Formats
//!
//! - **Godot**: one `AtlasTexture` `.tres` resource per sprite

pub mod godot;

pub use godot::*;

use std::path::PathBuf;
use thiserror::Error;

/// Common error type for export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error during file writing
    #[error("IO error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_display() {
        let err = ExportError::Io {
            path: PathBuf::from("out/hub.tres"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = err.to_string();
        assert!(message.contains("IO error"));
        assert!(message.contains("out/hub.tres"));
        assert!(message.contains("denied"));
    }
}

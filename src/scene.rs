//! Scene chunk rewiring - points chunk textures at AtlasTexture resources
//!
//! Map scenes reference each chunk tile as its own PNG:
//!
//! ```text
//! [ext_resource type="Texture2D" uid="uid://..." path="res://chunks/chunk_12_7.png" id="127_x2dlj"]
//! ```
//!
//! Once the chunks have been packed into an atlas, each line is replaced by
//! a reference to the matching `AtlasTexture` resource, keeping the scene's
//! own resource id so every `ExtResource("...")` usage stays valid:
//!
//! ```text
//! [ext_resource type="AtlasTexture" path="res://resources/map_chunks/chunk_12_7.tres" id="127_x2dlj"]
//! ```
//!
//! The `uid="..."` attribute is optional in the input and never emitted.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while rewriting a scene
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Failed to read scene {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write scene {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to back up {} to {}: {source}", .scene.display(), .backup.display())]
    Backup {
        scene: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid chunk directory '{0}'")]
    Pattern(String, #[source] regex::Error),
}

/// A chunk texture reference parsed from a scene line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReference {
    /// The `uid://` value, when the line carried one
    pub uid: Option<String>,
    /// Chunk column, as written in the file name
    pub x: String,
    /// Chunk row, as written in the file name
    pub y: String,
    /// Scene-local resource id, preserved verbatim
    pub id: String,
}

impl ChunkReference {
    /// Path of the AtlasTexture resource for this chunk.
    pub fn atlas_path(&self, atlas_dir: &str) -> String {
        format!("{}/chunk_{}_{}.tres", atlas_dir.trim_end_matches('/'), self.x, self.y)
    }

    /// Replacement `ext_resource` line (without line terminator).
    pub fn atlas_line(&self, atlas_dir: &str) -> String {
        format!(
            "[ext_resource type=\"AtlasTexture\" path=\"{}\" id=\"{}\"]",
            self.atlas_path(atlas_dir),
            self.id
        )
    }
}

/// Compiled matcher for chunk texture lines
#[derive(Debug, Clone)]
pub struct ChunkPattern {
    regex: Regex,
}

impl ChunkPattern {
    /// Build a matcher for chunk PNGs living under `chunk_dir` (e.g. "res://chunks").
    pub fn new(chunk_dir: &str) -> Result<Self, SceneError> {
        let pattern = format!(
            r#"\[ext_resource type="Texture2D" (?:uid="([^"]*)" )?path="{}/chunk_(\d+)_(\d+)\.png" id="([^"]*)"\]"#,
            regex::escape(chunk_dir.trim_end_matches('/'))
        );
        let regex = Regex::new(&pattern).map_err(|e| SceneError::Pattern(chunk_dir.to_string(), e))?;
        Ok(Self { regex })
    }

    /// Parse a chunk reference out of `line`, if it contains one.
    ///
    /// Coordinate digits are kept exactly as written, leading zeros included.
    pub fn parse(&self, line: &str) -> Option<ChunkReference> {
        let caps = self.regex.captures(line)?;
        Some(ChunkReference {
            uid: caps.get(1).map(|m| m.as_str().to_string()),
            x: caps[2].to_string(),
            y: caps[3].to_string(),
            id: caps[4].to_string(),
        })
    }
}

/// Result of rewriting scene text
#[derive(Debug, Clone, Default)]
pub struct SceneRewrite {
    pub content: String,
    /// Every reference that was rewritten, in file order
    pub references: Vec<ChunkReference>,
}

impl SceneRewrite {
    pub fn replaced(&self) -> usize {
        self.references.len()
    }
}

/// Split a line into its body and terminator (`"\r\n"`, `"\n"`, or `""`).
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Rewrite every chunk line of `content`.
///
/// Matched lines are replaced whole and keep their original terminator;
/// all other lines are copied through byte for byte.
pub fn rewrite_scene_text(content: &str, pattern: &ChunkPattern, atlas_dir: &str) -> SceneRewrite {
    let mut out = String::with_capacity(content.len());
    let mut references = Vec::new();

    for line in content.split_inclusive('\n') {
        let (body, terminator) = split_terminator(line);
        match pattern.parse(body) {
            Some(reference) => {
                debug!(x = %reference.x, y = %reference.y, id = %reference.id, "chunk -> atlas texture");
                out.push_str(&reference.atlas_line(atlas_dir));
                out.push_str(terminator);
                references.push(reference);
            }
            None => out.push_str(line),
        }
    }

    SceneRewrite { content: out, references }
}

/// Copy `scene` to `backup` unless the backup already exists.
///
/// Returns `true` when a copy was made.
pub fn ensure_backup(scene: &Path, backup: &Path) -> Result<bool, SceneError> {
    if backup.exists() {
        return Ok(false);
    }
    let to_err = |source: std::io::Error| SceneError::Backup {
        scene: scene.to_path_buf(),
        backup: backup.to_path_buf(),
        source,
    };
    if let Some(parent) = backup.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(to_err)?;
        }
    }
    fs::copy(scene, backup).map_err(to_err)?;
    Ok(true)
}

/// Settings for one scene rewrite
#[derive(Debug, Clone)]
pub struct SceneOptions {
    pub scene: PathBuf,
    pub backup: PathBuf,
    /// Resource directory of the individual chunk PNGs
    pub chunk_dir: String,
    /// Resource directory of the chunk AtlasTexture resources
    pub atlas_dir: String,
    /// Parse and count, but touch no files
    pub dry_run: bool,
}

/// Outcome of [`run`]
#[derive(Debug, Clone)]
pub struct SceneReport {
    pub scene: PathBuf,
    /// Whether this run created the backup
    pub backup_created: bool,
    pub references: Vec<ChunkReference>,
}

impl SceneReport {
    pub fn replaced(&self) -> usize {
        self.references.len()
    }
}

/// Back up the scene, rewrite its chunk lines, and overwrite it.
pub fn run(options: &SceneOptions) -> Result<SceneReport, SceneError> {
    let pattern = ChunkPattern::new(&options.chunk_dir)?;

    // Read first so a missing scene fails before any backup is attempted
    let content = fs::read_to_string(&options.scene)
        .map_err(|source| SceneError::Read { path: options.scene.clone(), source })?;

    let backup_created = if options.dry_run {
        false
    } else {
        ensure_backup(&options.scene, &options.backup)?
    };
    if backup_created {
        info!(backup = %options.backup.display(), "created backup");
    }

    let rewrite = rewrite_scene_text(&content, &pattern, &options.atlas_dir);
    if !options.dry_run {
        fs::write(&options.scene, &rewrite.content)
            .map_err(|source| SceneError::Write { path: options.scene.clone(), source })?;
    }

    Ok(SceneReport { scene: options.scene.clone(), backup_created, references: rewrite.references })
}

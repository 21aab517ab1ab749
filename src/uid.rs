//! UID rewriting - replaces `res://` resource paths with their `uid://` ids
//!
//! Godot stores a stable identifier for a resource in a `<resource>.uid`
//! sidecar next to it. This module collects every sidecar under a project
//! root into a [`UidMap`], writes the map out for inspection, and rewrites
//! text files so that literal resource paths become uid references.
//!
//! Substitution is a single left-to-right pass where the longest matching
//! path wins at each position, so `res://a.png` never clobbers the prefix of
//! `res://a.png.import`, and replaced text is never scanned again.

use crate::config::RES_SCHEME;
use crate::output::{self, OutputError};
use glob::glob;
use regex::{Captures, Regex, RegexBuilder};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Extension of sidecar identifier files.
pub const SIDECAR_EXTENSION: &str = "uid";

/// Resource path -> uid mapping. Ordered so the written map is stable.
pub type UidMap = BTreeMap<String, String>;

/// Errors raised while building the map or rewriting files
#[derive(Debug, Error)]
pub enum UidError {
    #[error("Project root {} is not accessible: {source}", .path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid search pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("Failed to walk project tree: {0}")]
    Walk(#[from] glob::GlobError),
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to build path matcher: {0}")]
    Matcher(#[from] regex::Error),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Settings for one UID rewriting run
#[derive(Debug, Clone)]
pub struct UidOptions {
    /// Project root; both sidecars and rewritten files live below it
    pub root: PathBuf,
    /// Map artifact path (relative paths resolve against `root`)
    pub map_file: PathBuf,
    /// Extensions (no dot, any case) of files that get rewritten
    pub extensions: Vec<String>,
    /// Compute everything but write nothing
    pub dry_run: bool,
}

/// Outcome of rewriting a tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Files whose extension is on the allow-list
    pub files_scanned: usize,
    /// Files that contained at least one resource path
    pub files_updated: Vec<PathBuf>,
    /// Total number of substitutions
    pub replacements: usize,
}

/// Outcome of a full [`run`]
#[derive(Debug, Clone)]
pub struct UidRunReport {
    pub map: UidMap,
    /// Where the map was (or, in dry-run mode, would be) written
    pub map_path: PathBuf,
    pub rewrite: RewriteReport,
}

/// Find every `.uid` sidecar below `root`, sorted by path.
pub fn discover_sidecars(root: &Path) -> Result<Vec<PathBuf>, UidError> {
    let mut files = find_files(root, &format!("**/*.{}", SIDECAR_EXTENSION))?;
    files.sort();
    Ok(files)
}

fn find_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, UidError> {
    let full_pattern =
        format!("{}/{}", glob::Pattern::escape(&root.to_string_lossy()), pattern);
    let paths = glob(&full_pattern)
        .map_err(|source| UidError::Pattern { pattern: full_pattern.clone(), source })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Resource path a sidecar belongs to: `res://` + root-relative path with
/// `/` separators and the `.uid` suffix removed.
///
/// Returns `None` when `sidecar` is not below `root`, is not a sidecar, or
/// is a bare `.uid` file.
pub fn resource_path_for(root: &Path, sidecar: &Path) -> Option<String> {
    let relative = sidecar.strip_prefix(root).ok()?;
    let parts: Vec<String> =
        relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    let joined = parts.join("/");
    let resource = joined.strip_suffix(&format!(".{}", SIDECAR_EXTENSION))?;
    // A bare `.uid` file names no resource
    if resource.is_empty() || resource.ends_with('/') {
        return None;
    }
    Some(format!("{}{}", RES_SCHEME, resource))
}

/// Build the resource path -> uid map from every sidecar below `root`.
///
/// Sidecar contents are trimmed. If two sidecars produce the same resource
/// path, the one sorted later wins.
pub fn build_uid_map(root: &Path) -> Result<UidMap, UidError> {
    let mut map = UidMap::new();

    for sidecar in discover_sidecars(root)? {
        let Some(resource) = resource_path_for(root, &sidecar) else {
            warn!(path = %sidecar.display(), "no resource path for sidecar (outside root or bare .uid), skipping");
            continue;
        };
        let contents = fs::read_to_string(&sidecar)
            .map_err(|source| UidError::Read { path: sidecar.clone(), source })?;
        let uid = contents.trim().to_string();

        if let Some(previous) = map.insert(resource.clone(), uid) {
            warn!(resource = %resource, previous = %previous, "duplicate resource path, keeping last uid");
        }
    }

    debug!(entries = map.len(), "built uid map");
    Ok(map)
}

/// Write the map as a pretty-printed JSON object.
pub fn write_uid_map(map: &UidMap, path: &Path) -> Result<(), UidError> {
    output::write_json(map, path)?;
    Ok(())
}

/// Single-pass, longest-match-first substitution of resource paths.
#[derive(Debug)]
pub struct UidReplacer<'a> {
    map: &'a UidMap,
    matcher: Option<Regex>,
}

impl<'a> UidReplacer<'a> {
    /// Compile a matcher for every key in `map`.
    pub fn new(map: &'a UidMap) -> Result<Self, UidError> {
        if map.is_empty() {
            return Ok(Self { map, matcher: None });
        }

        // Alternation is leftmost-first, so listing longer keys first makes
        // the longest key win at any given start position.
        let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let pattern = keys.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");

        let matcher = RegexBuilder::new(&pattern).size_limit(256 << 20).build()?;
        Ok(Self { map, matcher: Some(matcher) })
    }

    /// Replace every mapped path in `text`, returning the new text and the
    /// number of substitutions made.
    pub fn replace(&self, text: &str) -> (String, usize) {
        let Some(matcher) = &self.matcher else {
            return (text.to_string(), 0);
        };
        if !text.contains(RES_SCHEME) {
            return (text.to_string(), 0);
        }

        let mut count = 0;
        let replaced = matcher.replace_all(text, |caps: &Captures| {
            count += 1;
            self.map[&caps[0]].clone()
        });
        (replaced.into_owned(), count)
    }
}

fn has_allowed_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_ascii_lowercase()))
        .unwrap_or(false)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Rewrite every allow-listed file below `root`.
///
/// A file is written back only when at least one substitution happened.
/// `skip` (typically the map artifact) is never touched. There is no
/// rollback: an error aborts the walk with earlier files already rewritten.
pub fn rewrite_tree(
    root: &Path,
    map: &UidMap,
    extensions: &[String],
    skip: Option<&Path>,
    dry_run: bool,
) -> Result<RewriteReport, UidError> {
    let replacer = UidReplacer::new(map)?;
    let allowed: HashSet<String> =
        extensions.iter().map(|e| e.trim_start_matches('.').to_ascii_lowercase()).collect();

    let mut files = find_files(root, "**/*")?;
    files.sort();

    let mut report = RewriteReport::default();
    for path in files {
        if !has_allowed_extension(&path, &allowed) {
            continue;
        }
        if skip.is_some_and(|s| same_file(&path, s)) {
            continue;
        }
        report.files_scanned += 1;

        let content = fs::read_to_string(&path)
            .map_err(|source| UidError::Read { path: path.clone(), source })?;
        let (new_content, count) = replacer.replace(&content);
        if count == 0 {
            continue;
        }

        if !dry_run {
            fs::write(&path, new_content)
                .map_err(|source| UidError::Write { path: path.clone(), source })?;
        }
        info!(path = %path.display(), replacements = count, "updated");
        report.replacements += count;
        report.files_updated.push(path);
    }

    Ok(report)
}

/// Build the map, persist it, and rewrite the tree.
pub fn run(options: &UidOptions) -> Result<UidRunReport, UidError> {
    let root = fs::canonicalize(&options.root)
        .map_err(|source| UidError::Root { path: options.root.clone(), source })?;
    let map_path = if options.map_file.is_absolute() {
        options.map_file.clone()
    } else {
        root.join(&options.map_file)
    };

    let map = build_uid_map(&root)?;
    if !options.dry_run {
        write_uid_map(&map, &map_path)?;
    }

    let rewrite =
        rewrite_tree(&root, &map, &options.extensions, Some(&map_path), options.dry_run)?;
    Ok(UidRunReport { map, map_path, rewrite })
}

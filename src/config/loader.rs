//! Configuration loading and discovery for `gdpipe.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PipelineConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for.
pub const CONFIG_FILE_NAME: &str = "gdpipe.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML parsing error
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the UID replacer root
    pub uids_root: Option<PathBuf>,
    /// Override the UID map artifact path
    pub map_file: Option<PathBuf>,
    /// Override the scene file
    pub scene_file: Option<PathBuf>,
    /// Override the scene backup path
    pub scene_backup: Option<PathBuf>,
    /// Override the sprite source directory
    pub src_dir: Option<PathBuf>,
    /// Override atlas padding
    pub padding: Option<u32>,
    /// Override the atlas image output
    pub image: Option<PathBuf>,
    /// Override the atlas layout output
    pub layout: Option<PathBuf>,
}

/// A loaded configuration together with the directory its paths resolve against.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: PipelineConfig,
    /// Directory containing `gdpipe.toml`, or the working directory when none was found
    pub project_root: PathBuf,
    /// The file the configuration came from, if any
    pub source: Option<PathBuf>,
}

/// Find `gdpipe.toml` by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find `gdpipe.toml` by walking up from a specific directory.
///
/// This is the internal implementation that allows specifying the start directory,
/// useful for testing.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration rooted at the current directory.
///
/// # Example
/// ```ignore
/// let loaded = load_config(None)?;
/// let image = resolve_path(&loaded.project_root, &loaded.config.atlas.image);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            let config = load_config_file(&p)?;
            let project_root = project_root(&p)
                .filter(|root| !root.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok(LoadedConfig { config, project_root, source: Some(p) })
        }
        None => Ok(LoadedConfig {
            config: PipelineConfig::default(),
            project_root: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            source: None,
        }),
    }
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    let config: PipelineConfig = toml::from_str(&contents)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut PipelineConfig, overrides: &CliOverrides) {
    if let Some(ref root) = overrides.uids_root {
        config.uids.root = root.clone();
    }
    if let Some(ref map_file) = overrides.map_file {
        config.uids.map_file = map_file.clone();
    }

    if let Some(ref file) = overrides.scene_file {
        config.scene.file = file.clone();
    }
    if let Some(ref backup) = overrides.scene_backup {
        config.scene.backup = backup.clone();
    }

    if let Some(ref src) = overrides.src_dir {
        config.atlas.src_dir = src.clone();
    }
    if let Some(padding) = overrides.padding {
        config.atlas.padding = padding;
    }
    if let Some(ref image) = overrides.image {
        config.atlas.image = image.clone();
    }
    if let Some(ref layout) = overrides.layout {
        config.atlas.layout = layout.clone();
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"[atlas]\npadding = 1")
            .expect("should write config content");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "").expect("should write config");

        let subdir = temp.path().join("scenes").join("world");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    fn test_load_config_sets_project_root() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[scene]\nfile = \"world.tscn\"\n").expect("should write config");

        let loaded = load_config(Some(&config_path)).expect("config should load");
        assert_eq!(loaded.project_root, temp.path());
        assert_eq!(loaded.source.as_deref(), Some(config_path.as_path()));
        assert_eq!(loaded.config.scene.file, PathBuf::from("world.tscn"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[atlas\npadding = ").expect("should write config");

        let err = load_config(Some(&config_path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[atlas]\nsprites = []\n").expect("should write config");

        let err = load_config(Some(&config_path)).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("atlas.sprites"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/gdpipe.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = PipelineConfig::default();
        let overrides = CliOverrides {
            padding: Some(0),
            image: Some(PathBuf::from("out/atlas.png")),
            scene_file: Some(PathBuf::from("level.tscn")),
            ..Default::default()
        };
        merge_cli_overrides(&mut config, &overrides);

        assert_eq!(config.atlas.padding, 0);
        assert_eq!(config.atlas.image, PathBuf::from("out/atlas.png"));
        assert_eq!(config.scene.file, PathBuf::from("level.tscn"));
        // Untouched values keep their defaults
        assert_eq!(config.atlas.layout, PathBuf::from("resources/buildings_atlas_config.json"));
        assert_eq!(config.uids.map_file, PathBuf::from("uid_map.json"));
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("art_src")), PathBuf::from("/project/art_src"));
        assert_eq!(resolve_path(root, Path::new("/abs/path")), PathBuf::from("/abs/path"));
    }
}

//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod atlas;
mod scene;
mod uids;

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, LoadedConfig};

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// gdpipe - asset pipeline utilities for Godot projects
#[derive(Parser)]
#[command(name = "gdpipe")]
#[command(about = "gdpipe - rewrite resource paths to UIDs, rewire scene chunks to atlas textures, pack sprite atlases")]
#[command(version)]
pub struct Cli {
    /// Path to gdpipe.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show per-file and per-line details
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace res:// paths with uid:// references using .uid sidecar files
    Uids {
        /// Project root to scan, relative to the current directory (overrides [uids].root)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Where to write the path -> uid map (relative to the scanned root)
        #[arg(long)]
        map_file: Option<PathBuf>,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Point chunk PNG references in a scene at AtlasTexture resources
    Scene {
        /// Scene file to rewrite, relative to the current directory (overrides [scene].file)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Backup path, created only if missing, relative to the current directory
        #[arg(long)]
        backup: Option<PathBuf>,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Pack the configured sprites into a horizontal strip atlas
    Atlas {
        /// Sprite source directory, relative to the current directory (overrides [atlas].src_dir)
        #[arg(long)]
        src: Option<PathBuf>,

        /// Padding around and between sprites in pixels
        #[arg(long)]
        padding: Option<u32>,

        /// Atlas PNG output path, relative to the current directory
        #[arg(long)]
        image: Option<PathBuf>,

        /// Layout JSON output path, relative to the current directory
        #[arg(long)]
        layout: Option<PathBuf>,
    },
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise the verbosity flags pick the level.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gdpipe={}", default_level)));

    // A second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

/// Anchor a path given on the command line at the current directory.
///
/// Config-file paths are relative to the project root, but paths typed on
/// the command line are relative to where the command runs.
fn from_cwd(path: Option<PathBuf>) -> Option<PathBuf> {
    path.map(|p| match std::env::current_dir() {
        Ok(cwd) if p.is_relative() => cwd.join(p),
        _ => p,
    })
}

/// Load the configuration and apply CLI overrides.
fn load(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<LoadedConfig, ExitCode> {
    match load_config(config_path) {
        Ok(mut loaded) => {
            if let Some(source) = &loaded.source {
                tracing::debug!(config = %source.display(), "using config");
            }
            merge_cli_overrides(&mut loaded.config, overrides);
            Ok(loaded)
        }
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            Err(ExitCode::from(EXIT_INVALID_ARGS))
        }
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Uids { root, map_file, dry_run } => {
            let overrides =
                CliOverrides { uids_root: from_cwd(root), map_file, ..Default::default() };
            match load(config_path, &overrides) {
                Ok(loaded) => uids::run_uids(&loaded, dry_run),
                Err(code) => code,
            }
        }
        Commands::Scene { file, backup, dry_run } => {
            let overrides =
                CliOverrides {
                    scene_file: from_cwd(file),
                    scene_backup: from_cwd(backup),
                    ..Default::default()
                };
            match load(config_path, &overrides) {
                Ok(loaded) => scene::run_scene(&loaded, dry_run),
                Err(code) => code,
            }
        }
        Commands::Atlas { src, padding, image, layout } => {
            let overrides =
                CliOverrides {
                    src_dir: from_cwd(src),
                    padding,
                    image: from_cwd(image),
                    layout: from_cwd(layout),
                    ..Default::default()
                };
            match load(config_path, &overrides) {
                Ok(loaded) => atlas::run_atlas(&loaded),
                Err(code) => code,
            }
        }
    }
}

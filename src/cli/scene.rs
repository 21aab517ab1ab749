//! `gdpipe scene` - chunk texture lines to AtlasTexture references

use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::{resolve_path, LoadedConfig};
use crate::scene::{self, SceneOptions};

/// How many rewritten chunks to list before summarising.
const PREVIEW_LIMIT: usize = 5;

/// Run the scene command
pub fn run_scene(loaded: &LoadedConfig, dry_run: bool) -> ExitCode {
    let cfg = &loaded.config.scene;
    let options = SceneOptions {
        scene: resolve_path(&loaded.project_root, &cfg.file),
        backup: resolve_path(&loaded.project_root, &cfg.backup),
        chunk_dir: cfg.chunk_dir.clone(),
        atlas_dir: cfg.atlas_dir.clone(),
        dry_run,
    };

    match scene::run(&options) {
        Ok(report) => {
            if report.backup_created {
                println!("Created backup: {}", options.backup.display());
            } else if !dry_run {
                println!("Backup already exists: {}", options.backup.display());
            }

            for reference in report.references.iter().take(PREVIEW_LIMIT) {
                println!(
                    "  Chunk {},{} -> {}",
                    reference.x,
                    reference.y,
                    reference.atlas_path(&options.atlas_dir)
                );
            }
            if report.replaced() > PREVIEW_LIMIT {
                println!("  ... and {} more", report.replaced() - PREVIEW_LIMIT);
            }

            let verb = if dry_run { "Would update" } else { "Updated" };
            println!("{} {} chunk references in {}", verb, report.replaced(), report.scene.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

//! `gdpipe atlas` - sprite strip packing

use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::atlas::{self, AtlasOptions, GodotOutput};
use crate::config::{resolve_path, LoadedConfig};

/// Run the atlas command
pub fn run_atlas(loaded: &LoadedConfig) -> ExitCode {
    let root = &loaded.project_root;
    let cfg = &loaded.config.atlas;
    let options = AtlasOptions {
        src_dir: resolve_path(root, &cfg.src_dir),
        sprites: cfg.sprites.clone(),
        padding: cfg.padding,
        image: resolve_path(root, &cfg.image),
        layout: resolve_path(root, &cfg.layout),
        godot: cfg.godot.as_ref().map(|g| GodotOutput {
            out_dir: resolve_path(root, &g.out_dir),
            resource_path: g.resource_path.clone(),
        }),
    };

    match atlas::run(&options) {
        Ok(report) => {
            println!(
                "Created atlas: {} ({}x{})",
                report.image_path.display(),
                report.size.0,
                report.size.1
            );
            println!("Config saved: {}", report.layout_path.display());
            if !report.godot_files.is_empty() {
                println!("Wrote {} AtlasTexture resource(s)", report.godot_files.len());
            }
            println!("Packed {} sprite(s)", report.packed.len());
            if !report.missing.is_empty() {
                println!("Skipped {} missing: {}", report.missing.len(), report.missing.join(", "));
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

//! `gdpipe uids` - resource path to UID rewriting

use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::{resolve_path, LoadedConfig};
use crate::uid::{self, UidOptions};

/// Run the uids command
pub fn run_uids(loaded: &LoadedConfig, dry_run: bool) -> ExitCode {
    let cfg = &loaded.config.uids;
    let options = UidOptions {
        root: resolve_path(&loaded.project_root, &cfg.root),
        map_file: cfg.map_file.clone(),
        extensions: cfg.extensions.clone(),
        dry_run,
    };

    match uid::run(&options) {
        Ok(report) => {
            if dry_run {
                println!("Dry run - no files written");
                for path in &report.rewrite.files_updated {
                    println!("  would update {}", path.display());
                }
            } else {
                println!("UID map ({} entries): {}", report.map.len(), report.map_path.display());
            }
            println!(
                "Replaced {} path(s) in {} of {} file(s)",
                report.rewrite.replacements,
                report.rewrite.files_updated.len(),
                report.rewrite.files_scanned
            );
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

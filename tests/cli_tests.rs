//! CLI integration tests for the `gdpipe` binary.
//!
//! Each test builds a throwaway project in a temp directory with its own
//! `gdpipe.toml`, runs one subcommand, and checks files plus exit codes.

use std::fs;
use std::path::Path;
use std::process::Command;

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

/// Run gdpipe inside `dir` and return (stdout, stderr, exit code).
fn run_gdpipe(dir: &Path, args: &[&str]) -> (String, String, i32) {
    run_gdpipe_from(dir, dir, args)
}

/// Run gdpipe from `cwd` against the project config in `project`.
fn run_gdpipe_from(cwd: &Path, project: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_gdpipe"))
        .current_dir(cwd)
        .arg("--config")
        .arg(project.join("gdpipe.toml"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute gdpipe");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code().unwrap_or(-1))
}

fn project(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("gdpipe.toml"), config).unwrap();
    dir
}

#[test]
fn test_atlas_command_packs_sprites() {
    let dir = project("[atlas]\nsprites = [\"A.png\", \"Gone.png\", \"B.png\"]\n");
    let src = dir.path().join("art_src");
    fs::create_dir_all(&src).unwrap();
    RgbaImage::from_pixel(40, 20, Rgba([255, 0, 0, 255])).save(src.join("A.png")).unwrap();
    RgbaImage::from_pixel(30, 25, Rgba([0, 0, 255, 255])).save(src.join("B.png")).unwrap();

    let (stdout, stderr, code) = run_gdpipe(dir.path(), &["atlas"]);

    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("(74x29)"), "stdout: {}", stdout);
    assert!(stdout.contains("Packed 2 sprite(s)"));
    assert!(stderr.contains("Gone.png"), "missing sprite should be warned about: {}", stderr);

    let atlas = image::open(src.join("buildings_atlas.png")).unwrap();
    assert_eq!((atlas.width(), atlas.height()), (74, 29));
    let layout = fs::read_to_string(dir.path().join("resources/buildings_atlas_config.json")).unwrap();
    let layout: serde_json::Value = serde_json::from_str(&layout).unwrap();
    assert_eq!(layout["B"]["x"], 44);
}

#[test]
fn test_atlas_command_fails_without_sprites() {
    let dir = project("[atlas]\nsprites = [\"Nothing.png\"]\n");

    let (_, stderr, code) = run_gdpipe(dir.path(), &["atlas"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("No sprites found"), "stderr: {}", stderr);
    assert!(!dir.path().join("resources").exists());
    assert!(!dir.path().join("art_src/buildings_atlas.png").exists());
}

#[test]
fn test_atlas_command_padding_override() {
    let dir = project("[atlas]\nsprites = [\"A.png\"]\n");
    let src = dir.path().join("art_src");
    fs::create_dir_all(&src).unwrap();
    RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255])).save(src.join("A.png")).unwrap();

    let (stdout, _, code) =
        run_gdpipe(dir.path(), &["atlas", "--padding", "0", "--image", "out/atlas.png"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("(10x10)"), "stdout: {}", stdout);
    assert!(dir.path().join("out/atlas.png").exists());
}

#[test]
fn test_atlas_command_flag_paths_follow_cwd() {
    let dir = project("[atlas]\nsprites = [\"A.png\"]\n");
    let src = dir.path().join("art_src");
    fs::create_dir_all(&src).unwrap();
    RgbaImage::from_pixel(6, 6, Rgba([1, 2, 3, 255])).save(src.join("A.png")).unwrap();
    let sub = dir.path().join("tools");
    fs::create_dir_all(&sub).unwrap();

    let (_, stderr, code) = run_gdpipe_from(
        &sub,
        dir.path(),
        &["atlas", "--image", "out/atlas.png", "--layout", "out/atlas.json"],
    );

    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(sub.join("out/atlas.png").exists());
    assert!(sub.join("out/atlas.json").exists());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_scene_command_rewrites_and_backs_up() {
    let dir = project("");
    let scene = dir.path().join("overworld.tscn");
    let original = "[gd_scene load_steps=2 format=3]\n\n\
        [ext_resource type=\"Texture2D\" uid=\"uid://abc\" path=\"res://chunks/chunk_3_7.png\" id=\"127_x\"]\n";
    fs::write(&scene, original).unwrap();

    let (stdout, stderr, code) = run_gdpipe(dir.path(), &["scene"]);

    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("Updated 1 chunk references"), "stdout: {}", stdout);
    assert_eq!(fs::read_to_string(dir.path().join("overworld_backup.tscn")).unwrap(), original);
    assert_eq!(
        fs::read_to_string(&scene).unwrap(),
        "[gd_scene load_steps=2 format=3]\n\n\
        [ext_resource type=\"AtlasTexture\" path=\"res://resources/map_chunks/chunk_3_7.tres\" id=\"127_x\"]\n"
    );

    let (stdout, _, code) = run_gdpipe(dir.path(), &["scene"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Backup already exists"));
    assert!(stdout.contains("Updated 0 chunk references"));
}

#[test]
fn test_scene_command_missing_file() {
    let dir = project("[scene]\nfile = \"nowhere.tscn\"\nbackup = \"nowhere_backup.tscn\"\n");

    let (_, stderr, code) = run_gdpipe(dir.path(), &["scene"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("nowhere.tscn"));
}

#[test]
fn test_uids_command_rewrites_tree() {
    let dir = project("[uids]\nextensions = [\"tscn\", \"gd\"]\n");
    let root = dir.path();
    fs::create_dir_all(root.join("art")).unwrap();
    fs::write(root.join("art/hub.png.uid"), "uid://hubuid\n").unwrap();
    fs::write(root.join("main.tscn"), "path=\"res://art/hub.png\"").unwrap();
    fs::write(root.join("player.gd"), "preload(\"res://art/hub.png\")").unwrap();

    let (stdout, stderr, code) = run_gdpipe(root, &["uids"]);

    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("Replaced 2 path(s) in 2 of 2 file(s)"), "stdout: {}", stdout);
    assert_eq!(fs::read_to_string(root.join("main.tscn")).unwrap(), "path=\"uid://hubuid\"");
    assert_eq!(fs::read_to_string(root.join("player.gd")).unwrap(), "preload(\"uid://hubuid\")");
    assert!(root.join("uid_map.json").exists());
}

#[test]
fn test_uids_command_dry_run() {
    let dir = project("");
    let root = dir.path();
    fs::write(root.join("hub.png.uid"), "uid://hub").unwrap();
    fs::write(root.join("main.tscn"), "res://hub.png").unwrap();

    let (stdout, _, code) = run_gdpipe(root, &["uids", "--dry-run"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("would update"), "stdout: {}", stdout);
    assert_eq!(fs::read_to_string(root.join("main.tscn")).unwrap(), "res://hub.png");
    assert!(!root.join("uid_map.json").exists());
}

#[test]
fn test_invalid_config_exit_code() {
    let dir = project("[atlas]\nsprites = []\n");

    let (_, stderr, code) = run_gdpipe(dir.path(), &["atlas"]);

    assert_eq!(code, 2);
    assert!(stderr.contains("atlas.sprites"), "stderr: {}", stderr);
}

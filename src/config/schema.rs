//! Configuration schema types for `gdpipe.toml`
//!
//! Every default mirrors the constants the pipeline has always used, so an
//! empty (or missing) config file behaves exactly like the stock tools.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix every Godot resource path starts with.
pub const RES_SCHEME: &str = "res://";

/// UID replacer settings (`[uids]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UidsConfig {
    /// Project root scanned for `.uid` sidecars and text files
    #[serde(default = "default_uids_root")]
    pub root: PathBuf,
    /// Where the resource path -> uid map is written, relative to `root`
    #[serde(default = "default_map_file")]
    pub map_file: PathBuf,
    /// File extensions (without the dot) that get rewritten
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for UidsConfig {
    fn default() -> Self {
        Self {
            root: default_uids_root(),
            map_file: default_map_file(),
            extensions: default_extensions(),
        }
    }
}

fn default_uids_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_map_file() -> PathBuf {
    PathBuf::from("uid_map.json")
}

fn default_extensions() -> Vec<String> {
    ["gd", "cs", "ts", "js", "py", "json", "cfg", "ini", "xml", "shader", "tres", "tscn"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Scene atlas rewriter settings (`[scene]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    /// Scene file rewritten in place
    #[serde(default = "default_scene_file")]
    pub file: PathBuf,
    /// One-time backup copy of the scene
    #[serde(default = "default_backup")]
    pub backup: PathBuf,
    /// Resource directory holding the individual chunk PNGs
    #[serde(default = "default_chunk_dir")]
    pub chunk_dir: String,
    /// Resource directory holding the chunk AtlasTexture resources
    #[serde(default = "default_atlas_dir")]
    pub atlas_dir: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            file: default_scene_file(),
            backup: default_backup(),
            chunk_dir: default_chunk_dir(),
            atlas_dir: default_atlas_dir(),
        }
    }
}

fn default_scene_file() -> PathBuf {
    PathBuf::from("overworld.tscn")
}

fn default_backup() -> PathBuf {
    PathBuf::from("overworld_backup.tscn")
}

fn default_chunk_dir() -> String {
    "res://chunks".to_string()
}

fn default_atlas_dir() -> String {
    "res://resources/map_chunks".to_string()
}

/// Optional Godot AtlasTexture output for packed sprites (`[atlas.godot]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GodotOutputConfig {
    /// Directory receiving one `<sprite>.tres` per packed sprite
    pub out_dir: PathBuf,
    /// Resource directory the atlas image is reachable under (e.g. "res://art_src")
    pub resource_path: String,
}

/// Sprite atlas packer settings (`[atlas]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtlasConfig {
    /// Directory the sprite files are loaded from
    #[serde(default = "default_src_dir")]
    pub src_dir: PathBuf,
    /// Sprite file names, packed left to right in this order
    #[serde(default = "default_sprites")]
    pub sprites: Vec<String>,
    /// Transparent margin around and between sprites
    #[serde(default = "default_padding")]
    pub padding: u32,
    /// Composite PNG output
    #[serde(default = "default_image")]
    pub image: PathBuf,
    /// Name -> rectangle JSON output
    #[serde(default = "default_layout")]
    pub layout: PathBuf,
    /// Also emit Godot AtlasTexture resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub godot: Option<GodotOutputConfig>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            sprites: default_sprites(),
            padding: default_padding(),
            image: default_image(),
            layout: default_layout(),
            godot: None,
        }
    }
}

fn default_src_dir() -> PathBuf {
    PathBuf::from("art_src")
}

fn default_sprites() -> Vec<String> {
    [
        "AloeFarm.png",
        "Bakery.png",
        "CoffeeFarm.png",
        "CottonFarm.png",
        "FoodTrader.png",
        "HempFarm.png",
        "Hub.png",
        "LuxuryTrader.png",
        "MaterialTrader.png",
        "MedicalTrader.png",
        "RabbitHutch.png",
        "Scrapyard.png",
        "StoneQuarry.png",
        "Wheat_Farm.png",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_padding() -> u32 {
    // Keeps neighbouring sprites from bleeding into each other when filtered
    2
}

fn default_image() -> PathBuf {
    PathBuf::from("art_src/buildings_atlas.png")
}

fn default_layout() -> PathBuf {
    PathBuf::from("resources/buildings_atlas_config.json")
}

/// Root configuration structure for `gdpipe.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub uids: UidsConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub atlas: AtlasConfig,
}

impl PipelineConfig {
    /// Validate the configuration, returning every problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.uids.extensions.is_empty() {
            errors.push("uids.extensions must list at least one extension".to_string());
        }
        for ext in &self.uids.extensions {
            if ext.is_empty() || ext.starts_with('.') {
                errors.push(format!(
                    "uids.extensions: '{}' must be a bare extension like \"tscn\"",
                    ext
                ));
            }
        }

        for (field, value) in
            [("scene.chunk_dir", &self.scene.chunk_dir), ("scene.atlas_dir", &self.scene.atlas_dir)]
        {
            if !value.starts_with(RES_SCHEME) {
                errors.push(format!("{} must start with {} (got '{}')", field, RES_SCHEME, value));
            }
        }
        if self.scene.file == self.scene.backup {
            errors.push("scene.backup must differ from scene.file".to_string());
        }

        if self.atlas.sprites.is_empty() {
            errors.push("atlas.sprites must list at least one sprite".to_string());
        }
        if let Some(godot) = &self.atlas.godot {
            if !godot.resource_path.starts_with(RES_SCHEME) {
                errors.push(format!(
                    "atlas.godot.resource_path must start with {} (got '{}')",
                    RES_SCHEME, godot.resource_path
                ));
            }
        }

        errors
    }
}

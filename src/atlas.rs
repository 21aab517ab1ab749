//! Atlas packing - combines a fixed list of sprites into one strip atlas
//!
//! Sprites are laid out left to right in the order given, each `padding`
//! pixels below the top edge and `padding` pixels after the previous sprite.
//! The layout is written next to the image as a JSON object mapping each
//! sprite name (file name without extension) to its rectangle.

use crate::export::{ExportError, GodotExporter};
use crate::output::{self, OutputError};
use image::{Rgba, RgbaImage};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while loading, packing, or writing an atlas
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("No sprites found in {}", .0.display())]
    NoSprites(PathBuf),
    #[error("Nothing to pack: the sprite list is empty")]
    EmptyAtlas,
    #[error("Failed to load sprite {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Atlas would be larger than {} pixels wide", u32::MAX)]
    TooLarge,
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Settings for one packing run
#[derive(Debug, Clone)]
pub struct AtlasOptions {
    /// Directory the sprite files are read from
    pub src_dir: PathBuf,
    /// Sprite file names, packed in this order
    pub sprites: Vec<String>,
    /// Transparent margin around and between sprites
    pub padding: u32,
    /// Composite PNG output
    pub image: PathBuf,
    /// Name -> rectangle JSON output
    pub layout: PathBuf,
    /// Optional Godot AtlasTexture output
    pub godot: Option<GodotOutput>,
}

/// Where to put Godot AtlasTexture resources for the packed sprites
#[derive(Debug, Clone)]
pub struct GodotOutput {
    pub out_dir: PathBuf,
    /// Resource directory containing the atlas image (e.g. "res://art_src")
    pub resource_path: String,
}

/// A sprite to be packed into an atlas
#[derive(Debug)]
pub struct SpriteInput {
    pub name: String,
    pub image: RgbaImage,
}

/// A sprite's placement rectangle within the atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpriteRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Sprite rectangles in packing order.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtlasLayout {
    entries: Vec<(String, SpriteRect)>,
}

impl AtlasLayout {
    pub fn get(&self, name: &str) -> Option<&SpriteRect> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpriteRect)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AtlasLayout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, rect) in &self.entries {
            map.serialize_entry(name, rect)?;
        }
        map.end()
    }
}

/// Result of packing: the composite image and where every sprite went
#[derive(Debug)]
pub struct PackedAtlas {
    pub image: RgbaImage,
    pub layout: AtlasLayout,
}

/// Sprites that were loaded, plus the names that were not found
#[derive(Debug, Default)]
pub struct LoadedSprites {
    pub sprites: Vec<SpriteInput>,
    pub missing: Vec<String>,
}

/// Outcome of [`run`]
#[derive(Debug, Clone)]
pub struct AtlasReport {
    pub image_path: PathBuf,
    pub layout_path: PathBuf,
    pub size: (u32, u32),
    pub packed: Vec<String>,
    pub missing: Vec<String>,
    pub godot_files: Vec<PathBuf>,
}

/// Transparent color for atlas background
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Sprite name for a file: the file name without its extension.
pub fn sprite_name(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

/// Load the listed sprites from `src_dir` as RGBA images.
///
/// Missing files are skipped with a warning. Files that exist but cannot be
/// decoded are errors. Sprite names are unique: a file whose name (see
/// [`sprite_name`]) was already taken by an earlier entry is skipped.
pub fn load_sprites(src_dir: &Path, files: &[String]) -> Result<LoadedSprites, AtlasError> {
    let mut loaded = LoadedSprites::default();
    let mut seen = HashSet::new();

    for file in files {
        let name = sprite_name(file);
        if !seen.insert(name.clone()) {
            warn!(sprite = %file, name = %name, "sprite name already used, skipping");
            continue;
        }

        let path = src_dir.join(file);
        if !path.is_file() {
            warn!(path = %path.display(), "sprite not found, skipping");
            loaded.missing.push(file.clone());
            continue;
        }

        let image = image::open(&path)
            .map_err(|source| AtlasError::Load { path: path.clone(), source })?
            .to_rgba8();
        debug!(sprite = %file, width = image.width(), height = image.height(), "loaded");
        loaded.sprites.push(SpriteInput { name, image });
    }

    Ok(loaded)
}

/// Pack sprites into a single horizontal strip.
///
/// Width is Σ(wᵢ + padding), height is max(hᵢ) + 2 × padding, and sprite i
/// sits at `(padding + Σⱼ<ᵢ(wⱼ + padding), padding)`. An empty slice is
/// [`AtlasError::EmptyAtlas`].
pub fn pack_strip(sprites: &[SpriteInput], padding: u32) -> Result<PackedAtlas, AtlasError> {
    if sprites.is_empty() {
        return Err(AtlasError::EmptyAtlas);
    }

    let mut entries = Vec::with_capacity(sprites.len());
    let mut x_offset = padding;
    let mut total_width: u32 = 0;
    let mut max_height: u32 = 0;

    for sprite in sprites {
        let (w, h) = sprite.image.dimensions();
        entries.push((sprite.name.clone(), SpriteRect { x: x_offset, y: padding, width: w, height: h }));

        let advance = w.checked_add(padding).ok_or(AtlasError::TooLarge)?;
        total_width = total_width.checked_add(advance).ok_or(AtlasError::TooLarge)?;
        x_offset = x_offset.checked_add(advance).ok_or(AtlasError::TooLarge)?;
        max_height = max_height.max(h);
    }

    let atlas_height = padding
        .checked_mul(2)
        .and_then(|p| p.checked_add(max_height))
        .ok_or(AtlasError::TooLarge)?;

    let mut image = RgbaImage::from_pixel(total_width, atlas_height, TRANSPARENT);
    for (sprite, (_, rect)) in sprites.iter().zip(&entries) {
        copy_sprite_to_atlas(&mut image, &sprite.image, rect.x, rect.y);
    }

    Ok(PackedAtlas { image, layout: AtlasLayout { entries } })
}

/// Copy a sprite image to the atlas at the given position
fn copy_sprite_to_atlas(atlas: &mut RgbaImage, sprite: &RgbaImage, x: u32, y: u32) {
    for sy in 0..sprite.height() {
        for sx in 0..sprite.width() {
            let pixel = *sprite.get_pixel(sx, sy);
            if x + sx < atlas.width() && y + sy < atlas.height() {
                atlas.put_pixel(x + sx, y + sy, pixel);
            }
        }
    }
}

/// Write the composite image and the layout JSON, creating directories as needed.
pub fn write_atlas(packed: &PackedAtlas, image_path: &Path, layout_path: &Path) -> Result<(), AtlasError> {
    output::save_png(&packed.image, image_path)?;
    output::write_json(&packed.layout, layout_path)?;
    Ok(())
}

/// Load, pack, and write an atlas.
///
/// When no sprite could be loaded, fails with [`AtlasError::NoSprites`]
/// before anything is written.
pub fn run(options: &AtlasOptions) -> Result<AtlasReport, AtlasError> {
    info!(src = %options.src_dir.display(), "building sprite atlas");
    let loaded = load_sprites(&options.src_dir, &options.sprites)?;
    if loaded.sprites.is_empty() {
        return Err(AtlasError::NoSprites(options.src_dir.clone()));
    }

    let packed = pack_strip(&loaded.sprites, options.padding)?;
    write_atlas(&packed, &options.image, &options.layout)?;

    let godot_files = match &options.godot {
        Some(godot) => {
            let image_name = options
                .image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            GodotExporter::new()
                .with_resource_path(&godot.resource_path)
                .export_atlas_textures(&packed.layout, &image_name, &godot.out_dir)?
        }
        None => Vec::new(),
    };

    Ok(AtlasReport {
        image_path: options.image.clone(),
        layout_path: options.layout.clone(),
        size: packed.image.dimensions(),
        packed: loaded.sprites.into_iter().map(|s| s.name).collect(),
        missing: loaded.missing,
        godot_files,
    })
}

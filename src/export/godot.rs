//! Godot engine export format.
//!
//! Writes one `AtlasTexture` resource per packed sprite so scenes can use a
//! region of the atlas wherever they used the standalone image before:
//!
//! ```text
//! [gd_resource type="AtlasTexture" load_steps=2 format=3]
//!
//! [ext_resource type="Texture2D" path="res://art_src/buildings_atlas.png" id="1"]
//!
//! [resource]
//! atlas = ExtResource("1")
//! region = Rect2(2, 2, 64, 48)
//! ```

use crate::atlas::{AtlasLayout, SpriteRect};
use crate::export::ExportError;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Godot format exporter.
#[derive(Debug)]
pub struct GodotExporter {
    /// Resource directory holding the atlas image
    resource_path: String,
}

impl Default for GodotExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl GodotExporter {
    /// Create a new Godot exporter with default settings.
    pub fn new() -> Self {
        Self { resource_path: "res://".to_string() }
    }

    /// Create a Godot exporter with custom resource path.
    pub fn with_resource_path(mut self, path: &str) -> Self {
        self.resource_path = path.to_string();
        self
    }

    /// Write `<out_dir>/<sprite>.tres` for every sprite in `layout`.
    ///
    /// Returns the written paths in layout order.
    pub fn export_atlas_textures(
        &self,
        layout: &AtlasLayout,
        image_name: &str,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(out_dir)
            .map_err(|source| ExportError::Io { path: out_dir.to_path_buf(), source })?;

        let mut outputs = Vec::with_capacity(layout.len());
        for (name, rect) in layout.iter() {
            let content = self.generate_atlas_texture(image_name, rect);
            let output_path = out_dir.join(format!("{}.tres", name));
            File::create(&output_path)
                .and_then(|mut file| file.write_all(content.as_bytes()))
                .map_err(|source| ExportError::Io { path: output_path.clone(), source })?;
            outputs.push(output_path);
        }

        Ok(outputs)
    }

    /// Generate AtlasTexture resource content.
    fn generate_atlas_texture(&self, image_name: &str, rect: &SpriteRect) -> String {
        let base = self.resource_path.trim_end_matches('/');
        let texture_path = if base.ends_with(':') {
            // "res://" itself: avoid a triple slash
            format!("{}//{}", base, image_name)
        } else {
            format!("{}/{}", base, image_name)
        };

        format!(
            r#"[gd_resource type="AtlasTexture" load_steps=2 format=3]

[ext_resource type="Texture2D" path="{}" id="1"]

[resource]
atlas = ExtResource("1")
region = Rect2({}, {}, {}, {})
"#,
            texture_path, rect.x, rect.y, rect.width, rect.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{pack_strip, SpriteInput};
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn layout_of(sizes: &[(&str, u32, u32)]) -> AtlasLayout {
        let sprites: Vec<SpriteInput> = sizes
            .iter()
            .map(|(name, w, h)| SpriteInput {
                name: name.to_string(),
                image: RgbaImage::from_pixel(*w, *h, Rgba([0, 0, 0, 255])),
            })
            .collect();
        pack_strip(&sprites, 2).unwrap().layout
    }

    #[test]
    fn test_generate_atlas_texture() {
        let exporter = GodotExporter::new().with_resource_path("res://sprites/");
        let rect = SpriteRect { x: 10, y: 20, width: 32, height: 48 };
        let content = exporter.generate_atlas_texture("test.png", &rect);

        assert!(content.starts_with("[gd_resource type=\"AtlasTexture\" load_steps=2 format=3]"));
        assert!(content.contains("[ext_resource type=\"Texture2D\" path=\"res://sprites/test.png\" id=\"1\"]"));
        assert!(content.contains("atlas = ExtResource(\"1\")"));
        assert!(content.contains("region = Rect2(10, 20, 32, 48)"));
    }

    #[test]
    fn test_generate_atlas_texture_at_res_root() {
        let exporter = GodotExporter::new();
        let rect = SpriteRect { x: 0, y: 0, width: 1, height: 1 };
        let content = exporter.generate_atlas_texture("atlas.png", &rect);
        assert!(content.contains("path=\"res://atlas.png\""));
    }

    #[test]
    fn test_export_atlas_textures_creates_files() {
        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("resources/map_chunks");
        let layout = layout_of(&[("chunk_0_0", 16, 16), ("chunk_1_0", 16, 16)]);

        let outputs = GodotExporter::new()
            .with_resource_path("res://resources")
            .export_atlas_textures(&layout, "map_atlas.png", &out_dir)
            .unwrap();

        assert_eq!(outputs, vec![out_dir.join("chunk_0_0.tres"), out_dir.join("chunk_1_0.tres")]);
        let second = fs::read_to_string(&outputs[1]).unwrap();
        assert!(second.contains("path=\"res://resources/map_atlas.png\""));
        assert!(second.contains("region = Rect2(20, 2, 16, 16)"));
    }
}

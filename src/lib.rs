//! gdpipe - asset pipeline utilities for Godot projects
//!
//! This library provides functionality to:
//! - Rewrite `res://` resource paths into `uid://` references using `.uid` sidecars
//! - Point chunk texture references in a scene at pre-built AtlasTexture resources
//! - Pack a list of sprites into a strip atlas with a name -> rectangle lookup

pub mod atlas;
pub mod cli;
pub mod config;
pub mod export;
pub mod output;
pub mod scene;
pub mod uid;

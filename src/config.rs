use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    renderer::bones::DEFAULT_MAX_BONES,
    resource_system::{ImportOptions, DEFAULT_MAX_HIERARCHY_DEPTH},
};

pub const DEFAULT_CONFIG_PATH: &str = "assets/scene.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub movement_speed: f32,
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 30.0, 10.0],
            movement_speed: 2.5,
            sensitivity: 0.1,
        }
    }
}

/// One step of a follower chain, applied in the previous instance's (scaled) space.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FollowerConfig {
    pub offset: [f32; 3],
    /// yaw in degrees, applied after the offset
    pub rotation_y: f32,
}

impl FollowerConfig {
    fn step(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from(self.offset))
            * Mat4::from_rotation_y(self.rotation_y.to_radians())
    }
}

/// One instance of a character in the world, optionally leading a chain of followers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    pub translation: [f32; 3],
    /// yaw in degrees
    pub rotation_y: f32,
    pub scale: f32,
    pub followers: Vec<FollowerConfig>,
}

impl PlacementConfig {
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_y(self.rotation_y.to_radians()),
            Vec3::from(self.translation),
        )
    }

    /// Leader first, then every follower chained onto the one before it.
    pub fn transforms(&self) -> Vec<Mat4> {
        let mut current = self.transform();
        let mut transforms = Vec::with_capacity(self.followers.len() + 1);
        transforms.push(current);
        for follower in &self.followers {
            current *= follower.step();
            transforms.push(current);
        }
        transforms
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation_y: 0.0,
            scale: 1.0,
            followers: vec![],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SwimConfig {
    pub start: [f32; 3],
    pub end: [f32; 3],
    /// seconds for one leg, a full cycle is twice as long
    pub leg_duration: f32,
    pub amplitude: f32,
    pub scale: f32,
    pub heading_offset: f32,
    /// first follower's offset from the leader, in leader space
    pub school_anchor: [f32; 3],
    /// offsets chain: every follower is placed relative to the previous one
    pub school_offsets: Vec<[f32; 3]>,
    pub school_spacing: f32,
}

impl Default for SwimConfig {
    fn default() -> Self {
        Self {
            start: [10.0, -3.0, -40.0],
            end: [-35.0, -3.0, -40.0],
            leg_duration: 10.0,
            amplitude: 10.0,
            scale: 1.2,
            heading_offset: -90.0,
            school_anchor: [1.0, -0.5, 1.0],
            school_offsets: vec![],
            school_spacing: 1.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CharacterConfig {
    pub name: String,
    /// relative paths resolve against the config file's directory
    pub asset: PathBuf,
    /// None = first clip of the asset
    #[serde(default)]
    pub clip: Option<String>,
    #[serde(default)]
    pub placements: Vec<PlacementConfig>,
    #[serde(default)]
    pub swim: Option<SwimConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub frames: u32,
    /// seconds per simulated frame
    pub fixed_delta: f32,
    pub aspect: f32,
    pub max_bones: usize,
    pub max_hierarchy_depth: usize,
    pub camera: CameraConfig,
    pub characters: Vec<CharacterConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            fixed_delta: 1.0 / 60.0,
            aspect: 800.0 / 600.0,
            max_bones: DEFAULT_MAX_BONES,
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
            camera: CameraConfig::default(),
            characters: vec![],
        }
    }
}

impl SceneConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: SceneConfig = serde_json::from_str(&json)?;
        if let Some(dir) = path.parent() {
            for character in &mut config.characters {
                if character.asset.is_relative() {
                    character.asset = dir.join(&character.asset);
                }
            }
        }
        log::info!(
            "loaded config {}: {} characters, {} frames",
            path.display(),
            config.characters.len(),
            config.frames
        );
        Ok(config)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            max_hierarchy_depth: self.max_hierarchy_depth,
        }
    }
}

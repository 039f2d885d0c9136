use serde::{Deserialize, Serialize};

use super::{animationfile::ClipDescription, skeletonfile::NodeDescription};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MeshVertexDescription {
    pub position: [f32; 3],
    #[serde(default)]
    pub normal: [f32; 3],
    #[serde(default)]
    pub tex_coords: [f32; 2],
    /// indices into `MeshDescription::joints`
    #[serde(default)]
    pub joints: [u16; 4],
    #[serde(default)]
    pub weights: [f32; 4],
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MeshDescription {
    pub name: String,
    /// joint palette, by bone name
    pub joints: Vec<String>,
    pub vertices: Vec<MeshVertexDescription>,
    #[serde(default)]
    pub indices: Vec<u32>,
}

/// Everything the animation subsystem needs from one imported asset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelFile {
    pub name: String,
    pub hierarchy: NodeDescription,
    #[serde(default)]
    pub clips: Vec<ClipDescription>,
    #[serde(default)]
    pub meshes: Vec<MeshDescription>,
}

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    #[default]
    Linear,
    /// values are stored as (in-tangent, value, out-tangent) triplets
    CubicSpline,
}

impl From<gltf::animation::Interpolation> for Interpolation {
    fn from(value: gltf::animation::Interpolation) -> Self {
        match value {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelDescription<T> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    #[serde(default)]
    pub interpolation: Interpolation,
}

/// Keys authored for one bone, addressed by bone name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackDescription {
    pub bone: String,
    #[serde(default)]
    pub position: Option<ChannelDescription<[f32; 3]>>,
    /// quaternion as [x, y, z, w]
    #[serde(default)]
    pub rotation: Option<ChannelDescription<[f32; 4]>>,
    #[serde(default)]
    pub scale: Option<ChannelDescription<[f32; 3]>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClipDescription {
    pub name: String,
    /// in ticks, None = last key time
    #[serde(default)]
    pub duration: Option<f32>,
    /// None = 1 tick per second
    #[serde(default)]
    pub ticks_per_second: Option<f32>,
    pub tracks: Vec<TrackDescription>,
}

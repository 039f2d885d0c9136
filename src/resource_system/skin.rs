use super::{file_formats::modelfile::MeshDescription, skeleton::Skeleton};

pub const MAX_BONE_INFLUENCE: usize = 4;

/// Up to four (bone index, weight) influences of one vertex. Weights are stored as given;
/// nothing renormalizes them.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct VertexBoneWeights {
    pub bones: [u32; MAX_BONE_INFLUENCE],
    pub weights: [f32; MAX_BONE_INFLUENCE],
    used: u8,
}

impl VertexBoneWeights {
    /// Fills the next free slot. Influences past the fourth are dropped and `false` is returned.
    pub fn add(&mut self, bone: u32, weight: f32) -> bool {
        let slot = self.used as usize;
        if slot >= MAX_BONE_INFLUENCE {
            return false;
        }
        self.bones[slot] = bone;
        self.weights[slot] = weight;
        self.used += 1;
        true
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub bone_ids: [u32; 4],
    pub weights: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct SkinnedMesh {
    pub name: String,
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
}

impl SkinnedMesh {
    /// Maps the mesh's joint palette onto skeleton bone indices. Influences of joints the
    /// skeleton doesn't know keep slot order but carry zero weight.
    pub fn from_description(description: &MeshDescription, skeleton: &Skeleton) -> Self {
        let palette: Vec<Option<u32>> = description
            .joints
            .iter()
            .map(|name| skeleton.bone_index(name).map(|idx| idx as u32))
            .collect();
        let mut unresolved = 0usize;

        let vertices = description
            .vertices
            .iter()
            .map(|vertex| {
                let mut influences = VertexBoneWeights::default();
                for (joint, weight) in vertex.joints.iter().zip(vertex.weights) {
                    match palette.get(*joint as usize).copied().flatten() {
                        Some(bone) => influences.add(bone, weight),
                        None => {
                            if weight != 0.0 {
                                unresolved += 1;
                            }
                            influences.add(0, 0.0)
                        }
                    };
                }
                SkinnedVertex {
                    position: vertex.position,
                    normal: vertex.normal,
                    tex_coords: vertex.tex_coords,
                    bone_ids: influences.bones,
                    weights: influences.weights,
                }
            })
            .collect();

        if unresolved > 0 {
            log::warn!(
                "mesh {}: {} weighted influences reference joints missing from the skeleton",
                description.name,
                unresolved
            );
        }

        Self {
            name: description.name.clone(),
            vertices,
            indices: description.indices.clone(),
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

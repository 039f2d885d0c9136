use std::cell::Cell;

use glam::Mat4;

use super::program::ShaderProgram;
use crate::resource_system::store::SkinnedModel;

/// Something the host can draw with the currently bound program.
pub trait Drawable {
    fn draw(&self, program: &mut dyn ShaderProgram, model: Mat4);
}

struct MeshBuffers {
    vertices: Vec<u8>,
    index_count: usize,
}

/// CPU-side vertex/index buffers of a skinned model. Sets the `model` uniform and counts draws;
/// stands in for GPU meshes in the headless host.
#[derive(Default)]
pub struct MeshDrawable {
    meshes: Vec<MeshBuffers>,
    draws: Cell<usize>,
    indices_drawn: Cell<usize>,
}

impl MeshDrawable {
    pub fn from_model(model: &SkinnedModel) -> Self {
        let meshes = model
            .meshes
            .iter()
            .map(|mesh| MeshBuffers {
                vertices: mesh.vertex_bytes().to_vec(),
                index_count: mesh.indices.len(),
            })
            .collect::<Vec<_>>();
        log::debug!(
            "{}: {} vertex bytes in {} meshes",
            model.name,
            meshes.iter().map(|m| m.vertices.len()).sum::<usize>(),
            meshes.len()
        );
        Self {
            meshes,
            ..Default::default()
        }
    }

    pub fn vertex_bytes(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn draws(&self) -> usize {
        self.draws.get()
    }

    pub fn indices_drawn(&self) -> usize {
        self.indices_drawn.get()
    }
}

impl Drawable for MeshDrawable {
    fn draw(&self, program: &mut dyn ShaderProgram, model: Mat4) {
        program.set_mat4("model", model);
        self.draws.set(self.draws.get() + 1);
        let indices: usize = self.meshes.iter().map(|m| m.index_count).sum();
        self.indices_drawn.set(self.indices_drawn.get() + indices);
    }
}

use glam::Mat4;

use super::program::{ShaderProgram, UniformValue};
use crate::error::RenderError;

pub const BONE_MATRICES_UNIFORM: &str = "finalBonesMatrices";
/// Array length declared by the skinning vertex shader.
pub const DEFAULT_MAX_BONES: usize = 100;

/// Uploads one frame's bone matrices as a single uniform array. Nothing is written when the
/// skeleton has more bones than the shader declares.
pub fn upload_bone_matrices(
    program: &mut dyn ShaderProgram,
    matrices: &[Mat4],
    capacity: usize,
) -> Result<(), RenderError> {
    if matrices.len() > capacity {
        return Err(RenderError::BoneCapacityExceeded {
            count: matrices.len(),
            capacity,
        });
    }
    program.set_uniform(BONE_MATRICES_UNIFORM, UniformValue::Mat4Array(matrices.to_vec()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::renderer::program::RecordingProgram;

    #[test]
    fn uploads_whole_array() {
        let mut program = RecordingProgram::new("skinned");
        let matrices = vec![Mat4::IDENTITY, Mat4::from_translation(Vec3::Y)];
        upload_bone_matrices(&mut program, &matrices, DEFAULT_MAX_BONES).unwrap();
        assert_eq!(
            program.uniform(BONE_MATRICES_UNIFORM),
            Some(&UniformValue::Mat4Array(matrices))
        );
    }

    #[test]
    fn too_many_bones_writes_nothing() {
        let mut program = RecordingProgram::new("skinned");
        let matrices = vec![Mat4::IDENTITY; 3];
        match upload_bone_matrices(&mut program, &matrices, 2) {
            Err(RenderError::BoneCapacityExceeded { count, capacity }) => {
                assert_eq!((count, capacity), (3, 2))
            }
            other => panic!("expected BoneCapacityExceeded, got {other:?}"),
        }
        assert_eq!(program.writes(), 0);
    }
}

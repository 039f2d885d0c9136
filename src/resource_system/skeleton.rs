use std::collections::HashMap;

use glam::Mat4;

use super::{file_formats::skeletonfile::NodeDescription, ImportOptions};
use crate::error::ImportError;

#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    /// slot in the final matrix array, also the target of vertex bone ids
    pub index: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// bind-pose transform relative to the parent
    pub local_bind: Mat4,
    pub inverse_bind: Mat4,
}

/// Bind-pose bone hierarchy. Bones are stored in depth-first pre-order, so the root is
/// always index 0 and every parent precedes its children.
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<Bone>,
    by_name: HashMap<String, usize>,
    depth: usize,
}

impl Skeleton {
    pub fn from_description(
        root: &NodeDescription,
        options: &ImportOptions,
    ) -> Result<Self, ImportError> {
        let mut bones: Vec<Bone> = vec![];
        let mut by_name = HashMap::<String, usize>::new();
        let mut max_depth = 0usize;

        // (node, parent index, depth, parent global bind transform)
        let mut stack: Vec<(&NodeDescription, Option<usize>, usize, Mat4)> =
            vec![(root, None, 1, Mat4::IDENTITY)];

        while let Some((node, parent, depth, parent_global)) = stack.pop() {
            if depth > options.max_hierarchy_depth {
                return Err(ImportError::HierarchyTooDeep {
                    limit: options.max_hierarchy_depth,
                });
            }
            max_depth = max_depth.max(depth);

            let index = bones.len();
            let local_bind = Mat4::from_cols_array_2d(&node.transform);
            let global_bind = parent_global * local_bind;
            let inverse_bind = match node.inverse_bind {
                Some(ref m) => Mat4::from_cols_array_2d(m),
                None => global_bind.inverse(),
            };

            if let Some(parent_idx) = parent {
                bones[parent_idx].children.push(index);
            }
            by_name.entry(node.name.clone()).or_insert(index);
            bones.push(Bone {
                name: node.name.clone(),
                index,
                parent,
                children: vec![],
                local_bind,
                inverse_bind,
            });

            // reversed so siblings pop in authored order
            for child in node.children.iter().rev() {
                stack.push((child, Some(index), depth + 1, global_bind));
            }
        }

        if by_name.len() < bones.len() {
            log::warn!(
                "skeleton {} has {} duplicate bone names, first occurrence wins",
                root.name,
                bones.len() - by_name.len()
            );
        }

        Ok(Self {
            bones,
            by_name,
            depth: max_depth,
        })
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn root(&self) -> &Bone {
        &self.bones[0]
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Number of levels from the root to the deepest leaf, root included.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;

    fn translation(x: f32, y: f32, z: f32) -> [[f32; 4]; 4] {
        Mat4::from_translation(Vec3::new(x, y, z)).to_cols_array_2d()
    }

    fn rig() -> NodeDescription {
        NodeDescription::new("hips", translation(0.0, 1.0, 0.0))
            .with_child(
                NodeDescription::new("spine", translation(0.0, 0.5, 0.0))
                    .with_child(NodeDescription::new("head", translation(0.0, 0.5, 0.0))),
            )
            .with_child(NodeDescription::new("leg", translation(0.2, -0.5, 0.0)))
    }

    #[test]
    fn indices_follow_preorder_traversal() {
        let skeleton = Skeleton::from_description(&rig(), &ImportOptions::default()).unwrap();
        let names: Vec<_> = skeleton.bones().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["hips", "spine", "head", "leg"]);
        for (idx, bone) in skeleton.bones().iter().enumerate() {
            assert_eq!(bone.index, idx);
        }
        assert_eq!(skeleton.root().parent, None);
        assert_eq!(skeleton.bones()[2].parent, Some(1));
        assert_eq!(skeleton.bones()[3].parent, Some(0));
        assert_eq!(skeleton.root().children, vec![1, 3]);
        assert_eq!(skeleton.depth(), 3);
    }

    #[test]
    fn derived_inverse_bind_undoes_global_bind() {
        let skeleton = Skeleton::from_description(&rig(), &ImportOptions::default()).unwrap();
        let head = &skeleton.bones()[2];
        let global = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
        assert!((global * head.inverse_bind).abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn explicit_inverse_bind_is_kept() {
        let mut root = NodeDescription::new("root", translation(0.0, 0.0, 0.0));
        root.inverse_bind = Some(translation(5.0, 0.0, 0.0));
        let skeleton = Skeleton::from_description(&root, &ImportOptions::default()).unwrap();
        assert_eq!(
            skeleton.root().inverse_bind,
            Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))
        );
    }

    #[test]
    fn duplicate_names_resolve_to_first_bone() {
        let root = NodeDescription::new("root", Mat4::IDENTITY.to_cols_array_2d())
            .with_child(NodeDescription::new("arm", translation(1.0, 0.0, 0.0)))
            .with_child(NodeDescription::new("arm", translation(-1.0, 0.0, 0.0)));
        let skeleton = Skeleton::from_description(&root, &ImportOptions::default()).unwrap();
        assert_eq!(skeleton.bone_count(), 3);
        assert_eq!(skeleton.bone_index("arm"), Some(1));
    }

    #[test]
    fn rejects_hierarchy_deeper_than_limit() {
        let mut node = NodeDescription::new("leaf", Mat4::IDENTITY.to_cols_array_2d());
        for i in 0..9 {
            node = NodeDescription::new(format!("n{i}"), Mat4::IDENTITY.to_cols_array_2d())
                .with_child(node);
        }
        let options = ImportOptions {
            max_hierarchy_depth: 5,
        };
        match Skeleton::from_description(&node, &options) {
            Err(ImportError::HierarchyTooDeep { limit }) => assert_eq!(limit, 5),
            other => panic!("expected HierarchyTooDeep, got {other:?}"),
        }
        let options = ImportOptions {
            max_hierarchy_depth: 10,
        };
        assert_eq!(Skeleton::from_description(&node, &options).unwrap().depth(), 10);
    }
}

use std::path::Path;

use generational_arena::{Arena, Index};

use super::{
    animation::AnimationClip,
    file_formats::{animationfile::ClipDescription, modelfile::ModelFile},
    read_model_file,
    skeleton::Skeleton,
    skin::SkinnedMesh,
    ImportOptions,
};
use crate::error::ImportError;

#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub struct SkeletonId(pub(crate) Index);

#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub struct ClipId(pub(crate) Index);

#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub struct ModelId(pub(crate) Index);

pub struct SkinnedModel {
    pub name: String,
    pub skeleton: SkeletonId,
    pub clips: Vec<ClipId>,
    pub meshes: Vec<SkinnedMesh>,
}

impl SkinnedModel {
    pub fn clip_by_name(&self, store: &AssetStore, name: &str) -> Option<ClipId> {
        self.clips
            .iter()
            .copied()
            .find(|id| store.clip(*id).is_some_and(|clip| clip.name == name))
    }
}

/// Owns every imported skeleton, clip and model. Handles are generational, so a handle to a
/// removed asset resolves to None instead of aliasing whatever reuses the slot.
#[derive(Default)]
pub struct AssetStore {
    skeletons: Arena<Skeleton>,
    clips: Arena<AnimationClip>,
    models: Arena<SkinnedModel>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports the skeleton, clips and skinned meshes of an asset file.
    pub fn load_from_asset(
        &mut self,
        path: impl AsRef<Path>,
        options: &ImportOptions,
    ) -> Result<ModelId, ImportError> {
        let file = read_model_file(path.as_ref(), options)?;
        self.insert_model_file(&file, options)
    }

    /// Imports only the clips of an asset file and binds them to an already loaded skeleton.
    pub fn load_clips(
        &mut self,
        path: impl AsRef<Path>,
        skeleton: SkeletonId,
        options: &ImportOptions,
    ) -> Result<Vec<ClipId>, ImportError> {
        let file = read_model_file(path.as_ref(), options)?;
        self.insert_clips(&file.clips, skeleton)
    }

    pub fn insert_model_file(
        &mut self,
        file: &ModelFile,
        options: &ImportOptions,
    ) -> Result<ModelId, ImportError> {
        let skeleton = Skeleton::from_description(&file.hierarchy, options)?;
        let meshes: Vec<SkinnedMesh> = file
            .meshes
            .iter()
            .map(|mesh| SkinnedMesh::from_description(mesh, &skeleton))
            .collect();
        let (bone_count, depth) = (skeleton.bone_count(), skeleton.depth());
        let skeleton_id = SkeletonId(self.skeletons.insert(skeleton));

        let clips = match self.insert_clips(&file.clips, skeleton_id) {
            Ok(clips) => clips,
            Err(e) => {
                self.skeletons.remove(skeleton_id.0);
                return Err(e);
            }
        };
        log::info!(
            "loaded model {}: {} bones (depth {}), {} clips, {} meshes",
            file.name,
            bone_count,
            depth,
            clips.len(),
            meshes.len()
        );

        Ok(ModelId(self.models.insert(SkinnedModel {
            name: file.name.clone(),
            skeleton: skeleton_id,
            clips,
            meshes,
        })))
    }

    /// All or nothing: on error no clip of the batch stays in the store.
    pub fn insert_clips(
        &mut self,
        descriptions: &[ClipDescription],
        skeleton_id: SkeletonId,
    ) -> Result<Vec<ClipId>, ImportError> {
        let skeleton = self
            .skeletons
            .get(skeleton_id.0)
            .ok_or(ImportError::UnknownSkeleton)?;
        let clips = descriptions
            .iter()
            .map(|description| AnimationClip::from_description(description, skeleton_id, skeleton))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clips
            .into_iter()
            .map(|clip| ClipId(self.clips.insert(clip)))
            .collect())
    }

    /// Drops a model together with its skeleton and every clip bound to that skeleton.
    pub fn remove_model(&mut self, id: ModelId) -> Option<SkinnedModel> {
        let model = self.models.remove(id.0)?;
        self.skeletons.remove(model.skeleton.0);
        let skeleton = model.skeleton;
        self.clips.retain(|_, clip| clip.skeleton != skeleton);
        Some(model)
    }

    pub fn skeleton(&self, id: SkeletonId) -> Option<&Skeleton> {
        self.skeletons.get(id.0)
    }

    pub fn clip(&self, id: ClipId) -> Option<&AnimationClip> {
        self.clips.get(id.0)
    }

    pub fn model(&self, id: ModelId) -> Option<&SkinnedModel> {
        self.models.get(id.0)
    }

    pub fn model_by_name(&self, name: &str) -> Option<ModelId> {
        self.models
            .iter()
            .find(|(_, model)| model.name == name)
            .map(|(idx, _)| ModelId(idx))
    }

    /// Resolves a clip together with the skeleton it animates.
    pub fn clip_with_skeleton(&self, id: ClipId) -> Option<(&AnimationClip, &Skeleton)> {
        let clip = self.clip(id)?;
        let skeleton = self.skeleton(clip.skeleton)?;
        Some((clip, skeleton))
    }
}

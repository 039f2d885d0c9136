use std::{
    collections::HashMap,
    path::PathBuf,
    rc::Rc,
};

use glam::{Mat4, Vec3};

use crate::{
    config::{CharacterConfig, PlacementConfig, SceneConfig, SwimConfig},
    error::{ImportError, SceneError},
    renderer::{bones::upload_bone_matrices, drawable::Drawable, program::ShaderProgram},
    resource_system::{
        store::{AssetStore, ModelId, SkinnedModel},
        ImportOptions,
    },
    sim::{animator::Animator, frame::FrameContext, pose, swim_path::SwimPath},
};

/// A leader on a swim path followed by a chain of offset followers.
#[derive(Debug, Clone)]
pub struct School {
    pub path: SwimPath,
    pub anchor: Vec3,
    pub offsets: Vec<Vec3>,
}

impl School {
    fn from_config(config: &SwimConfig) -> Self {
        Self {
            path: SwimPath {
                start: config.start.into(),
                end: config.end.into(),
                leg_duration: config.leg_duration,
                amplitude: config.amplitude,
                scale: config.scale,
                heading_offset: config.heading_offset,
            },
            anchor: config.school_anchor.into(),
            offsets: config
                .school_offsets
                .iter()
                .map(|offset| Vec3::from(*offset) * config.school_spacing)
                .collect(),
        }
    }

    /// Leader first, then every follower.
    pub fn transforms(&self, seconds: f32) -> Vec<Mat4> {
        let leader = self.path.transform_at(seconds);
        let mut transforms = Vec::with_capacity(self.offsets.len() + 1);
        transforms.push(leader);
        let mut follower = leader * Mat4::from_translation(self.anchor);
        for offset in &self.offsets {
            follower *= Mat4::from_translation(*offset);
            transforms.push(follower);
        }
        transforms
    }
}

pub struct Character {
    pub name: String,
    pub animator: Animator,
    /// skinning matrices of the model's rest pose, drawn while no clip plays
    pub bind_pose: Vec<Mat4>,
    pub placements: Vec<Mat4>,
    pub school: Option<School>,
    drawable: Rc<dyn Drawable>,
}

impl Character {
    pub fn bone_matrices(&self) -> &[Mat4] {
        if self.animator.is_playing() {
            self.animator.final_bone_matrices()
        } else {
            &self.bind_pose
        }
    }

    pub fn model_transforms(&self, frame: &FrameContext) -> Vec<Mat4> {
        let mut transforms = self.placements.clone();
        if let Some(school) = &self.school {
            transforms.extend(school.transforms(frame.time_since_start));
        }
        transforms
    }
}

/// Imports every asset the config references, once per distinct path. Keyed by character name.
pub fn load_assets(
    config: &SceneConfig,
    store: &mut AssetStore,
    options: &ImportOptions,
) -> Result<HashMap<String, ModelId>, ImportError> {
    let mut by_path = HashMap::<PathBuf, ModelId>::new();
    let mut models = HashMap::new();
    for character in &config.characters {
        let id = match by_path.get(&character.asset) {
            Some(id) => *id,
            None => {
                let id = store.load_from_asset(&character.asset, options)?;
                by_path.insert(character.asset.clone(), id);
                id
            }
        };
        models.insert(character.name.clone(), id);
    }
    Ok(models)
}

#[derive(Default)]
pub struct Scene {
    pub characters: Vec<Character>,
}

impl Scene {
    pub fn from_config(
        config: &SceneConfig,
        store: &AssetStore,
        models: &HashMap<String, ModelId>,
        mut make_drawable: impl FnMut(&CharacterConfig, &SkinnedModel) -> Rc<dyn Drawable>,
    ) -> Result<Self, SceneError> {
        let mut characters = vec![];
        for character in &config.characters {
            let unknown_model = || SceneError::UnknownModel(character.name.clone());
            let model_id = *models.get(&character.name).ok_or_else(unknown_model)?;
            let model = store.model(model_id).ok_or_else(unknown_model)?;
            let skeleton = store.skeleton(model.skeleton).ok_or_else(unknown_model)?;
            let mut globals = vec![];
            let mut bind_pose = vec![];
            pose::compute_pose(skeleton, None, 0.0, &mut globals, &mut bind_pose);

            let clip = match &character.clip {
                Some(name) => Some(model.clip_by_name(store, name).ok_or_else(|| {
                    SceneError::UnknownClip {
                        model: model.name.clone(),
                        clip: name.clone(),
                    }
                })?),
                None => model.clips.first().copied(),
            };
            let animator = match clip {
                Some(clip) => Animator::new(store, clip),
                None => {
                    log::warn!("{} has no animation clips, drawing in bind pose", character.name);
                    Animator::default()
                }
            };

            characters.push(Character {
                name: character.name.clone(),
                animator,
                bind_pose,
                placements: character
                    .placements
                    .iter()
                    .flat_map(PlacementConfig::transforms)
                    .collect(),
                school: character.swim.as_ref().map(School::from_config),
                drawable: make_drawable(character, model),
            });
        }
        log::info!("scene built with {} characters", characters.len());
        Ok(Self { characters })
    }

    /// Advances every animator once. Must run before `draw` in the same frame.
    pub fn update(&mut self, frame: &FrameContext, store: &AssetStore) {
        for character in &mut self.characters {
            character.animator.update_animation(store, frame.delta_time);
        }
        log::debug!(
            "frame {}: updated {} animators",
            frame.frame_index,
            self.characters.len()
        );
    }

    /// Uploads camera and bone state, then draws every instance. Returns the number of draws.
    pub fn draw(
        &self,
        frame: &FrameContext,
        program: &mut dyn ShaderProgram,
        max_bones: usize,
    ) -> Result<usize, SceneError> {
        program.bind();
        program.set_mat4("projection", frame.projection);
        program.set_mat4("view", frame.view);
        program.set_vec3("viewPos", frame.view_position);

        let mut draws = 0;
        for character in &self.characters {
            upload_bone_matrices(program, character.bone_matrices(), max_bones)?;
            for model in character.model_transforms(frame) {
                character.drawable.draw(program, model);
                draws += 1;
            }
        }
        Ok(draws)
    }
}

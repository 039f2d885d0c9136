use glam::Mat4;

use crate::resource_system::store::{AssetStore, ClipId};

use super::pose;

/// Durations at or below this are treated as a single frozen frame.
const MIN_CLIP_DURATION: f32 = 1e-6;

/// Per-character playback cursor. Loops its clip forever; the only states are "playing"
/// (a clip is bound) and "uninitialized" (no clip).
#[derive(Debug, Default, Clone)]
pub struct Animator {
    clip: Option<ClipId>,
    /// clip-local ticks, always in [0, duration)
    current_time: f32,
    globals: Vec<Mat4>,
    final_bone_matrices: Vec<Mat4>,
}

impl Animator {
    pub fn new(store: &AssetStore, clip: ClipId) -> Self {
        let mut animator = Self::default();
        animator.play_animation(store, clip);
        animator
    }

    /// Binds `clip`, rewinds to time zero and evaluates the first pose.
    pub fn play_animation(&mut self, store: &AssetStore, clip: ClipId) {
        self.clip = Some(clip);
        self.current_time = 0.0;
        self.recompute(store);
    }

    pub fn update_animation(&mut self, store: &AssetStore, dt: f32) {
        let Some(clip_id) = self.clip else {
            return;
        };
        let Some(clip) = store.clip(clip_id) else {
            log::warn!("animator clip {:?} is no longer loaded, unbinding", clip_id);
            self.unbind();
            return;
        };

        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            log::warn!("ignoring invalid frame delta {}", dt);
            0.0
        };

        if clip.duration <= MIN_CLIP_DURATION {
            self.current_time = 0.0;
        } else {
            self.current_time += dt * clip.ticks_per_second;
            self.current_time = self.current_time.rem_euclid(clip.duration);
            // rem_euclid can round up to the divisor itself
            if self.current_time >= clip.duration {
                self.current_time = 0.0;
            }
        }
        self.recompute(store);
    }

    /// One matrix per bone, indexed by bone index. Overwritten by the next update.
    pub fn final_bone_matrices(&self) -> &[Mat4] {
        &self.final_bone_matrices
    }

    /// Model-space bone transforms of the current pose, without the inverse bind.
    pub fn global_transforms(&self) -> &[Mat4] {
        &self.globals
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn clip(&self) -> Option<ClipId> {
        self.clip
    }

    pub fn is_playing(&self) -> bool {
        self.clip.is_some()
    }

    fn unbind(&mut self) {
        self.clip = None;
        self.current_time = 0.0;
        self.globals.clear();
        self.final_bone_matrices.clear();
    }

    fn recompute(&mut self, store: &AssetStore) {
        let Some(clip_id) = self.clip else {
            return;
        };
        match store.clip_with_skeleton(clip_id) {
            Some((clip, skeleton)) => pose::compute_pose(
                skeleton,
                Some(clip),
                self.current_time,
                &mut self.globals,
                &mut self.final_bone_matrices,
            ),
            None => {
                log::warn!("animator clip {:?} has no loaded skeleton, unbinding", clip_id);
                self.unbind();
            }
        }
    }
}

// Runtime animation format

use glam::{Quat, Vec3};

use super::{
    file_formats::animationfile::{ChannelDescription, ClipDescription, Interpolation, TrackDescription},
    skeleton::Skeleton,
    store::SkeletonId,
};
use crate::error::ImportError;

#[derive(Debug, Clone)]
pub struct Keyframes<T> {
    times: Box<[f32]>,
    values: Box<[T]>,
    interpolation: Interpolation,
}

impl<T> Keyframes<T> {
    /// Returns None for a channel without keys.
    fn from_description<S: Copy>(
        bone: &str,
        channel: &'static str,
        description: &ChannelDescription<S>,
        convert: impl Fn(S) -> T,
    ) -> Result<Option<Self>, ImportError> {
        let times = description.times.len();
        let values = description.values.len();
        let expected = match description.interpolation {
            Interpolation::CubicSpline => times * 3,
            _ => times,
        };
        if values != expected {
            return Err(ImportError::MalformedChannel {
                bone: bone.to_string(),
                channel,
                times,
                values,
            });
        }
        if times == 0 {
            return Ok(None);
        }
        Ok(Some(Self {
            times: description.times.clone().into_boxed_slice(),
            values: description.values.iter().map(|v| convert(*v)).collect(),
            interpolation: description.interpolation,
        }))
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn last_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct BoneTrack {
    pub bone: usize,
    pub position: Option<Keyframes<Vec3>>,
    pub rotation: Option<Keyframes<Quat>>,
    pub scale: Option<Keyframes<Vec3>>,
}

impl BoneTrack {
    fn from_description(bone: usize, description: &TrackDescription) -> Result<Self, ImportError> {
        let name = description.bone.as_str();
        let position = match description.position {
            Some(ref channel) => Keyframes::from_description(name, "position", channel, Vec3::from_array)?,
            None => None,
        };
        let rotation = match description.rotation {
            Some(ref channel) => {
                // cubic spline tangents must keep their magnitude
                let normalize = channel.interpolation != Interpolation::CubicSpline;
                Keyframes::from_description(name, "rotation", channel, |v| {
                    let q = Quat::from_array(v);
                    if normalize && q.length_squared() > 0.0 {
                        q.normalize()
                    } else {
                        q
                    }
                })?
            }
            None => None,
        };
        let scale = match description.scale {
            Some(ref channel) => Keyframes::from_description(name, "scale", channel, Vec3::from_array)?,
            None => None,
        };
        Ok(Self {
            bone,
            position,
            rotation,
            scale,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }

    fn last_time(&self) -> f32 {
        let p = self.position.as_ref().map(Keyframes::last_time).unwrap_or(0.0);
        let r = self.rotation.as_ref().map(Keyframes::last_time).unwrap_or(0.0);
        let s = self.scale.as_ref().map(Keyframes::last_time).unwrap_or(0.0);
        p.max(r).max(s)
    }
}

/// Keyframed tracks for the bones of one skeleton. Immutable after import.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// clip-local ticks
    pub duration: f32,
    pub ticks_per_second: f32,
    pub skeleton: SkeletonId,
    bone_count: usize,
    tracks: Vec<BoneTrack>,
    /// track_for_bone[bone index] => index into tracks
    track_for_bone: Vec<Option<usize>>,
}

impl AnimationClip {
    pub fn from_description(
        description: &ClipDescription,
        skeleton_id: SkeletonId,
        skeleton: &Skeleton,
    ) -> Result<Self, ImportError> {
        let mut tracks: Vec<BoneTrack> = vec![];
        let mut track_for_bone: Vec<Option<usize>> = vec![None; skeleton.bone_count()];

        for track_description in &description.tracks {
            let Some(bone) = skeleton.bone_index(&track_description.bone) else {
                log::warn!(
                    "clip {}: bone {} is not part of the skeleton, track ignored",
                    description.name,
                    track_description.bone
                );
                continue;
            };
            if track_for_bone[bone].is_some() {
                log::warn!(
                    "clip {}: bone {} has more than one track, keeping the first",
                    description.name,
                    track_description.bone
                );
                continue;
            }
            let track = BoneTrack::from_description(bone, track_description)?;
            if track.is_empty() {
                continue;
            }
            track_for_bone[bone] = Some(tracks.len());
            tracks.push(track);
        }

        let duration = match description.duration {
            Some(d) if d.is_finite() && d >= 0.0 => d,
            _ => tracks.iter().map(BoneTrack::last_time).fold(0.0f32, f32::max),
        };
        let ticks_per_second = match description.ticks_per_second {
            None => 1.0,
            Some(tps) if tps.is_finite() && tps > 0.0 => tps,
            Some(tps) => {
                log::warn!(
                    "clip {}: invalid ticks per second {}, using 1.0",
                    description.name,
                    tps
                );
                1.0
            }
        };

        Ok(Self {
            name: description.name.clone(),
            duration,
            ticks_per_second,
            skeleton: skeleton_id,
            bone_count: skeleton.bone_count(),
            tracks,
            track_for_bone,
        })
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }

    pub fn track(&self, bone: usize) -> Option<&BoneTrack> {
        self.track_for_bone
            .get(bone)
            .copied()
            .flatten()
            .map(|idx| &self.tracks[idx])
    }
}

#[cfg(test)]
mod tests {
    use generational_arena::Arena;
    use glam::Mat4;

    use super::*;
    use crate::resource_system::{file_formats::skeletonfile::NodeDescription, ImportOptions};

    fn skeleton() -> (SkeletonId, Skeleton) {
        let root = NodeDescription::new("root", Mat4::IDENTITY.to_cols_array_2d())
            .with_child(NodeDescription::new("tail", Mat4::IDENTITY.to_cols_array_2d()));
        let skeleton = Skeleton::from_description(&root, &ImportOptions::default()).unwrap();
        let mut arena = Arena::new();
        (SkeletonId(arena.insert(())), skeleton)
    }

    fn linear<T>(times: Vec<f32>, values: Vec<T>) -> ChannelDescription<T> {
        ChannelDescription {
            times,
            values,
            interpolation: Interpolation::Linear,
        }
    }

    fn track(bone: &str) -> TrackDescription {
        TrackDescription {
            bone: bone.to_string(),
            position: None,
            rotation: None,
            scale: None,
        }
    }

    #[test]
    fn duration_defaults_to_last_key() {
        let (id, skeleton) = skeleton();
        let mut tail = track("tail");
        tail.position = Some(linear(vec![0.0, 4.0], vec![[0.0; 3], [1.0, 0.0, 0.0]]));
        tail.scale = Some(linear(vec![0.0, 2.5, 7.5], vec![[1.0; 3]; 3]));
        let description = ClipDescription {
            name: "swim".into(),
            duration: None,
            ticks_per_second: None,
            tracks: vec![tail],
        };
        let clip = AnimationClip::from_description(&description, id, &skeleton).unwrap();
        assert_eq!(clip.duration, 7.5);
        assert_eq!(clip.ticks_per_second, 1.0);
        assert!(clip.track(0).is_none());
        assert_eq!(clip.track(1).map(|t| t.bone), Some(1));
    }

    #[test]
    fn unknown_bones_and_empty_tracks_are_skipped() {
        let (id, skeleton) = skeleton();
        let mut ghost = track("fin");
        ghost.position = Some(linear(vec![0.0], vec![[1.0; 3]]));
        let mut empty = track("root");
        empty.rotation = Some(linear(vec![], vec![]));
        let description = ClipDescription {
            name: "partial".into(),
            duration: Some(3.0),
            ticks_per_second: Some(24.0),
            tracks: vec![ghost, empty],
        };
        let clip = AnimationClip::from_description(&description, id, &skeleton).unwrap();
        assert!(clip.tracks().is_empty());
        assert_eq!(clip.bone_count(), 2);
        assert_eq!(clip.duration, 3.0);
        assert_eq!(clip.ticks_per_second, 24.0);
    }

    #[test]
    fn first_track_for_a_bone_drives_it() {
        let (id, skeleton) = skeleton();
        let mut first = track("tail");
        first.position = Some(linear(vec![0.0, 4.0], vec![[0.0; 3], [1.0, 0.0, 0.0]]));
        let mut second = track("tail");
        second.position = Some(linear(vec![0.0, 10.0], vec![[0.0; 3], [9.0, 0.0, 0.0]]));
        second.rotation = Some(linear(vec![0.0], vec![[0.0, 1.0, 0.0, 0.0]]));
        let description = ClipDescription {
            name: "drag".into(),
            duration: None,
            ticks_per_second: None,
            tracks: vec![first, second],
        };
        let clip = AnimationClip::from_description(&description, id, &skeleton).unwrap();
        assert_eq!(clip.tracks().len(), 1);
        // the later track's keys take no part in the clip
        assert_eq!(clip.duration, 4.0);
        let tail = clip.track(1).unwrap();
        assert!(tail.rotation.is_none());

        let local = crate::sim::pose::local_transform(&skeleton, Some(&clip), 1, 4.0);
        assert!(local.abs_diff_eq(Mat4::from_translation(glam::Vec3::X), 1e-6));
    }

    #[test]
    fn mismatched_key_counts_fail_import() {
        let (id, skeleton) = skeleton();
        let mut root = track("root");
        root.rotation = Some(ChannelDescription {
            times: vec![0.0, 1.0],
            values: vec![[0.0, 0.0, 0.0, 1.0]; 2],
            interpolation: Interpolation::CubicSpline,
        });
        let description = ClipDescription {
            name: "broken".into(),
            duration: None,
            ticks_per_second: None,
            tracks: vec![root],
        };
        match AnimationClip::from_description(&description, id, &skeleton) {
            Err(ImportError::MalformedChannel { channel, times, values, .. }) => {
                assert_eq!(channel, "rotation");
                assert_eq!((times, values), (2, 2));
            }
            other => panic!("expected MalformedChannel, got {other:?}"),
        }
    }

    #[test]
    fn invalid_tick_rate_falls_back_to_one() {
        let (id, skeleton) = skeleton();
        let description = ClipDescription {
            name: "idle".into(),
            duration: Some(1.0),
            ticks_per_second: Some(0.0),
            tracks: vec![],
        };
        let clip = AnimationClip::from_description(&description, id, &skeleton).unwrap();
        assert_eq!(clip.ticks_per_second, 1.0);
    }

    #[test]
    fn rotation_keys_are_normalized() {
        let (id, skeleton) = skeleton();
        let mut root = track("root");
        root.rotation = Some(linear(vec![0.0], vec![[0.0, 0.0, 0.0, 2.0]]));
        let description = ClipDescription {
            name: "hold".into(),
            duration: None,
            ticks_per_second: None,
            tracks: vec![root],
        };
        let clip = AnimationClip::from_description(&description, id, &skeleton).unwrap();
        let rotation = clip.track(0).and_then(|t| t.rotation.as_ref()).unwrap();
        assert_eq!(rotation.values()[0], Quat::IDENTITY);
    }
}

use std::cmp::Ordering;

use glam::{Mat4, Quat, Vec3};

use crate::resource_system::{
    animation::{AnimationClip, BoneTrack, Keyframes},
    file_formats::animationfile::Interpolation,
    skeleton::{Bone, Skeleton},
};

/// Indices of the keys bracketing `val`. Equal indices mean no blend.
fn bin_search_anim_indices(times: &[f32], val: f32) -> (usize, usize) {
    let n = times.len();
    if n <= 1 {
        return (0, 0);
    }

    match times.binary_search_by(|x| x.partial_cmp(&val).unwrap_or(Ordering::Greater)) {
        Ok(i) => (i, i),                    // exact hit, no blend
        Err(0) => (0, 0),                   // before first, clamp
        Err(i) if i >= n => (n - 1, n - 1), // after last, clamp
        Err(i) => (i - 1, i),               // between i-1 and i
    }
}

/// (left key, right key, normalized factor, key spacing)
fn compute_keyframe_indices(times: &[f32], t: f32) -> (usize, usize, f32, f32) {
    let (i0, i1) = bin_search_anim_indices(times, t);
    let (t0, t1) = (times[i0], times[i1]);
    let dt = t1 - t0;
    let alpha = if i0 == i1 || dt.abs() < f32::EPSILON {
        0.0
    } else {
        (t - t0) / dt
    };
    (i0, i1, alpha, dt)
}

/// glTF cubic spline: values are (in-tangent, value, out-tangent) per key.
fn hermite<T>(values: &[T], i0: usize, i1: usize, s: f32, dt: f32) -> T
where
    T: Copy + std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
{
    let v0 = values[i0 * 3 + 1];
    let b0 = values[i0 * 3 + 2];
    let a1 = values[i1 * 3];
    let v1 = values[i1 * 3 + 1];
    let s2 = s * s;
    let s3 = s2 * s;
    v0 * (2.0 * s3 - 3.0 * s2 + 1.0)
        + b0 * ((s3 - 2.0 * s2 + s) * dt)
        + v1 * (-2.0 * s3 + 3.0 * s2)
        + a1 * ((s3 - s2) * dt)
}

pub fn sample_vec3(channel: &Keyframes<Vec3>, t: f32) -> Vec3 {
    let values = channel.values();
    let (i0, i1, alpha, dt) = compute_keyframe_indices(channel.times(), t);
    match channel.interpolation() {
        Interpolation::Linear => values[i0].lerp(values[i1], alpha),
        Interpolation::Step => values[i0],
        Interpolation::CubicSpline => hermite(values, i0, i1, alpha, dt),
    }
}

pub fn sample_quat(channel: &Keyframes<Quat>, t: f32) -> Quat {
    let values = channel.values();
    let (i0, i1, alpha, dt) = compute_keyframe_indices(channel.times(), t);
    match channel.interpolation() {
        // glam's slerp takes the shortest arc
        Interpolation::Linear => values[i0].slerp(values[i1], alpha).normalize(),
        Interpolation::Step => values[i0],
        Interpolation::CubicSpline => hermite(values, i0, i1, alpha, dt).normalize(),
    }
}

/// Local transform of a keyed bone at clip time `t`. Channels without keys keep the bind-pose
/// component.
fn animated_local(bone: &Bone, track: &BoneTrack, t: f32) -> Mat4 {
    let (base_scale, base_rotation, base_translation) = bone.local_bind.to_scale_rotation_translation();
    let translation = track
        .position
        .as_ref()
        .map_or(base_translation, |channel| sample_vec3(channel, t));
    let rotation = track
        .rotation
        .as_ref()
        .map_or(base_rotation, |channel| sample_quat(channel, t));
    let scale = track
        .scale
        .as_ref()
        .map_or(base_scale, |channel| sample_vec3(channel, t));
    // T * R * S
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

pub fn local_transform(skeleton: &Skeleton, clip: Option<&AnimationClip>, bone: usize, t: f32) -> Mat4 {
    let Some(bone) = skeleton.bone(bone) else {
        return Mat4::IDENTITY;
    };
    match clip.and_then(|clip| clip.track(bone.index)) {
        Some(track) => animated_local(bone, track, t),
        None => bone.local_bind,
    }
}

/// Evaluates the pose at clip time `t`. Both buffers are resized to the bone count;
/// `final_matrices[i] = global[i] * inverse_bind[i]`.
pub fn compute_pose(
    skeleton: &Skeleton,
    clip: Option<&AnimationClip>,
    t: f32,
    globals: &mut Vec<Mat4>,
    final_matrices: &mut Vec<Mat4>,
) {
    let bone_count = skeleton.bone_count();
    globals.clear();
    globals.resize(bone_count, Mat4::IDENTITY);
    final_matrices.clear();
    final_matrices.resize(bone_count, Mat4::IDENTITY);
    if bone_count == 0 {
        return;
    }

    // depth is bounded at import, so the stack never exceeds the bone count
    let mut stack: Vec<(usize, Mat4)> = vec![(skeleton.root().index, Mat4::IDENTITY)];
    while let Some((idx, parent_global)) = stack.pop() {
        let bone = &skeleton.bones()[idx];
        let global = parent_global * local_transform(skeleton, clip, idx, t);
        globals[idx] = global;
        final_matrices[idx] = global * bone.inverse_bind;

        for child in &bone.children {
            stack.push((*child, global));
        }
    }
}

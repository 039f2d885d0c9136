use std::f32::consts::{FRAC_PI_2, PI};
use std::path::PathBuf;

use glam::{Mat4, Quat, Vec3};
use post_apocalypse::{
    error::ImportError,
    resource_system::{
        file_formats::{
            animationfile::{ChannelDescription, ClipDescription, Interpolation, TrackDescription},
            modelfile::ModelFile,
            skeletonfile::NodeDescription,
        },
        store::{AssetStore, ClipId},
        ImportOptions,
    },
    sim::animator::Animator,
};

fn linear<T>(times: Vec<f32>, values: Vec<T>) -> Option<ChannelDescription<T>> {
    Some(ChannelDescription {
        times,
        values,
        interpolation: Interpolation::Linear,
    })
}

/// root -> arm -> hand, with a static tail hanging off the root.
fn lighthouse_keeper() -> ModelFile {
    let offset = |x: f32| Mat4::from_translation(Vec3::new(x, 0.0, 0.0)).to_cols_array_2d();
    ModelFile {
        name: "keeper".into(),
        hierarchy: NodeDescription::new("root", Mat4::IDENTITY.to_cols_array_2d())
            .with_child(
                NodeDescription::new("arm", offset(1.0))
                    .with_child(NodeDescription::new("hand", offset(0.5))),
            )
            .with_child(NodeDescription::new("tail", offset(-1.0))),
        clips: vec![
            ClipDescription {
                name: "turn".into(),
                duration: Some(10.0),
                ticks_per_second: Some(1.0),
                tracks: vec![TrackDescription {
                    bone: "root".into(),
                    position: None,
                    rotation: linear(
                        vec![0.0, 10.0],
                        vec![Quat::IDENTITY.to_array(), Quat::from_rotation_y(PI).to_array()],
                    ),
                    scale: None,
                }],
            },
            ClipDescription {
                name: "wave".into(),
                duration: None,
                ticks_per_second: Some(25.0),
                tracks: vec![
                    TrackDescription {
                        bone: "arm".into(),
                        position: linear(vec![0.0, 12.0, 24.0], vec![[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]]),
                        rotation: linear(
                            vec![0.0, 24.0],
                            vec![Quat::IDENTITY.to_array(), Quat::from_rotation_z(FRAC_PI_2).to_array()],
                        ),
                        scale: linear(vec![6.0, 18.0], vec![[1.0; 3], [2.0; 3]]),
                    },
                    TrackDescription {
                        bone: "ghost".into(),
                        position: linear(vec![0.0], vec![[9.0; 3]]),
                        rotation: None,
                        scale: None,
                    },
                ],
            },
        ],
        meshes: vec![],
    }
}

fn write_asset(dir: &tempfile::TempDir, name: &str, file: &ModelFile) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string(file).unwrap()).unwrap();
    path
}

fn load(clip: &str) -> (AssetStore, ClipId) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_asset(&dir, "keeper.json", &lighthouse_keeper());
    let mut store = AssetStore::new();
    let model = store.load_from_asset(&path, &ImportOptions::default()).unwrap();
    let clip = store.model(model).unwrap().clip_by_name(&store, clip).unwrap();
    (store, clip)
}

fn assert_pose_eq(a: &[Mat4], b: &[Mat4]) {
    assert_eq!(a.len(), b.len());
    for (m, n) in a.iter().zip(b) {
        assert!(m.abs_diff_eq(*n, 1e-4), "{m:?} != {n:?}");
    }
}

#[test]
fn full_cycle_in_two_steps_returns_to_rest() {
    let (store, clip) = load("turn");
    let mut animator = Animator::new(&store, clip);
    animator.update_animation(&store, 5.0);
    animator.update_animation(&store, 5.0);
    assert_eq!(animator.current_time(), 0.0);
    for m in animator.final_bone_matrices() {
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}

#[test]
fn same_deltas_give_bit_identical_poses() {
    let (store, clip) = load("wave");
    let deltas = [0.016, 0.033, 0.2, 0.0, 0.5, 1.7];
    let run = || {
        let mut animator = Animator::new(&store, clip);
        deltas
            .iter()
            .map(|dt| {
                animator.update_animation(&store, *dt);
                animator.final_bone_matrices().to_vec()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn advancing_one_duration_closes_the_loop() {
    let (store, clip) = load("wave");
    let duration = store.clip(clip).unwrap().duration;
    assert_eq!(duration, 24.0);

    let mut animator = Animator::new(&store, clip);
    animator.update_animation(&store, 0.3);
    let before = animator.final_bone_matrices().to_vec();
    // 24 ticks at 25 ticks per second
    animator.update_animation(&store, 0.96);
    assert_pose_eq(&before, animator.final_bone_matrices());
}

#[test]
fn first_and_last_keys_bound_the_pose() {
    let (store, clip) = load("wave");
    let animator = Animator::new(&store, clip);
    // scale keys start at 6: before them the first key is held
    let arm = animator.global_transforms()[1];
    assert!(arm.abs_diff_eq(Mat4::from_translation(Vec3::X), 1e-6));

    let mut animator = Animator::new(&store, clip);
    animator.update_animation(&store, (24.0 - 1e-3) / 25.0);
    let (scale, rotation, translation) = animator.global_transforms()[1].to_scale_rotation_translation();
    assert!(scale.abs_diff_eq(Vec3::splat(2.0), 1e-4));
    assert!(rotation.angle_between(Quat::from_rotation_z(FRAC_PI_2)) < 1e-3);
    assert!(translation.abs_diff_eq(Vec3::X, 1e-3));
}

#[test]
fn unkeyed_bones_hold_their_bind_pose() {
    let (store, clip) = load("wave");
    let mut animator = Animator::new(&store, clip);
    for _ in 0..40 {
        animator.update_animation(&store, 0.037);
        // root and tail have no track; "ghost" keys were dropped
        assert!(animator.final_bone_matrices()[0].abs_diff_eq(Mat4::IDENTITY, 1e-6));
        assert!(animator.final_bone_matrices()[3].abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }
}

#[test]
fn root_rotation_reaches_children() {
    let (store, clip) = load("turn");
    let mut animator = Animator::new(&store, clip);
    // halfway along a half turn
    animator.update_animation(&store, 5.0);
    let root = animator.final_bone_matrices()[0];
    let hand = animator.final_bone_matrices()[2];
    // hand has an identity local animation, so it skins exactly like the root
    assert!(hand.abs_diff_eq(root, 1e-5));
    let hand_position = animator.global_transforms()[2].w_axis.truncate();
    assert!((hand_position.length() - 1.5).abs() < 1e-5);
    assert!(hand_position.x.abs() < 1e-5);
}

#[test]
fn matrix_count_never_changes() {
    let (store, clip) = load("wave");
    let mut animator = Animator::new(&store, clip);
    for dt in [0.0, 0.1, 10.0, 0.25, -3.0] {
        animator.update_animation(&store, dt);
        assert_eq!(animator.final_bone_matrices().len(), 4);
    }
}

#[test]
fn clips_bind_to_an_existing_skeleton() {
    let dir = tempfile::tempdir().unwrap();
    let rig = write_asset(&dir, "keeper.json", &lighthouse_keeper());
    let mut extra = lighthouse_keeper();
    extra.hierarchy = NodeDescription::new("unused", Mat4::IDENTITY.to_cols_array_2d());
    extra.clips.truncate(1);
    extra.clips[0].name = "turn_again".into();
    let extra = write_asset(&dir, "extra.json", &extra);

    let mut store = AssetStore::new();
    let model = store.load_from_asset(&rig, &ImportOptions::default()).unwrap();
    let skeleton = store.model(model).unwrap().skeleton;
    let clips = store.load_clips(&extra, skeleton, &ImportOptions::default()).unwrap();
    assert_eq!(clips.len(), 1);
    let clip = store.clip(clips[0]).unwrap();
    assert_eq!(clip.name, "turn_again");
    assert_eq!(clip.bone_count(), 4);
    assert_eq!(clip.skeleton, skeleton);
}

#[test]
fn broken_assets_fail_with_import_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = AssetStore::new();

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        store.load_from_asset(&missing, &ImportOptions::default()),
        Err(ImportError::Io { .. })
    ));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "{ \"name\": \"x\" ").unwrap();
    assert!(matches!(
        store.load_from_asset(&garbage, &ImportOptions::default()),
        Err(ImportError::Json(_))
    ));

    let mut deep = NodeDescription::new("leaf", Mat4::IDENTITY.to_cols_array_2d());
    for i in 0..8 {
        deep = NodeDescription::new(format!("n{i}"), Mat4::IDENTITY.to_cols_array_2d()).with_child(deep);
    }
    let mut file = lighthouse_keeper();
    file.hierarchy = deep;
    file.clips.clear();
    let path = write_asset(&dir, "deep.json", &file);
    let options = ImportOptions {
        max_hierarchy_depth: 4,
    };
    assert!(matches!(
        store.load_from_asset(&path, &options),
        Err(ImportError::HierarchyTooDeep { limit: 4 })
    ));
}

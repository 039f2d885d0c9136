use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use gltf::animation::util::ReadOutputs;
use gltf::{buffer, Document, Node};

use super::{
    file_formats::{
        animationfile::{ChannelDescription, ClipDescription, Interpolation, TrackDescription},
        modelfile::{MeshDescription, MeshVertexDescription, ModelFile},
        skeletonfile::{NodeDescription, IDENTITY},
    },
    ImportOptions,
};
use crate::error::ImportError;

pub fn import_gltf(path: &Path, options: &ImportOptions) -> Result<ModelFile, ImportError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::open(path)?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());

    let hierarchy = read_hierarchy(&document, &buffers, options)?;
    let clips = read_clips(&document, &buffers);
    let meshes = read_skinned_meshes(&document, &buffers);
    log::info!(
        "imported {}: {} clips, {} skinned meshes",
        path.display(),
        clips.len(),
        meshes.len()
    );

    Ok(ModelFile {
        name,
        hierarchy,
        clips,
        meshes,
    })
}

fn node_name(node: &Node) -> String {
    node.name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

/// Inverse bind matrices by node index. First skin to list a joint wins.
fn read_inverse_binds(
    document: &Document,
    buffers: &[buffer::Data],
) -> HashMap<usize, [[f32; 4]; 4]> {
    let mut inverse_binds = HashMap::new();
    for skin in document.skins() {
        let reader = skin.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
        let joints: Vec<Node> = skin.joints().collect();
        match reader.read_inverse_bind_matrices() {
            Some(matrices) => {
                let matrices: Vec<[[f32; 4]; 4]> = matrices.collect();
                if matrices.len() != joints.len() {
                    log::warn!(
                        "skin {} has {} inverse bind matrices for {} joints",
                        skin.index(),
                        matrices.len(),
                        joints.len()
                    );
                }
                for (joint, matrix) in joints.iter().zip(matrices) {
                    inverse_binds.entry(joint.index()).or_insert(matrix);
                }
            }
            // absent inverseBindMatrices are identity matrices
            None => {
                for joint in &joints {
                    inverse_binds.entry(joint.index()).or_insert(IDENTITY);
                }
            }
        }
    }
    inverse_binds
}

fn describe_node(
    node: Node,
    inverse_binds: &HashMap<usize, [[f32; 4]; 4]>,
    depth: usize,
    options: &ImportOptions,
) -> Result<NodeDescription, ImportError> {
    // also guards against cyclic node references in malformed files
    if depth > options.max_hierarchy_depth {
        return Err(ImportError::HierarchyTooDeep {
            limit: options.max_hierarchy_depth,
        });
    }
    let children = node
        .children()
        .map(|child| describe_node(child, inverse_binds, depth + 1, options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NodeDescription {
        name: node_name(&node),
        transform: node.transform().matrix(),
        inverse_bind: inverse_binds.get(&node.index()).copied(),
        children,
    })
}

fn read_hierarchy(
    document: &Document,
    buffers: &[buffer::Data],
    options: &ImportOptions,
) -> Result<NodeDescription, ImportError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(ImportError::NoHierarchy)?;
    let inverse_binds = read_inverse_binds(document, buffers);
    let mut roots: Vec<Node> = scene.nodes().collect();

    match roots.len() {
        0 => Err(ImportError::NoHierarchy),
        1 => describe_node(roots.remove(0), &inverse_binds, 1, options),
        _ => {
            let children = roots
                .into_iter()
                .map(|root| describe_node(root, &inverse_binds, 2, options))
                .collect::<Result<Vec<_>, _>>()?;
            let name = scene
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("scene_{}", scene.index()));
            Ok(NodeDescription {
                name,
                transform: IDENTITY,
                inverse_bind: None,
                children,
            })
        }
    }
}

fn read_clips(document: &Document, buffers: &[buffer::Data]) -> Vec<ClipDescription> {
    let mut clips = vec![];
    for animation in document.animations() {
        let name = animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("animation_{}", animation.index()));
        // keyed by node index so track order is stable
        let mut tracks = BTreeMap::<usize, TrackDescription>::new();

        for channel in animation.channels() {
            let node = channel.target().node();
            let reader = channel.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
            let Some(inputs) = reader.read_inputs() else {
                log::warn!("{}: channel {} has no input times", name, channel.index());
                continue;
            };
            let times: Vec<f32> = inputs.collect();
            let interpolation = Interpolation::from(channel.sampler().interpolation());
            let track = tracks
                .entry(node.index())
                .or_insert_with(|| TrackDescription {
                    bone: node_name(&node),
                    position: None,
                    rotation: None,
                    scale: None,
                });

            match reader.read_outputs() {
                Some(ReadOutputs::Translations(values)) => {
                    track.position = Some(ChannelDescription {
                        times,
                        values: values.collect(),
                        interpolation,
                    });
                }
                Some(ReadOutputs::Rotations(values)) => {
                    track.rotation = Some(ChannelDescription {
                        times,
                        values: values.into_f32().collect(),
                        interpolation,
                    });
                }
                Some(ReadOutputs::Scales(values)) => {
                    track.scale = Some(ChannelDescription {
                        times,
                        values: values.collect(),
                        interpolation,
                    });
                }
                Some(ReadOutputs::MorphTargetWeights(_)) => {
                    log::warn!("{}: morph target weights on {} ignored", name, track.bone);
                }
                None => {
                    log::warn!("{}: channel {} has no output values", name, channel.index());
                }
            }
        }

        clips.push(ClipDescription {
            name,
            duration: None,
            ticks_per_second: None,
            tracks: tracks.into_values().collect(),
        });
    }
    clips
}

fn read_skinned_meshes(document: &Document, buffers: &[buffer::Data]) -> Vec<MeshDescription> {
    let mut meshes = vec![];
    for node in document.nodes() {
        let (Some(mesh), Some(skin)) = (node.mesh(), node.skin()) else {
            continue;
        };
        let joints: Vec<String> = skin.joints().map(|joint| node_name(&joint)).collect();

        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                log::warn!(
                    "mesh {} primitive {} has no positions, skipping",
                    mesh.index(),
                    primitive.index()
                );
                continue;
            };
            let normals: Vec<[f32; 3]> = reader.read_normals().map(|n| n.collect()).unwrap_or_default();
            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|t| t.into_f32().collect())
                .unwrap_or_default();
            let bone_joints: Vec<[u16; 4]> = reader
                .read_joints(0)
                .map(|j| j.into_u16().collect())
                .unwrap_or_default();
            let weights: Vec<[f32; 4]> = reader
                .read_weights(0)
                .map(|w| w.into_f32().collect())
                .unwrap_or_default();
            let indices: Vec<u32> = reader
                .read_indices()
                .map(|i| i.into_u32().collect())
                .unwrap_or_default();

            let vertices = positions
                .enumerate()
                .map(|(i, position)| MeshVertexDescription {
                    position,
                    normal: normals.get(i).copied().unwrap_or_default(),
                    tex_coords: tex_coords.get(i).copied().unwrap_or_default(),
                    joints: bone_joints.get(i).copied().unwrap_or_default(),
                    weights: weights.get(i).copied().unwrap_or_default(),
                })
                .collect();

            meshes.push(MeshDescription {
                name: format!(
                    "{}_{}",
                    mesh.name().map(str::to_string).unwrap_or_else(|| format!("mesh_{}", mesh.index())),
                    primitive.index()
                ),
                joints: joints.clone(),
                vertices,
                indices,
            });
        }
    }
    meshes
}

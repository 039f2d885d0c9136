use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("gltf error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported asset format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("asset contains no usable node hierarchy")]
    NoHierarchy,

    #[error("node hierarchy is nested deeper than {limit} levels")]
    HierarchyTooDeep { limit: usize },

    #[error("{channel} channel of bone {bone} has {times} timestamps but {values} values")]
    MalformedChannel {
        bone: String,
        channel: &'static str,
        times: usize,
        values: usize,
    },

    #[error("skeleton handle does not refer to a loaded skeleton")]
    UnknownSkeleton,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{count} bone matrices exceed the shader capacity of {capacity}")]
    BoneCapacityExceeded { count: usize, capacity: usize },
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no model loaded for character {0}")]
    UnknownModel(String),

    #[error("model {model} has no clip named {clip}")]
    UnknownClip { model: String, clip: String },

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

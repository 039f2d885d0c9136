use std::path::Path;

use file_formats::modelfile::ModelFile;

use crate::error::ImportError;

pub mod animation;
pub mod file_formats;
pub mod gltf_import;
pub mod skeleton;
pub mod skin;
pub mod store;

pub const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Deepest bone nesting accepted before the asset is rejected.
    pub max_hierarchy_depth: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
        }
    }
}

/// Reads an asset into its description form, picking the importer by file extension.
pub fn read_model_file(path: &Path, options: &ImportOptions) -> Result<ModelFile, ImportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("gltf") | Some("glb") => gltf_import::import_gltf(path, options),
        Some("json") => {
            let json = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(serde_json::from_str(&json)?)
        }
        _ => Err(ImportError::UnsupportedFormat(path.to_path_buf())),
    }
}

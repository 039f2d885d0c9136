use serde::{Deserialize, Serialize};

pub(crate) const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

fn identity() -> [[f32; 4]; 4] {
    IDENTITY
}

/// One node of an imported scene graph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeDescription {
    pub name: String,
    /// column-major, relative to the parent node
    #[serde(default = "identity")]
    pub transform: [[f32; 4]; 4],
    /// column-major, None = derive from the bind pose
    #[serde(default)]
    pub inverse_bind: Option<[[f32; 4]; 4]>,
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

impl NodeDescription {
    pub fn new(name: impl Into<String>, transform: [[f32; 4]; 4]) -> Self {
        Self {
            name: name.into(),
            transform,
            inverse_bind: None,
            children: vec![],
        }
    }

    pub fn with_child(mut self, child: NodeDescription) -> Self {
        self.children.push(child);
        self
    }
}

use serde::{Deserialize, Serialize};

use grocery_core::NodePath;

/// A store or grouping node in the organization tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub path: NodePath,
    pub name: String,
}

impl Node {
    /// Node named after the last segment of its path.
    pub fn new(path: NodePath) -> Self {
        let name = path.name().to_string();
        Self { path, name }
    }
}

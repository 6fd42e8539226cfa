//! Palette documents: the catalogue of node templates an editor offers.
//!
//! A palette is read-only input. Templates are node-shaped and convert
//! through the same path as document nodes; instantiating one is the store's
//! job (clone, fresh node id, caller-supplied position).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::convert::node_shell_from_def;
use crate::error::ModelError;
use crate::interchange::NodeDef;
use crate::types::Node;

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub version: Option<String>,
    pub categories: Vec<PaletteCategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaletteCategory {
    pub id: String,
    pub label: Option<String>,
    pub node_types: Vec<Node>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PaletteDef {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    categories: Vec<PaletteCategoryDef>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PaletteCategoryDef {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    node_types: Vec<NodeDef>,
}

impl Palette {
    pub fn from_value(doc: Value) -> Result<Self, ModelError> {
        let def: PaletteDef = serde_json::from_value(doc)?;
        let mut categories = Vec::with_capacity(def.categories.len());
        for category in def.categories {
            let mut node_types = Vec::with_capacity(category.node_types.len());
            for template in category.node_types {
                node_types.push(node_shell_from_def(template)?);
            }
            categories.push(PaletteCategory {
                id: category.id,
                label: category.label,
                node_types,
            });
        }
        Ok(Self {
            version: def.version,
            categories,
        })
    }

    /// First template whose operator matches, searching categories in order
    pub fn node_type(&self, op: &str) -> Option<&Node> {
        self.categories
            .iter()
            .flat_map(|c| c.node_types.iter())
            .find(|n| n.op.as_deref() == Some(op))
    }

    pub fn require_node_type(&self, op: &str) -> Result<&Node, ModelError> {
        self.node_type(op)
            .ok_or_else(|| ModelError::UnknownOperator(op.to_string()))
    }
}

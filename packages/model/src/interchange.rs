//! Serde definitions for the on-disk pipeline-flow format (version 3.0).
//!
//! These structs mirror the wire shape one-to-one. Mapping between them and
//! the in-memory model (port-inline links to first-class `Link`s, `"binding"`
//! nodes to entry/exit kinds, comment `associated_id_refs` to comment links)
//! lives in [`crate::convert`].
//!
//! Unknown fields land in flattened `extra` maps instead of failing the
//! parse, and serializing a def writes them back out. Node and port defs
//! additionally carry their non-`ui_data` application data into the model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DOC_TYPE: &str = "pipeline";

pub const NODE_TYPE_EXECUTION: &str = "execution_node";
pub const NODE_TYPE_BINDING: &str = "binding";
pub const NODE_TYPE_SUPER: &str = "super_node";
pub const NODE_TYPE_MODEL: &str = "model_node";

fn is_false(value: &bool) -> bool {
    !*value
}

fn default_doc_type() -> String {
    DOC_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineFlowDef {
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
    pub version: String,
    pub id: String,
    pub primary_pipeline: String,
    pub pipelines: Vec<PipelineDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtimes: Vec<RuntimeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_pipelines: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_ref: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<CommentDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<PortDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<PortDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subflow_ref: Option<SubflowRefDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_data: Option<NodeAppDataDef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAppDataDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_data: Option<NodeUiDataDef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeUiDataDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub x_pos: f64,
    #[serde(default)]
    pub y_pos: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_expanded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<AssociationDef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Portless association serialized on the source node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationDef {
    pub id: String,
    pub node_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_data: Option<PortAppDataDef>,
    /// Input ports only: the node-links terminating at this port
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkRefDef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortAppDataDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_data: Option<PortUiDataDef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortUiDataDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<CardinalityDef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardinalityDef {
    #[serde(default)]
    pub min: u32,
    pub max: i64,
}

/// Upstream end of a node-link, written inline on the target input port.
/// `node_id_ref`/`port_id_ref` name the source node and its output port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRefDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub node_id_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_id_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentDef {
    pub id: String,
    #[serde(default)]
    pub x_pos: f64,
    #[serde(default)]
    pub y_pos: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_id_refs: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubflowRefDef {
    pub pipeline_id_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_round_trip() {
        let doc = json!({
            "doc_type": "pipeline",
            "version": "3.0",
            "json_schema": "http://example.com/pipeline-v3-schema.json",
            "id": "flow-1",
            "primary_pipeline": "p1",
            "pipelines": [{
                "id": "p1",
                "nodes": [],
                "zoom": { "k": 1.0, "x": 0, "y": 0 }
            }]
        });

        let def: PipelineFlowDef = serde_json::from_value(doc.clone()).unwrap();
        assert!(def.extra.contains_key("json_schema"));
        assert!(def.pipelines[0].extra.contains_key("zoom"));

        let back = serde_json::to_value(&def).unwrap();
        assert_eq!(back["json_schema"], doc["json_schema"]);
        assert_eq!(back["pipelines"][0]["zoom"], doc["pipelines"][0]["zoom"]);
    }

    #[test]
    fn test_port_link_refs_parse() {
        let port = json!({
            "id": "inPort",
            "app_data": { "ui_data": { "cardinality": { "min": 0, "max": 1 } } },
            "links": [ { "id": "l1", "node_id_ref": "n1", "port_id_ref": "outPort" } ]
        });

        let def: PortDef = serde_json::from_value(port).unwrap();
        assert_eq!(def.links.len(), 1);
        assert_eq!(def.links[0].node_id_ref, "n1");
        let card = def.app_data.unwrap().ui_data.unwrap().cardinality.unwrap();
        assert_eq!(card.max, 1);
    }
}

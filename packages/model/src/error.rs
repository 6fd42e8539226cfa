//! Error types for the document model

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Pipeline not found: {0}")]
    PipelineNotFound(String),

    #[error("Node not found: {node_id} in pipeline {pipeline_id}")]
    NodeNotFound {
        pipeline_id: String,
        node_id: String,
    },

    #[error("Link not found: {link_id} in pipeline {pipeline_id}")]
    LinkNotFound {
        pipeline_id: String,
        link_id: String,
    },

    #[error("Comment not found: {comment_id} in pipeline {pipeline_id}")]
    CommentNotFound {
        pipeline_id: String,
        comment_id: String,
    },

    #[error("Object not found: {object_id} in pipeline {pipeline_id}")]
    ObjectNotFound {
        pipeline_id: String,
        object_id: String,
    },

    #[error("Port {port_id} not found on node {node_id}")]
    PortNotFound { node_id: String, port_id: String },

    #[error("Node {node_id} has no {direction} ports")]
    NoPorts {
        node_id: String,
        direction: &'static str,
    },

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Link between {src_id} and {trg_id} already exists")]
    DuplicateLink { src_id: String, trg_id: String },

    #[error("Link source and target are the same node: {0}")]
    SelfLink(String),

    #[error("Cardinality exceeded on port {port_id} of node {node_id} (max {max})")]
    CardinalityExceeded {
        node_id: String,
        port_id: String,
        max: i64,
    },

    #[error("Node {0} is not a supernode")]
    NotASuperNode(String),

    #[error("Link {0} is not a node link")]
    NotANodeLink(String),

    #[error("Selection contains no nodes")]
    EmptySelection,

    #[error("Binding node {node_id} cannot carry {direction} ports")]
    BindingPortShape {
        node_id: String,
        direction: &'static str,
    },

    #[error("Supernode {node_id} references missing pipeline {pipeline_id}")]
    MissingSubflow {
        node_id: String,
        pipeline_id: String,
    },

    #[error("Node {0} carries a subflow reference but is not a supernode")]
    UnexpectedSubflow(String),

    #[error("Cannot delete the primary pipeline: {0}")]
    PrimaryPipelineDelete(String),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Palette has no node type for operator: {0}")]
    UnknownOperator(String),

    #[error("Invalid document: {0}")]
    Deserialize(#[from] serde_json::Error),
}

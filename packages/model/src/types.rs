//! # Document Model Types
//!
//! In-memory representation of a pipeline flow: one document holding one or
//! more pipelines, each pipeline a flat collection of nodes, comments and
//! first-class links.
//!
//! These types are plain data. Consistency rules (id uniqueness, endpoint
//! resolution, cardinality limits) are enforced by the `ObjectModel` store,
//! not by the structs themselves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version string written by the current serializer
pub const CURRENT_VERSION: &str = "3.0";

/// Node classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Sub-pipeline entry point; carries output ports only
    BindingEntry,
    /// Sub-pipeline exit point; carries input ports only
    BindingExit,
    Execution,
    /// Node whose body is a nested pipeline
    SuperNode,
    Model,
}

impl NodeKind {
    pub fn is_binding(self) -> bool {
        matches!(self, NodeKind::BindingEntry | NodeKind::BindingExit)
    }
}

/// Link classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    /// Data link between an output port and an input port
    NodeLink,
    /// Portless node-to-node association
    AssociationLink,
    /// Comment-to-node attachment
    CommentLink,
}

/// Bounds on how many links a port may carry. `max == -1` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinality {
    pub min: u32,
    pub max: i64,
}

impl Cardinality {
    pub const UNBOUNDED: i64 = -1;

    /// Default for input ports when a document omits cardinality
    pub fn input_default() -> Self {
        Self { min: 0, max: 1 }
    }

    /// Default for output ports when a document omits cardinality
    pub fn output_default() -> Self {
        Self {
            min: 0,
            max: Self::UNBOUNDED,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max == Self::UNBOUNDED
    }

    /// Whether one more link fits on a port that already carries `current`
    pub fn allows_another(&self, current: usize) -> bool {
        self.is_unbounded() || (current as i64) < self.max
    }
}

/// A single input or output port on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub label: Option<String>,
    pub cardinality: Cardinality,
    pub app_data: Option<Value>,
}

impl Port {
    pub fn input(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            cardinality: Cardinality::input_default(),
            app_data: None,
        }
    }

    pub fn output(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            cardinality: Cardinality::output_default(),
            app_data: None,
        }
    }

    pub fn with_cardinality(mut self, min: u32, max: i64) -> Self {
        self.cardinality = Cardinality { min, max };
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Reference from a supernode to the pipeline holding its body.
/// A `url` marks the pipeline as living in another flow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubflowRef {
    pub pipeline_id: String,
    pub url: Option<String>,
}

impl SubflowRef {
    pub fn local(pipeline_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            url: None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.url.is_none()
    }
}

/// One node on a pipeline surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    /// Operator name (which execution the node represents)
    pub op: Option<String>,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Supernodes only: whether the body renders in place
    pub is_expanded: bool,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    /// Supernodes only
    pub subflow_ref: Option<SubflowRef>,
    /// Operator configuration, opaque to the model
    pub parameters: Option<Value>,
    /// Application data outside the ui block, opaque to the model
    pub app_data: Option<Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            op: None,
            label: None,
            x: 0.0,
            y: 0.0,
            width: None,
            height: None,
            is_expanded: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            subflow_ref: None,
            parameters: None,
            app_data: None,
        }
    }

    /// Execution node with one input and one output port
    pub fn execution(id: impl Into<String>, op: impl Into<String>) -> Self {
        let id = id.into();
        let mut node = Self::new(id.clone(), NodeKind::Execution);
        node.op = Some(op.into());
        node.inputs.push(Port::input("inPort"));
        node.outputs.push(Port::output("outPort"));
        node
    }

    /// Entry binding node with one output port
    pub fn binding_entry(id: impl Into<String>) -> Self {
        let mut node = Self::new(id, NodeKind::BindingEntry);
        node.outputs.push(Port::output("outPort"));
        node
    }

    /// Exit binding node with one input port
    pub fn binding_exit(id: impl Into<String>) -> Self {
        let mut node = Self::new(id, NodeKind::BindingExit);
        node.inputs.push(Port::input("inPort"));
        node
    }

    /// Supernode whose body is the given local pipeline
    pub fn super_node(id: impl Into<String>, pipeline_id: impl Into<String>) -> Self {
        let mut node = Self::new(id, NodeKind::SuperNode);
        node.subflow_ref = Some(SubflowRef::local(pipeline_id));
        node
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_input(mut self, port: Port) -> Self {
        self.inputs.push(port);
        self
    }

    pub fn with_output(mut self, port: Port) -> Self {
        self.outputs.push(port);
        self
    }

    pub fn input(&self, port_id: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.id == port_id)
    }

    pub fn output(&self, port_id: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.id == port_id)
    }

    pub fn is_super_node(&self) -> bool {
        self.kind == NodeKind::SuperNode
    }

    /// Local sub-pipeline id, if this is a supernode bound inside this flow
    pub fn local_subflow(&self) -> Option<&str> {
        match &self.subflow_ref {
            Some(r) if r.is_local() => Some(r.pipeline_id.as_str()),
            _ => None,
        }
    }
}

/// One link between two objects in the same pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub kind: LinkKind,
    /// Source node id, or comment id for comment links
    pub src_id: String,
    pub src_port: Option<String>,
    pub trg_id: String,
    pub trg_port: Option<String>,
    pub app_data: Option<Value>,
}

impl Link {
    pub fn node(
        id: impl Into<String>,
        src_id: impl Into<String>,
        src_port: Option<String>,
        trg_id: impl Into<String>,
        trg_port: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: LinkKind::NodeLink,
            src_id: src_id.into(),
            src_port,
            trg_id: trg_id.into(),
            trg_port,
            app_data: None,
        }
    }

    pub fn comment(
        id: impl Into<String>,
        comment_id: impl Into<String>,
        node_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: LinkKind::CommentLink,
            src_id: comment_id.into(),
            src_port: None,
            trg_id: node_id.into(),
            trg_port: None,
            app_data: None,
        }
    }

    pub fn association(
        id: impl Into<String>,
        src_id: impl Into<String>,
        trg_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: LinkKind::AssociationLink,
            src_id: src_id.into(),
            src_port: None,
            trg_id: trg_id.into(),
            trg_port: None,
            app_data: None,
        }
    }

    /// Whether either endpoint is one of the given object ids
    pub fn touches(&self, ids: &[&str]) -> bool {
        ids.contains(&self.src_id.as_str()) || ids.contains(&self.trg_id.as_str())
    }
}

/// Free-floating annotation attached to nodes through comment links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub content: String,
}

impl Comment {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            width: 175.0,
            height: 42.0,
            content: content.into(),
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Runtime registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runtime {
    pub id: String,
    pub name: String,
}

/// One diagram surface: a flat collection of nodes, comments and links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub name: Option<String>,
    pub runtime_ref: Option<String>,
    pub nodes: Vec<Node>,
    pub comments: Vec<Comment>,
    pub links: Vec<Link>,
    pub app_data: Option<Value>,
    /// Bumped by every structural mutation; renderers compare it against the
    /// value they last painted. Not part of the interchange format.
    #[serde(skip)]
    revision: u64,
}

impl Pipeline {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            runtime_ref: None,
            nodes: Vec::new(),
            comments: Vec::new(),
            links: Vec::new(),
            app_data: None,
            revision: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn bump_revision(&mut self) {
        self.revision = self.revision.saturating_add(1);
    }

    /// History replay only: restores a previously observed counter value
    pub fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    pub fn link(&self, link_id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id == link_id)
    }

    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn comment_mut(&mut self, comment_id: &str) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id == comment_id)
    }

    /// Links with either endpoint in `ids`, in insertion order
    pub fn links_touching(&self, ids: &[&str]) -> Vec<&Link> {
        self.links.iter().filter(|l| l.touches(ids)).collect()
    }
}

/// Top-level document: one primary pipeline plus the sub-pipelines reachable
/// from supernodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineFlow {
    pub id: String,
    pub primary_pipeline: String,
    pub pipelines: Vec<Pipeline>,
    pub runtimes: Vec<Runtime>,
    /// References to pipelines stored in other flow documents
    pub external_pipelines: Vec<Value>,
    pub app_data: Option<Value>,
}

impl PipelineFlow {
    /// Empty flow with a single primary pipeline
    pub fn new(id: impl Into<String>, primary_pipeline: impl Into<String>) -> Self {
        let primary_pipeline = primary_pipeline.into();
        Self {
            id: id.into(),
            primary_pipeline: primary_pipeline.clone(),
            pipelines: vec![Pipeline::new(primary_pipeline)],
            runtimes: Vec::new(),
            external_pipelines: Vec::new(),
            app_data: None,
        }
    }

    pub fn pipeline(&self, pipeline_id: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|p| p.id == pipeline_id)
    }

    pub fn pipeline_mut(&mut self, pipeline_id: &str) -> Option<&mut Pipeline> {
        self.pipelines.iter_mut().find(|p| p.id == pipeline_id)
    }

    pub fn primary(&self) -> Option<&Pipeline> {
        self.pipeline(&self.primary_pipeline)
    }
}

//! Mapping between the interchange defs and the in-memory model.
//!
//! The wire format stores node-links inline on the *target* input port,
//! associations on the *source* node, and comment attachments as id lists on
//! the comment. Loading lifts all three into first-class [`Link`]s; saving
//! folds them back. Links are assembled in a fixed walk order (node-links in
//! node/port order, then associations, then comment links), so saving and
//! reloading a freshly loaded flow reproduces it exactly, generated ids
//! included.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::ids::IdGenerator;
use crate::interchange::{
    AssociationDef, CardinalityDef, CommentDef, LinkRefDef, NodeAppDataDef, NodeDef, NodeUiDataDef,
    PipelineDef, PipelineFlowDef, PortAppDataDef, PortDef, PortUiDataDef, RuntimeDef,
    SubflowRefDef, DOC_TYPE, NODE_TYPE_BINDING, NODE_TYPE_EXECUTION, NODE_TYPE_MODEL,
    NODE_TYPE_SUPER,
};
use crate::types::{
    Cardinality, Comment, Link, LinkKind, Node, NodeKind, Pipeline, PipelineFlow, Port, Runtime,
    SubflowRef, CURRENT_VERSION,
};

impl PipelineFlow {
    /// Builds a flow from interchange JSON. The document must already be at
    /// the current schema version; older documents go through
    /// `pipeflow-migrate` first.
    pub fn from_value(doc: Value) -> Result<Self, ModelError> {
        let def: PipelineFlowDef = serde_json::from_value(doc)?;
        flow_from_def(def)
    }

    /// Serializes the flow back to interchange JSON at the current version.
    pub fn to_value(&self) -> Result<Value, ModelError> {
        Ok(serde_json::to_value(flow_to_def(self))?)
    }
}

/// Hands out generated ids that are free in the source document. The
/// generator walks a fixed id sequence and claims the first unused slot, so
/// repeated loads of equivalent documents assign the same ids.
struct FreshIds {
    taken: HashSet<String>,
    generator: IdGenerator,
}

impl FreshIds {
    fn new(def: &PipelineFlowDef) -> Self {
        let mut taken = HashSet::new();
        for pipeline in &def.pipelines {
            taken.insert(pipeline.id.clone());
            for node in &pipeline.nodes {
                taken.insert(node.id.clone());
                for port in node.inputs.iter().chain(node.outputs.iter()) {
                    for link_ref in &port.links {
                        if let Some(id) = &link_ref.id {
                            taken.insert(id.clone());
                        }
                    }
                }
                if let Some(ui) = node.app_data.as_ref().and_then(|a| a.ui_data.as_ref()) {
                    for association in &ui.associations {
                        taken.insert(association.id.clone());
                    }
                }
            }
            for comment in &pipeline.comments {
                taken.insert(comment.id.clone());
            }
        }
        Self {
            taken,
            generator: IdGenerator::new(&def.id),
        }
    }

    fn next(&mut self) -> String {
        loop {
            let id = self.generator.next_id();
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }
}

fn flow_from_def(def: PipelineFlowDef) -> Result<PipelineFlow, ModelError> {
    let mut fresh = FreshIds::new(&def);
    let mut pipelines = Vec::with_capacity(def.pipelines.len());
    for pipeline_def in def.pipelines {
        pipelines.push(pipeline_from_def(pipeline_def, &mut fresh)?);
    }
    Ok(PipelineFlow {
        id: def.id,
        primary_pipeline: def.primary_pipeline,
        pipelines,
        runtimes: def
            .runtimes
            .into_iter()
            .map(|r| Runtime {
                id: r.id,
                name: r.name,
            })
            .collect(),
        external_pipelines: def.external_pipelines,
        app_data: def.app_data,
    })
}

fn pipeline_from_def(def: PipelineDef, fresh: &mut FreshIds) -> Result<Pipeline, ModelError> {
    let mut nodes = Vec::with_capacity(def.nodes.len());
    let mut node_links = Vec::new();
    let mut association_links = Vec::new();

    for node_def in def.nodes {
        let (node, links, associations) = node_from_def(node_def, fresh)?;
        node_links.extend(links);
        association_links.extend(associations);
        nodes.push(node);
    }

    let mut comments = Vec::with_capacity(def.comments.len());
    let mut comment_links = Vec::new();
    for comment_def in def.comments {
        for node_id in &comment_def.associated_id_refs {
            comment_links.push(Link::comment(
                fresh.next(),
                comment_def.id.clone(),
                node_id.clone(),
            ));
        }
        comments.push(Comment {
            id: comment_def.id,
            x: comment_def.x_pos,
            y: comment_def.y_pos,
            width: comment_def.width,
            height: comment_def.height,
            content: comment_def.content,
        });
    }

    let mut links = node_links;
    links.append(&mut association_links);
    links.append(&mut comment_links);

    let mut pipeline = Pipeline::new(def.id);
    pipeline.name = def.name;
    pipeline.runtime_ref = def.runtime_ref;
    pipeline.nodes = nodes;
    pipeline.comments = comments;
    pipeline.links = links;
    pipeline.app_data = def.app_data;
    Ok(pipeline)
}

/// Lifts the inline link refs and associations off a node def, then builds
/// the node itself. Returned as (node, node-links, association-links).
fn node_from_def(
    mut def: NodeDef,
    fresh: &mut FreshIds,
) -> Result<(Node, Vec<Link>, Vec<Link>), ModelError> {
    let node_id = def.id.clone();

    let mut node_links = Vec::new();
    for port in &mut def.inputs {
        for link_ref in std::mem::take(&mut port.links) {
            let id = match link_ref.id {
                Some(id) => id,
                None => fresh.next(),
            };
            let mut link = Link::node(
                id,
                link_ref.node_id_ref,
                link_ref.port_id_ref,
                node_id.clone(),
                Some(port.id.clone()),
            );
            link.app_data = link_ref.app_data;
            node_links.push(link);
        }
    }

    let mut association_links = Vec::new();
    if let Some(ui) = def.app_data.as_mut().and_then(|a| a.ui_data.as_mut()) {
        for association in std::mem::take(&mut ui.associations) {
            let mut link = Link::association(association.id, node_id.clone(), association.node_ref);
            link.app_data = association.app_data;
            association_links.push(link);
        }
    }

    let node = node_shell_from_def(def)?;
    Ok((node, node_links, association_links))
}

/// Node fields and ports only; inline links and associations are the
/// caller's business. Also used to instantiate palette templates.
pub(crate) fn node_shell_from_def(def: NodeDef) -> Result<Node, ModelError> {
    let kind = node_kind_from_type(&def.node_type, !def.inputs.is_empty())
        .ok_or_else(|| ModelError::UnknownNodeType(def.node_type.clone()))?;

    let mut node = Node::new(def.id, kind);
    node.op = def.op;
    node.parameters = def.parameters;
    node.subflow_ref = def.subflow_ref.map(|r| SubflowRef {
        pipeline_id: r.pipeline_id_ref,
        url: r.url,
    });
    if let Some(app) = def.app_data {
        if let Some(ui) = app.ui_data {
            node.label = ui.label;
            node.x = ui.x_pos;
            node.y = ui.y_pos;
            node.width = ui.width;
            node.height = ui.height;
            node.is_expanded = ui.is_expanded;
        }
        if !app.extra.is_empty() {
            node.app_data = Some(Value::Object(app.extra));
        }
    }
    node.inputs = def
        .inputs
        .into_iter()
        .map(|p| port_from_def(p, Cardinality::input_default()))
        .collect();
    node.outputs = def
        .outputs
        .into_iter()
        .map(|p| port_from_def(p, Cardinality::output_default()))
        .collect();
    Ok(node)
}

fn port_from_def(def: PortDef, default: Cardinality) -> Port {
    let mut port = Port {
        id: def.id,
        label: None,
        cardinality: default,
        app_data: None,
    };
    if let Some(app) = def.app_data {
        if let Some(ui) = app.ui_data {
            port.label = ui.label;
            if let Some(c) = ui.cardinality {
                port.cardinality = Cardinality {
                    min: c.min,
                    max: c.max,
                };
            }
        }
        if !app.extra.is_empty() {
            port.app_data = Some(Value::Object(app.extra));
        }
    }
    port
}

fn node_kind_from_type(node_type: &str, has_inputs: bool) -> Option<NodeKind> {
    match node_type {
        NODE_TYPE_EXECUTION => Some(NodeKind::Execution),
        NODE_TYPE_SUPER => Some(NodeKind::SuperNode),
        NODE_TYPE_MODEL => Some(NodeKind::Model),
        NODE_TYPE_BINDING => Some(if has_inputs {
            NodeKind::BindingExit
        } else {
            NodeKind::BindingEntry
        }),
        _ => None,
    }
}

fn node_type_from_kind(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Execution => NODE_TYPE_EXECUTION,
        NodeKind::SuperNode => NODE_TYPE_SUPER,
        NodeKind::Model => NODE_TYPE_MODEL,
        NodeKind::BindingEntry | NodeKind::BindingExit => NODE_TYPE_BINDING,
    }
}

fn flow_to_def(flow: &PipelineFlow) -> PipelineFlowDef {
    PipelineFlowDef {
        doc_type: DOC_TYPE.to_string(),
        version: CURRENT_VERSION.to_string(),
        id: flow.id.clone(),
        primary_pipeline: flow.primary_pipeline.clone(),
        pipelines: flow.pipelines.iter().map(pipeline_to_def).collect(),
        runtimes: flow
            .runtimes
            .iter()
            .map(|r| RuntimeDef {
                id: r.id.clone(),
                name: r.name.clone(),
                extra: Map::new(),
            })
            .collect(),
        external_pipelines: flow.external_pipelines.clone(),
        app_data: flow.app_data.clone(),
        extra: Map::new(),
    }
}

fn pipeline_to_def(pipeline: &Pipeline) -> PipelineDef {
    PipelineDef {
        id: pipeline.id.clone(),
        name: pipeline.name.clone(),
        runtime_ref: pipeline.runtime_ref.clone(),
        nodes: pipeline
            .nodes
            .iter()
            .map(|n| node_to_def(n, pipeline))
            .collect(),
        comments: pipeline
            .comments
            .iter()
            .map(|c| comment_to_def(c, pipeline))
            .collect(),
        app_data: pipeline.app_data.clone(),
        extra: Map::new(),
    }
}

fn node_to_def(node: &Node, pipeline: &Pipeline) -> NodeDef {
    let associations: Vec<AssociationDef> = pipeline
        .links
        .iter()
        .filter(|l| l.kind == LinkKind::AssociationLink && l.src_id == node.id)
        .map(|l| AssociationDef {
            id: l.id.clone(),
            node_ref: l.trg_id.clone(),
            app_data: l.app_data.clone(),
        })
        .collect();

    let inputs = if node.inputs.is_empty() {
        default_input_to_def(node, pipeline)
    } else {
        node.inputs
            .iter()
            .enumerate()
            .map(|(index, port)| input_port_to_def(port, index == 0, node, pipeline))
            .collect()
    };
    let outputs = node.outputs.iter().map(output_port_to_def).collect();

    let app_extra = match &node.app_data {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    NodeDef {
        id: node.id.clone(),
        node_type: node_type_from_kind(node.kind).to_string(),
        op: node.op.clone(),
        inputs,
        outputs,
        parameters: node.parameters.clone(),
        subflow_ref: node.subflow_ref.as_ref().map(|r| SubflowRefDef {
            pipeline_id_ref: r.pipeline_id.clone(),
            url: r.url.clone(),
        }),
        app_data: Some(NodeAppDataDef {
            ui_data: Some(NodeUiDataDef {
                label: node.label.clone(),
                x_pos: node.x,
                y_pos: node.y,
                width: node.width,
                height: node.height,
                is_expanded: node.is_expanded,
                associations,
                extra: Map::new(),
            }),
            extra: app_extra,
        }),
        extra: Map::new(),
    }
}

/// Input ports carry the inline refs for every node-link terminating at
/// them. Links whose target port was never resolved ride on the first port.
fn input_port_to_def(port: &Port, first: bool, node: &Node, pipeline: &Pipeline) -> PortDef {
    let links = pipeline
        .links
        .iter()
        .filter(|l| l.kind == LinkKind::NodeLink && l.trg_id == node.id)
        .filter(|l| match &l.trg_port {
            Some(p) => *p == port.id,
            None => first,
        })
        .map(link_ref_to_def)
        .collect();

    PortDef {
        id: port.id.clone(),
        app_data: Some(port_app_data_to_def(port)),
        links,
        extra: Map::new(),
    }
}

/// A portless binding target has no input port for its inline refs to ride
/// on; saving materializes the default input port to carry them.
fn default_input_to_def(node: &Node, pipeline: &Pipeline) -> Vec<PortDef> {
    let links: Vec<LinkRefDef> = pipeline
        .links
        .iter()
        .filter(|l| l.kind == LinkKind::NodeLink && l.trg_id == node.id)
        .map(link_ref_to_def)
        .collect();
    if links.is_empty() {
        return Vec::new();
    }
    vec![PortDef {
        id: "inPort".to_string(),
        app_data: None,
        links,
        extra: Map::new(),
    }]
}

fn link_ref_to_def(link: &Link) -> LinkRefDef {
    LinkRefDef {
        id: Some(link.id.clone()),
        node_id_ref: link.src_id.clone(),
        port_id_ref: link.src_port.clone(),
        app_data: link.app_data.clone(),
    }
}

fn output_port_to_def(port: &Port) -> PortDef {
    PortDef {
        id: port.id.clone(),
        app_data: Some(port_app_data_to_def(port)),
        links: Vec::new(),
        extra: Map::new(),
    }
}

fn port_app_data_to_def(port: &Port) -> PortAppDataDef {
    let extra = match &port.app_data {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    PortAppDataDef {
        ui_data: Some(PortUiDataDef {
            label: port.label.clone(),
            cardinality: Some(CardinalityDef {
                min: port.cardinality.min,
                max: port.cardinality.max,
            }),
            extra: Map::new(),
        }),
        extra,
    }
}

fn comment_to_def(comment: &Comment, pipeline: &Pipeline) -> CommentDef {
    let associated_id_refs = pipeline
        .links
        .iter()
        .filter(|l| l.kind == LinkKind::CommentLink && l.src_id == comment.id)
        .map(|l| l.trg_id.clone())
        .collect();

    CommentDef {
        id: comment.id.clone(),
        x_pos: comment.x,
        y_pos: comment.y,
        width: comment.width,
        height: comment.height,
        content: comment.content.clone(),
        associated_id_refs,
        extra: Map::new(),
    }
}

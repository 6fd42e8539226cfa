//! The document store.
//!
//! `ObjectModel` owns one [`PipelineFlow`] and is the only mutation path into
//! it. Queries are cheap lookups; setters are atomic (full effect, or an
//! error and no change) and bump the owning pipeline's revision counter on
//! success. Higher-level editing (actions, undo/redo) composes these
//! primitives; the store itself keeps no history.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::ModelError;
use crate::ids::IdGenerator;
use crate::types::{
    Comment, Link, LinkKind, Node, NodeKind, Pipeline, PipelineFlow, Port,
};

/// Position and size snapshot used by geometry setters. `width`/`height` are
/// `None` for objects that keep their current size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectGeometry {
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ObjectModel {
    flow: PipelineFlow,
    ids: IdGenerator,
}

impl ObjectModel {
    pub fn new(flow: PipelineFlow) -> Self {
        let ids = IdGenerator::new(&flow.id);
        Self { flow, ids }
    }

    pub fn flow(&self) -> &PipelineFlow {
        &self.flow
    }

    pub fn into_flow(self) -> PipelineFlow {
        self.flow
    }

    // ---- queries ----

    pub fn pipeline(&self, pipeline_id: &str) -> Option<&Pipeline> {
        self.flow.pipeline(pipeline_id)
    }

    pub fn primary_pipeline(&self) -> Option<&Pipeline> {
        self.flow.primary()
    }

    pub fn node(&self, pipeline_id: &str, node_id: &str) -> Option<&Node> {
        self.pipeline(pipeline_id)?.node(node_id)
    }

    pub fn link(&self, pipeline_id: &str, link_id: &str) -> Option<&Link> {
        self.pipeline(pipeline_id)?.link(link_id)
    }

    pub fn comment(&self, pipeline_id: &str, comment_id: &str) -> Option<&Comment> {
        self.pipeline(pipeline_id)?.comment(comment_id)
    }

    pub fn nodes(&self, pipeline_id: &str) -> Option<&[Node]> {
        self.pipeline(pipeline_id).map(|p| p.nodes.as_slice())
    }

    pub fn links(&self, pipeline_id: &str) -> Option<&[Link]> {
        self.pipeline(pipeline_id).map(|p| p.links.as_slice())
    }

    pub fn comments(&self, pipeline_id: &str) -> Option<&[Comment]> {
        self.pipeline(pipeline_id).map(|p| p.comments.as_slice())
    }

    /// Clones of every link with an endpoint in `ids`, in pipeline order
    pub fn attached_links(&self, pipeline_id: &str, ids: &[&str]) -> Vec<Link> {
        match self.pipeline(pipeline_id) {
            Some(p) => p.links_touching(ids).into_iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Node-links terminating at one input port
    pub fn input_link_count(&self, pipeline_id: &str, node_id: &str, port_id: &str) -> usize {
        match self.pipeline(pipeline_id) {
            Some(p) => p
                .links
                .iter()
                .filter(|l| {
                    l.kind == LinkKind::NodeLink
                        && l.trg_id == node_id
                        && l.trg_port.as_deref() == Some(port_id)
                })
                .count(),
            None => 0,
        }
    }

    /// Node-links originating at one output port
    pub fn output_link_count(&self, pipeline_id: &str, node_id: &str, port_id: &str) -> usize {
        match self.pipeline(pipeline_id) {
            Some(p) => p
                .links
                .iter()
                .filter(|l| {
                    l.kind == LinkKind::NodeLink
                        && l.src_id == node_id
                        && l.src_port.as_deref() == Some(port_id)
                })
                .count(),
            None => 0,
        }
    }

    pub fn pipeline_revision(&self, pipeline_id: &str) -> Option<u64> {
        self.pipeline(pipeline_id).map(|p| p.revision())
    }

    /// Transitive local sub-pipeline ids reachable from one supernode
    pub fn subflow_pipelines(&self, pipeline_id: &str, node_id: &str) -> Vec<String> {
        match self.node(pipeline_id, node_id).and_then(|n| n.local_subflow()) {
            Some(root) => self.subflow_tree(root),
            None => Vec::new(),
        }
    }

    /// Transitive local sub-pipeline ids starting from (and including)
    /// `root`. Cycle-safe; unresolved references are skipped.
    pub fn subflow_tree(&self, root: &str) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![root.to_string()];
        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(pipeline) = self.pipeline(&id) {
                for node in &pipeline.nodes {
                    if let Some(sub) = node.local_subflow() {
                        stack.push(sub.to_string());
                    }
                }
                order.push(id);
            }
        }
        order
    }

    /// Supernodes bound to the given pipeline, as (host pipeline, node) pairs
    pub fn subflow_referrers(&self, pipeline_id: &str) -> Vec<(String, String)> {
        let mut referrers = Vec::new();
        for pipeline in &self.flow.pipelines {
            for node in &pipeline.nodes {
                if node.local_subflow() == Some(pipeline_id) {
                    referrers.push((pipeline.id.clone(), node.id.clone()));
                }
            }
        }
        referrers
    }

    // ---- id generation ----

    /// Next generated id not already used anywhere in the flow. Documents
    /// authored elsewhere may carry arbitrary ids, so every candidate is
    /// checked.
    pub fn fresh_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            if !self.id_in_use(&id) {
                return id;
            }
        }
    }

    fn id_in_use(&self, id: &str) -> bool {
        self.flow.id == id
            || self.flow.pipelines.iter().any(|p| {
                p.id == id
                    || p.nodes.iter().any(|n| n.id == id)
                    || p.comments.iter().any(|c| c.id == id)
                    || p.links.iter().any(|l| l.id == id)
            })
    }

    /// Clone of a palette template with a fresh node id at the given
    /// position. Port ids are kept as the template declares them.
    pub fn node_from_template(&mut self, template: &Node, x: f64, y: f64) -> Node {
        let mut node = template.clone();
        node.id = self.fresh_id();
        node.x = x;
        node.y = y;
        node
    }

    // ---- pipeline setters ----

    pub fn add_pipeline(&mut self, pipeline: Pipeline) -> Result<(), ModelError> {
        if self.flow.pipeline(&pipeline.id).is_some() {
            return Err(ModelError::DuplicateId(pipeline.id));
        }
        self.flow.pipelines.push(pipeline);
        Ok(())
    }

    pub fn delete_pipeline(&mut self, pipeline_id: &str) -> Result<Pipeline, ModelError> {
        if pipeline_id == self.flow.primary_pipeline {
            return Err(ModelError::PrimaryPipelineDelete(pipeline_id.to_string()));
        }
        let index = self
            .flow
            .pipelines
            .iter()
            .position(|p| p.id == pipeline_id)
            .ok_or_else(|| ModelError::PipelineNotFound(pipeline_id.to_string()))?;
        Ok(self.flow.pipelines.remove(index))
    }

    /// Position of a pipeline in the flow's pipeline list
    pub fn pipeline_index(&self, pipeline_id: &str) -> Option<usize> {
        self.flow.pipelines.iter().position(|p| p.id == pipeline_id)
    }

    /// History restore: reinserts a pipeline at its captured position
    pub fn insert_pipeline_at(
        &mut self,
        index: usize,
        pipeline: Pipeline,
    ) -> Result<(), ModelError> {
        if self.flow.pipeline(&pipeline.id).is_some() {
            return Err(ModelError::DuplicateId(pipeline.id));
        }
        let index = index.min(self.flow.pipelines.len());
        self.flow.pipelines.insert(index, pipeline);
        Ok(())
    }

    // ---- node setters ----

    pub fn add_node(&mut self, pipeline_id: &str, node: Node) -> Result<(), ModelError> {
        {
            let pipeline = self.require_pipeline(pipeline_id)?;
            if object_id_in_pipeline(pipeline, &node.id) {
                return Err(ModelError::DuplicateId(node.id));
            }
        }
        check_node_shape(&node)?;
        if let Some(sub) = node.local_subflow() {
            if self.flow.pipeline(sub).is_none() {
                let pipeline_id = sub.to_string();
                return Err(ModelError::MissingSubflow {
                    node_id: node.id,
                    pipeline_id,
                });
            }
        }
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        pipeline.nodes.push(node);
        pipeline.bump_revision();
        Ok(())
    }

    pub fn delete_node(&mut self, pipeline_id: &str, node_id: &str) -> Result<Node, ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        let index = pipeline
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| ModelError::NodeNotFound {
                pipeline_id: pipeline_id.to_string(),
                node_id: node_id.to_string(),
            })?;
        let node = pipeline.nodes.remove(index);
        pipeline.bump_revision();
        Ok(node)
    }

    /// History restore: id uniqueness only, no shape or subflow checks
    pub fn restore_node(&mut self, pipeline_id: &str, node: Node) -> Result<(), ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        if object_id_in_pipeline(pipeline, &node.id) {
            return Err(ModelError::DuplicateId(node.id));
        }
        pipeline.nodes.push(node);
        pipeline.bump_revision();
        Ok(())
    }

    /// History restore: reinserts a node at its captured position.
    pub fn restore_node_at(
        &mut self,
        pipeline_id: &str,
        index: usize,
        node: Node,
    ) -> Result<(), ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        if object_id_in_pipeline(pipeline, &node.id) {
            return Err(ModelError::DuplicateId(node.id));
        }
        let index = index.min(pipeline.nodes.len());
        pipeline.nodes.insert(index, node);
        pipeline.bump_revision();
        Ok(())
    }

    // ---- comment setters ----

    pub fn add_comment(&mut self, pipeline_id: &str, comment: Comment) -> Result<(), ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        if object_id_in_pipeline(pipeline, &comment.id) {
            return Err(ModelError::DuplicateId(comment.id));
        }
        pipeline.comments.push(comment);
        pipeline.bump_revision();
        Ok(())
    }

    pub fn delete_comment(
        &mut self,
        pipeline_id: &str,
        comment_id: &str,
    ) -> Result<Comment, ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        let index = pipeline
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| ModelError::CommentNotFound {
                pipeline_id: pipeline_id.to_string(),
                comment_id: comment_id.to_string(),
            })?;
        let comment = pipeline.comments.remove(index);
        pipeline.bump_revision();
        Ok(comment)
    }

    pub fn restore_comment(
        &mut self,
        pipeline_id: &str,
        comment: Comment,
    ) -> Result<(), ModelError> {
        self.add_comment(pipeline_id, comment)
    }

    /// History restore: reinserts a comment at its captured position.
    pub fn restore_comment_at(
        &mut self,
        pipeline_id: &str,
        index: usize,
        comment: Comment,
    ) -> Result<(), ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        if object_id_in_pipeline(pipeline, &comment.id) {
            return Err(ModelError::DuplicateId(comment.id));
        }
        let index = index.min(pipeline.comments.len());
        pipeline.comments.insert(index, comment);
        pipeline.bump_revision();
        Ok(())
    }

    // ---- link setters ----

    /// Validates and inserts a link. Node-links resolve omitted ports to the
    /// first port on the relevant side, enforce output → input direction,
    /// and reject self-links, duplicates and cardinality overflow. Comment
    /// and association links check endpoint existence and duplicates.
    pub fn add_link(&mut self, pipeline_id: &str, mut link: Link) -> Result<(), ModelError> {
        {
            let pipeline = self.require_pipeline(pipeline_id)?;
            if object_id_in_pipeline(pipeline, &link.id) {
                return Err(ModelError::DuplicateId(link.id));
            }
            match link.kind {
                LinkKind::NodeLink => {
                    let (src_port, trg_port) = validate_node_link(pipeline, &link)?;
                    link.src_port = src_port;
                    link.trg_port = trg_port;
                }
                LinkKind::CommentLink => validate_comment_link(pipeline, &link)?,
                LinkKind::AssociationLink => validate_association_link(pipeline, &link)?,
            }
        }
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        pipeline.links.push(link);
        pipeline.bump_revision();
        Ok(())
    }

    pub fn delete_link(&mut self, pipeline_id: &str, link_id: &str) -> Result<Link, ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        let index = pipeline
            .links
            .iter()
            .position(|l| l.id == link_id)
            .ok_or_else(|| ModelError::LinkNotFound {
                pipeline_id: pipeline_id.to_string(),
                link_id: link_id.to_string(),
            })?;
        let link = pipeline.links.remove(index);
        pipeline.bump_revision();
        Ok(link)
    }

    /// History restore: id uniqueness only. Skips semantic validation so a
    /// captured link can always go back, even when the surrounding document
    /// was over advisory limits when loaded.
    pub fn restore_link(&mut self, pipeline_id: &str, link: Link) -> Result<(), ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        if object_id_in_pipeline(pipeline, &link.id) {
            return Err(ModelError::DuplicateId(link.id));
        }
        pipeline.links.push(link);
        pipeline.bump_revision();
        Ok(())
    }

    /// History restore: reinserts a link at its captured position.
    pub fn restore_link_at(
        &mut self,
        pipeline_id: &str,
        index: usize,
        link: Link,
    ) -> Result<(), ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        if object_id_in_pipeline(pipeline, &link.id) {
            return Err(ModelError::DuplicateId(link.id));
        }
        let index = index.min(pipeline.links.len());
        pipeline.links.insert(index, link);
        pipeline.bump_revision();
        Ok(())
    }

    // ---- object setters ----

    /// Offsets nodes and comments by one delta. Every id must resolve before
    /// anything moves.
    pub fn move_objects(
        &mut self,
        pipeline_id: &str,
        ids: &[String],
        dx: f64,
        dy: f64,
    ) -> Result<(), ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        for id in ids {
            if pipeline.node(id).is_none() && pipeline.comment(id).is_none() {
                return Err(ModelError::ObjectNotFound {
                    pipeline_id: pipeline_id.to_string(),
                    object_id: id.clone(),
                });
            }
        }
        for id in ids {
            if let Some(node) = pipeline.node_mut(id) {
                node.x += dx;
                node.y += dy;
            } else if let Some(comment) = pipeline.comment_mut(id) {
                comment.x += dx;
                comment.y += dy;
            }
        }
        pipeline.bump_revision();
        Ok(())
    }

    /// Replaces an object's geometry and returns the previous one. Comments
    /// keep their size for `None` width/height.
    pub fn set_object_geometry(
        &mut self,
        pipeline_id: &str,
        object_id: &str,
        geometry: ObjectGeometry,
    ) -> Result<ObjectGeometry, ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        if let Some(node) = pipeline.node_mut(object_id) {
            let previous = ObjectGeometry {
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
            };
            node.x = geometry.x;
            node.y = geometry.y;
            node.width = geometry.width;
            node.height = geometry.height;
            pipeline.bump_revision();
            return Ok(previous);
        }
        if let Some(comment) = pipeline.comment_mut(object_id) {
            let previous = ObjectGeometry {
                x: comment.x,
                y: comment.y,
                width: Some(comment.width),
                height: Some(comment.height),
            };
            comment.x = geometry.x;
            comment.y = geometry.y;
            if let Some(width) = geometry.width {
                comment.width = width;
            }
            if let Some(height) = geometry.height {
                comment.height = height;
            }
            pipeline.bump_revision();
            return Ok(previous);
        }
        Err(ModelError::ObjectNotFound {
            pipeline_id: pipeline_id.to_string(),
            object_id: object_id.to_string(),
        })
    }

    /// Returns the previous label
    pub fn set_node_label(
        &mut self,
        pipeline_id: &str,
        node_id: &str,
        label: Option<String>,
    ) -> Result<Option<String>, ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        let node = pipeline
            .node_mut(node_id)
            .ok_or_else(|| ModelError::NodeNotFound {
                pipeline_id: pipeline_id.to_string(),
                node_id: node_id.to_string(),
            })?;
        let previous = std::mem::replace(&mut node.label, label);
        pipeline.bump_revision();
        Ok(previous)
    }

    /// Returns the previous parameters
    pub fn set_node_parameters(
        &mut self,
        pipeline_id: &str,
        node_id: &str,
        parameters: Option<Value>,
    ) -> Result<Option<Value>, ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        let node = pipeline
            .node_mut(node_id)
            .ok_or_else(|| ModelError::NodeNotFound {
                pipeline_id: pipeline_id.to_string(),
                node_id: node_id.to_string(),
            })?;
        let previous = std::mem::replace(&mut node.parameters, parameters);
        pipeline.bump_revision();
        Ok(previous)
    }

    /// Returns the previous content
    pub fn set_comment_content(
        &mut self,
        pipeline_id: &str,
        comment_id: &str,
        content: String,
    ) -> Result<String, ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        let comment = pipeline
            .comment_mut(comment_id)
            .ok_or_else(|| ModelError::CommentNotFound {
                pipeline_id: pipeline_id.to_string(),
                comment_id: comment_id.to_string(),
            })?;
        let previous = std::mem::replace(&mut comment.content, content);
        pipeline.bump_revision();
        Ok(previous)
    }

    /// Returns the previous expansion state
    pub fn set_supernode_expanded(
        &mut self,
        pipeline_id: &str,
        node_id: &str,
        is_expanded: bool,
    ) -> Result<bool, ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        let node = pipeline
            .node_mut(node_id)
            .ok_or_else(|| ModelError::NodeNotFound {
                pipeline_id: pipeline_id.to_string(),
                node_id: node_id.to_string(),
            })?;
        if node.kind != NodeKind::SuperNode {
            return Err(ModelError::NotASuperNode(node_id.to_string()));
        }
        let previous = std::mem::replace(&mut node.is_expanded, is_expanded);
        pipeline.bump_revision();
        Ok(previous)
    }

    /// History replay only; does not count as a mutation itself
    pub fn set_pipeline_revision(
        &mut self,
        pipeline_id: &str,
        revision: u64,
    ) -> Result<(), ModelError> {
        let pipeline = self.require_pipeline_mut(pipeline_id)?;
        pipeline.set_revision(revision);
        Ok(())
    }

    // ---- internal ----

    fn require_pipeline(&self, pipeline_id: &str) -> Result<&Pipeline, ModelError> {
        self.flow
            .pipeline(pipeline_id)
            .ok_or_else(|| ModelError::PipelineNotFound(pipeline_id.to_string()))
    }

    fn require_pipeline_mut(&mut self, pipeline_id: &str) -> Result<&mut Pipeline, ModelError> {
        self.flow
            .pipeline_mut(pipeline_id)
            .ok_or_else(|| ModelError::PipelineNotFound(pipeline_id.to_string()))
    }
}

fn object_id_in_pipeline(pipeline: &Pipeline, id: &str) -> bool {
    pipeline.node(id).is_some() || pipeline.comment(id).is_some() || pipeline.link(id).is_some()
}

fn check_node_shape(node: &Node) -> Result<(), ModelError> {
    match node.kind {
        NodeKind::BindingEntry if !node.inputs.is_empty() => {
            return Err(ModelError::BindingPortShape {
                node_id: node.id.clone(),
                direction: "input",
            });
        }
        NodeKind::BindingExit if !node.outputs.is_empty() => {
            return Err(ModelError::BindingPortShape {
                node_id: node.id.clone(),
                direction: "output",
            });
        }
        _ => {}
    }
    if node.subflow_ref.is_some() && node.kind != NodeKind::SuperNode {
        return Err(ModelError::UnexpectedSubflow(node.id.clone()));
    }
    for port in &node.inputs {
        if node.inputs.iter().filter(|p| p.id == port.id).count() > 1 {
            return Err(ModelError::DuplicateId(port.id.clone()));
        }
    }
    for port in &node.outputs {
        if node.outputs.iter().filter(|p| p.id == port.id).count() > 1 {
            return Err(ModelError::DuplicateId(port.id.clone()));
        }
    }
    Ok(())
}

/// Resolves and checks a node-link against its pipeline; returns the
/// resolved (src_port, trg_port) pair. `None` stays `None` only on a binding
/// endpoint with no ports on the relevant side.
fn validate_node_link(
    pipeline: &Pipeline,
    link: &Link,
) -> Result<(Option<String>, Option<String>), ModelError> {
    if link.src_id == link.trg_id {
        return Err(ModelError::SelfLink(link.src_id.clone()));
    }
    let src = pipeline
        .node(&link.src_id)
        .ok_or_else(|| ModelError::NodeNotFound {
            pipeline_id: pipeline.id.clone(),
            node_id: link.src_id.clone(),
        })?;
    let trg = pipeline
        .node(&link.trg_id)
        .ok_or_else(|| ModelError::NodeNotFound {
            pipeline_id: pipeline.id.clone(),
            node_id: link.trg_id.clone(),
        })?;

    let src_port = resolve_port(src, &link.src_port, &src.outputs, "output")?;
    let trg_port = resolve_port(trg, &link.trg_port, &trg.inputs, "input")?;

    let duplicate = pipeline.links.iter().any(|l| {
        l.kind == LinkKind::NodeLink
            && l.src_id == link.src_id
            && l.src_port == src_port
            && l.trg_id == link.trg_id
            && l.trg_port == trg_port
    });
    if duplicate {
        return Err(ModelError::DuplicateLink {
            src_id: link.src_id.clone(),
            trg_id: link.trg_id.clone(),
        });
    }

    if let Some(port_id) = &trg_port {
        if let Some(port) = trg.input(port_id) {
            let current = pipeline
                .links
                .iter()
                .filter(|l| {
                    l.kind == LinkKind::NodeLink
                        && l.trg_id == trg.id
                        && l.trg_port.as_deref() == Some(port_id.as_str())
                })
                .count();
            if !port.cardinality.allows_another(current) {
                return Err(ModelError::CardinalityExceeded {
                    node_id: trg.id.clone(),
                    port_id: port_id.clone(),
                    max: port.cardinality.max,
                });
            }
        }
    }
    if let Some(port_id) = &src_port {
        if let Some(port) = src.output(port_id) {
            let current = pipeline
                .links
                .iter()
                .filter(|l| {
                    l.kind == LinkKind::NodeLink
                        && l.src_id == src.id
                        && l.src_port.as_deref() == Some(port_id.as_str())
                })
                .count();
            if !port.cardinality.allows_another(current) {
                return Err(ModelError::CardinalityExceeded {
                    node_id: src.id.clone(),
                    port_id: port_id.clone(),
                    max: port.cardinality.max,
                });
            }
        }
    }

    Ok((src_port, trg_port))
}

fn resolve_port(
    node: &Node,
    requested: &Option<String>,
    ports: &[Port],
    direction: &'static str,
) -> Result<Option<String>, ModelError> {
    match requested {
        Some(port_id) => {
            if ports.iter().any(|p| p.id == *port_id) {
                Ok(Some(port_id.clone()))
            } else {
                Err(ModelError::PortNotFound {
                    node_id: node.id.clone(),
                    port_id: port_id.clone(),
                })
            }
        }
        None => match ports.first() {
            Some(port) => Ok(Some(port.id.clone())),
            None if node.kind.is_binding() => Ok(None),
            None => Err(ModelError::NoPorts {
                node_id: node.id.clone(),
                direction,
            }),
        },
    }
}

fn validate_comment_link(pipeline: &Pipeline, link: &Link) -> Result<(), ModelError> {
    if pipeline.comment(&link.src_id).is_none() {
        return Err(ModelError::CommentNotFound {
            pipeline_id: pipeline.id.clone(),
            comment_id: link.src_id.clone(),
        });
    }
    if pipeline.node(&link.trg_id).is_none() {
        return Err(ModelError::NodeNotFound {
            pipeline_id: pipeline.id.clone(),
            node_id: link.trg_id.clone(),
        });
    }
    let duplicate = pipeline
        .links
        .iter()
        .any(|l| l.kind == LinkKind::CommentLink && l.src_id == link.src_id && l.trg_id == link.trg_id);
    if duplicate {
        return Err(ModelError::DuplicateLink {
            src_id: link.src_id.clone(),
            trg_id: link.trg_id.clone(),
        });
    }
    Ok(())
}

fn validate_association_link(pipeline: &Pipeline, link: &Link) -> Result<(), ModelError> {
    if link.src_id == link.trg_id {
        return Err(ModelError::SelfLink(link.src_id.clone()));
    }
    for node_id in [&link.src_id, &link.trg_id] {
        if pipeline.node(node_id).is_none() {
            return Err(ModelError::NodeNotFound {
                pipeline_id: pipeline.id.clone(),
                node_id: node_id.clone(),
            });
        }
    }
    let duplicate = pipeline.links.iter().any(|l| {
        l.kind == LinkKind::AssociationLink && l.src_id == link.src_id && l.trg_id == link.trg_id
    });
    if duplicate {
        return Err(ModelError::DuplicateLink {
            src_id: link.src_id.clone(),
            trg_id: link.trg_id.clone(),
        });
    }
    Ok(())
}

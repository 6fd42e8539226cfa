use pipeflow_model::{Comment, Link, LinkKind, ModelError, Node, ObjectModel, Pipeline};

use super::{require_pipeline, split_objects};

/// Pastes copied material into a pipeline.
///
/// Top-level objects get fresh ids and an offset; links between copied
/// objects are remapped onto the fresh ids; supernode subtrees come along as
/// whole pipelines under fresh pipeline ids. Links that left the copied
/// selection are not part of the material. The old → new id mapping is
/// captured on the first apply, so redo pastes identical ids.
#[derive(Debug, Clone)]
pub struct CloneObjects {
    pipeline_id: String,
    nodes: Vec<Node>,
    comments: Vec<Comment>,
    links: Vec<Link>,
    pipelines: Vec<Pipeline>,
    dx: f64,
    dy: f64,
    cloned_nodes: Vec<Node>,
    cloned_comments: Vec<Comment>,
    cloned_links: Vec<Link>,
    cloned_pipelines: Vec<Pipeline>,
    id_map: Vec<(String, String)>,
    applied: bool,
}

impl CloneObjects {
    /// Copies a selection straight out of a store, keeping the links whose
    /// endpoints are both selected and the sub-pipelines of selected
    /// supernodes.
    pub fn from_selection(
        store: &ObjectModel,
        source_pipeline: &str,
        object_ids: &[String],
        target_pipeline: impl Into<String>,
        dx: f64,
        dy: f64,
    ) -> Result<Self, ModelError> {
        let (node_ids, comment_ids) = split_objects(store, source_pipeline, object_ids)?;
        let nodes: Vec<Node> = store
            .nodes(source_pipeline)
            .into_iter()
            .flatten()
            .filter(|n| node_ids.contains(&n.id))
            .cloned()
            .collect();
        let comments: Vec<Comment> = store
            .comments(source_pipeline)
            .into_iter()
            .flatten()
            .filter(|c| comment_ids.contains(&c.id))
            .cloned()
            .collect();
        let links: Vec<Link> = store
            .links(source_pipeline)
            .into_iter()
            .flatten()
            .filter(|l| match l.kind {
                LinkKind::NodeLink | LinkKind::AssociationLink => {
                    node_ids.contains(&l.src_id) && node_ids.contains(&l.trg_id)
                }
                LinkKind::CommentLink => {
                    comment_ids.contains(&l.src_id) && node_ids.contains(&l.trg_id)
                }
            })
            .cloned()
            .collect();

        let mut pipelines: Vec<Pipeline> = Vec::new();
        for node in &nodes {
            for sub in store.subflow_pipelines(source_pipeline, &node.id) {
                if !pipelines.iter().any(|p| p.id == sub) {
                    if let Some(pipeline) = store.pipeline(&sub) {
                        pipelines.push(pipeline.clone());
                    }
                }
            }
        }

        Ok(Self::from_clipboard(
            target_pipeline,
            nodes,
            comments,
            links,
            pipelines,
            dx,
            dy,
        ))
    }

    /// Builds the action from already-copied material, for pastes across
    /// documents.
    pub fn from_clipboard(
        target_pipeline: impl Into<String>,
        nodes: Vec<Node>,
        comments: Vec<Comment>,
        links: Vec<Link>,
        pipelines: Vec<Pipeline>,
        dx: f64,
        dy: f64,
    ) -> Self {
        Self {
            pipeline_id: target_pipeline.into(),
            nodes,
            comments,
            links,
            pipelines,
            dx,
            dy,
            cloned_nodes: Vec::new(),
            cloned_comments: Vec::new(),
            cloned_links: Vec::new(),
            cloned_pipelines: Vec::new(),
            id_map: Vec::new(),
            applied: false,
        }
    }

    /// Old id → pasted id, once applied.
    pub fn id_map(&self) -> &[(String, String)] {
        &self.id_map
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        require_pipeline(store, &self.pipeline_id)?;
        for node in &self.nodes {
            if let Some(sub) = node.local_subflow() {
                let in_material = self.pipelines.iter().any(|p| p.id == sub);
                if !in_material && store.pipeline(sub).is_none() {
                    return Err(ModelError::MissingSubflow {
                        node_id: node.id.clone(),
                        pipeline_id: sub.to_string(),
                    });
                }
            }
        }

        if !self.applied {
            self.remap(store);
            self.applied = true;
        }

        for pipeline in &self.cloned_pipelines {
            store.add_pipeline(pipeline.clone())?;
        }
        for node in &self.cloned_nodes {
            store.add_node(&self.pipeline_id, node.clone())?;
        }
        for comment in &self.cloned_comments {
            store.add_comment(&self.pipeline_id, comment.clone())?;
        }
        for link in &self.cloned_links {
            store.restore_link(&self.pipeline_id, link.clone())?;
        }
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        for link in self.cloned_links.iter().rev() {
            store.delete_link(&self.pipeline_id, &link.id)?;
        }
        for comment in self.cloned_comments.iter().rev() {
            store.delete_comment(&self.pipeline_id, &comment.id)?;
        }
        for node in self.cloned_nodes.iter().rev() {
            store.delete_node(&self.pipeline_id, &node.id)?;
        }
        for pipeline in self.cloned_pipelines.iter().rev() {
            store.delete_pipeline(&pipeline.id)?;
        }
        Ok(())
    }

    /// First apply only: draws fresh ids and rewrites every reference in the
    /// material onto them.
    fn remap(&mut self, store: &mut ObjectModel) {
        let mut map: Vec<(String, String)> = Vec::new();
        for pipeline in &self.pipelines {
            map.push((pipeline.id.clone(), store.fresh_id()));
        }
        for node in &self.nodes {
            map.push((node.id.clone(), store.fresh_id()));
        }
        for comment in &self.comments {
            map.push((comment.id.clone(), store.fresh_id()));
        }
        for link in &self.links {
            map.push((link.id.clone(), store.fresh_id()));
        }
        let mapped = |id: &str| {
            map.iter()
                .find(|(old, _)| old == id)
                .map(|(_, new)| new.clone())
        };

        self.cloned_pipelines = self
            .pipelines
            .iter()
            .map(|pipeline| {
                let mut clone = pipeline.clone();
                if let Some(new_id) = mapped(&pipeline.id) {
                    clone.id = new_id;
                }
                clone.set_revision(0);
                for node in &mut clone.nodes {
                    remap_subflow(node, &mapped);
                }
                clone
            })
            .collect();
        self.cloned_nodes = self
            .nodes
            .iter()
            .map(|node| {
                let mut clone = node.clone();
                if let Some(new_id) = mapped(&node.id) {
                    clone.id = new_id;
                }
                clone.x += self.dx;
                clone.y += self.dy;
                remap_subflow(&mut clone, &mapped);
                clone
            })
            .collect();
        self.cloned_comments = self
            .comments
            .iter()
            .map(|comment| {
                let mut clone = comment.clone();
                if let Some(new_id) = mapped(&comment.id) {
                    clone.id = new_id;
                }
                clone.x += self.dx;
                clone.y += self.dy;
                clone
            })
            .collect();
        self.cloned_links = self
            .links
            .iter()
            .map(|link| {
                let mut clone = link.clone();
                if let Some(new_id) = mapped(&link.id) {
                    clone.id = new_id;
                }
                if let Some(new_src) = mapped(&link.src_id) {
                    clone.src_id = new_src;
                }
                if let Some(new_trg) = mapped(&link.trg_id) {
                    clone.trg_id = new_trg;
                }
                clone
            })
            .collect();
        self.id_map = map;
    }
}

/// Points a supernode at the pasted copy of its body, when the body is part
/// of the material.
fn remap_subflow(node: &mut Node, mapped: &impl Fn(&str) -> Option<String>) {
    let target = node.local_subflow().and_then(mapped);
    if let Some(new_id) = target {
        if let Some(subflow_ref) = &mut node.subflow_ref {
            subflow_ref.pipeline_id = new_id;
        }
    }
}

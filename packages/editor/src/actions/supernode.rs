use pipeflow_model::{Link, LinkKind, ModelError, Node, ObjectModel, Pipeline, Port};

use super::{require_comment, require_node, split_objects};

/// What happened to a host link the action removed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum LinkFate {
    /// Both endpoints moved, so the link moved into the sub-pipeline as is.
    Moved,
    /// Crossed the boundary as a comment or association link; removed.
    Dropped,
    /// Crossed the boundary as a node link; replaced by a supernode port,
    /// a binding node and a pair of new links.
    Rerouted,
}

#[derive(Debug, Clone)]
struct RemovedLink {
    index: usize,
    link: Link,
    fate: LinkFate,
}

/// Collapses a selection of nodes and comments into a new supernode backed
/// by a new sub-pipeline.
///
/// Node links crossing the boundary are rerouted through generated supernode
/// ports and binding nodes inside the body. Comment and association links
/// crossing the boundary are dropped. Everything is captured, so undo
/// rebuilds the host pipeline exactly and redo regenerates identical ids.
#[derive(Debug, Clone)]
pub struct CreateSuperNode {
    pipeline_id: String,
    object_ids: Vec<String>,
    label: Option<String>,
    sub_pipeline_id: Option<String>,
    supernode: Option<Node>,
    moved_nodes: Vec<(usize, String)>,
    moved_comments: Vec<(usize, String)>,
    removed_links: Vec<RemovedLink>,
    bindings: Vec<Node>,
    host_links: Vec<Link>,
    sub_links: Vec<Link>,
}

impl CreateSuperNode {
    pub fn new(pipeline_id: impl Into<String>, object_ids: Vec<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            object_ids,
            label: None,
            sub_pipeline_id: None,
            supernode: None,
            moved_nodes: Vec::new(),
            moved_comments: Vec::new(),
            removed_links: Vec::new(),
            bindings: Vec::new(),
            host_links: Vec::new(),
            sub_links: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The generated supernode, once applied.
    pub fn supernode(&self) -> Option<&Node> {
        self.supernode.as_ref()
    }

    /// The generated body pipeline id, once applied.
    pub fn sub_pipeline_id(&self) -> Option<&str> {
        self.sub_pipeline_id.as_deref()
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        let (node_ids, comment_ids) = split_objects(store, &self.pipeline_id, &self.object_ids)?;
        if node_ids.is_empty() {
            return Err(ModelError::EmptySelection);
        }
        let first = self.sub_pipeline_id.is_none();
        if first {
            self.plan(store, &node_ids, &comment_ids)?;
        }
        self.run(store, first)
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.sub_pipeline_id.is_some(), "undo before apply");
        let Some(sub_id) = self.sub_pipeline_id.clone() else {
            return Ok(());
        };
        let Some(supernode_id) = self.supernode.as_ref().map(|n| n.id.clone()) else {
            return Ok(());
        };
        let host = self.pipeline_id.clone();

        for link in self.host_links.iter().rev() {
            store.delete_link(&host, &link.id)?;
        }
        store.delete_node(&host, &supernode_id)?;
        for removed in self.removed_links.iter().rev() {
            if removed.fate == LinkFate::Moved {
                store.delete_link(&sub_id, &removed.link.id)?;
            }
            store.restore_link_at(&host, removed.index, removed.link.clone())?;
        }
        for (index, comment_id) in self.moved_comments.iter().rev() {
            let comment = store.delete_comment(&sub_id, comment_id)?;
            store.restore_comment_at(&host, *index, comment)?;
        }
        for (index, node_id) in self.moved_nodes.iter().rev() {
            let node = store.delete_node(&sub_id, node_id)?;
            store.restore_node_at(&host, *index, node)?;
        }
        store.delete_pipeline(&sub_id)?;
        Ok(())
    }

    /// First apply only: decides what moves, what reroutes and what drops,
    /// and generates every id the action will ever use.
    fn plan(
        &mut self,
        store: &mut ObjectModel,
        node_ids: &[String],
        comment_ids: &[String],
    ) -> Result<(), ModelError> {
        let host = self.pipeline_id.clone();
        let sub_id = store.fresh_id();
        let supernode_id = store.fresh_id();

        // Selection order on the canvas is host order.
        self.moved_nodes = store
            .nodes(&host)
            .into_iter()
            .flatten()
            .filter(|n| node_ids.contains(&n.id))
            .map(|n| (0, n.id.clone()))
            .collect();
        self.moved_comments = store
            .comments(&host)
            .into_iter()
            .flatten()
            .filter(|c| comment_ids.contains(&c.id))
            .map(|c| (0, c.id.clone()))
            .collect();

        let links: Vec<Link> = store
            .links(&host)
            .map(|links| links.to_vec())
            .unwrap_or_default();
        let mut incoming = Vec::new();
        let mut outgoing = Vec::new();
        for link in &links {
            let fate = match link.kind {
                LinkKind::NodeLink => {
                    let src_in = node_ids.contains(&link.src_id);
                    let trg_in = node_ids.contains(&link.trg_id);
                    if src_in && trg_in {
                        Some(LinkFate::Moved)
                    } else if trg_in {
                        incoming.push(link.clone());
                        Some(LinkFate::Rerouted)
                    } else if src_in {
                        outgoing.push(link.clone());
                        Some(LinkFate::Rerouted)
                    } else {
                        None
                    }
                }
                LinkKind::CommentLink => {
                    let src_in = comment_ids.contains(&link.src_id);
                    let trg_in = node_ids.contains(&link.trg_id);
                    match (src_in, trg_in) {
                        (true, true) => Some(LinkFate::Moved),
                        (true, false) | (false, true) => Some(LinkFate::Dropped),
                        (false, false) => None,
                    }
                }
                LinkKind::AssociationLink => {
                    let src_in = node_ids.contains(&link.src_id);
                    let trg_in = node_ids.contains(&link.trg_id);
                    match (src_in, trg_in) {
                        (true, true) => Some(LinkFate::Moved),
                        (true, false) | (false, true) => Some(LinkFate::Dropped),
                        (false, false) => None,
                    }
                }
            };
            if let Some(fate) = fate {
                self.removed_links.push(RemovedLink {
                    index: 0,
                    link: link.clone(),
                    fate,
                });
            }
        }

        // The supernode sits at the top-left corner of the selection.
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        for node_id in node_ids {
            let node = require_node(store, &host, node_id)?;
            min_x = min_x.min(node.x);
            min_y = min_y.min(node.y);
        }
        for comment_id in comment_ids {
            let comment = require_comment(store, &host, comment_id)?;
            min_x = min_x.min(comment.x);
            min_y = min_y.min(comment.y);
        }

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for link in &incoming {
            let port_id = store.fresh_id();
            let entry_id = store.fresh_id();
            let anchor = require_node(store, &host, &link.trg_id)?;
            let entry =
                Node::binding_entry(entry_id.clone()).with_position(anchor.x - 150.0, anchor.y);
            inputs.push(Port::input(port_id.clone()));
            self.host_links.push(Link::node(
                store.fresh_id(),
                link.src_id.clone(),
                link.src_port.clone(),
                supernode_id.clone(),
                Some(port_id),
            ));
            self.sub_links.push(Link::node(
                store.fresh_id(),
                entry_id,
                Some("outPort".to_string()),
                link.trg_id.clone(),
                link.trg_port.clone(),
            ));
            self.bindings.push(entry);
        }
        for link in &outgoing {
            let port_id = store.fresh_id();
            let exit_id = store.fresh_id();
            let anchor = require_node(store, &host, &link.src_id)?;
            let exit =
                Node::binding_exit(exit_id.clone()).with_position(anchor.x + 150.0, anchor.y);
            outputs.push(Port::output(port_id.clone()));
            self.sub_links.push(Link::node(
                store.fresh_id(),
                link.src_id.clone(),
                link.src_port.clone(),
                exit_id,
                Some("inPort".to_string()),
            ));
            self.host_links.push(Link::node(
                store.fresh_id(),
                supernode_id.clone(),
                Some(port_id),
                link.trg_id.clone(),
                link.trg_port.clone(),
            ));
            self.bindings.push(exit);
        }

        let mut supernode =
            Node::super_node(supernode_id, sub_id.clone()).with_position(min_x, min_y);
        if let Some(label) = &self.label {
            supernode = supernode.with_label(label.clone());
        }
        supernode.inputs = inputs;
        supernode.outputs = outputs;

        self.sub_pipeline_id = Some(sub_id);
        self.supernode = Some(supernode);
        Ok(())
    }

    /// Executes the captured plan. On the first run link and object positions
    /// are recorded as they are removed, for positional undo.
    fn run(&mut self, store: &mut ObjectModel, first: bool) -> Result<(), ModelError> {
        let Some(sub_id) = self.sub_pipeline_id.clone() else {
            return Ok(());
        };
        let Some(supernode) = self.supernode.clone() else {
            return Ok(());
        };
        let host = self.pipeline_id.clone();

        store.add_pipeline(Pipeline::new(sub_id.clone()))?;
        for entry in &mut self.moved_nodes {
            let index = store
                .nodes(&host)
                .and_then(|nodes| nodes.iter().position(|n| n.id == entry.1))
                .ok_or_else(|| ModelError::NodeNotFound {
                    pipeline_id: host.clone(),
                    node_id: entry.1.clone(),
                })?;
            if first {
                entry.0 = index;
            }
            let node = store.delete_node(&host, &entry.1)?;
            store.restore_node(&sub_id, node)?;
        }
        for entry in &mut self.moved_comments {
            let index = store
                .comments(&host)
                .and_then(|comments| comments.iter().position(|c| c.id == entry.1))
                .ok_or_else(|| ModelError::CommentNotFound {
                    pipeline_id: host.clone(),
                    comment_id: entry.1.clone(),
                })?;
            if first {
                entry.0 = index;
            }
            let comment = store.delete_comment(&host, &entry.1)?;
            store.restore_comment(&sub_id, comment)?;
        }
        for removed in &mut self.removed_links {
            let index = store
                .links(&host)
                .and_then(|links| links.iter().position(|l| l.id == removed.link.id))
                .ok_or_else(|| ModelError::LinkNotFound {
                    pipeline_id: host.clone(),
                    link_id: removed.link.id.clone(),
                })?;
            if first {
                removed.index = index;
            }
            let link = store.delete_link(&host, &removed.link.id)?;
            if removed.fate == LinkFate::Moved {
                store.restore_link(&sub_id, link)?;
            }
        }
        for binding in &self.bindings {
            store.restore_node(&sub_id, binding.clone())?;
        }
        store.add_node(&host, supernode)?;
        for link in &self.host_links {
            store.restore_link(&host, link.clone())?;
        }
        for link in &self.sub_links {
            store.restore_link(&sub_id, link.clone())?;
        }
        Ok(())
    }
}

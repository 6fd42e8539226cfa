use std::collections::HashSet;

use pipeflow_model::{Comment, Link, ModelError, Node, ObjectModel};

use super::require_node;

/// Adds a prebuilt node, usually stamped out from a palette template with
/// `ObjectModel::node_from_template`.
#[derive(Debug, Clone)]
pub struct CreateNode {
    pipeline_id: String,
    node: Node,
}

impl CreateNode {
    pub fn new(pipeline_id: impl Into<String>, node: Node) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            node,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        store.add_node(&self.pipeline_id, self.node.clone())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        store.delete_node(&self.pipeline_id, &self.node.id)?;
        Ok(())
    }
}

/// Adds a comment, optionally attached to nodes through generated comment
/// links.
#[derive(Debug, Clone)]
pub struct CreateComment {
    pipeline_id: String,
    comment: Comment,
    attach_to: Vec<String>,
    links: Vec<Link>,
}

impl CreateComment {
    pub fn new(pipeline_id: impl Into<String>, comment: Comment, attach_to: Vec<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            comment,
            attach_to,
            links: Vec::new(),
        }
    }

    pub fn comment(&self) -> &Comment {
        &self.comment
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for node_id in &self.attach_to {
            require_node(store, &self.pipeline_id, node_id)?;
            if !seen.insert(node_id.as_str()) {
                return Err(ModelError::DuplicateLink {
                    src_id: self.comment.id.clone(),
                    trg_id: node_id.clone(),
                });
            }
        }
        store.add_comment(&self.pipeline_id, self.comment.clone())?;
        if self.links.is_empty() {
            self.links = self
                .attach_to
                .iter()
                .map(|node_id| {
                    Link::comment(store.fresh_id(), self.comment.id.clone(), node_id.clone())
                })
                .collect();
        }
        for link in &self.links {
            store.restore_link(&self.pipeline_id, link.clone())?;
        }
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        for link in self.links.iter().rev() {
            store.delete_link(&self.pipeline_id, &link.id)?;
        }
        store.delete_comment(&self.pipeline_id, &self.comment.id)?;
        Ok(())
    }
}

/// Connects two node ports. Omitted ports resolve to the first port on the
/// relevant side; the resolved link is captured so redo recreates it exactly.
#[derive(Debug, Clone)]
pub struct CreateNodeLink {
    pipeline_id: String,
    src_id: String,
    src_port: Option<String>,
    trg_id: String,
    trg_port: Option<String>,
    created: Option<Link>,
}

impl CreateNodeLink {
    pub fn new(
        pipeline_id: impl Into<String>,
        src_id: impl Into<String>,
        trg_id: impl Into<String>,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            src_id: src_id.into(),
            src_port: None,
            trg_id: trg_id.into(),
            trg_port: None,
            created: None,
        }
    }

    pub fn with_src_port(mut self, port_id: impl Into<String>) -> Self {
        self.src_port = Some(port_id.into());
        self
    }

    pub fn with_trg_port(mut self, port_id: impl Into<String>) -> Self {
        self.trg_port = Some(port_id.into());
        self
    }

    /// The link as it went into the document, ports resolved.
    pub fn created(&self) -> Option<&Link> {
        self.created.as_ref()
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        match &self.created {
            Some(link) => store.restore_link(&self.pipeline_id, link.clone()),
            None => {
                let id = store.fresh_id();
                let link = Link::node(
                    id.clone(),
                    self.src_id.clone(),
                    self.src_port.clone(),
                    self.trg_id.clone(),
                    self.trg_port.clone(),
                );
                store.add_link(&self.pipeline_id, link)?;
                self.created = store.link(&self.pipeline_id, &id).cloned();
                Ok(())
            }
        }
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.created.is_some(), "undo before apply");
        let Some(link) = &self.created else {
            return Ok(());
        };
        store.delete_link(&self.pipeline_id, &link.id)?;
        Ok(())
    }
}

/// Attaches an existing comment to a node.
#[derive(Debug, Clone)]
pub struct CreateCommentLink {
    pipeline_id: String,
    comment_id: String,
    node_id: String,
    created: Option<Link>,
}

impl CreateCommentLink {
    pub fn new(
        pipeline_id: impl Into<String>,
        comment_id: impl Into<String>,
        node_id: impl Into<String>,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            comment_id: comment_id.into(),
            node_id: node_id.into(),
            created: None,
        }
    }

    pub fn created(&self) -> Option<&Link> {
        self.created.as_ref()
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        match &self.created {
            Some(link) => store.restore_link(&self.pipeline_id, link.clone()),
            None => {
                let id = store.fresh_id();
                let link = Link::comment(id.clone(), self.comment_id.clone(), self.node_id.clone());
                store.add_link(&self.pipeline_id, link)?;
                self.created = store.link(&self.pipeline_id, &id).cloned();
                Ok(())
            }
        }
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.created.is_some(), "undo before apply");
        let Some(link) = &self.created else {
            return Ok(());
        };
        store.delete_link(&self.pipeline_id, &link.id)?;
        Ok(())
    }
}

/// Draws an association between two nodes.
#[derive(Debug, Clone)]
pub struct CreateAssociationLink {
    pipeline_id: String,
    src_id: String,
    trg_id: String,
    created: Option<Link>,
}

impl CreateAssociationLink {
    pub fn new(
        pipeline_id: impl Into<String>,
        src_id: impl Into<String>,
        trg_id: impl Into<String>,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            src_id: src_id.into(),
            trg_id: trg_id.into(),
            created: None,
        }
    }

    pub fn created(&self) -> Option<&Link> {
        self.created.as_ref()
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        match &self.created {
            Some(link) => store.restore_link(&self.pipeline_id, link.clone()),
            None => {
                let id = store.fresh_id();
                let link = Link::association(id.clone(), self.src_id.clone(), self.trg_id.clone());
                store.add_link(&self.pipeline_id, link)?;
                self.created = store.link(&self.pipeline_id, &id).cloned();
                Ok(())
            }
        }
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.created.is_some(), "undo before apply");
        let Some(link) = &self.created else {
            return Ok(());
        };
        store.delete_link(&self.pipeline_id, &link.id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use pipeflow_model::{ObjectModel, PipelineFlow};

    fn two_node_store() -> ObjectModel {
        let mut store = ObjectModel::new(PipelineFlow::new("flow", "p1"));
        store
            .add_node("p1", Node::execution("n1", "filter"))
            .unwrap();
        store
            .add_node("p1", Node::execution("n2", "select"))
            .unwrap();
        store
    }

    #[test]
    fn test_create_node_round_trip() {
        let mut store = two_node_store();
        let before = store.flow().clone();

        let mut action: Action =
            CreateNode::new("p1", Node::execution("n3", "join").with_position(40.0, 80.0)).into();
        action.apply(&mut store).unwrap();
        assert!(store.node("p1", "n3").is_some());

        action.undo(&mut store).unwrap();
        store.set_pipeline_revision("p1", before.pipeline("p1").unwrap().revision()).unwrap();
        assert_eq!(*store.flow(), before);
    }

    #[test]
    fn test_create_node_link_resolves_first_ports() {
        let mut store = two_node_store();
        let mut action = CreateNodeLink::new("p1", "n1", "n2");
        action.apply(&mut store).unwrap();

        let link = action.created().unwrap();
        assert_eq!(link.src_port.as_deref(), Some("outPort"));
        assert_eq!(link.trg_port.as_deref(), Some("inPort"));
    }

    #[test]
    fn test_create_node_link_redo_reuses_id() {
        let mut store = two_node_store();
        let mut action = CreateNodeLink::new("p1", "n1", "n2");
        action.apply(&mut store).unwrap();
        let first_id = action.created().unwrap().id.clone();

        action.undo(&mut store).unwrap();
        action.apply(&mut store).unwrap();
        assert_eq!(action.created().unwrap().id, first_id);
        assert!(store.link("p1", &first_id).is_some());
    }

    #[test]
    fn test_create_comment_attaches_and_undoes() {
        let mut store = two_node_store();
        let comment = Comment::new("c1", "check the join keys");
        let mut action = CreateComment::new(
            "p1",
            comment,
            vec!["n1".to_string(), "n2".to_string()],
        );
        action.apply(&mut store).unwrap();
        assert_eq!(store.links("p1").unwrap().len(), 2);

        action.undo(&mut store).unwrap();
        assert!(store.comment("p1", "c1").is_none());
        assert!(store.links("p1").unwrap().is_empty());
    }

    #[test]
    fn test_create_comment_rejects_missing_target_before_mutating() {
        let mut store = two_node_store();
        let before = store.flow().clone();
        let mut action = CreateComment::new(
            "p1",
            Comment::new("c1", "dangling"),
            vec!["n1".to_string(), "ghost".to_string()],
        );
        assert!(action.apply(&mut store).is_err());
        assert_eq!(*store.flow(), before);
    }

    #[test]
    fn test_create_association_rejects_duplicate() {
        let mut store = two_node_store();
        let mut first = CreateAssociationLink::new("p1", "n1", "n2");
        first.apply(&mut store).unwrap();

        let mut second = CreateAssociationLink::new("p1", "n1", "n2");
        assert!(matches!(
            second.apply(&mut store),
            Err(ModelError::DuplicateLink { .. })
        ));
    }
}

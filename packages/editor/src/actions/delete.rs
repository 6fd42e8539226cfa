use std::collections::HashSet;

use pipeflow_model::{Comment, Link, ModelError, Node, ObjectModel, Pipeline};

use super::{link_index, split_objects};

/// Removes one link.
#[derive(Debug, Clone)]
pub struct DeleteLink {
    pipeline_id: String,
    link_id: String,
    removed: Option<(usize, Link)>,
}

impl DeleteLink {
    pub fn new(pipeline_id: impl Into<String>, link_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            link_id: link_id.into(),
            removed: None,
        }
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        let index = link_index(store, &self.pipeline_id, &self.link_id)?;
        let link = store.delete_link(&self.pipeline_id, &self.link_id)?;
        self.removed = Some((index, link));
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.removed.is_some(), "undo before apply");
        let Some((index, link)) = &self.removed else {
            return Ok(());
        };
        store.restore_link_at(&self.pipeline_id, *index, link.clone())
    }
}

/// Removes every link touching the given nodes and comments, leaving the
/// objects in place.
#[derive(Debug, Clone)]
pub struct DisconnectObjects {
    pipeline_id: String,
    object_ids: Vec<String>,
    removed: Vec<(usize, Link)>,
    applied: bool,
}

impl DisconnectObjects {
    pub fn new(pipeline_id: impl Into<String>, object_ids: Vec<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            object_ids,
            removed: Vec::new(),
            applied: false,
        }
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        split_objects(store, &self.pipeline_id, &self.object_ids)?;
        if !self.applied {
            let ids: Vec<&str> = self.object_ids.iter().map(String::as_str).collect();
            for link in store.attached_links(&self.pipeline_id, &ids) {
                let index = link_index(store, &self.pipeline_id, &link.id)?;
                let link = store.delete_link(&self.pipeline_id, &link.id)?;
                self.removed.push((index, link));
            }
            self.applied = true;
        } else {
            for (_, link) in &self.removed {
                store.delete_link(&self.pipeline_id, &link.id)?;
            }
        }
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        for (index, link) in self.removed.iter().rev() {
            store.restore_link_at(&self.pipeline_id, *index, link.clone())?;
        }
        Ok(())
    }
}

/// Removes nodes and comments together with their attached links, plus any
/// supernode sub-pipelines that nothing else references afterwards.
///
/// Everything removed is captured with its position, and undo reinserts in
/// reverse: pipelines, then nodes and comments, then links.
#[derive(Debug, Clone)]
pub struct DeleteObjects {
    pipeline_id: String,
    object_ids: Vec<String>,
    links: Vec<(usize, Link)>,
    comments: Vec<(usize, Comment)>,
    nodes: Vec<(usize, Node)>,
    pipelines: Vec<(usize, Pipeline)>,
    applied: bool,
}

impl DeleteObjects {
    pub fn new(pipeline_id: impl Into<String>, object_ids: Vec<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            object_ids,
            links: Vec::new(),
            comments: Vec::new(),
            nodes: Vec::new(),
            pipelines: Vec::new(),
            applied: false,
        }
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        let (node_ids, comment_ids) = split_objects(store, &self.pipeline_id, &self.object_ids)?;
        if !self.applied {
            let ids: Vec<&str> = self.object_ids.iter().map(String::as_str).collect();
            let attached: Vec<String> = store
                .attached_links(&self.pipeline_id, &ids)
                .into_iter()
                .map(|l| l.id)
                .collect();
            let doomed = doomed_subflows(store, &self.pipeline_id, &node_ids);

            for link_id in &attached {
                let index = link_index(store, &self.pipeline_id, link_id)?;
                let link = store.delete_link(&self.pipeline_id, link_id)?;
                self.links.push((index, link));
            }
            for comment_id in &comment_ids {
                let index = comment_index(store, &self.pipeline_id, comment_id)?;
                let comment = store.delete_comment(&self.pipeline_id, comment_id)?;
                self.comments.push((index, comment));
            }
            for node_id in &node_ids {
                let index = node_index(store, &self.pipeline_id, node_id)?;
                let node = store.delete_node(&self.pipeline_id, node_id)?;
                self.nodes.push((index, node));
            }
            for pipeline_id in &doomed {
                let index = store
                    .pipeline_index(pipeline_id)
                    .ok_or_else(|| ModelError::PipelineNotFound(pipeline_id.clone()))?;
                let pipeline = store.delete_pipeline(pipeline_id)?;
                self.pipelines.push((index, pipeline));
            }
            self.applied = true;
        } else {
            for (_, link) in &self.links {
                store.delete_link(&self.pipeline_id, &link.id)?;
            }
            for (_, comment) in &self.comments {
                store.delete_comment(&self.pipeline_id, &comment.id)?;
            }
            for (_, node) in &self.nodes {
                store.delete_node(&self.pipeline_id, &node.id)?;
            }
            for (_, pipeline) in &self.pipelines {
                store.delete_pipeline(&pipeline.id)?;
            }
        }
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        for (index, pipeline) in self.pipelines.iter().rev() {
            store.insert_pipeline_at(*index, pipeline.clone())?;
        }
        for (index, node) in self.nodes.iter().rev() {
            store.restore_node_at(&self.pipeline_id, *index, node.clone())?;
        }
        for (index, comment) in self.comments.iter().rev() {
            store.restore_comment_at(&self.pipeline_id, *index, comment.clone())?;
        }
        for (index, link) in self.links.iter().rev() {
            store.restore_link_at(&self.pipeline_id, *index, link.clone())?;
        }
        Ok(())
    }
}

fn node_index(store: &ObjectModel, pipeline_id: &str, node_id: &str) -> Result<usize, ModelError> {
    store
        .nodes(pipeline_id)
        .and_then(|nodes| nodes.iter().position(|n| n.id == node_id))
        .ok_or_else(|| ModelError::NodeNotFound {
            pipeline_id: pipeline_id.to_string(),
            node_id: node_id.to_string(),
        })
}

fn comment_index(
    store: &ObjectModel,
    pipeline_id: &str,
    comment_id: &str,
) -> Result<usize, ModelError> {
    store
        .comments(pipeline_id)
        .and_then(|comments| comments.iter().position(|c| c.id == comment_id))
        .ok_or_else(|| ModelError::CommentNotFound {
            pipeline_id: pipeline_id.to_string(),
            comment_id: comment_id.to_string(),
        })
}

/// Sub-pipelines that become unreferenced once the given nodes are gone.
///
/// Starts from the subflow trees of the deleted supernodes, then drops any
/// candidate that is still reachable from a surviving supernode. A candidate
/// survives referrers that are themselves inside doomed pipelines, so whole
/// trees go at once. The primary pipeline and the host pipeline are never
/// candidates.
fn doomed_subflows(store: &ObjectModel, pipeline_id: &str, node_ids: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for node_id in node_ids {
        for sub in store.subflow_pipelines(pipeline_id, node_id) {
            if !candidates.contains(&sub) {
                candidates.push(sub);
            }
        }
    }

    let mut doomed: HashSet<String> = candidates.iter().cloned().collect();
    doomed.remove(&store.flow().primary_pipeline);
    doomed.remove(pipeline_id);
    loop {
        let mut changed = false;
        for candidate in &candidates {
            if !doomed.contains(candidate) {
                continue;
            }
            let referenced = store
                .subflow_referrers(candidate)
                .iter()
                .any(|(owner, node_id)| {
                    let deleted = owner == pipeline_id && node_ids.contains(node_id);
                    !deleted && !doomed.contains(owner)
                });
            if referenced {
                doomed.remove(candidate);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    candidates.retain(|c| doomed.contains(c));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeflow_model::{Node, PipelineFlow};

    fn linked_store() -> ObjectModel {
        let mut store = ObjectModel::new(PipelineFlow::new("flow", "p1"));
        store
            .add_node("p1", Node::execution("n1", "filter"))
            .unwrap();
        store
            .add_node("p1", Node::execution("n2", "select"))
            .unwrap();
        store
            .add_node("p1", Node::execution("n3", "join"))
            .unwrap();
        store
            .add_link("p1", Link::node("l1", "n1", None, "n2", None))
            .unwrap();
        store
            .add_link("p1", Link::node("l2", "n2", None, "n3", None))
            .unwrap();
        store
    }

    #[test]
    fn test_delete_link_restores_position() {
        let mut store = linked_store();
        let before = store.flow().clone();

        let mut action = DeleteLink::new("p1", "l1");
        action.apply(&mut store).unwrap();
        assert_eq!(store.links("p1").unwrap()[0].id, "l2");

        action.undo(&mut store).unwrap();
        store.set_pipeline_revision("p1", before.pipeline("p1").unwrap().revision()).unwrap();
        assert_eq!(*store.flow(), before);
    }

    #[test]
    fn test_delete_objects_captures_attached_links() {
        let mut store = linked_store();
        let mut action = DeleteObjects::new("p1", vec!["n2".to_string()]);
        action.apply(&mut store).unwrap();

        assert!(store.node("p1", "n2").is_none());
        assert!(store.links("p1").unwrap().is_empty());

        action.undo(&mut store).unwrap();
        assert!(store.node("p1", "n2").is_some());
        let link_ids: Vec<&str> = store
            .links("p1")
            .unwrap()
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(link_ids, vec!["l1", "l2"]);
    }

    #[test]
    fn test_delete_supernode_takes_unreferenced_subtree() {
        let mut store = linked_store();
        store.add_pipeline(Pipeline::new("sub")).unwrap();
        store.add_node("p1", Node::super_node("s1", "sub")).unwrap();

        let mut action = DeleteObjects::new("p1", vec!["s1".to_string()]);
        action.apply(&mut store).unwrap();
        assert!(store.pipeline("sub").is_none());

        action.undo(&mut store).unwrap();
        assert!(store.pipeline("sub").is_some());
        assert!(store.node("p1", "s1").is_some());
    }

    #[test]
    fn test_delete_supernode_keeps_shared_subtree() {
        let mut store = linked_store();
        store.add_pipeline(Pipeline::new("sub")).unwrap();
        store.add_node("p1", Node::super_node("s1", "sub")).unwrap();
        store.add_node("p1", Node::super_node("s2", "sub")).unwrap();

        let mut action = DeleteObjects::new("p1", vec!["s1".to_string()]);
        action.apply(&mut store).unwrap();
        assert!(store.pipeline("sub").is_some());
        assert!(store.node("p1", "s2").is_some());
    }

    #[test]
    fn test_delete_both_referrers_takes_subtree() {
        let mut store = linked_store();
        store.add_pipeline(Pipeline::new("sub")).unwrap();
        store.add_node("p1", Node::super_node("s1", "sub")).unwrap();
        store.add_node("p1", Node::super_node("s2", "sub")).unwrap();

        let mut action =
            DeleteObjects::new("p1", vec!["s1".to_string(), "s2".to_string()]);
        action.apply(&mut store).unwrap();
        assert!(store.pipeline("sub").is_none());
    }

    #[test]
    fn test_disconnect_keeps_objects() {
        let mut store = linked_store();
        let mut action = DisconnectObjects::new("p1", vec!["n2".to_string()]);
        action.apply(&mut store).unwrap();

        assert!(store.links("p1").unwrap().is_empty());
        assert!(store.node("p1", "n2").is_some());

        action.undo(&mut store).unwrap();
        assert_eq!(store.links("p1").unwrap().len(), 2);
    }

    #[test]
    fn test_delete_unknown_object_leaves_store_untouched() {
        let mut store = linked_store();
        let before = store.flow().clone();
        let mut action = DeleteObjects::new("p1", vec!["n1".to_string(), "ghost".to_string()]);
        assert!(action.apply(&mut store).is_err());
        assert_eq!(*store.flow(), before);
    }
}

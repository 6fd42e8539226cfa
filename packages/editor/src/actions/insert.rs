use pipeflow_model::{Link, LinkKind, ModelError, Node, ObjectModel};

use super::{link_index, require_node};

/// Splices a node into an existing node link: the original link is removed
/// and replaced by source → node and node → target, and the node is offset to
/// sit on the old path.
///
/// The replacement must fit even on ports that are already at their limit,
/// because the removed link frees one slot on each original endpoint. The
/// precondition checks count links with the original excluded for exactly
/// that reason.
#[derive(Debug, Clone)]
pub struct InsertNodeIntoLink {
    pipeline_id: String,
    link_id: String,
    node_id: String,
    dx: f64,
    dy: f64,
    removed: Option<(usize, Link)>,
    first: Option<Link>,
    second: Option<Link>,
}

impl InsertNodeIntoLink {
    pub fn new(
        pipeline_id: impl Into<String>,
        link_id: impl Into<String>,
        node_id: impl Into<String>,
        dx: f64,
        dy: f64,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            link_id: link_id.into(),
            node_id: node_id.into(),
            dx,
            dy,
            removed: None,
            first: None,
            second: None,
        }
    }

    /// The two links standing in for the original, once applied.
    pub fn created(&self) -> Option<(&Link, &Link)> {
        Some((self.first.as_ref()?, self.second.as_ref()?))
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        let index = link_index(store, &self.pipeline_id, &self.link_id)?;
        let original = require_link_value(store, &self.pipeline_id, &self.link_id)?;
        if original.kind != LinkKind::NodeLink {
            return Err(ModelError::NotANodeLink(self.link_id.clone()));
        }
        let node = require_node(store, &self.pipeline_id, &self.node_id)?.clone();
        if node.id == original.src_id || node.id == original.trg_id {
            return Err(ModelError::SelfLink(node.id));
        }

        let node_in = first_port(&node, true)?;
        let node_out = first_port(&node, false)?;
        self.check_insert_capacity(store, &original, &node, &node_in, &node_out)?;

        if self.removed.is_none() {
            self.removed = Some((index, original.clone()));
        }
        if self.first.is_none() {
            self.first = Some(Link::node(
                store.fresh_id(),
                original.src_id.clone(),
                original.src_port.clone(),
                self.node_id.clone(),
                node_in,
            ));
            self.second = Some(Link::node(
                store.fresh_id(),
                self.node_id.clone(),
                node_out,
                original.trg_id.clone(),
                original.trg_port.clone(),
            ));
        }

        store.delete_link(&self.pipeline_id, &self.link_id)?;
        store.move_objects(
            &self.pipeline_id,
            std::slice::from_ref(&self.node_id),
            self.dx,
            self.dy,
        )?;
        if let (Some(first), Some(second)) = (&self.first, &self.second) {
            store.restore_link(&self.pipeline_id, first.clone())?;
            store.restore_link(&self.pipeline_id, second.clone())?;
        }
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.removed.is_some(), "undo before apply");
        let Some((index, original)) = &self.removed else {
            return Ok(());
        };
        if let (Some(first), Some(second)) = (&self.first, &self.second) {
            store.delete_link(&self.pipeline_id, &second.id)?;
            store.delete_link(&self.pipeline_id, &first.id)?;
        }
        store.move_objects(
            &self.pipeline_id,
            std::slice::from_ref(&self.node_id),
            -self.dx,
            -self.dy,
        )?;
        store.restore_link_at(&self.pipeline_id, *index, original.clone())
    }

    /// Rejects the splice when a port cannot take its replacement link. The
    /// original link is counted out on its own endpoints.
    fn check_insert_capacity(
        &self,
        store: &ObjectModel,
        original: &Link,
        node: &Node,
        node_in: &Option<String>,
        node_out: &Option<String>,
    ) -> Result<(), ModelError> {
        if let Some(port_id) = node_in {
            if let Some(port) = node.input(port_id) {
                let current = store.input_link_count(&self.pipeline_id, &node.id, port_id);
                if !port.cardinality.allows_another(current) {
                    return Err(ModelError::CardinalityExceeded {
                        node_id: node.id.clone(),
                        port_id: port_id.clone(),
                        max: port.cardinality.max,
                    });
                }
            }
        }
        if let Some(port_id) = node_out {
            if let Some(port) = node.output(port_id) {
                let current = store.output_link_count(&self.pipeline_id, &node.id, port_id);
                if !port.cardinality.allows_another(current) {
                    return Err(ModelError::CardinalityExceeded {
                        node_id: node.id.clone(),
                        port_id: port_id.clone(),
                        max: port.cardinality.max,
                    });
                }
            }
        }

        let duplicate = store
            .links(&self.pipeline_id)
            .into_iter()
            .flatten()
            .filter(|l| l.kind == LinkKind::NodeLink && l.id != original.id)
            .any(|l| {
                (l.src_id == original.src_id
                    && l.src_port == original.src_port
                    && l.trg_id == self.node_id
                    && l.trg_port == *node_in)
                    || (l.src_id == self.node_id
                        && l.src_port == *node_out
                        && l.trg_id == original.trg_id
                        && l.trg_port == original.trg_port)
            });
        if duplicate {
            return Err(ModelError::DuplicateLink {
                src_id: original.src_id.clone(),
                trg_id: original.trg_id.clone(),
            });
        }
        Ok(())
    }
}

fn require_link_value(
    store: &ObjectModel,
    pipeline_id: &str,
    link_id: &str,
) -> Result<Link, ModelError> {
    store
        .link(pipeline_id, link_id)
        .cloned()
        .ok_or_else(|| ModelError::LinkNotFound {
            pipeline_id: pipeline_id.to_string(),
            link_id: link_id.to_string(),
        })
}

/// First port on the given side, `None` for a binding node without ports on
/// that side.
fn first_port(node: &Node, input: bool) -> Result<Option<String>, ModelError> {
    let ports = if input { &node.inputs } else { &node.outputs };
    match ports.first() {
        Some(port) => Ok(Some(port.id.clone())),
        None if node.kind.is_binding() => Ok(None),
        None => Err(ModelError::NoPorts {
            node_id: node.id.clone(),
            direction: if input { "input" } else { "output" },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeflow_model::{PipelineFlow, Port};

    fn spliceable_store() -> ObjectModel {
        let mut store = ObjectModel::new(PipelineFlow::new("flow", "p1"));
        store
            .add_node("p1", Node::execution("n1", "read").with_position(0.0, 0.0))
            .unwrap();
        store
            .add_node(
                "p1",
                Node::execution("n2", "write").with_position(400.0, 0.0),
            )
            .unwrap();
        store
            .add_node(
                "p1",
                Node::execution("n3", "filter").with_position(100.0, 300.0),
            )
            .unwrap();
        store
            .add_link("p1", Link::node("l1", "n1", None, "n2", None))
            .unwrap();
        store
    }

    #[test]
    fn test_insert_replaces_link_with_two() {
        let mut store = spliceable_store();
        let mut action = InsertNodeIntoLink::new("p1", "l1", "n3", 100.0, -300.0);
        action.apply(&mut store).unwrap();

        assert!(store.link("p1", "l1").is_none());
        let (first, second) = action.created().unwrap();
        assert_eq!((first.src_id.as_str(), first.trg_id.as_str()), ("n1", "n3"));
        assert_eq!(
            (second.src_id.as_str(), second.trg_id.as_str()),
            ("n3", "n2")
        );
        assert_eq!(store.node("p1", "n3").unwrap().x, 200.0);
    }

    #[test]
    fn test_insert_undo_restores_exactly() {
        let mut store = spliceable_store();
        let before = store.flow().clone();
        let revision = before.pipeline("p1").unwrap().revision();

        let mut action = InsertNodeIntoLink::new("p1", "l1", "n3", 100.0, -300.0);
        action.apply(&mut store).unwrap();
        action.undo(&mut store).unwrap();
        store.set_pipeline_revision("p1", revision).unwrap();
        assert_eq!(*store.flow(), before);
    }

    #[test]
    fn test_insert_fits_on_full_input_port() {
        // n2's input takes one link and already carries l1. Splicing into l1
        // must still work since l1 itself is replaced.
        let mut store = spliceable_store();
        let port = store.node("p1", "n2").unwrap().inputs[0].clone();
        assert_eq!(port.cardinality.max, 1);

        let mut action = InsertNodeIntoLink::new("p1", "l1", "n3", 0.0, 0.0);
        action.apply(&mut store).unwrap();
        assert_eq!(store.links("p1").unwrap().len(), 2);
    }

    #[test]
    fn test_insert_rejects_full_insert_node() {
        let mut store = spliceable_store();
        store
            .add_node(
                "p1",
                Node::new("n4", pipeflow_model::NodeKind::Execution)
                    .with_input(Port::input("in").with_cardinality(0, 1))
                    .with_output(Port::output("out")),
            )
            .unwrap();
        store
            .add_link("p1", Link::node("l2", "n3", None, "n4", None))
            .unwrap();

        // n4's only input is occupied by l2, which the splice does not touch.
        let mut action = InsertNodeIntoLink::new("p1", "l1", "n4", 0.0, 0.0);
        assert!(matches!(
            action.apply(&mut store),
            Err(ModelError::CardinalityExceeded { .. })
        ));
        assert!(store.link("p1", "l1").is_some());
    }

    #[test]
    fn test_insert_rejects_endpoint_node() {
        let mut store = spliceable_store();
        let mut action = InsertNodeIntoLink::new("p1", "l1", "n1", 0.0, 0.0);
        assert!(matches!(
            action.apply(&mut store),
            Err(ModelError::SelfLink(_))
        ));
    }

    #[test]
    fn test_insert_redo_reuses_link_ids() {
        let mut store = spliceable_store();
        let mut action = InsertNodeIntoLink::new("p1", "l1", "n3", 50.0, 0.0);
        action.apply(&mut store).unwrap();
        let (first_id, second_id) = {
            let (first, second) = action.created().unwrap();
            (first.id.clone(), second.id.clone())
        };

        action.undo(&mut store).unwrap();
        action.apply(&mut store).unwrap();
        assert!(store.link("p1", &first_id).is_some());
        assert!(store.link("p1", &second_id).is_some());
    }
}

//! # Flow Editor
//!
//! The session object a host embeds: one document, one store, one command
//! stack. Documents enter through [`FlowEditor::open`], which upgrades older
//! schema versions and validates, and leave through [`FlowEditor::save`].

use serde_json::Value;
use tracing::{debug, warn};

use pipeflow_model::{ObjectModel, PipelineFlow};
use pipeflow_validator::{ensure_valid, validate_flow, Diagnostic, ValidateOptions};

use crate::actions::Action;
use crate::command_stack::CommandStack;
use crate::error::EditError;

/// How much a document has to satisfy to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Error-level diagnostics reject the document.
    #[default]
    Strict,
    /// Diagnostics are logged and the document loads anyway. Editing
    /// proceeds on a best-effort basis; saving reproduces the flaws.
    Advisory,
}

/// An editing session over one flow document.
#[derive(Debug)]
pub struct FlowEditor {
    store: ObjectModel,
    stack: CommandStack,
}

impl FlowEditor {
    /// Starts a session over an in-memory flow, for documents built
    /// programmatically.
    pub fn new(flow: PipelineFlow) -> Self {
        Self {
            store: ObjectModel::new(flow),
            stack: CommandStack::new(),
        }
    }

    /// Loads a serialized document: runs the schema upgrader, deserializes
    /// and validates according to `mode`.
    pub fn open(document: Value, mode: ValidationMode) -> Result<Self, EditError> {
        let document = pipeflow_migrate::upgrade(document)?;
        let flow = PipelineFlow::from_value(document)?;
        match mode {
            ValidationMode::Strict => ensure_valid(&flow)?,
            ValidationMode::Advisory => {
                for diagnostic in validate_flow(&flow, ValidateOptions::default()) {
                    warn!(
                        rule = diagnostic.rule.as_str(),
                        pipeline = diagnostic.pipeline_id.as_deref().unwrap_or("-"),
                        "{}",
                        diagnostic.message
                    );
                }
            }
        }
        debug!(flow = flow.id.as_str(), "opened document");
        Ok(Self::new(flow))
    }

    /// Serializes the current document.
    pub fn save(&self) -> Result<Value, EditError> {
        Ok(self.store.flow().to_value()?)
    }

    pub fn store(&self) -> &ObjectModel {
        &self.store
    }

    pub fn flow(&self) -> &PipelineFlow {
        self.store.flow()
    }

    /// Stamps a palette template into a placeable node with a fresh id.
    pub fn node_from_template(
        &mut self,
        template: &pipeflow_model::Node,
        x: f64,
        y: f64,
    ) -> pipeflow_model::Node {
        self.store.node_from_template(template, x, y)
    }

    /// Applies an action through the command stack.
    pub fn execute(&mut self, action: Action) -> Result<(), EditError> {
        let label = action.label();
        match self.stack.execute(action, &mut self.store) {
            Ok(()) => {
                debug!(action = label, "executed");
                Ok(())
            }
            Err(error) => {
                warn!(action = label, %error, "action rejected");
                Err(error.into())
            }
        }
    }

    /// Reverts the most recent action. `Ok(false)` when history is empty.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        let label = self.stack.undo_label();
        let undone = self.stack.undo(&mut self.store)?;
        if undone {
            debug!(action = label.unwrap_or("?"), "undone");
        }
        Ok(undone)
    }

    /// Reapplies the most recently undone action. `Ok(false)` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        let label = self.stack.redo_label();
        let redone = self.stack.redo(&mut self.store)?;
        if redone {
            debug!(action = label.unwrap_or("?"), "redone");
        }
        Ok(redone)
    }

    /// Reverts up to `count` actions, returning how many were undone.
    pub fn undo_multi(&mut self, count: usize) -> Result<usize, EditError> {
        Ok(self.stack.undo_multi(count, &mut self.store)?)
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    pub fn undo_label(&self) -> Option<&'static str> {
        self.stack.undo_label()
    }

    pub fn redo_label(&self) -> Option<&'static str> {
        self.stack.redo_label()
    }

    /// The last executed action with its captures, for reading generated ids.
    pub fn last_action(&self) -> Option<&Action> {
        self.stack.last_action()
    }

    /// Runs the default rule set over the current document.
    pub fn validate(&self) -> Vec<Diagnostic> {
        validate_flow(self.store.flow(), ValidateOptions::default())
    }

    /// Drops undo/redo history, typically on document switches.
    pub fn clear_history(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{CreateNodeLink, MoveObjects};
    use pipeflow_model::Node;
    use serde_json::json;

    fn editor_with_nodes() -> FlowEditor {
        let mut editor = FlowEditor::new(PipelineFlow::new("flow", "p1"));
        let n1 = Node::execution("n1", "read");
        let n2 = Node::execution("n2", "write");
        editor
            .execute(crate::actions::CreateNode::new("p1", n1).into())
            .unwrap();
        editor
            .execute(crate::actions::CreateNode::new("p1", n2).into())
            .unwrap();
        editor
    }

    #[test]
    fn test_execute_and_undo_through_editor() {
        let mut editor = editor_with_nodes();
        editor
            .execute(CreateNodeLink::new("p1", "n1", "n2").into())
            .unwrap();
        assert_eq!(editor.flow().pipeline("p1").unwrap().links.len(), 1);

        assert!(editor.undo().unwrap());
        assert!(editor.flow().pipeline("p1").unwrap().links.is_empty());
    }

    #[test]
    fn test_rejected_action_leaves_no_history_entry() {
        let mut editor = editor_with_nodes();
        let undo_count_before = editor.stack.undo_count();
        let result = editor.execute(MoveObjects::new("p1", vec!["ghost".to_string()], 1.0, 1.0).into());
        assert!(result.is_err());
        assert_eq!(editor.stack.undo_count(), undo_count_before);
    }

    #[test]
    fn test_open_strict_rejects_broken_document() {
        let document = json!({
            "doc_type": "pipeline",
            "version": "3.0",
            "id": "flow",
            "primary_pipeline": "missing",
            "pipelines": []
        });
        assert!(matches!(
            FlowEditor::open(document, ValidationMode::Strict),
            Err(EditError::Validation(_))
        ));
    }

    #[test]
    fn test_open_advisory_loads_broken_document() {
        let document = json!({
            "doc_type": "pipeline",
            "version": "3.0",
            "id": "flow",
            "primary_pipeline": "missing",
            "pipelines": []
        });
        let editor = FlowEditor::open(document, ValidationMode::Advisory).unwrap();
        assert_eq!(editor.flow().id, "flow");
    }

    #[test]
    fn test_open_upgrades_old_documents() {
        let document = json!({
            "version": "1.0",
            "id": "flow",
            "primary_pipeline": "p1",
            "pipelines": [{
                "id": "p1",
                "nodes": [{
                    "id": "n1",
                    "type": "execution_node",
                    "op": "read",
                    "x_pos": 10.0,
                    "y_pos": 20.0
                }]
            }]
        });
        let editor = FlowEditor::open(document, ValidationMode::Strict).unwrap();
        let node = editor.flow().pipeline("p1").unwrap().node("n1").unwrap();
        assert_eq!((node.x, node.y), (10.0, 20.0));
    }
}

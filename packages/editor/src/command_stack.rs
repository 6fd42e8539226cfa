//! # Command Stack
//!
//! Tracks applied actions and drives undo/redo.
//!
//! ## Design
//!
//! - `execute` applies the action, clears the redo stack and pushes the
//!   action with the revision counter of its host pipeline as observed
//!   before and after
//! - `undo`/`redo` run against the stack top and only move the entry once
//!   the replay succeeded, so a failing replay leaves the cursor in place
//! - Failed actions are never pushed
//! - History is unbounded; hosts call `clear` on document switches

use pipeflow_model::{ModelError, ObjectModel};

use crate::actions::Action;

#[derive(Debug, Clone)]
struct HistoryEntry {
    action: Action,
    revision_before: u64,
    revision_after: u64,
}

/// Undo/redo stack over an [`ObjectModel`].
#[derive(Debug, Default)]
pub struct CommandStack {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
}

impl CommandStack {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Applies an action and records it for undo.
    pub fn execute(&mut self, mut action: Action, store: &mut ObjectModel) -> Result<(), ModelError> {
        let revision_before = store.pipeline_revision(action.pipeline_id()).unwrap_or(0);
        action.apply(store)?;
        let revision_after = store.pipeline_revision(action.pipeline_id()).unwrap_or(0);
        self.redo_stack.clear();
        self.undo_stack.push(HistoryEntry {
            action,
            revision_before,
            revision_after,
        });
        Ok(())
    }

    /// Reverts the most recent action. `Ok(false)` when there is nothing to
    /// undo.
    pub fn undo(&mut self, store: &mut ObjectModel) -> Result<bool, ModelError> {
        let Some(entry) = self.undo_stack.last_mut() else {
            return Ok(false);
        };
        entry.action.undo(store)?;
        store.set_pipeline_revision(entry.action.pipeline_id(), entry.revision_before)?;
        if let Some(entry) = self.undo_stack.pop() {
            self.redo_stack.push(entry);
        }
        Ok(true)
    }

    /// Reapplies the most recently undone action. `Ok(false)` when there is
    /// nothing to redo.
    pub fn redo(&mut self, store: &mut ObjectModel) -> Result<bool, ModelError> {
        let Some(entry) = self.redo_stack.last_mut() else {
            return Ok(false);
        };
        entry.action.redo(store)?;
        store.set_pipeline_revision(entry.action.pipeline_id(), entry.revision_after)?;
        if let Some(entry) = self.redo_stack.pop() {
            self.undo_stack.push(entry);
        }
        Ok(true)
    }

    /// Undoes up to `count` actions, returning how many were undone.
    pub fn undo_multi(
        &mut self,
        count: usize,
        store: &mut ObjectModel,
    ) -> Result<usize, ModelError> {
        let mut undone = 0;
        while undone < count && self.undo(store)? {
            undone += 1;
        }
        Ok(undone)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the action `undo` would revert.
    pub fn undo_label(&self) -> Option<&'static str> {
        self.undo_stack.last().map(|entry| entry.action.label())
    }

    /// Label of the action `redo` would reapply.
    pub fn redo_label(&self) -> Option<&'static str> {
        self.redo_stack.last().map(|entry| entry.action.label())
    }

    /// The most recently executed or redone action, captures filled.
    pub fn last_action(&self) -> Option<&Action> {
        self.undo_stack.last().map(|entry| &entry.action)
    }

    /// Drops all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{CreateNode, DeleteLink, MoveObjects};
    use pipeflow_model::{Link, Node, PipelineFlow};

    fn seeded_store() -> ObjectModel {
        let mut store = ObjectModel::new(PipelineFlow::new("flow", "p1"));
        store
            .add_node("p1", Node::execution("n1", "read"))
            .unwrap();
        store
            .add_node("p1", Node::execution("n2", "write"))
            .unwrap();
        store
            .add_link("p1", Link::node("l1", "n1", None, "n2", None))
            .unwrap();
        store
    }

    #[test]
    fn test_stack_starts_empty() {
        let stack = CommandStack::new();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_count(), 0);
        assert_eq!(stack.redo_count(), 0);
    }

    #[test]
    fn test_empty_undo_and_redo_are_not_errors() {
        let mut store = seeded_store();
        let mut stack = CommandStack::new();
        assert!(!stack.undo(&mut store).unwrap());
        assert!(!stack.redo(&mut store).unwrap());
    }

    #[test]
    fn test_execute_undo_redo_cycle() {
        let mut store = seeded_store();
        let before = store.flow().clone();
        let mut stack = CommandStack::new();

        stack
            .execute(
                CreateNode::new("p1", Node::execution("n3", "join")).into(),
                &mut store,
            )
            .unwrap();
        let after = store.flow().clone();

        assert!(stack.undo(&mut store).unwrap());
        assert_eq!(*store.flow(), before);

        assert!(stack.redo(&mut store).unwrap());
        assert_eq!(*store.flow(), after);
    }

    #[test]
    fn test_failed_action_is_not_pushed() {
        let mut store = seeded_store();
        let mut stack = CommandStack::new();
        let result = stack.execute(DeleteLink::new("p1", "ghost").into(), &mut store);
        assert!(result.is_err());
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_failed_undo_keeps_the_cursor() {
        let mut store = seeded_store();
        let mut stack = CommandStack::new();
        stack
            .execute(
                CreateNode::new("p1", Node::execution("n3", "join")).into(),
                &mut store,
            )
            .unwrap();

        // Host mutates the store behind the stack's back.
        store.delete_node("p1", "n3").unwrap();

        assert!(stack.undo(&mut store).is_err());
        assert!(stack.can_undo());
        assert_eq!(stack.undo_count(), 1);
        assert_eq!(stack.undo_label(), Some("Create node"));
        assert_eq!(stack.redo_count(), 0);

        store
            .restore_node("p1", Node::execution("n3", "join"))
            .unwrap();
        assert!(stack.undo(&mut store).unwrap());
        assert!(store.node("p1", "n3").is_none());
    }

    #[test]
    fn test_failed_redo_keeps_the_cursor() {
        let mut store = seeded_store();
        let mut stack = CommandStack::new();
        stack
            .execute(
                CreateNode::new("p1", Node::execution("n3", "join")).into(),
                &mut store,
            )
            .unwrap();
        stack.undo(&mut store).unwrap();

        store
            .add_node("p1", Node::execution("n3", "write"))
            .unwrap();

        assert!(stack.redo(&mut store).is_err());
        assert!(stack.can_redo());
        assert_eq!(stack.redo_count(), 1);
        assert_eq!(stack.redo_label(), Some("Create node"));
        assert_eq!(stack.undo_count(), 0);

        store.delete_node("p1", "n3").unwrap();
        assert!(stack.redo(&mut store).unwrap());
        assert_eq!(store.node("p1", "n3").unwrap().op.as_deref(), Some("join"));
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut store = seeded_store();
        let mut stack = CommandStack::new();

        stack
            .execute(
                MoveObjects::new("p1", vec!["n1".to_string()], 10.0, 0.0).into(),
                &mut store,
            )
            .unwrap();
        stack.undo(&mut store).unwrap();
        assert!(stack.can_redo());

        stack
            .execute(
                MoveObjects::new("p1", vec!["n2".to_string()], 0.0, 10.0).into(),
                &mut store,
            )
            .unwrap();
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_multi_stops_at_empty() {
        let mut store = seeded_store();
        let mut stack = CommandStack::new();
        for i in 0..3 {
            stack
                .execute(
                    MoveObjects::new("p1", vec!["n1".to_string()], 1.0 + i as f64, 0.0).into(),
                    &mut store,
                )
                .unwrap();
        }
        assert_eq!(stack.undo_multi(5, &mut store).unwrap(), 3);
        assert!(!stack.can_undo());
        assert_eq!(stack.redo_count(), 3);
    }

    #[test]
    fn test_labels_follow_the_cursor() {
        let mut store = seeded_store();
        let mut stack = CommandStack::new();
        stack
            .execute(DeleteLink::new("p1", "l1").into(), &mut store)
            .unwrap();
        assert_eq!(stack.undo_label(), Some("Delete link"));
        assert_eq!(stack.redo_label(), None);

        stack.undo(&mut store).unwrap();
        assert_eq!(stack.undo_label(), None);
        assert_eq!(stack.redo_label(), Some("Delete link"));
    }

    #[test]
    fn test_undo_restores_revision_counter() {
        let mut store = seeded_store();
        let revision = store.pipeline_revision("p1").unwrap();
        let mut stack = CommandStack::new();

        stack
            .execute(
                MoveObjects::new("p1", vec!["n1".to_string()], 5.0, 5.0).into(),
                &mut store,
            )
            .unwrap();
        assert!(store.pipeline_revision("p1").unwrap() > revision);

        stack.undo(&mut store).unwrap();
        assert_eq!(store.pipeline_revision("p1").unwrap(), revision);
    }
}

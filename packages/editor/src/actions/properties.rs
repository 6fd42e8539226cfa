use pipeflow_model::{ModelError, ObjectModel};
use serde_json::Value;

/// Replaces a comment's text, capturing the previous text for undo.
#[derive(Debug, Clone)]
pub struct EditComment {
    pipeline_id: String,
    comment_id: String,
    content: String,
    previous: Option<String>,
}

impl EditComment {
    pub fn new(
        pipeline_id: impl Into<String>,
        comment_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            comment_id: comment_id.into(),
            content: content.into(),
            previous: None,
        }
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        let prev =
            store.set_comment_content(&self.pipeline_id, &self.comment_id, self.content.clone())?;
        if self.previous.is_none() {
            self.previous = Some(prev);
        }
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.previous.is_some(), "undo before apply");
        let Some(previous) = &self.previous else {
            return Ok(());
        };
        store.set_comment_content(&self.pipeline_id, &self.comment_id, previous.clone())?;
        Ok(())
    }
}

/// Sets or clears a node's display label.
#[derive(Debug, Clone)]
pub struct SetNodeLabel {
    pipeline_id: String,
    node_id: String,
    label: Option<String>,
    previous: Option<Option<String>>,
}

impl SetNodeLabel {
    pub fn new(
        pipeline_id: impl Into<String>,
        node_id: impl Into<String>,
        label: Option<String>,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            node_id: node_id.into(),
            label,
            previous: None,
        }
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        let prev = store.set_node_label(&self.pipeline_id, &self.node_id, self.label.clone())?;
        if self.previous.is_none() {
            self.previous = Some(prev);
        }
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.previous.is_some(), "undo before apply");
        let Some(previous) = &self.previous else {
            return Ok(());
        };
        store.set_node_label(&self.pipeline_id, &self.node_id, previous.clone())?;
        Ok(())
    }
}

/// Replaces a node's operator parameter block wholesale. Parameters are
/// opaque JSON to the editing layer.
#[derive(Debug, Clone)]
pub struct SetNodeProperties {
    pipeline_id: String,
    node_id: String,
    parameters: Option<Value>,
    previous: Option<Option<Value>>,
}

impl SetNodeProperties {
    pub fn new(
        pipeline_id: impl Into<String>,
        node_id: impl Into<String>,
        parameters: Option<Value>,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            node_id: node_id.into(),
            parameters,
            previous: None,
        }
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        let prev =
            store.set_node_parameters(&self.pipeline_id, &self.node_id, self.parameters.clone())?;
        if self.previous.is_none() {
            self.previous = Some(prev);
        }
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.previous.is_some(), "undo before apply");
        let Some(previous) = &self.previous else {
            return Ok(());
        };
        store.set_node_parameters(&self.pipeline_id, &self.node_id, previous.clone())?;
        Ok(())
    }
}

/// Marks a supernode as rendered inline.
#[derive(Debug, Clone)]
pub struct ExpandSuperNode {
    pipeline_id: String,
    node_id: String,
    previous: Option<bool>,
}

impl ExpandSuperNode {
    pub fn new(pipeline_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            node_id: node_id.into(),
            previous: None,
        }
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        let prev = store.set_supernode_expanded(&self.pipeline_id, &self.node_id, true)?;
        if self.previous.is_none() {
            self.previous = Some(prev);
        }
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.previous.is_some(), "undo before apply");
        let Some(previous) = self.previous else {
            return Ok(());
        };
        store.set_supernode_expanded(&self.pipeline_id, &self.node_id, previous)?;
        Ok(())
    }
}

/// Collapses a supernode back to its boxed rendering.
#[derive(Debug, Clone)]
pub struct CollapseSuperNode {
    pipeline_id: String,
    node_id: String,
    previous: Option<bool>,
}

impl CollapseSuperNode {
    pub fn new(pipeline_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            node_id: node_id.into(),
            previous: None,
        }
    }

    pub(crate) fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        let prev = store.set_supernode_expanded(&self.pipeline_id, &self.node_id, false)?;
        if self.previous.is_none() {
            self.previous = Some(prev);
        }
        Ok(())
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        debug_assert!(self.previous.is_some(), "undo before apply");
        let Some(previous) = self.previous else {
            return Ok(());
        };
        store.set_supernode_expanded(&self.pipeline_id, &self.node_id, previous)?;
        Ok(())
    }
}

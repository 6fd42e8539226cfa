//! # Pipeflow Editor
//!
//! Document editing engine for pipeline flows.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ migrate: v1/v2 documents → current schema   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: FlowEditor session                  │
//! │  - Open/save documents                      │
//! │  - Apply actions with preconditions         │
//! │  - Undo/redo through the command stack      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ validator: structural diagnostics           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pipeflow_editor::{CreateNodeLink, FlowEditor, ValidationMode};
//!
//! // Load document
//! let mut editor = FlowEditor::open(document, ValidationMode::Strict)?;
//!
//! // Apply an action
//! editor.execute(CreateNodeLink::new("p1", "n1", "n2").into())?;
//!
//! // Take it back
//! editor.undo()?;
//!
//! // Save
//! let document = editor.save()?;
//! ```

mod actions;
mod command_stack;
mod controller;
mod error;

pub use actions::{
    Action, CloneObjects, CollapseSuperNode, CreateAssociationLink, CreateComment,
    CreateCommentLink, CreateNode, CreateNodeLink, CreateSuperNode, DeleteLink, DeleteObjects,
    DisconnectObjects, EditComment, ExpandSuperNode, InsertNodeIntoLink, MoveObjects,
    SetNodeLabel, SetNodeProperties, SizeAndPositionObjects,
};
pub use command_stack::CommandStack;
pub use controller::{FlowEditor, ValidationMode};
pub use error::EditError;

// Re-export the model entry points hosts always need alongside the editor
pub use pipeflow_model::{ObjectModel, PipelineFlow};

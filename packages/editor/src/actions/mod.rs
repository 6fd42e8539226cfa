//! # Editing Actions
//!
//! The closed catalogue of semantic edits a host can perform on a flow.
//!
//! ## Design
//!
//! - Each action validates its preconditions before touching the store, so a
//!   failed action leaves the document untouched
//! - The first `apply` fills the action's capture slots (generated ids,
//!   removed objects together with their positions); `undo` and `redo` replay
//!   from those captures, which is what makes redo reproduce identical ids
//! - Undo reinserts removed objects at their captured positions, so a
//!   `do; undo` round trip leaves the document deep-equal to its prior state
//! - Composite actions (insert into link, build supernode, delete with
//!   cascade) are single undo steps

mod arrange;
mod clone;
mod create;
mod delete;
mod insert;
mod properties;
mod supernode;

pub use arrange::{MoveObjects, SizeAndPositionObjects};
pub use clone::CloneObjects;
pub use create::{
    CreateAssociationLink, CreateComment, CreateCommentLink, CreateNode, CreateNodeLink,
};
pub use delete::{DeleteLink, DeleteObjects, DisconnectObjects};
pub use insert::InsertNodeIntoLink;
pub use properties::{
    CollapseSuperNode, EditComment, ExpandSuperNode, SetNodeLabel, SetNodeProperties,
};
pub use supernode::CreateSuperNode;

use pipeflow_model::{Comment, Link, ModelError, Node, ObjectModel, Pipeline};

/// One undoable edit.
///
/// The enum is closed on purpose: every edit the stack can hold is listed
/// here, and `apply`/`undo` dispatch is an exhaustive match.
#[derive(Debug, Clone)]
pub enum Action {
    CreateNode(CreateNode),
    CreateComment(CreateComment),
    CreateNodeLink(CreateNodeLink),
    CreateCommentLink(CreateCommentLink),
    CreateAssociationLink(CreateAssociationLink),
    DeleteLink(DeleteLink),
    DeleteObjects(DeleteObjects),
    DisconnectObjects(DisconnectObjects),
    MoveObjects(MoveObjects),
    SizeAndPositionObjects(SizeAndPositionObjects),
    EditComment(EditComment),
    SetNodeLabel(SetNodeLabel),
    SetNodeProperties(SetNodeProperties),
    ExpandSuperNode(ExpandSuperNode),
    CollapseSuperNode(CollapseSuperNode),
    InsertNodeIntoLink(InsertNodeIntoLink),
    CreateSuperNode(CreateSuperNode),
    CloneObjects(CloneObjects),
}

macro_rules! each_action {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Action::CreateNode($inner) => $body,
            Action::CreateComment($inner) => $body,
            Action::CreateNodeLink($inner) => $body,
            Action::CreateCommentLink($inner) => $body,
            Action::CreateAssociationLink($inner) => $body,
            Action::DeleteLink($inner) => $body,
            Action::DeleteObjects($inner) => $body,
            Action::DisconnectObjects($inner) => $body,
            Action::MoveObjects($inner) => $body,
            Action::SizeAndPositionObjects($inner) => $body,
            Action::EditComment($inner) => $body,
            Action::SetNodeLabel($inner) => $body,
            Action::SetNodeProperties($inner) => $body,
            Action::ExpandSuperNode($inner) => $body,
            Action::CollapseSuperNode($inner) => $body,
            Action::InsertNodeIntoLink($inner) => $body,
            Action::CreateSuperNode($inner) => $body,
            Action::CloneObjects($inner) => $body,
        }
    };
}

impl Action {
    /// Human-readable label for history menus.
    pub fn label(&self) -> &'static str {
        match self {
            Action::CreateNode(_) => "Create node",
            Action::CreateComment(_) => "Create comment",
            Action::CreateNodeLink(_) => "Create link",
            Action::CreateCommentLink(_) => "Attach comment",
            Action::CreateAssociationLink(_) => "Create association",
            Action::DeleteLink(_) => "Delete link",
            Action::DeleteObjects(_) => "Delete",
            Action::DisconnectObjects(_) => "Disconnect",
            Action::MoveObjects(_) => "Move",
            Action::SizeAndPositionObjects(_) => "Resize",
            Action::EditComment(_) => "Edit comment",
            Action::SetNodeLabel(_) => "Rename node",
            Action::SetNodeProperties(_) => "Edit properties",
            Action::ExpandSuperNode(_) => "Expand supernode",
            Action::CollapseSuperNode(_) => "Collapse supernode",
            Action::InsertNodeIntoLink(_) => "Insert node into link",
            Action::CreateSuperNode(_) => "Create supernode",
            Action::CloneObjects(_) => "Paste",
        }
    }

    /// Pipeline whose revision counter this action is recorded against.
    pub fn pipeline_id(&self) -> &str {
        each_action!(self, action => action.pipeline_id())
    }

    pub(crate) fn apply(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        each_action!(self, action => action.apply(store))
    }

    pub(crate) fn undo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        each_action!(self, action => action.undo(store))
    }

    /// Replays the action from its captures. The state the stack hands us is
    /// identical to the one the first `apply` saw, so generated ids come out
    /// the same.
    pub(crate) fn redo(&mut self, store: &mut ObjectModel) -> Result<(), ModelError> {
        self.apply(store)
    }
}

macro_rules! action_from {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Action {
                fn from(action: $variant) -> Self {
                    Action::$variant(action)
                }
            }
        )+
    };
}

action_from!(
    CreateNode,
    CreateComment,
    CreateNodeLink,
    CreateCommentLink,
    CreateAssociationLink,
    DeleteLink,
    DeleteObjects,
    DisconnectObjects,
    MoveObjects,
    SizeAndPositionObjects,
    EditComment,
    SetNodeLabel,
    SetNodeProperties,
    ExpandSuperNode,
    CollapseSuperNode,
    InsertNodeIntoLink,
    CreateSuperNode,
    CloneObjects,
);

// ---- shared precondition helpers ----

pub(crate) fn require_pipeline<'a>(
    store: &'a ObjectModel,
    pipeline_id: &str,
) -> Result<&'a Pipeline, ModelError> {
    store
        .pipeline(pipeline_id)
        .ok_or_else(|| ModelError::PipelineNotFound(pipeline_id.to_string()))
}

pub(crate) fn require_node<'a>(
    store: &'a ObjectModel,
    pipeline_id: &str,
    node_id: &str,
) -> Result<&'a Node, ModelError> {
    store
        .node(pipeline_id, node_id)
        .ok_or_else(|| ModelError::NodeNotFound {
            pipeline_id: pipeline_id.to_string(),
            node_id: node_id.to_string(),
        })
}

pub(crate) fn require_comment<'a>(
    store: &'a ObjectModel,
    pipeline_id: &str,
    comment_id: &str,
) -> Result<&'a Comment, ModelError> {
    store
        .comment(pipeline_id, comment_id)
        .ok_or_else(|| ModelError::CommentNotFound {
            pipeline_id: pipeline_id.to_string(),
            comment_id: comment_id.to_string(),
        })
}

pub(crate) fn require_link<'a>(
    store: &'a ObjectModel,
    pipeline_id: &str,
    link_id: &str,
) -> Result<&'a Link, ModelError> {
    store
        .link(pipeline_id, link_id)
        .ok_or_else(|| ModelError::LinkNotFound {
            pipeline_id: pipeline_id.to_string(),
            link_id: link_id.to_string(),
        })
}

/// Splits a mixed selection into node ids and comment ids, in selection
/// order. Fails on the first id that is neither.
pub(crate) fn split_objects(
    store: &ObjectModel,
    pipeline_id: &str,
    object_ids: &[String],
) -> Result<(Vec<String>, Vec<String>), ModelError> {
    require_pipeline(store, pipeline_id)?;
    let mut nodes = Vec::new();
    let mut comments = Vec::new();
    for id in object_ids {
        if store.node(pipeline_id, id).is_some() {
            nodes.push(id.clone());
        } else if store.comment(pipeline_id, id).is_some() {
            comments.push(id.clone());
        } else {
            return Err(ModelError::ObjectNotFound {
                pipeline_id: pipeline_id.to_string(),
                object_id: id.clone(),
            });
        }
    }
    Ok((nodes, comments))
}

/// Position of a link in its pipeline, for positional undo captures.
pub(crate) fn link_index(
    store: &ObjectModel,
    pipeline_id: &str,
    link_id: &str,
) -> Result<usize, ModelError> {
    store
        .links(pipeline_id)
        .and_then(|links| links.iter().position(|l| l.id == link_id))
        .ok_or_else(|| ModelError::LinkNotFound {
            pipeline_id: pipeline_id.to_string(),
            link_id: link_id.to_string(),
        })
}

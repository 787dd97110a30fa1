use goml_ids::NodeID;
use goml_markup::MarkupError;
use goml_objects::ObjectError;
use thiserror::Error;

use crate::tags::ElementTag;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unknown tag <{0}>")]
    UnknownTag(String),

    #[error("element {0} does not exist")]
    Missing(NodeID),

    #[error("element {child} is not a child of {parent}")]
    NotAChild { parent: NodeID, child: NodeID },

    #[error("cannot insert {child} under {parent}: {child} is an ancestor of {parent}")]
    Cycle { parent: NodeID, child: NodeID },

    /// A user-facing attribute error; the attribute's side effect was skipped.
    #[error("{message}")]
    Attribute {
        tag: ElementTag,
        name: String,
        message: String,
    },

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Object(#[from] ObjectError),
}

pub type Result<T> = std::result::Result<T, DocumentError>;

use crate::document::NodeId;
use thiserror::Error;

pub type DomResult<T> = Result<T, DomError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Node {0:?} does not exist")]
    NodeNotFound(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Cannot insert {child:?} into {parent:?}: {reason}")]
    HierarchyRequest {
        parent: NodeId,
        child: NodeId,
        reason: &'static str,
    },

    #[error("<{tag}> already has a shadow root")]
    ShadowRootExists { tag: String },
}

use crate::id::NodeId;
use crate::model::Relation;

/// Why a structural edit was rejected.
///
/// Rejections are ordinary outcomes, not failures: the infallible forms of
/// every operation turn them into a no-op and return the input unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("node {0} not found")]
    NotFound(NodeId),

    #[error("cannot move node {0} relative to itself")]
    SelfMove(NodeId),

    #[error("cannot move {dragged} {relation} {target}: target is inside the moved subtree")]
    Cycle {
        dragged: NodeId,
        target: NodeId,
        relation: Relation,
    },

    #[error("duplicate node id {0}")]
    DuplicateId(NodeId),
}

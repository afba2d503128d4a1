use thiserror::Error;

use crate::BvhNodeId;

/// Reasons why a BVH couldn't be built.
///
/// Trees are built all-or-nothing, so any of these means the whole build
/// failed and no nodes are available.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("index count must be a multiple of three, got {len}")]
    InvalidIndexCount { len: usize },

    #[error("nothing to build a tree from")]
    NoPrimitives,

    #[error(
        "index {index} points outside of the vertex buffer \
         (len = {vertex_count})"
    )]
    IndexOutOfBounds { index: u32, vertex_count: usize },

    #[error("vertex {vertex} has a non-finite position")]
    NonFinitePosition { vertex: u32 },

    #[error("got {count} primitives, but at most {max} fit into a single tree")]
    TooManyPrimitives { count: usize, max: usize },

    #[error(
        "couldn't split node {node_id:?} ({primitives} primitives) into \
         two non-empty halves"
    )]
    DegenerateSplit { node_id: BvhNodeId, primitives: usize },

    #[error("node {node_id:?} has empty bounds")]
    EmptyBounds { node_id: BvhNodeId },

    #[error("node {child:?} sticks out of its parent {parent:?}")]
    BoundsViolation { parent: BvhNodeId, child: BvhNodeId },

    #[error("primitive {primitive_id} is referenced by more than one leaf")]
    DuplicatedPrimitive { primitive_id: u32 },

    #[error("expected {expected} nodes, got {actual}")]
    NodeCountMismatch { expected: usize, actual: usize },
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

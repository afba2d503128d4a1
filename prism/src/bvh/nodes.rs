use std::ops;

use fxhash::FxHashSet;

use super::{BvhNode, BvhNodeId};
use crate::{BoundingBox, BuildError, Result};

/// Flat storage for the nodes of a single tree; root lives at index zero and
/// children are referenced by their indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BvhNodes {
    nodes: Vec<BvhNode>,
}

impl BvhNodes {
    /// Drops all nodes and makes room for a tree of `len` nodes.
    pub fn reset(&mut self, len: usize) {
        self.nodes.clear();
        self.nodes.shrink_to(len);
        self.nodes.reserve_exact(len);
    }

    /// Allocates two new nodes, returning their ids.
    ///
    /// Nodes are allocated as leaves; the builder overwrites them once it gets
    /// to process them.
    pub fn add_pair(
        &mut self,
        left_bounds: BoundingBox,
        right_bounds: BoundingBox,
    ) -> (BvhNodeId, BvhNodeId) {
        let left_id = self.add(left_bounds);
        let right_id = self.add(right_bounds);

        (left_id, right_id)
    }

    pub fn add(&mut self, bounds: BoundingBox) -> BvhNodeId {
        self.nodes.push(BvhNode::Leaf {
            bounds,
            primitive_id: 0,
        });

        BvhNodeId::new((self.nodes.len() - 1) as u32)
    }

    pub fn get(&self, id: BvhNodeId) -> Option<&BvhNode> {
        self.nodes.get(id.get() as usize)
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.get(BvhNodeId::root())
    }

    pub fn iter(&self) -> impl Iterator<Item = (BvhNodeId, &BvhNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(id, node)| (BvhNodeId::new(id as u32), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes = Default::default();
    }

    /// Checks that this is a well-formed tree over `primitives` primitives:
    /// `2n - 1` nodes, none of them with empty bounds, children contained
    /// within their parents, each primitive present in exactly one leaf.
    pub fn validate(&self, primitives: usize) -> Result<()> {
        let expected = (2 * primitives).saturating_sub(1);

        if self.len() != expected {
            return Err(BuildError::NodeCountMismatch {
                expected,
                actual: self.len(),
            });
        }

        let mut seen = FxHashSet::default();

        for (id, node) in self.iter() {
            if node.bounds().is_empty() {
                return Err(BuildError::EmptyBounds { node_id: id });
            }

            match *node {
                BvhNode::Internal {
                    bounds,
                    left_id,
                    right_id,
                } => {
                    // Children are always allocated after their parent
                    for child_id in [left_id, right_id] {
                        let fits = self.get(child_id).map_or(false, |child| {
                            bounds.contains(child.bounds())
                        });

                        if child_id <= id || !fits {
                            return Err(BuildError::BoundsViolation {
                                parent: id,
                                child: child_id,
                            });
                        }
                    }
                }

                BvhNode::Leaf { primitive_id, .. } => {
                    if !seen.insert(primitive_id) {
                        return Err(BuildError::DuplicatedPrimitive {
                            primitive_id,
                        });
                    }
                }
            }
        }

        if seen.len() != primitives {
            return Err(BuildError::NodeCountMismatch {
                expected: primitives,
                actual: seen.len(),
            });
        }

        Ok(())
    }
}

impl ops::Index<BvhNodeId> for BvhNodes {
    type Output = BvhNode;

    fn index(&self, index: BvhNodeId) -> &Self::Output {
        &self.nodes[index.get() as usize]
    }
}

impl ops::IndexMut<BvhNodeId> for BvhNodes {
    fn index_mut(&mut self, index: BvhNodeId) -> &mut Self::Output {
        &mut self.nodes[index.get() as usize]
    }
}

use prism_gpu as gpu;

use super::{BvhNode, BvhNodes};

/// Packs nodes into their GPU representation, keeping their ids intact (i.e.
/// node `n` becomes `out[n]`).
///
/// Expects the tree to fit within [`gpu::BvhNode::MAX_NODES`], which the
/// builder guarantees.
pub fn run(nodes: &BvhNodes, out: &mut Vec<gpu::BvhNode>) {
    out.clear();
    out.reserve_exact(nodes.len());

    for (_, node) in nodes.iter() {
        let bounds = node.bounds();

        out.push(match *node {
            BvhNode::Internal {
                left_id, right_id, ..
            } => gpu::BvhNode::internal(
                bounds.min(),
                bounds.max(),
                left_id.get() as u16,
                right_id.get() as u16,
            ),

            BvhNode::Leaf { primitive_id, .. } => {
                gpu::BvhNode::leaf(bounds.min(), bounds.max(), primitive_id)
            }
        });
    }
}

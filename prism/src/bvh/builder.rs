use glam::{DVec3, Vec3};
use prism_gpu as gpu;

use super::{BvhNode, BvhNodeId, BvhNodes, BvhPrimitive, BvhPrimitivesRef};
use crate::{
    Axis, BoundingBox, BuildError, BvhConfig, EmptySplitFallback, Result,
};

/// Builds a tree with exactly one primitive per leaf.
///
/// Each node gets split along the axis on which its primitives' centroids are
/// spread the most, at the centroids' mean. Nodes are processed depth-first
/// from a worklist, so the final layout is the same as the one a recursive
/// pre-order build would produce (children of a node always occupy two
/// consecutive slots, allocated right before the node's left subtree).
///
/// `primitives` get reordered in-place.
pub fn run(
    nodes: &mut BvhNodes,
    primitives: &mut [BvhPrimitive],
    config: &BvhConfig,
) -> Result<()> {
    if primitives.is_empty() {
        return Err(BuildError::NoPrimitives);
    }

    if primitives.len() > gpu::BvhNode::MAX_PRIMITIVES {
        return Err(BuildError::TooManyPrimitives {
            count: primitives.len(),
            max: gpu::BvhNode::MAX_PRIMITIVES,
        });
    }

    nodes.reset(2 * primitives.len() - 1);

    let root_id =
        nodes.add(primitives.iter().map(|prim| prim.bounds).collect());

    let mut stack = vec![BvhNodeRef {
        id: root_id,
        primitives_ref: BvhPrimitivesRef::new(0, primitives.len() as u32),
    }];

    while let Some(node) = stack.pop() {
        if let Some((left, right)) = subdivide(nodes, primitives, node, config)?
        {
            stack.push(right);
            stack.push(left);
        }
    }

    Ok(())
}

fn subdivide(
    nodes: &mut BvhNodes,
    primitives: &mut [BvhPrimitive],
    node: BvhNodeRef,
    config: &BvhConfig,
) -> Result<Option<(BvhNodeRef, BvhNodeRef)>> {
    let bounds = nodes[node.id].bounds();
    let primitives = &mut primitives[node.primitives_ref.as_range()];

    if let [primitive] = &*primitives {
        nodes[node.id] = BvhNode::Leaf {
            bounds,
            primitive_id: primitive.id,
        };

        return Ok(None);
    }

    // If all centroids are at the same spot, there's no plane that could
    // separate them - in that case we just cut the list in half
    let pivot = match find_splitting_plane(primitives) {
        Some(plane) => split(primitives, plane),
        None => primitives.len() / 2,
    };

    let pivot = if pivot == 0 || pivot == primitives.len() {
        match config.empty_split {
            EmptySplitFallback::HalveByCount => {
                log::warn!(
                    "Couldn't partition node {:?} ({} primitives); \
                     splitting it by count",
                    node.id,
                    primitives.len(),
                );

                primitives.len() / 2
            }

            EmptySplitFallback::Fail => {
                return Err(BuildError::DegenerateSplit {
                    node_id: node.id,
                    primitives: primitives.len(),
                });
            }
        }
    } else {
        pivot
    };

    let (left_prims, right_prims) = primitives.split_at(pivot);

    let (left_id, right_id) = nodes.add_pair(
        left_prims.iter().map(|prim| prim.bounds).collect(),
        right_prims.iter().map(|prim| prim.bounds).collect(),
    );

    nodes[node.id] = BvhNode::Internal {
        bounds,
        left_id,
        right_id,
    };

    let (left_primitives_ref, right_primitives_ref) =
        node.primitives_ref.split_at(pivot);

    Ok(Some((
        BvhNodeRef {
            id: left_id,
            primitives_ref: left_primitives_ref,
        },
        BvhNodeRef {
            id: right_id,
            primitives_ref: right_primitives_ref,
        },
    )))
}

fn find_splitting_plane(
    primitives: &[BvhPrimitive],
) -> Option<SplittingPlane> {
    // Summed in f64, so that centroids near the edge of the f32 range don't
    // overflow into infinity
    let mut sum = DVec3::ZERO;
    let mut centroid_bb = BoundingBox::default();

    for primitive in primitives {
        sum += primitive.center.as_dvec3();
        centroid_bb.grow(primitive.center);
    }

    let extent = centroid_bb.extent();

    if extent == Vec3::ZERO {
        return None;
    }

    let split_by = Axis::longest(extent);
    let split_at = (sum / (primitives.len() as f64)).as_vec3()[split_by];

    Some(SplittingPlane { split_by, split_at })
}

/// Moves primitives lying before the plane to the front of the slice and
/// returns their count.
fn split(primitives: &mut [BvhPrimitive], plane: SplittingPlane) -> usize {
    let mut left_prim_idx = 0;
    let mut right_prim_idx = primitives.len();

    while left_prim_idx < right_prim_idx {
        if primitives[left_prim_idx].center[plane.split_by] < plane.split_at {
            left_prim_idx += 1;
        } else {
            right_prim_idx -= 1;
            primitives.swap(left_prim_idx, right_prim_idx);
        }
    }

    left_prim_idx
}

#[derive(Clone, Copy, Debug)]
struct SplittingPlane {
    split_by: Axis,
    split_at: f32,
}

#[derive(Clone, Copy, Debug)]
struct BvhNodeRef {
    id: BvhNodeId,
    primitives_ref: BvhPrimitivesRef,
}

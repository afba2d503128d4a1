use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Single node of a BVH, as seen by shaders.
///
/// Layout (32 bytes, no padding):
///
/// ```text
/// 0..12   aabb_min
/// 12..14  left_child
/// 14..16  right_child
/// 16..28  aabb_max
/// 28..32  index
/// ```
///
/// A node whose both children are zero is a leaf - node 0 is always the root
/// and so it never appears as anybody's child.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    pub aabb_min: Vec3,
    pub left_child: u16,
    pub right_child: u16,
    pub aabb_max: Vec3,
    pub index: u32,
}

impl BvhNode {
    /// Maximum number of nodes addressable through the 16-bit child indices.
    pub const MAX_NODES: usize = (u16::MAX as usize) + 1;

    /// Maximum number of primitives a single tree can hold, so that all of
    /// its `2n - 1` nodes stay addressable.
    pub const MAX_PRIMITIVES: usize = (Self::MAX_NODES + 1) / 2;

    pub fn internal(
        aabb_min: Vec3,
        aabb_max: Vec3,
        left_child: u16,
        right_child: u16,
    ) -> Self {
        Self {
            aabb_min,
            left_child,
            right_child,
            aabb_max,
            index: 0,
        }
    }

    pub fn leaf(aabb_min: Vec3, aabb_max: Vec3, index: u32) -> Self {
        Self {
            aabb_min,
            left_child: 0,
            right_child: 0,
            aabb_max,
            index,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left_child == 0 && self.right_child == 0
    }
}

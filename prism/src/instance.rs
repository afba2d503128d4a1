use glam::Affine3A;

use crate::{BoundingBox, Bvh};

/// Mesh placed somewhere in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    /// Object-space bounds of the instanced mesh.
    pub bounds: BoundingBox,
    pub xform: Affine3A,
}

impl Instance {
    pub fn new(bvh: &Bvh, xform: Affine3A) -> Self {
        Self {
            bounds: bvh.bounds(),
            xform,
        }
    }

    pub fn world_bounds(&self) -> BoundingBox {
        self.bounds.with_transform(self.xform)
    }
}

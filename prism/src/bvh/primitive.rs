use std::ops::Range;

use glam::Vec3;

use crate::BoundingBox;

/// Thing a leaf points at - a mesh's triangle or an instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BvhPrimitive {
    /// Payload stored in the leaf representing this primitive.
    pub id: u32,
    pub center: Vec3,
    pub bounds: BoundingBox,
}

impl BvhPrimitive {
    pub fn from_triangle(id: u32, positions: [Vec3; 3]) -> Self {
        Self {
            id,
            // Divided before summing, so that far-away triangles don't
            // overflow into infinity
            center: positions.iter().map(|&pos| pos / 3.0).sum(),
            bounds: BoundingBox::from_points(positions),
        }
    }

    pub fn from_bounds(id: u32, bounds: BoundingBox) -> Self {
        Self {
            id,
            center: bounds.center(),
            bounds,
        }
    }
}

/// Range of primitives owned by a node that's waiting to be processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BvhPrimitivesRef {
    start: u32,
    end: u32,
}

impl BvhPrimitivesRef {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        let start = self.start as usize;
        let end = self.end as usize;

        start..end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Splits this range into `start..start + at` and `start + at..end`.
    pub fn split_at(&self, at: usize) -> (Self, Self) {
        let pivot = self.start + (at as u32);

        (Self::new(self.start, pivot), Self::new(pivot, self.end))
    }
}

use std::ops::{Index, IndexMut};

use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Returns the axis along which `extent` is the largest.
    ///
    /// Ties are resolved in favour of the earlier axis - Y has to be strictly
    /// larger than X to win, and Z has to be strictly larger than whichever
    /// of them won.
    pub fn longest(extent: Vec3) -> Self {
        let mut axis = Self::X;

        if extent.y > extent.x {
            axis = Self::Y;
        }

        if extent.z > extent[axis] {
            axis = Self::Z;
        }

        axis
    }
}

impl Index<Axis> for Vec3 {
    type Output = f32;

    fn index(&self, index: Axis) -> &Self::Output {
        match index {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl IndexMut<Axis> for Vec3 {
    fn index_mut(&mut self, index: Axis) -> &mut Self::Output {
        match index {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

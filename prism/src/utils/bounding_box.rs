use glam::{Affine3A, BVec3, Vec3};

/// Axis-aligned box.
///
/// A box is empty when its `min` exceeds its `max` on any axis; the default
/// box is empty and grows as points and other boxes are merged into it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
}

impl BoundingBox {
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().collect()
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        !self.min.cmple(self.max).all()
    }

    /// Returns the box's size along each axis; zero for an empty box.
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Vec3 {
        // Halving first keeps boxes spanning most of the f32 range finite
        self.min * 0.5 + self.max * 0.5
    }

    /// Extends this box so that it covers `point`.
    pub fn grow(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Extends this box so that it covers `other`; empty boxes are skipped.
    pub fn merge(&mut self, other: Self) {
        if !other.is_empty() {
            self.grow(other.min);
            self.grow(other.max);
        }
    }

    /// Returns the smallest box covering this one after it's been
    /// transformed.
    pub fn with_transform(&self, xform: Affine3A) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }

        let (min, max) = (self.min, self.max);

        Self::from_points((0..8).map(|corner| {
            let point = Vec3::select(
                BVec3::new(
                    corner & 1 != 0,
                    corner & 2 != 0,
                    corner & 4 != 0,
                ),
                max,
                min,
            );

            xform.transform_point3(point)
        }))
    }

    /// Returns whether `other` lies entirely within this box (touching the
    /// boundary counts as being inside).
    ///
    /// An empty `other` is contained in every box.
    pub fn contains(&self, other: Self) -> bool {
        other.is_empty()
            || (other.min.cmpge(self.min).all()
                && other.max.cmple(self.max).all())
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl FromIterator<Vec3> for BoundingBox {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Vec3>,
    {
        iter.into_iter().fold(Self::EMPTY, |mut this, point| {
            this.grow(point);
            this
        })
    }
}

impl FromIterator<Self> for BoundingBox {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Self>,
    {
        iter.into_iter().fold(Self::EMPTY, |mut this, other| {
            this.merge(other);
            this
        })
    }
}

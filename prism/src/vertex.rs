use glam::{Vec3, Vec4, Vec4Swizzles};

/// Anything that has a position - the builder doesn't care about the rest of
/// vertex's attributes.
pub trait Vertex {
    fn position(&self) -> Vec3;
}

impl Vertex for Vec3 {
    fn position(&self) -> Vec3 {
        *self
    }
}

impl Vertex for Vec4 {
    fn position(&self) -> Vec3 {
        self.xyz()
    }
}

impl Vertex for [f32; 3] {
    fn position(&self) -> Vec3 {
        Vec3::from_array(*self)
    }
}

impl<T> Vertex for &T
where
    T: Vertex,
{
    fn position(&self) -> Vec3 {
        T::position(self)
    }
}

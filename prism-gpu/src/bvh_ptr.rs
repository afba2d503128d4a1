/// Index of a node within a packed BVH buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BvhPtr(u32);

impl BvhPtr {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn root() -> Self {
        Self(0)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

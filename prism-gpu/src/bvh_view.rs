use crate::{BvhNode, BvhPtr};

/// Read-only view of a packed BVH, with node 0 being the root.
#[derive(Clone, Copy, Debug)]
pub struct BvhView<'a> {
    buffer: &'a [BvhNode],
}

impl<'a> BvhView<'a> {
    pub fn new(buffer: &'a [BvhNode]) -> Self {
        Self { buffer }
    }

    /// Reinterprets raw bytes (e.g. read back from a GPU buffer) as nodes.
    ///
    /// Returns `None` if the bytes are misaligned or their length isn't a
    /// multiple of the node's size.
    pub fn from_bytes(bytes: &'a [u8]) -> Option<Self> {
        bytemuck::try_cast_slice(bytes).ok().map(Self::new)
    }

    pub fn get(&self, ptr: BvhPtr) -> Option<&'a BvhNode> {
        self.buffer.get(ptr.get() as usize)
    }

    pub fn root(&self) -> Option<&'a BvhNode> {
        self.get(BvhPtr::root())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns children of given node or `None` if it's a leaf.
    pub fn children(&self, ptr: BvhPtr) -> Option<(BvhPtr, BvhPtr)> {
        let node = self.get(ptr)?;

        if node.is_leaf() {
            None
        } else {
            Some((
                BvhPtr::new(node.left_child as u32),
                BvhPtr::new(node.right_child as u32),
            ))
        }
    }

    /// Returns payloads of all leaves, in depth-first order.
    pub fn leaves(&self) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = Vec::new();

        if !self.is_empty() {
            stack.push(BvhPtr::root());
        }

        while let Some(ptr) = stack.pop() {
            let Some(node) = self.get(ptr) else {
                continue;
            };

            if let Some((left, right)) = self.children(ptr) {
                stack.push(right);
                stack.push(left);
            } else {
                out.push(node.index);
            }
        }

        out
    }
}

//! Structs shared between Prism's BVH builder and the shaders consuming it.

mod bvh_node;
mod bvh_ptr;
mod bvh_view;

pub use self::bvh_node::*;
pub use self::bvh_ptr::*;
pub use self::bvh_view::*;

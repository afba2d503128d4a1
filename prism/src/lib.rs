//! Prism's acceleration structures: BVHs built on the CPU and laid out so that
//! they can be uploaded straight into GPU buffers.
//!
//! ```
//! use glam::vec3;
//! use prism::Bvh;
//!
//! let vertices = [
//!     vec3(0.0, 0.0, 0.0),
//!     vec3(1.0, 0.0, 0.0),
//!     vec3(0.0, 1.0, 0.0),
//!     vec3(5.0, 0.0, 0.0),
//!     vec3(6.0, 0.0, 0.0),
//!     vec3(5.0, 1.0, 0.0),
//! ];
//!
//! let bvh = Bvh::build(&vertices, &[0, 1, 2, 3, 4, 5]).unwrap();
//!
//! assert_eq!(3, bvh.size());
//! assert_eq!(3 * 32, bvh.as_bytes().len());
//! ```

mod bvh;
mod config;
mod error;
mod instance;
mod tbvh;
mod utils;
mod vertex;

pub use prism_gpu as gpu;

pub use self::bvh::*;
pub use self::config::*;
pub use self::error::*;
pub use self::instance::*;
pub use self::tbvh::*;
pub use self::utils::*;
pub use self::vertex::*;

#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// 4x4 homogeneous matrix type.
pub mod mat4;

pub use mat4::Mat4;

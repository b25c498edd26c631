#![deny(missing_docs)]
//! Volume types and grid attributes for volumetric image processing

/// grid description of a volume: extents, spacing and world placement.
pub mod attributes;

/// Error types for the volume module.
pub mod error;

/// scalar volume representation.
pub mod volume;

pub use crate::attributes::{ImageAttributes, VolumeSize};
pub use crate::error::VolumeError;
pub use crate::volume::{GreyVolume, RealVolume, Volume, VoxelType};

//! Voxel interpolation methods for volume resampling.
//!
//! This module reconstructs continuous intensities from the voxels of a volume, which is
//! needed whenever a volume is sampled at non-integer coordinates.
//!
//! # Interpolation Modes
//!
//! - **Nearest**: Fastest, uses the nearest voxel value (no interpolation)
//! - **Linear**: Trilinear interpolation between the 8 enclosing voxels
//! - **Cubic**: Separable cubic convolution over the 4x4x4 neighbourhood
//!
//! Every mode is exact on grid points and returns the background value outside the volume.

pub(crate) mod interpolate;
mod nearest;
mod tricubic;
mod trilinear;

pub use interpolate::{new_interpolator, InterpolationMode, VolumeInterpolator};

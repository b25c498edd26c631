#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// error types for the resampling operations.
pub mod error;

/// compute volume histogram module.
pub mod histogram;

/// utilities for interpolation.
pub mod interpolation;

/// voxel gates restricting an operation to a region.
pub mod mask;

/// module containing parallization utilities.
pub mod parallel;

/// volume resampling driver.
pub mod resample;

/// volume geometric transformations module.
pub mod warp;

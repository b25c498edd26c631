#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access, NIfTI decoding/encoding and
/// malformed transform files.
pub mod error;

/// High-level volume reading and writing functions.
///
/// Read and write NIfTI-1 volumes (`.nii`, `.nii.gz`) together with their grid attributes.
pub mod functional;

/// Transform matrix files.
pub mod matrix;

use voxreg_image::VolumeError;

use crate::parallel::ParallelError;

/// An error type for the resampling operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ResampleError {
    /// Error coming from the volume containers, e.g. a dimension mismatch.
    #[error("Invalid volume. {0}")]
    VolumeError(#[from] VolumeError),

    /// Error when the displacement field does not hold exactly 3 components per voxel.
    #[error("The displacement field does not define 3D vectors for each voxel, got {0} frames")]
    InvalidFieldRank(usize),

    /// Error when an interpolator is bound to a volume without voxels.
    #[error("Cannot interpolate an empty volume")]
    EmptyVolume,

    /// Error when parsing an unknown interpolation mode.
    #[error("Unknown interpolation mode: {0}")]
    InvalidInterpolationMode(String),

    /// Error when the output has more time frames than the input.
    #[error("Output has {0} frames but the input only has {1}")]
    FrameMismatch(usize, usize),

    /// Error when the parallel execution could not be set up.
    #[error("Parallel execution failed. {0}")]
    ParallelError(#[from] ParallelError),
}

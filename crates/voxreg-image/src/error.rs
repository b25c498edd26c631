use crate::attributes::VolumeSize;

/// An error type for the volume module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum VolumeError {
    /// Error when the data length does not match the volume size.
    #[error("Data length ({0}) does not match the volume size ({1})")]
    InvalidDataLength(usize, usize),

    /// Error when a voxel index is outside of the volume.
    #[error("Voxel index {0:?} is out of bounds for {1}")]
    VoxelIndexOutOfBounds([usize; 4], VolumeSize),

    /// Error when a time frame index is outside of the volume.
    #[error("Time frame {0} is out of bounds, the volume has {1} frames")]
    FrameIndexOutOfBounds(usize, usize),

    /// Error when two volumes do not share the same x, y, z extents.
    #[error("Volume size {0} does not have the same dimensionality as {1}")]
    DimensionMismatch(VolumeSize, VolumeSize),

    /// Error when an axis of the image-to-world matrix has zero length.
    #[error("Image-to-world matrix has a degenerate axis {0}")]
    DegenerateAxis(usize),

    /// Error when the image-to-world matrix cannot be inverted.
    #[error("Image-to-world matrix is singular")]
    SingularFrame,
}

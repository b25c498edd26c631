use voxreg_image::{ImageAttributes, Volume, VoxelType};

use crate::error::ResampleError;

/// A per-voxel gate deciding whether a voxel takes part in an operation.
pub trait VoxelGate: Sync {
    /// Whether the voxel `(x, y, z)` takes part.
    fn passes(&self, x: usize, y: usize, z: usize) -> bool;

    /// The grid the gate is defined on.
    fn grid(&self) -> &ImageAttributes;
}

/// Gate backed by a mask (e.g. segmentation) volume.
///
/// A voxel passes unless the mask holds the sentinel value there. The sentinel defaults to
/// zero, so any labelled voxel passes. Only the first time frame of the mask is read.
#[derive(Debug, Clone, Copy)]
pub struct MaskFilter<'a, M: VoxelType> {
    mask: &'a Volume<M>,
    sentinel: M,
}

impl<'a, M: VoxelType> MaskFilter<'a, M> {
    /// Wrap a mask volume after checking it against the grid it will gate.
    ///
    /// # Errors
    ///
    /// Returns [`voxreg_image::VolumeError::DimensionMismatch`] if the x, y, z extents differ.
    pub fn new(mask: &'a Volume<M>, grid: &ImageAttributes) -> Result<Self, ResampleError> {
        grid.ensure_dimension_compatible(mask.attributes())?;
        Ok(Self {
            mask,
            sentinel: M::default(),
        })
    }

    /// Set the value marking excluded voxels.
    pub fn with_sentinel(mut self, sentinel: M) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// The value marking excluded voxels.
    pub fn sentinel(&self) -> M {
        self.sentinel
    }
}

impl<M: VoxelType> VoxelGate for MaskFilter<'_, M> {
    #[inline]
    fn passes(&self, x: usize, y: usize, z: usize) -> bool {
        let offset = x + self.mask.x() * (y + self.mask.y() * z);
        self.mask.as_slice()[offset] != self.sentinel
    }

    fn grid(&self) -> &ImageAttributes {
        self.mask.attributes()
    }
}

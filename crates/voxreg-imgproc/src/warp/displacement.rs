use voxreg_image::{ImageAttributes, RealVolume};

use crate::error::ResampleError;

/// Number of displacement components stored along the time axis of a field.
pub const FIELD_COMPONENTS: usize = 3;

/// A dense displacement field defined on the output grid.
///
/// The field is a real volume whose time axis holds the displacement components: `dx` at
/// `t = 0`, `dy` at `t = 1` and `dz` at `t = 2`. Displacements are expressed in voxels of
/// the input volume, no world-space conversion is applied.
#[derive(Debug, Clone, Copy)]
pub struct DisplacementField<'a> {
    field: &'a RealVolume,
    frame_len: usize,
}

impl<'a> DisplacementField<'a> {
    /// Wrap a field volume after checking it against the grid it will be evaluated on.
    ///
    /// # Arguments
    ///
    /// * `field` - The displacement field volume.
    /// * `grid` - The grid of the volume being resampled.
    ///
    /// # Errors
    ///
    /// * [`voxreg_image::VolumeError::DimensionMismatch`] if the x, y, z extents differ.
    /// * [`ResampleError::InvalidFieldRank`] if the field does not have exactly 3 frames.
    pub fn new(field: &'a RealVolume, grid: &ImageAttributes) -> Result<Self, ResampleError> {
        grid.ensure_dimension_compatible(field.attributes())?;

        if field.t() != FIELD_COMPONENTS {
            return Err(ResampleError::InvalidFieldRank(field.t()));
        }

        Ok(Self {
            field,
            frame_len: field.size().frame_len(),
        })
    }

    /// The grid the field is defined on.
    pub fn grid(&self) -> &'a ImageAttributes {
        self.field.attributes()
    }

    /// Displacement `(dx, dy, dz)` at an integer voxel.
    ///
    /// PRECONDITION: `(x, y, z)` lies inside the field grid.
    #[inline]
    pub fn displacement(&self, x: usize, y: usize, z: usize) -> [f64; 3] {
        let offset = x + self.field.x() * (y + self.field.y() * z);
        let data = self.field.as_slice();
        [
            data[offset],
            data[offset + self.frame_len],
            data[offset + 2 * self.frame_len],
        ]
    }
}

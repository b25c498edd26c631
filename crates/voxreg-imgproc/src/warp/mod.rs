//! Spatial transforms driving the resampling of a volume.
//!
//! Both transform sources answer the same question, "how far does the voxel `(x, y, z)` move",
//! so the resampling driver never needs to know which one is active:
//!
//! - [`DisplacementField`]: a dense per-voxel displacement read from a 4D volume
//! - [`AffineDisplacement`]: a world-space affine composed with the image/world frames of a
//!   reference grid

mod affine;
mod displacement;

pub use affine::AffineDisplacement;
pub use displacement::{DisplacementField, FIELD_COMPONENTS};

use voxreg_image::ImageAttributes;

/// A source of voxel displacements.
#[derive(Debug, Clone, Copy)]
pub enum TransformSource<'a> {
    /// Dense displacement field.
    Field(DisplacementField<'a>),
    /// Affine displacement matrix.
    Affine(AffineDisplacement),
}

impl TransformSource<'_> {
    /// Displacement `(dx, dy, dz)` of the integer voxel `(x, y, z)`.
    #[inline]
    pub fn displacement(&self, x: usize, y: usize, z: usize) -> [f64; 3] {
        match self {
            TransformSource::Field(field) => field.displacement(x, y, z),
            TransformSource::Affine(affine) => affine.displacement(x as f64, y as f64, z as f64),
        }
    }

    /// The grid the displacements are defined on, if the source is bound to one.
    pub fn grid(&self) -> Option<&ImageAttributes> {
        match self {
            TransformSource::Field(field) => Some(field.grid()),
            TransformSource::Affine(_) => None,
        }
    }
}

impl<'a> From<DisplacementField<'a>> for TransformSource<'a> {
    fn from(field: DisplacementField<'a>) -> Self {
        TransformSource::Field(field)
    }
}

impl From<AffineDisplacement> for TransformSource<'_> {
    fn from(affine: AffineDisplacement) -> Self {
        TransformSource::Affine(affine)
    }
}

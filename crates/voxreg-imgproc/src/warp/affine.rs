use voxreg_algebra::Mat4;
use voxreg_image::ImageAttributes;

// Tolerance of the frame-alignment self-check on the linear block.
const ALIGNMENT_TOLERANCE: f64 = 1e-6;

/// A displacement defined by a world-space affine transform.
///
/// The voxel-space displacement matrix is composed once as
///
/// ```text
/// M = world_to_image * world_affine * image_to_world - I
/// ```
///
/// so that `(x, y, z) + M * (x, y, z, 1)` is where the voxel `(x, y, z)` of the reference grid
/// lands after applying `world_affine` in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineDisplacement {
    matrix: Mat4,
}

impl AffineDisplacement {
    /// Compose the displacement matrix from the frames of a reference grid and a world affine.
    ///
    /// # Arguments
    ///
    /// * `image_to_world` - The image-to-world matrix of the reference grid.
    /// * `world_to_image` - The world-to-image matrix of the same grid.
    /// * `world_affine` - The transform to apply in world space.
    ///
    /// # Example
    ///
    /// ```
    /// use voxreg_algebra::Mat4;
    /// use voxreg_image::ImageAttributes;
    /// use voxreg_imgproc::warp::AffineDisplacement;
    ///
    /// let grid = ImageAttributes::new([16, 16, 16]);
    /// let affine = AffineDisplacement::new(
    ///     &grid.image_to_world(),
    ///     &grid.world_to_image(),
    ///     &Mat4::from_translation([0.0, 0.0, 10.0]),
    /// );
    ///
    /// assert_eq!(affine.displacement(3.0, 4.0, 5.0), [0.0, 0.0, 10.0]);
    /// ```
    pub fn new(image_to_world: &Mat4, world_to_image: &Mat4, world_affine: &Mat4) -> Self {
        let matrix = *world_to_image * *world_affine * *image_to_world - Mat4::IDENTITY;
        let affine = Self { matrix };

        log::debug!("composed voxel displacement matrix:\n{}", matrix);

        if let Some(residual) = affine.alignment_warning(world_affine) {
            log::warn!(
                "displacement matrix of a world translation has a non-zero linear block \
                 (max |M[i,j]| = {residual:e}), the image and world frames may be misaligned"
            );
        }

        affine
    }

    /// Check the frames the matrix was composed from against `world_affine`.
    ///
    /// A pure world translation must leave the linear block of the displacement matrix at
    /// zero. Returns the linear residual when `world_affine` is a translation and the
    /// residual exceeds the alignment tolerance, `None` otherwise.
    pub fn alignment_warning(&self, world_affine: &Mat4) -> Option<f64> {
        let is_translation = (*world_affine - Mat4::from_translation(world_affine.translation()))
            .abs_diff_eq(&Mat4::ZERO, f64::EPSILON);
        let residual = self.linear_residual();
        (is_translation && residual > ALIGNMENT_TOLERANCE).then_some(residual)
    }

    /// Compose the displacement matrix using both frames of `reference`.
    pub fn from_attributes(reference: &ImageAttributes, world_affine: &Mat4) -> Self {
        Self::new(
            &reference.image_to_world(),
            &reference.world_to_image(),
            world_affine,
        )
    }

    /// Use an already composed voxel displacement matrix.
    pub fn from_displacement_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// The composed voxel displacement matrix.
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Largest absolute entry of the upper-left 3x3 block of the displacement matrix.
    ///
    /// Zero for a world translation when the frames are consistent.
    pub fn linear_residual(&self) -> f64 {
        self.matrix.linear_max_abs()
    }

    /// Displacement `(dx, dy, dz)` at a voxel.
    #[inline]
    pub fn displacement(&self, x: f64, y: f64, z: f64) -> [f64; 3] {
        let m = &self.matrix;
        [
            m.get(0, 0) * x + m.get(0, 1) * y + m.get(0, 2) * z + m.get(0, 3),
            m.get(1, 0) * x + m.get(1, 1) * y + m.get(1, 2) * z + m.get(1, 3),
            m.get(2, 0) * x + m.get(2, 1) * y + m.get(2, 2) * z + m.get(2, 3),
        ]
    }
}

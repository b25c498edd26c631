use voxreg_algebra::Mat4;

use crate::error::VolumeError;

// dot products of orthonormal axes stay within this of 0 or 1
const ORTHONORMAL_TOLERANCE: f64 = 1e-12;

/// Volume size in voxels
///
/// The extents of a 3D volume with an optional time axis. A plain 3D volume has `t == 1`.
///
/// # Examples
///
/// ```
/// use voxreg_image::VolumeSize;
///
/// let size = VolumeSize::from([10, 20, 5]);
///
/// assert_eq!(size.x, 10);
/// assert_eq!(size.t, 1);
/// assert_eq!(size.num_voxels(), 10 * 20 * 5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeSize {
    /// Number of voxels along x
    pub x: usize,
    /// Number of voxels along y
    pub y: usize,
    /// Number of voxels along z
    pub z: usize,
    /// Number of time frames
    pub t: usize,
}

impl VolumeSize {
    /// Number of voxels in a single time frame.
    pub fn frame_len(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Total number of voxels over all time frames.
    pub fn num_voxels(&self) -> usize {
        self.frame_len() * self.t
    }

    /// Whether both sizes share the same x, y and z extents.
    ///
    /// The time axis is not compared.
    pub fn is_dimension_compatible(&self, other: &VolumeSize) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

impl std::fmt::Display for VolumeSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "VolumeSize {{ x: {}, y: {}, z: {}, t: {} }}",
            self.x, self.y, self.z, self.t
        )
    }
}

impl From<[usize; 3]> for VolumeSize {
    fn from(size: [usize; 3]) -> Self {
        VolumeSize {
            x: size[0],
            y: size[1],
            z: size[2],
            t: 1,
        }
    }
}

impl From<[usize; 4]> for VolumeSize {
    fn from(size: [usize; 4]) -> Self {
        VolumeSize {
            x: size[0],
            y: size[1],
            z: size[2],
            t: size[3],
        }
    }
}

/// Grid description of a volume: extents, voxel spacing and its placement in world space.
///
/// The image-to-world mapping places the centre of the voxel grid at `origin`:
///
/// ```text
/// image_to_world = T(origin) * [xaxis | yaxis | zaxis] * S(dx, dy, dz) * T(-(x-1)/2, -(y-1)/2, -(z-1)/2)
/// ```
///
/// and world-to-image is its inverse. The axes are unit vectors but need not be orthogonal,
/// so a sheared frame is represented exactly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageAttributes {
    /// Extents of the grid.
    pub size: VolumeSize,
    /// Voxel spacing `(dx, dy, dz, dt)`.
    pub spacing: [f64; 4],
    /// World position of the grid centre.
    pub origin: [f64; 3],
    /// Orientation of the x, y and z voxel axes in world space.
    pub axes: [[f64; 3]; 3],
}

impl ImageAttributes {
    /// Create attributes with unit spacing, zero origin and identity orientation.
    pub fn new(size: impl Into<VolumeSize>) -> Self {
        Self {
            size: size.into(),
            spacing: [1.0; 4],
            origin: [0.0; 3],
            axes: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Set the spatial voxel spacing.
    pub fn with_spacing(mut self, dx: f64, dy: f64, dz: f64) -> Self {
        self.spacing = [dx, dy, dz, self.spacing[3]];
        self
    }

    /// Set the world position of the grid centre.
    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Set the orientation of the voxel axes.
    pub fn with_axes(mut self, axes: [[f64; 3]; 3]) -> Self {
        self.axes = axes;
        self
    }

    /// Copy of the attributes with a different number of time frames.
    pub fn with_frames(mut self, t: usize) -> Self {
        self.size.t = t;
        self
    }

    /// Recover the attributes from an image-to-world matrix.
    ///
    /// The spacing is the length of each of the first three columns and the axes their
    /// normalised directions. The origin is the image of the grid centre.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::DegenerateAxis`] if a column has zero length and
    /// [`VolumeError::SingularFrame`] if the columns are linearly dependent.
    pub fn from_image_to_world(
        size: impl Into<VolumeSize>,
        image_to_world: &Mat4,
    ) -> Result<Self, VolumeError> {
        let size = size.into();
        let mut spacing = [1.0; 4];
        let mut axes = [[0.0; 3]; 3];

        for (i, axis) in axes.iter_mut().enumerate() {
            let col = [
                image_to_world.get(0, i),
                image_to_world.get(1, i),
                image_to_world.get(2, i),
            ];
            let norm = (col[0] * col[0] + col[1] * col[1] + col[2] * col[2]).sqrt();
            if norm.is_nan() || norm <= f64::EPSILON {
                return Err(VolumeError::DegenerateAxis(i));
            }
            spacing[i] = norm;
            *axis = [col[0] / norm, col[1] / norm, col[2] / norm];
        }

        if image_to_world.try_inverse().is_none() {
            return Err(VolumeError::SingularFrame);
        }

        let origin = image_to_world.transform_point(Self::grid_centre(&size));

        Ok(Self {
            size,
            spacing,
            origin,
            axes,
        })
    }

    fn grid_centre(size: &VolumeSize) -> [f64; 3] {
        [
            (size.x as f64 - 1.0) / 2.0,
            (size.y as f64 - 1.0) / 2.0,
            (size.z as f64 - 1.0) / 2.0,
        ]
    }

    /// Matrix mapping voxel coordinates to world coordinates.
    pub fn image_to_world(&self) -> Mat4 {
        let [cx, cy, cz] = Self::grid_centre(&self.size);
        let [dx, dy, dz, _] = self.spacing;
        let [xa, ya, za] = self.axes;

        let rotation = Mat4::from_rows([
            [xa[0], ya[0], za[0], 0.0],
            [xa[1], ya[1], za[1], 0.0],
            [xa[2], ya[2], za[2], 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        Mat4::from_translation(self.origin)
            * rotation
            * Mat4::from_scale([dx, dy, dz])
            * Mat4::from_translation([-cx, -cy, -cz])
    }

    fn has_orthonormal_axes(&self) -> bool {
        let dot = |a: [f64; 3], b: [f64; 3]| a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
        let [xa, ya, za] = self.axes;

        [(xa, xa, 1.0), (ya, ya, 1.0), (za, za, 1.0)]
            .into_iter()
            .chain([(xa, ya, 0.0), (xa, za, 0.0), (ya, za, 0.0)])
            .all(|(a, b, expected)| (dot(a, b) - expected).abs() <= ORTHONORMAL_TOLERANCE)
    }

    /// Matrix mapping world coordinates to voxel coordinates.
    ///
    /// Orthonormal axes are inverted by transposition. Any other frame, such as a sheared
    /// sform, is inverted in full.
    pub fn world_to_image(&self) -> Mat4 {
        if !self.has_orthonormal_axes() {
            if let Some(inverse) = self.image_to_world().try_inverse() {
                return inverse;
            }
            log::warn!("image-to-world matrix is singular, inverting its axes by transposition");
        }

        let [cx, cy, cz] = Self::grid_centre(&self.size);
        let [dx, dy, dz, _] = self.spacing;
        let [xa, ya, za] = self.axes;
        let [ox, oy, oz] = self.origin;

        let rotation_t = Mat4::from_rows([
            [xa[0], xa[1], xa[2], 0.0],
            [ya[0], ya[1], ya[2], 0.0],
            [za[0], za[1], za[2], 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        Mat4::from_translation([cx, cy, cz])
            * Mat4::from_scale([1.0 / dx, 1.0 / dy, 1.0 / dz])
            * rotation_t
            * Mat4::from_translation([-ox, -oy, -oz])
    }

    /// Map a voxel coordinate to world coordinates.
    pub fn image_to_world_point(&self, p: [f64; 3]) -> [f64; 3] {
        self.image_to_world().transform_point(p)
    }

    /// Map a world coordinate to voxel coordinates.
    pub fn world_to_image_point(&self, p: [f64; 3]) -> [f64; 3] {
        self.world_to_image().transform_point(p)
    }

    /// Whether both grids share the same x, y and z extents.
    pub fn is_dimension_compatible(&self, other: &ImageAttributes) -> bool {
        self.size.is_dimension_compatible(&other.size)
    }

    /// Check that both grids share the same x, y and z extents.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::DimensionMismatch`] with both sizes otherwise.
    pub fn ensure_dimension_compatible(&self, other: &ImageAttributes) -> Result<(), VolumeError> {
        if !self.is_dimension_compatible(other) {
            return Err(VolumeError::DimensionMismatch(self.size, other.size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn volume_size_compat() {
        let a = VolumeSize::from([4, 5, 6]);
        let b = VolumeSize::from([4, 5, 6, 3]);
        let c = VolumeSize::from([4, 5, 7]);
        assert!(a.is_dimension_compatible(&b));
        assert!(!a.is_dimension_compatible(&c));
        assert_eq!(b.num_voxels(), 4 * 5 * 6 * 3);
        assert_eq!(b.frame_len(), 4 * 5 * 6);
    }

    #[test]
    fn centre_maps_to_origin() {
        let attr = ImageAttributes::new([5, 5, 5])
            .with_spacing(2.0, 2.0, 2.0)
            .with_origin([10.0, -3.0, 1.0]);

        let p = attr.image_to_world_point([2.0, 2.0, 2.0]);
        assert_relative_eq!(p[0], 10.0);
        assert_relative_eq!(p[1], -3.0);
        assert_relative_eq!(p[2], 1.0);

        let p = attr.image_to_world_point([3.0, 2.0, 2.0]);
        assert_relative_eq!(p[0], 12.0);
    }

    #[test]
    fn world_to_image_is_inverse() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let attr = ImageAttributes::new([8, 6, 4])
            .with_spacing(0.5, 1.0, 3.0)
            .with_origin([1.0, 2.0, 3.0])
            .with_axes([[s, s, 0.0], [-s, s, 0.0], [0.0, 0.0, 1.0]]);

        let m = attr.world_to_image() * attr.image_to_world();
        assert!(m.abs_diff_eq(&Mat4::IDENTITY, 1e-12));
    }

    #[test]
    fn from_image_to_world_roundtrip() -> Result<(), VolumeError> {
        let i2w = Mat4::from_rows([
            [-2.0, 0.0, 0.0, 90.0],
            [0.0, 2.0, 0.0, -126.0],
            [0.0, 0.0, 2.5, -72.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let attr = ImageAttributes::from_image_to_world([91, 109, 91], &i2w)?;

        assert_relative_eq!(attr.spacing[0], 2.0);
        assert_relative_eq!(attr.spacing[2], 2.5);
        assert_relative_eq!(attr.axes[0][0], -1.0);
        assert!(attr.image_to_world().abs_diff_eq(&i2w, 1e-9));

        Ok(())
    }

    #[test]
    fn sheared_frame_inverse() -> Result<(), VolumeError> {
        let i2w = Mat4::from_rows([
            [1.0, 0.3, 0.0, -10.0],
            [0.0, 1.0, 0.0, 5.0],
            [0.0, 0.0, 2.0, 7.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let attr = ImageAttributes::from_image_to_world([16, 16, 16], &i2w)?;

        assert!(attr.image_to_world().abs_diff_eq(&i2w, 1e-9));
        let m = attr.world_to_image() * attr.image_to_world();
        assert!(m.abs_diff_eq(&Mat4::IDENTITY, 1e-9));

        let p = attr.world_to_image_point(attr.image_to_world_point([5.0, 5.0, 5.0]));
        assert_relative_eq!(p[0], 5.0, epsilon = 1e-9);
        assert_relative_eq!(p[1], 5.0, epsilon = 1e-9);
        assert_relative_eq!(p[2], 5.0, epsilon = 1e-9);

        Ok(())
    }

    #[test]
    fn from_image_to_world_degenerate() {
        let mut i2w = Mat4::IDENTITY;
        i2w.put(1, 1, 0.0);
        assert_eq!(
            ImageAttributes::from_image_to_world([2, 2, 2], &i2w),
            Err(VolumeError::DegenerateAxis(1))
        );

        let coplanar = Mat4::from_rows([
            [1.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(
            ImageAttributes::from_image_to_world([2, 2, 2], &coplanar),
            Err(VolumeError::SingularFrame)
        );
    }

    #[test]
    fn dimension_mismatch() {
        let a = ImageAttributes::new([4, 4, 4]);
        let b = ImageAttributes::new([4, 4, 3]);
        assert!(a.ensure_dimension_compatible(&a.with_frames(3)).is_ok());
        assert_eq!(
            a.ensure_dimension_compatible(&b),
            Err(VolumeError::DimensionMismatch(a.size, b.size))
        );
    }
}

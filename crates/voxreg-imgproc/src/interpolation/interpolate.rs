use std::fmt;
use std::str::FromStr;

use voxreg_image::{Volume, VoxelType};

use super::nearest::nearest_neighbor_interpolation;
use super::tricubic::tricubic_interpolation;
use super::trilinear::trilinear_interpolation;
use crate::error::ResampleError;

// Coordinates within this distance (in voxels) of the volume faces are snapped onto them,
// which absorbs the rounding left over by composed matrices.
const BOUNDARY_TOLERANCE: f64 = 1e-6;

/// Interpolation mode for the resampling operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Nearest neighbor interpolation
    Nearest,
    /// Trilinear interpolation
    #[default]
    Linear,
    /// Tricubic (Keys cubic convolution) interpolation
    Cubic,
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterpolationMode::Nearest => "nearest",
            InterpolationMode::Linear => "linear",
            InterpolationMode::Cubic => "cubic",
        };
        f.write_str(name)
    }
}

impl FromStr for InterpolationMode {
    type Err = ResampleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nn" | "nearest" => Ok(InterpolationMode::Nearest),
            "linear" | "trilinear" => Ok(InterpolationMode::Linear),
            "cubic" | "tricubic" => Ok(InterpolationMode::Cubic),
            _ => Err(ResampleError::InvalidInterpolationMode(s.to_string())),
        }
    }
}

/// An interpolator bound to a volume.
///
/// Reconstructs a continuous intensity from the voxels of the bound volume. The only way to
/// obtain one is [`new_interpolator`], so an interpolator is always initialized before use.
///
/// Boundary policy: the domain of the interpolator is `[0, X-1] x [0, Y-1] x [0, Z-1]` in voxel
/// coordinates. Any coordinate outside the domain (or `NaN`) evaluates to the background
/// value, which defaults to `0.0`. Inside the domain only in-range voxels are read.
///
/// The interpolator never mutates the volume and can be shared between threads.
#[derive(Debug, Clone, Copy)]
pub struct VolumeInterpolator<'a, T: VoxelType> {
    volume: &'a Volume<T>,
    mode: InterpolationMode,
    background: f64,
    upper: [f64; 3],
}

/// Create an interpolator of the given mode bound to `volume`.
///
/// # Arguments
///
/// * `mode` - The interpolation kernel to use.
/// * `volume` - The volume to interpolate.
///
/// # Errors
///
/// Returns [`ResampleError::EmptyVolume`] if the volume has no voxels.
///
/// # Example
///
/// ```
/// use voxreg_image::{ImageAttributes, Volume};
/// use voxreg_imgproc::interpolation::{new_interpolator, InterpolationMode};
///
/// let volume = Volume::<i16>::from_fn(ImageAttributes::new([4, 4, 4]), |x, _, _, _| x as i16);
/// let interp = new_interpolator(InterpolationMode::Linear, &volume).unwrap();
///
/// assert_eq!(interp.evaluate(1.0, 2.0, 3.0), 1.0);
/// assert_eq!(interp.evaluate(1.5, 0.0, 0.0), 1.5);
/// assert_eq!(interp.evaluate(4.0, 0.0, 0.0), 0.0);
/// ```
pub fn new_interpolator<T: VoxelType>(
    mode: InterpolationMode,
    volume: &Volume<T>,
) -> Result<VolumeInterpolator<'_, T>, ResampleError> {
    if volume.num_voxels() == 0 {
        return Err(ResampleError::EmptyVolume);
    }

    Ok(VolumeInterpolator {
        volume,
        mode,
        background: 0.0,
        upper: [
            (volume.x() - 1) as f64,
            (volume.y() - 1) as f64,
            (volume.z() - 1) as f64,
        ],
    })
}

impl<'a, T: VoxelType> VolumeInterpolator<'a, T> {
    /// Set the value returned for coordinates outside the volume.
    pub fn with_background(mut self, background: f64) -> Self {
        self.background = background;
        self
    }

    /// The interpolation kernel in use.
    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    /// The value returned for coordinates outside the volume.
    pub fn background(&self) -> f64 {
        self.background
    }

    /// The bound volume.
    pub fn volume(&self) -> &'a Volume<T> {
        self.volume
    }

    /// Whether the coordinate lies inside the interpolation domain.
    #[inline]
    pub fn is_inside(&self, x: f64, y: f64, z: f64) -> bool {
        let lo = -BOUNDARY_TOLERANCE;
        (lo..=self.upper[0] + BOUNDARY_TOLERANCE).contains(&x)
            && (lo..=self.upper[1] + BOUNDARY_TOLERANCE).contains(&y)
            && (lo..=self.upper[2] + BOUNDARY_TOLERANCE).contains(&z)
    }

    /// Evaluate the first time frame at a continuous voxel coordinate.
    #[inline]
    pub fn evaluate(&self, x: f64, y: f64, z: f64) -> f64 {
        self.evaluate_at(x, y, z, 0)
    }

    /// Evaluate time frame `t` at a continuous voxel coordinate.
    ///
    /// Returns the background value outside the domain or for a missing time frame.
    pub fn evaluate_at(&self, x: f64, y: f64, z: f64, t: usize) -> f64 {
        if t >= self.volume.t() || !self.is_inside(x, y, z) {
            return self.background;
        }

        let x = x.clamp(0.0, self.upper[0]);
        let y = y.clamp(0.0, self.upper[1]);
        let z = z.clamp(0.0, self.upper[2]);

        match self.mode {
            InterpolationMode::Nearest => nearest_neighbor_interpolation(self.volume, x, y, z, t),
            InterpolationMode::Linear => trilinear_interpolation(self.volume, x, y, z, t),
            InterpolationMode::Cubic => tricubic_interpolation(self.volume, x, y, z, t),
        }
    }
}

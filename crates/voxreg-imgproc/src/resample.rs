use std::sync::atomic::{AtomicUsize, Ordering};

use voxreg_algebra::Mat4;
use voxreg_image::{RealVolume, Volume, VoxelType};

use crate::error::ResampleError;
use crate::interpolation::{new_interpolator, InterpolationMode, VolumeInterpolator};
use crate::mask::VoxelGate;
use crate::parallel::{self, ExecutionStrategy};
use crate::warp::{AffineDisplacement, DisplacementField, TransformSource};

/// Statistics of a resampling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResampleSummary {
    /// Number of output voxels written.
    pub written: usize,
    /// Number of output voxels skipped by the mask.
    pub skipped: usize,
}

/// Resamples a volume onto an output grid through a transform source.
///
/// For every output voxel `(x, y, z)` the driver:
///
/// 1. skips the voxel if a mask is set and does not pass it,
/// 2. reads the displacement `(dx, dy, dz)` from the transform source,
/// 3. evaluates the interpolator at `(x + dx, y + dy, z + dz)` in the input voxel space,
/// 4. writes the value converted with the policy of the output voxel type.
///
/// Skipped voxels keep the value they had before the pass.
pub struct Resampler<'a, T: VoxelType> {
    source: TransformSource<'a>,
    interpolator: VolumeInterpolator<'a, T>,
    mask: Option<&'a dyn VoxelGate>,
    strategy: ExecutionStrategy,
}

impl<'a, T: VoxelType> Resampler<'a, T> {
    /// Create a new resampler.
    ///
    /// # Arguments
    ///
    /// * `source` - The transform source giving the displacement of every output voxel.
    /// * `interpolator` - The interpolator bound to the input volume.
    pub fn new(
        source: impl Into<TransformSource<'a>>,
        interpolator: VolumeInterpolator<'a, T>,
    ) -> Self {
        Self {
            source: source.into(),
            interpolator,
            mask: None,
            strategy: ExecutionStrategy::default(),
        }
    }

    /// Only resample the voxels passed by `mask`.
    pub fn with_mask(mut self, mask: &'a dyn VoxelGate) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Set the execution strategy of the voxel loop.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Resample into `dst`.
    ///
    /// Every check runs before the first voxel is written, so on error `dst` is untouched.
    ///
    /// # Errors
    ///
    /// * [`voxreg_image::VolumeError::DimensionMismatch`] if `dst` does not match the grid of
    ///   the transform source or of the mask.
    /// * [`ResampleError::FrameMismatch`] if `dst` has more time frames than the input.
    /// * [`ResampleError::ParallelError`] if the execution strategy cannot be set up.
    pub fn resample<U: VoxelType>(
        &self,
        dst: &mut Volume<U>,
    ) -> Result<ResampleSummary, ResampleError> {
        let attributes = *dst.attributes();

        if let Some(grid) = self.source.grid() {
            attributes.ensure_dimension_compatible(grid)?;
        }

        if let Some(mask) = self.mask {
            attributes.ensure_dimension_compatible(mask.grid())?;
        }

        let input_frames = self.interpolator.volume().t();
        if dst.t() > input_frames {
            return Err(ResampleError::FrameMismatch(dst.t(), input_frames));
        }

        let (nx, ny, nz) = (dst.x(), dst.y(), dst.z());
        let written = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);

        // one chunk per z-slice of every time frame
        parallel::par_iter_slices(dst.as_slice_mut(), nx * ny, self.strategy, |k, slice| {
            let (t, z) = (k / nz, k % nz);
            let (mut slice_written, mut slice_skipped) = (0, 0);

            for y in 0..ny {
                for x in 0..nx {
                    if let Some(mask) = self.mask {
                        if !mask.passes(x, y, z) {
                            slice_skipped += 1;
                            continue;
                        }
                    }

                    let [dx, dy, dz] = self.source.displacement(x, y, z);
                    let val = self.interpolator.evaluate_at(
                        x as f64 + dx,
                        y as f64 + dy,
                        z as f64 + dz,
                        t,
                    );

                    slice[x + nx * y] = U::from_f64(val);
                    slice_written += 1;
                }
            }

            written.fetch_add(slice_written, Ordering::Relaxed);
            skipped.fetch_add(slice_skipped, Ordering::Relaxed);
        })?;

        let summary = ResampleSummary {
            written: written.into_inner(),
            skipped: skipped.into_inner(),
        };

        log::debug!(
            "resampled {} voxels ({} skipped) with {} interpolation",
            summary.written,
            summary.skipped,
            self.interpolator.mode()
        );

        Ok(summary)
    }
}

/// Resample `src` into `dst` through a dense displacement field.
///
/// # Arguments
///
/// * `src` - The input volume.
/// * `field` - The displacement field, defined on the grid of `dst`, with 3 frames.
/// * `dst` - The output volume.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use voxreg_image::{ImageAttributes, Volume};
/// use voxreg_imgproc::interpolation::InterpolationMode;
/// use voxreg_imgproc::resample::warp_field;
///
/// let grid = ImageAttributes::new([4, 4, 4]);
/// let src = Volume::<i16>::from_fn(grid, |x, _, _, _| x as i16);
/// let field = Volume::<f64>::from_fn(grid.with_frames(3), |_, _, _, t| (t == 0) as u8 as f64);
/// let mut dst = Volume::<i16>::from_attributes(grid);
///
/// warp_field(&src, &field, &mut dst, InterpolationMode::Linear).unwrap();
///
/// assert_eq!(dst.get([0, 0, 0, 0]), Some(&1));
/// assert_eq!(dst.get([3, 0, 0, 0]), Some(&0));
/// ```
pub fn warp_field<T: VoxelType, U: VoxelType>(
    src: &Volume<T>,
    field: &RealVolume,
    dst: &mut Volume<U>,
    interpolation: InterpolationMode,
) -> Result<ResampleSummary, ResampleError> {
    let source = DisplacementField::new(field, dst.attributes())?;
    let interpolator = new_interpolator(interpolation, src)?;
    Resampler::new(source, interpolator).resample(dst)
}

/// Resample `src` into `dst` through a world-space affine transform.
///
/// The image/world frames are taken from the grid of `dst`.
pub fn warp_affine<T: VoxelType, U: VoxelType>(
    src: &Volume<T>,
    dst: &mut Volume<U>,
    world_affine: &Mat4,
    interpolation: InterpolationMode,
) -> Result<ResampleSummary, ResampleError> {
    let source = AffineDisplacement::from_attributes(dst.attributes(), world_affine);
    let interpolator = new_interpolator(interpolation, src)?;
    Resampler::new(source, interpolator).resample(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskFilter;
    use voxreg_image::{ImageAttributes, VolumeError};

    fn ramp_x(grid: ImageAttributes) -> Volume<i16> {
        Volume::from_fn(grid, |x, _, _, _| x as i16)
    }

    fn constant_field(grid: ImageAttributes, d: [f64; 3]) -> RealVolume {
        Volume::from_fn(grid.with_frames(3), |_, _, _, t| d[t])
    }

    #[test]
    fn shift_along_x() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([4, 4, 4]);
        let src = ramp_x(grid);
        let field = constant_field(grid, [1.0, 0.0, 0.0]);
        let mut dst = Volume::<i16>::from_attributes(grid);

        let summary = warp_field(&src, &field, &mut dst, InterpolationMode::Linear)?;
        assert_eq!(summary.written, 64);
        assert_eq!(summary.skipped, 0);

        for z in 0..4 {
            for y in 0..4 {
                for x in 0..4 {
                    let expected = if x < 3 { x as i16 + 1 } else { 0 };
                    assert_eq!(dst.get([x, y, z, 0]), Some(&expected));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn zero_field_is_identity() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([5, 4, 3]);
        let src = Volume::<i16>::from_fn(grid, |x, y, z, _| (x * 100 + y * 10 + z) as i16 - 50);
        let field = constant_field(grid, [0.0; 3]);

        for mode in [
            InterpolationMode::Nearest,
            InterpolationMode::Linear,
            InterpolationMode::Cubic,
        ] {
            let mut dst = Volume::<i16>::from_attributes(grid);
            warp_field(&src, &field, &mut dst, mode)?;
            assert_eq!(dst, src);
        }
        Ok(())
    }

    #[test]
    fn identity_affine_is_identity() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([6, 5, 4]).with_spacing(0.5, 1.0, 2.0);
        let src = Volume::<f64>::from_fn(grid, |x, y, z, _| (x * y + z) as f64 * 0.25);
        let mut dst = Volume::<f64>::from_attributes(grid);

        warp_affine(&src, &mut dst, &Mat4::IDENTITY, InterpolationMode::Linear)?;
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn affine_translation_moves_voxels() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([4, 4, 16]);
        let src = Volume::<i16>::from_fn(grid, |_, _, z, _| z as i16);
        let mut dst = Volume::<i16>::from_attributes(grid);

        warp_affine(
            &src,
            &mut dst,
            &Mat4::from_translation([0.0, 0.0, 10.0]),
            InterpolationMode::Linear,
        )?;

        for z in 0..16 {
            let expected = if z + 10 < 16 { z as i16 + 10 } else { 0 };
            assert_eq!(dst.get([2, 1, z, 0]), Some(&expected));
        }
        Ok(())
    }

    #[test]
    fn mask_skips_voxels() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([4, 4, 4]);
        let src = Volume::<i16>::from_attributes_val(grid, 9);
        let mask = Volume::<f64>::from_fn(grid, |x, _, _, _| (x % 2) as f64);
        let filter = MaskFilter::new(&mask, &grid)?;

        let source = AffineDisplacement::from_attributes(&grid, &Mat4::IDENTITY);
        let interpolator = new_interpolator(InterpolationMode::Linear, &src)?;

        let mut dst = Volume::<i16>::from_attributes_val(grid, -1);
        let summary = Resampler::new(source, interpolator)
            .with_mask(&filter)
            .resample(&mut dst)?;

        assert_eq!(summary, ResampleSummary { written: 32, skipped: 32 });
        for z in 0..4 {
            for y in 0..4 {
                for x in 0..4 {
                    let expected = if x % 2 == 0 { -1 } else { 9 };
                    assert_eq!(dst.get([x, y, z, 0]), Some(&expected));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn dimension_mismatch_writes_nothing() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([4, 4, 4]);
        let src = ramp_x(grid);
        let field = constant_field(grid, [0.0; 3]);
        let source = DisplacementField::new(&field, &grid)?;
        let interpolator = new_interpolator(InterpolationMode::Linear, &src)?;

        let other = ImageAttributes::new([4, 4, 5]);
        let mut dst = Volume::<i16>::from_attributes_val(other, 3);
        let res = Resampler::new(source, interpolator).resample(&mut dst);

        assert_eq!(
            res,
            Err(ResampleError::VolumeError(VolumeError::DimensionMismatch(
                other.size, grid.size
            )))
        );
        assert!(dst.as_slice().iter().all(|&v| v == 3));
        Ok(())
    }

    #[test]
    fn mask_dimension_mismatch() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([4, 4, 4]);
        let src = ramp_x(grid);
        let mask = Volume::<u8>::from_attributes_val(ImageAttributes::new([2, 2, 2]), 1);
        let filter = MaskFilter::new(&mask, mask.attributes())?;

        let source = AffineDisplacement::from_attributes(&grid, &Mat4::IDENTITY);
        let interpolator = new_interpolator(InterpolationMode::Linear, &src)?;
        let mut dst = Volume::<i16>::from_attributes(grid);

        let res = Resampler::new(source, interpolator)
            .with_mask(&filter)
            .resample(&mut dst);
        assert!(matches!(
            res,
            Err(ResampleError::VolumeError(VolumeError::DimensionMismatch(..)))
        ));
        Ok(())
    }

    #[test]
    fn nan_displacement_propagates() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([3, 3, 3]);
        let src = Volume::<f64>::from_attributes_val(grid, 1.0);
        let matrix = Mat4::from_rows([
            [f64::NAN, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
        ]);
        let source = AffineDisplacement::from_displacement_matrix(matrix);
        let interpolator = new_interpolator(InterpolationMode::Linear, &src)?;

        // NaN coordinates fall outside the domain and take the background value
        let mut dst = Volume::<f64>::from_attributes_val(grid, 5.0);
        Resampler::new(source, interpolator.with_background(f64::NAN)).resample(&mut dst)?;
        assert!(dst.as_slice().iter().all(|v| v.is_nan()));

        // integral outputs map NaN to zero
        let mut grey = Volume::<i16>::from_attributes_val(grid, 5);
        Resampler::new(source, interpolator.with_background(f64::NAN)).resample(&mut grey)?;
        assert!(grey.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn output_saturates() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([2, 2, 2]);
        let src = Volume::<f64>::from_fn(grid, |x, _, _, _| if x == 0 { 1.0e6 } else { -1.0e6 });
        let field = constant_field(grid, [0.0; 3]);
        let mut dst = Volume::<i16>::from_attributes(grid);

        warp_field(&src, &field, &mut dst, InterpolationMode::Nearest)?;
        assert_eq!(dst.get([0, 1, 1, 0]), Some(&i16::MAX));
        assert_eq!(dst.get([1, 1, 1, 0]), Some(&i16::MIN));
        Ok(())
    }

    #[test]
    fn serial_matches_parallel() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([9, 7, 5]);
        let src = Volume::<f32>::from_fn(grid, |x, y, z, _| ((x * 31 + y * 17 + z * 7) % 23) as f32);
        let field = Volume::<f64>::from_fn(grid.with_frames(3), |x, y, z, t| {
            0.3 * ((x + 2 * y + 3 * z + t) % 5) as f64 - 0.6
        });
        let source = DisplacementField::new(&field, &grid)?;
        let interpolator = new_interpolator(InterpolationMode::Cubic, &src)?;
        let resampler = Resampler::new(source, interpolator);

        let mut serial = Volume::<f32>::from_attributes(grid);
        resampler
            .with_strategy(ExecutionStrategy::Serial)
            .resample(&mut serial)?;

        let resampler = Resampler::new(source, interpolator);
        let mut parallel = Volume::<f32>::from_attributes(grid);
        resampler.resample(&mut parallel)?;

        let mut fixed = Volume::<f32>::from_attributes(grid);
        Resampler::new(source, interpolator)
            .with_strategy(ExecutionStrategy::Fixed(3))
            .resample(&mut fixed)?;

        assert_eq!(serial, parallel);
        assert_eq!(serial, fixed);
        Ok(())
    }

    #[test]
    fn frames_are_resampled() -> Result<(), ResampleError> {
        let grid = ImageAttributes::new([3, 3, 3]).with_frames(2);
        let src = Volume::<i16>::from_fn(grid, |x, _, _, t| (x + 10 * t) as i16);
        let source = AffineDisplacement::from_attributes(&grid, &Mat4::IDENTITY);
        let interpolator = new_interpolator(InterpolationMode::Nearest, &src)?;

        let mut dst = Volume::<i16>::from_attributes(grid);
        Resampler::new(source, interpolator).resample(&mut dst)?;
        assert_eq!(dst, src);

        let single = ImageAttributes::new([3, 3, 3]);
        let single_src = Volume::<i16>::from_attributes(single);
        let interpolator = new_interpolator(InterpolationMode::Nearest, &single_src)?;
        let res = Resampler::new(source, interpolator).resample(&mut dst);
        assert_eq!(res, Err(ResampleError::FrameMismatch(2, 1)));
        Ok(())
    }
}

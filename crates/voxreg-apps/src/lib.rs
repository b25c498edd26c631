#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use voxreg::algebra::Mat4;
use voxreg::image::GreyVolume;
use voxreg::imgproc::{
    error::ResampleError,
    interpolation::{new_interpolator, InterpolationMode},
    mask::MaskFilter,
    resample::{warp_field, ResampleSummary, Resampler},
    warp::AffineDisplacement,
};
use voxreg::io::{
    error::IoError,
    functional::{read_attributes, read_volume, write_volume_grey},
};

/// World-space translation applied by `warp_roi` when no transform file is given.
pub const DEFAULT_WORLD_TRANSLATION: [f64; 3] = [0.0, 0.0, 10.0];

/// An error type for the command line drivers.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Error reading or writing a file.
    #[error(transparent)]
    IoError(#[from] IoError),

    /// Error validating or running the resampling.
    #[error(transparent)]
    ResampleError(#[from] ResampleError),

    /// Error printing the diagnostic matrices.
    #[error("Failed to print the diagnostics. {0}")]
    DiagnosticsError(#[from] std::io::Error),
}

/// The world transform used by `warp_roi`, read from `file_path` if given.
pub fn world_transform(file_path: Option<&Path>) -> Result<Mat4, AppError> {
    match file_path {
        Some(path) => Ok(voxreg::io::matrix::read_matrix(path)?),
        None => Ok(Mat4::from_translation(DEFAULT_WORLD_TRANSLATION)),
    }
}

/// Resample a grey volume through a displacement field and write the result.
///
/// The output has the grid of the input. Nothing is written if any check fails.
///
/// # Arguments
///
/// * `input` - The grey volume to resample.
/// * `displacement_field` - The real field with the `dx, dy, dz` components as 3 time frames.
/// * `output` - Where to write the resampled grey volume.
/// * `interpolation` - The interpolation mode.
pub fn warp_by_field(
    input: &Path,
    displacement_field: &Path,
    output: &Path,
    interpolation: InterpolationMode,
) -> Result<ResampleSummary, AppError> {
    let input = read_volume::<i16>(input)?;
    let field = read_volume::<f64>(displacement_field)?;

    let mut resampled = GreyVolume::from_attributes(*input.attributes());
    let summary = warp_field(&input, &field, &mut resampled, interpolation)?;

    write_volume_grey(output, &resampled)?;
    log::info!("wrote {} voxels to {}", summary.written, output.display());

    Ok(summary)
}

/// Resample the labelled region of a grey volume through a world-space affine.
///
/// The image/world frames come from the header of `metadata`, and only voxels where
/// `segmentation` is non-zero are resampled, the others stay zero. The diagnostic matrices
/// are printed to `out` before the voxel loop.
///
/// # Arguments
///
/// * `input` - The grey volume to resample.
/// * `metadata` - A volume whose header supplies the image/world frames.
/// * `segmentation` - The mask selecting the voxels to resample.
/// * `output` - Where to write the resampled grey volume.
/// * `world_affine` - The transform to apply in world space.
/// * `interpolation` - The interpolation mode.
/// * `out` - Sink for the diagnostic matrices.
pub fn warp_region(
    input: &Path,
    metadata: &Path,
    segmentation: &Path,
    output: &Path,
    world_affine: &Mat4,
    interpolation: InterpolationMode,
    out: &mut impl Write,
) -> Result<ResampleSummary, AppError> {
    let input = read_volume::<i16>(input)?;
    let frames = read_attributes(metadata)?;
    let segmentation = read_volume::<f64>(segmentation)?;

    let mask = MaskFilter::new(&segmentation, input.attributes())?;

    let image_to_world = frames.image_to_world();
    let world_to_image = frames.world_to_image();
    let source = AffineDisplacement::new(&image_to_world, &world_to_image, world_affine);

    write_diagnostics(
        out,
        world_affine,
        &world_to_image,
        &image_to_world,
        source.matrix(),
    )?;

    let interpolator = new_interpolator(interpolation, &input)?;
    let mut resampled = GreyVolume::from_attributes(*input.attributes());
    let summary = Resampler::new(source, interpolator)
        .with_mask(&mask)
        .resample(&mut resampled)?;

    write_volume_grey(output, &resampled)?;
    log::info!(
        "wrote {} voxels ({} outside the region) to {}",
        summary.written,
        summary.skipped,
        output.display()
    );

    Ok(summary)
}

/// Print the matrices taking part in the affine composition.
pub fn write_diagnostics(
    out: &mut impl Write,
    world_affine: &Mat4,
    world_to_image: &Mat4,
    image_to_world: &Mat4,
    transform: &Mat4,
) -> std::io::Result<()> {
    writeln!(out, "World transform\n{world_affine}")?;
    writeln!(out, "Eye(4)\n{}", Mat4::IDENTITY)?;
    writeln!(out, "World2Image\n{world_to_image}")?;
    writeln!(out, "Image2WorldMatrix\n{image_to_world}")?;
    writeln!(out, "Transform\n{transform}")?;
    Ok(())
}

/// Print a driver failure to `out` as its message and return the failing exit code.
pub fn report_error(out: &mut impl Write, error: &AppError) -> ExitCode {
    // nothing more can be reported if the stream itself fails
    let _ = writeln!(out, "{error}");
    ExitCode::FAILURE
}

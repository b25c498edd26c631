use argh::FromArgs;
use std::path::PathBuf;
use std::process::ExitCode;

use voxreg::imgproc::interpolation::InterpolationMode;

#[derive(FromArgs)]
/// Transform the labelled region of the input volume by a world-space affine.
struct Args {
    /// path to the input grey volume
    #[argh(positional)]
    input: PathBuf,

    /// path to a volume whose header supplies the image/world frames
    #[argh(positional)]
    metadata: PathBuf,

    /// path to the segmentation, voxels labelled zero are left untouched
    #[argh(positional)]
    segmentation: PathBuf,

    /// path to the output volume
    #[argh(positional)]
    output: PathBuf,

    /// path to a 4x4 world transform, defaults to a translation of 10 along z
    #[argh(option, short = 't')]
    transform: Option<PathBuf>,

    /// interpolation mode: nearest, linear or cubic
    #[argh(option, short = 'i', default = "InterpolationMode::Linear")]
    interpolation: InterpolationMode,
}

fn run(args: Args) -> Result<(), voxreg_apps::AppError> {
    let world_affine = voxreg_apps::world_transform(args.transform.as_deref())?;

    let summary = voxreg_apps::warp_region(
        &args.input,
        &args.metadata,
        &args.segmentation,
        &args.output,
        &world_affine,
        args.interpolation,
        &mut std::io::stdout().lock(),
    )?;

    log::debug!("{summary:?}");

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Args = argh::from_env();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => voxreg_apps::report_error(&mut std::io::stderr().lock(), &e),
    }
}

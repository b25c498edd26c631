use argh::FromArgs;
use std::path::PathBuf;
use std::process::ExitCode;

use voxreg::imgproc::interpolation::InterpolationMode;

#[derive(FromArgs)]
/// Transform the input volume using the given displacement field.
struct Args {
    /// path to the input grey volume
    #[argh(positional)]
    input: PathBuf,

    /// path to the displacement field, a real volume with the dx, dy, dz components as 3 frames
    #[argh(positional)]
    displacement_field: PathBuf,

    /// path to the output volume
    #[argh(positional)]
    output: PathBuf,

    /// interpolation mode: nearest, linear or cubic
    #[argh(option, short = 'i', default = "InterpolationMode::Linear")]
    interpolation: InterpolationMode,
}

fn run(args: Args) -> Result<(), voxreg_apps::AppError> {
    let summary = voxreg_apps::warp_by_field(
        &args.input,
        &args.displacement_field,
        &args.output,
        args.interpolation,
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

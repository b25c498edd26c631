use std::path::Path;

use ndarray::{ArrayD, Ix4, IxDyn, ShapeBuilder};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use voxreg_algebra::Mat4;
use voxreg_image::{GreyVolume, ImageAttributes, RealVolume, Volume, VolumeSize, VoxelType};

use crate::error::IoError;

// NIfTI code for a scanner-independent affine in the sform rows
const SFORM_ALIGNED: i16 = 1;

fn has_nifti_extension(file_path: &Path) -> bool {
    file_path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_ascii_lowercase())
        .is_some_and(|name| name.ends_with(".nii") || name.ends_with(".nii.gz"))
}

fn check_input_path(file_path: &Path) -> Result<(), IoError> {
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    if !has_nifti_extension(file_path) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    Ok(())
}

/// The image-to-world matrix stored in a NIfTI header.
///
/// The sform rows are preferred, then the qform quaternion, then the plain voxel spacing.
fn header_image_to_world(header: &NiftiHeader) -> Mat4 {
    let to_row = |r: [f32; 4]| r.map(f64::from);

    if header.sform_code > 0 {
        return Mat4::from_rows([
            to_row(header.srow_x),
            to_row(header.srow_y),
            to_row(header.srow_z),
            [0.0, 0.0, 0.0, 1.0],
        ]);
    }

    let [dx, dy, dz] = [1, 2, 3].map(|i| f64::from(header.pixdim[i]));

    if header.qform_code > 0 {
        let [b, c, d] = [header.quatern_b, header.quatern_c, header.quatern_d].map(f64::from);
        let a = (1.0 - (b * b + c * c + d * d).min(1.0)).sqrt();
        let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
        let dz = dz * qfac;

        return Mat4::from_rows([
            [
                (a * a + b * b - c * c - d * d) * dx,
                (2.0 * b * c - 2.0 * a * d) * dy,
                (2.0 * b * d + 2.0 * a * c) * dz,
                f64::from(header.quatern_x),
            ],
            [
                (2.0 * b * c + 2.0 * a * d) * dx,
                (a * a + c * c - b * b - d * d) * dy,
                (2.0 * c * d - 2.0 * a * b) * dz,
                f64::from(header.quatern_y),
            ],
            [
                (2.0 * b * d - 2.0 * a * c) * dx,
                (2.0 * c * d + 2.0 * a * b) * dy,
                (a * a + d * d - c * c - b * b) * dz,
                f64::from(header.quatern_z),
            ],
            [0.0, 0.0, 0.0, 1.0],
        ]);
    }

    Mat4::from_scale([dx, dy, dz])
}

fn header_to_attributes(header: &NiftiHeader, size: VolumeSize) -> Result<ImageAttributes, IoError> {
    let mut attributes = ImageAttributes::from_image_to_world(size, &header_image_to_world(header))?;

    let dt = f64::from(header.pixdim[4]);
    if size.t > 1 && dt > 0.0 {
        attributes.spacing[3] = dt;
    }

    Ok(attributes)
}

fn header_size(header: &NiftiHeader) -> Result<VolumeSize, IoError> {
    let ndim = header.dim[0] as usize;
    if !(3..=4).contains(&ndim) {
        return Err(IoError::UnsupportedDimensions(ndim));
    }

    let [x, y, z, t] = [1, 2, 3, 4].map(|i| header.dim[i] as usize);
    Ok(VolumeSize {
        x,
        y,
        z,
        t: if ndim == 4 { t.max(1) } else { 1 },
    })
}

fn attributes_to_header(attributes: &ImageAttributes) -> NiftiHeader {
    let m = attributes.image_to_world();
    let row = |r: usize| [0, 1, 2, 3].map(|c| m.get(r, c) as f32);
    let [dx, dy, dz, dt] = attributes.spacing.map(|s| s as f32);

    NiftiHeader {
        pixdim: [1.0, dx, dy, dz, dt, 1.0, 1.0, 1.0],
        sform_code: SFORM_ALIGNED,
        qform_code: 0,
        srow_x: row(0),
        srow_y: row(1),
        srow_z: row(2),
        scl_slope: 1.0,
        scl_inter: 0.0,
        ..NiftiHeader::default()
    }
}

/// Lay out x-fastest voxel data as a Fortran-ordered array indexed `[x, y, z(, t)]`.
fn to_ndarray<A>(size: VolumeSize, data: Vec<A>) -> Result<ArrayD<A>, IoError> {
    let shape = if size.t > 1 {
        vec![size.x, size.y, size.z, size.t]
    } else {
        vec![size.x, size.y, size.z]
    };
    Ok(ArrayD::from_shape_vec(IxDyn(&shape).f(), data)?)
}

/// Reads a NIfTI volume from the given file path.
///
/// The voxel data is read as `f64`, with the scaling of the header applied, and converted
/// to `T` following the conversion policy of [`VoxelType`].
///
/// # Arguments
///
/// * `file_path` - The path to a `.nii` or `.nii.gz` file.
///
/// # Returns
///
/// The volume with its grid attributes derived from the header.
///
/// # Errors
///
/// Returns an error if the file does not exist, is not a NIfTI file, cannot be decoded or
/// does not hold a 3D or 4D volume.
pub fn read_volume<T: VoxelType>(file_path: impl AsRef<Path>) -> Result<Volume<T>, IoError> {
    let file_path = file_path.as_ref();
    check_input_path(file_path)?;

    let obj = ReaderOptions::new().read_file(file_path)?;
    let header = obj.header().clone();

    let array = obj.into_volume().into_ndarray::<f64>()?;
    let array = match array.ndim() {
        3 => array.insert_axis(ndarray::Axis(3)),
        4 => array,
        ndim => return Err(IoError::UnsupportedDimensions(ndim)),
    }
    .into_dimensionality::<Ix4>()?;

    let (nx, ny, nz, nt) = array.dim();
    let attributes = header_to_attributes(
        &header,
        VolumeSize {
            x: nx,
            y: ny,
            z: nz,
            t: nt,
        },
    )?;

    log::debug!("read {} from {}", attributes.size, file_path.display());

    Ok(Volume::from_fn(attributes, |x, y, z, t| {
        T::from_f64(array[[x, y, z, t]])
    }))
}

/// Reads the grid attributes of a NIfTI file without decoding its voxels.
///
/// # Arguments
///
/// * `file_path` - The path to a `.nii` or `.nii.gz` file.
pub fn read_attributes(file_path: impl AsRef<Path>) -> Result<ImageAttributes, IoError> {
    let file_path = file_path.as_ref();
    check_input_path(file_path)?;

    let header = NiftiHeader::from_file(file_path)?;
    header_to_attributes(&header, header_size(&header)?)
}

/// Writes a grey volume to a NIfTI file as signed 16 bit voxels.
///
/// # Arguments
///
/// * `file_path` - The path to a `.nii` or `.nii.gz` file.
/// * `volume` - The volume to write.
pub fn write_volume_grey(file_path: impl AsRef<Path>, volume: &GreyVolume) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    if !has_nifti_extension(file_path) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let header = attributes_to_header(volume.attributes());
    let array = to_ndarray(volume.size(), volume.as_slice().to_vec())?;

    WriterOptions::new(file_path)
        .reference_header(&header)
        .write_nifti(&array)?;

    log::debug!("wrote {} to {}", volume.size(), file_path.display());

    Ok(())
}

/// Writes a real volume to a NIfTI file as 32 bit float voxels.
///
/// # Arguments
///
/// * `file_path` - The path to a `.nii` or `.nii.gz` file.
/// * `volume` - The volume to write.
pub fn write_volume_real(file_path: impl AsRef<Path>, volume: &RealVolume) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    if !has_nifti_extension(file_path) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let header = attributes_to_header(volume.attributes());
    let data = volume.as_slice().iter().map(|&v| v as f32).collect();
    let array = to_ndarray(volume.size(), data)?;

    WriterOptions::new(file_path)
        .reference_header(&header)
        .write_nifti(&array)?;

    log::debug!("wrote {} to {}", volume.size(), file_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nifti_extension() {
        assert!(has_nifti_extension(Path::new("a/b/brain.nii")));
        assert!(has_nifti_extension(Path::new("brain.NII.GZ")));
        assert!(!has_nifti_extension(Path::new("brain.gz")));
        assert!(!has_nifti_extension(Path::new("brain.png")));
        assert!(!has_nifti_extension(Path::new("nii")));
    }

    #[test]
    fn header_round_trip() -> Result<(), IoError> {
        let attributes = ImageAttributes::new([6, 5, 4])
            .with_spacing(0.5, 1.0, 2.5)
            .with_origin([10.0, -3.0, 7.5]);

        let header = attributes_to_header(&attributes);
        let back = header_to_attributes(&header, attributes.size)?;

        assert_eq!(back.size, attributes.size);
        for i in 0..3 {
            assert_relative_eq!(back.spacing[i], attributes.spacing[i], epsilon = 1e-5);
            assert_relative_eq!(back.origin[i], attributes.origin[i], epsilon = 1e-4);
        }
        assert_relative_eq!(back.axes[0][0], 1.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn pixdim_fallback() {
        let mut header = NiftiHeader::default();
        header.sform_code = 0;
        header.qform_code = 0;
        header.pixdim = [1.0, 2.0, 3.0, 4.0, 1.0, 1.0, 1.0, 1.0];

        let m = header_image_to_world(&header);
        assert_eq!(m.get(0, 0), 2.0);
        assert_eq!(m.get(1, 1), 3.0);
        assert_eq!(m.get(2, 2), 4.0);
        assert_eq!(m.translation(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn identity_qform() {
        let mut header = NiftiHeader::default();
        header.sform_code = 0;
        header.qform_code = 1;
        header.quatern_b = 0.0;
        header.quatern_c = 0.0;
        header.quatern_d = 0.0;
        header.quatern_x = 1.0;
        header.quatern_y = 2.0;
        header.quatern_z = 3.0;
        header.pixdim = [-1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0];

        let m = header_image_to_world(&header);
        assert_relative_eq!(m.get(0, 0), 1.0);
        assert_relative_eq!(m.get(2, 2), -2.0);
        assert_eq!(m.translation(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn unsupported_dimensions() {
        let mut header = NiftiHeader::default();
        header.dim = [2, 4, 4, 1, 1, 1, 1, 1];
        assert!(matches!(
            header_size(&header),
            Err(IoError::UnsupportedDimensions(2))
        ));
    }
}

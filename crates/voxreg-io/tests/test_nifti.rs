use approx::assert_relative_eq;

use voxreg_algebra::Mat4;
use voxreg_image::{ImageAttributes, Volume};
use voxreg_io::{
    error::IoError,
    functional::{read_attributes, read_volume, write_volume_grey, write_volume_real},
    matrix::{read_matrix, write_matrix},
};

#[test]
fn test_grey_volume_file() -> Result<(), IoError> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("grey.nii");

    let attributes = ImageAttributes::new([5, 4, 3])
        .with_spacing(1.0, 1.0, 2.0)
        .with_origin([0.0, 12.0, -6.0]);
    let volume = Volume::<i16>::from_fn(attributes, |x, y, z, _| (x + 10 * y + 100 * z) as i16 - 99);

    write_volume_grey(&file_path, &volume)?;
    let read = read_volume::<i16>(&file_path)?;

    assert_eq!(read.size(), volume.size());
    assert_eq!(read.as_slice(), volume.as_slice());
    assert_relative_eq!(read.attributes().spacing[2], 2.0, epsilon = 1e-6);
    assert_relative_eq!(read.attributes().origin[1], 12.0, epsilon = 1e-4);

    let header_only = read_attributes(&file_path)?;
    assert_eq!(header_only.size, volume.size());
    Ok(())
}

#[test]
fn test_real_field_file() -> Result<(), IoError> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("field.nii.gz");

    let attributes = ImageAttributes::new([3, 3, 2]).with_frames(3);
    let field = Volume::<f64>::from_fn(attributes, |x, y, z, t| {
        0.25 * (x + y + z) as f64 - t as f64
    });

    write_volume_real(&file_path, &field)?;
    let read = read_volume::<f64>(&file_path)?;

    assert_eq!(read.t(), 3);
    for (a, b) in read.as_slice().iter().zip(field.as_slice()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-6);
    }
    Ok(())
}

#[test]
fn test_read_errors() -> Result<(), IoError> {
    assert!(matches!(
        read_volume::<i16>("/no/such/volume.nii"),
        Err(IoError::FileDoesNotExist(_))
    ));

    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("volume.png");
    std::fs::write(&file_path, b"not a volume")?;
    assert!(matches!(
        read_volume::<i16>(&file_path),
        Err(IoError::InvalidFileExtension(_))
    ));

    let volume = Volume::<i16>::from_attributes(ImageAttributes::new([2, 2, 2]));
    assert!(matches!(
        write_volume_grey(&file_path, &volume),
        Err(IoError::InvalidFileExtension(_))
    ));
    Ok(())
}

#[test]
fn test_matrix_file() -> Result<(), IoError> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("transform.txt");

    let m = Mat4::from_translation([1.5, -2.0, 10.0]) * Mat4::from_scale([1.0, 2.0, 0.5]);
    write_matrix(&file_path, &m)?;
    assert_eq!(read_matrix(&file_path)?, m);
    Ok(())
}

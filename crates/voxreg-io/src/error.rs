/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to decode or encode the NIfTI volume.
    #[error("Error with NIfTI encoding/decoding. {0}")]
    NiftiError(#[from] nifti::NiftiError),

    /// Error to lay out the voxel data for the writer.
    #[error("Failed to shape the voxel data. {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    /// Error to create the volume.
    #[error("Failed to create volume. {0}")]
    VolumeCreationError(#[from] voxreg_image::VolumeError),

    /// The volume has a number of dimensions other than 3 or 4.
    #[error("Unsupported number of dimensions: {0}")]
    UnsupportedDimensions(usize),

    /// Error to parse a transform matrix file.
    #[error("Invalid matrix file. {0}")]
    InvalidMatrix(String),
}

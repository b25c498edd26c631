use std::path::Path;

use voxreg_algebra::Mat4;

use crate::error::IoError;

/// Reads a 4x4 homogeneous transform from a text file.
///
/// The file holds 16 whitespace-separated numbers in row-major order. Lines starting with
/// `#` are comments and blank lines are ignored.
///
/// # Errors
///
/// Returns [`IoError::InvalidMatrix`] if a token is not a number or the file does not hold
/// exactly 16 of them.
pub fn read_matrix(file_path: impl AsRef<Path>) -> Result<Mat4, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let content = std::fs::read_to_string(file_path)?;
    parse_matrix(&content)
}

/// Parses a 4x4 homogeneous transform from its text form, see [`read_matrix`].
pub fn parse_matrix(content: &str) -> Result<Mat4, IoError> {
    let values = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|e| IoError::InvalidMatrix(format!("'{token}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let values: [f64; 16] = values.as_slice().try_into().map_err(|_| {
        IoError::InvalidMatrix(format!("expected 16 values, got {}", values.len()))
    })?;

    Ok(Mat4::from_row_slice(&values))
}

/// Writes a 4x4 homogeneous transform to a text file, one row per line.
pub fn write_matrix(file_path: impl AsRef<Path>, matrix: &Mat4) -> Result<(), IoError> {
    let content = matrix
        .to_rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n");

    std::fs::write(file_path, content + "\n")?;
    Ok(())
}

//! 4x4 homogeneous matrix (double precision).
//!
//! The matrix is a thin `#[repr(transparent)]` newtype over [`glam::DMat4`]. `glam` stores
//! matrices column-major; the accessors here take `(row, col)` pairs so that code reads like
//! the usual `M[row, col]` notation used for homogeneous transforms.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// 4x4 homogeneous transform matrix (double precision).
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Mat4(pub glam::DMat4);

impl Mat4 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self(glam::DMat4::IDENTITY);

    /// Zero matrix.
    pub const ZERO: Self = Self(glam::DMat4::ZERO);

    /// Create a new matrix from row-major rows.
    ///
    /// # Example
    ///
    /// ```
    /// use voxreg_algebra::Mat4;
    ///
    /// let m = Mat4::from_rows([
    ///     [1.0, 0.0, 0.0, 0.0],
    ///     [0.0, 1.0, 0.0, 0.0],
    ///     [0.0, 0.0, 1.0, 10.0],
    ///     [0.0, 0.0, 0.0, 1.0],
    /// ]);
    ///
    /// assert_eq!(m.get(2, 3), 10.0);
    /// ```
    #[inline]
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        // the transpose of a column-major load of the rows is the row-major matrix
        Self(glam::DMat4::from_cols_array_2d(&rows).transpose())
    }

    /// Create a new matrix from a row-major array of 16 values.
    #[inline]
    pub fn from_row_slice(values: &[f64; 16]) -> Self {
        Self(glam::DMat4::from_cols_array(values).transpose())
    }

    /// Return the matrix as row-major rows.
    #[inline]
    pub fn to_rows(&self) -> [[f64; 4]; 4] {
        self.0.transpose().to_cols_array_2d()
    }

    /// Pure translation matrix.
    #[inline]
    pub fn from_translation(t: [f64; 3]) -> Self {
        Self(glam::DMat4::from_translation(glam::DVec3::from_array(t)))
    }

    /// Pure (non-uniform) scale matrix.
    #[inline]
    pub fn from_scale(s: [f64; 3]) -> Self {
        Self(glam::DMat4::from_scale(glam::DVec3::from_array(s)))
    }

    /// Get the element at `(row, col)`.
    ///
    /// PRECONDITION: `row < 4` and `col < 4`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0.col(col)[row]
    }

    /// Set the element at `(row, col)`.
    ///
    /// PRECONDITION: `row < 4` and `col < 4`.
    #[inline]
    pub fn put(&mut self, row: usize, col: usize, value: f64) {
        self.0.col_mut(col)[row] = value;
    }

    /// Inverse of the matrix.
    ///
    /// Returns `None` when the matrix is singular or contains non-finite values.
    pub fn try_inverse(&self) -> Option<Self> {
        let det = self.0.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(Self(self.0.inverse()))
    }

    /// Apply the affine part of the matrix to a point (w = 1).
    #[inline]
    pub fn transform_point(&self, p: [f64; 3]) -> [f64; 3] {
        self.0.transform_point3(glam::DVec3::from_array(p)).to_array()
    }

    /// Largest absolute value of the upper-left 3x3 (linear) block.
    pub fn linear_max_abs(&self) -> f64 {
        let mut max = 0.0f64;
        for row in 0..3 {
            for col in 0..3 {
                max = max.max(self.get(row, col).abs());
            }
        }
        max
    }

    /// Translation column `(M[0,3], M[1,3], M[2,3])`.
    #[inline]
    pub fn translation(&self) -> [f64; 3] {
        [self.get(0, 3), self.get(1, 3), self.get(2, 3)]
    }

    /// Whether every element is within `max_abs_diff` of the element of `rhs`.
    #[inline]
    pub fn abs_diff_eq(&self, rhs: &Self, max_abs_diff: f64) -> bool {
        self.0.abs_diff_eq(rhs.0, max_abs_diff)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Deref for Mat4 {
    type Target = glam::DMat4;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Mat4 {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<glam::DMat4> for Mat4 {
    #[inline]
    fn from(m: glam::DMat4) -> Self {
        Self(m)
    }
}

impl From<Mat4> for glam::DMat4 {
    #[inline]
    fn from(m: Mat4) -> Self {
        m.0
    }
}

// Matrix-matrix multiplication
impl std::ops::Mul<Mat4> for Mat4 {
    type Output = Mat4;

    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        Mat4(self.0 * rhs.0)
    }
}

impl std::ops::Sub<Mat4> for Mat4 {
    type Output = Mat4;

    #[inline]
    fn sub(self, rhs: Mat4) -> Self::Output {
        Mat4(self.0 - rhs.0)
    }
}

impl std::ops::Add<Mat4> for Mat4 {
    type Output = Mat4;

    #[inline]
    fn add(self, rhs: Mat4) -> Self::Output {
        Mat4(self.0 + rhs.0)
    }
}

/// Prints the matrix row by row.
impl fmt::Display for Mat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            writeln!(
                f,
                "{:>12.6} {:>12.6} {:>12.6} {:>12.6}",
                row[0], row[1], row[2], row[3]
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mat4_rows_roundtrip() {
        let rows = [
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let m = Mat4::from_rows(rows);
        assert_eq!(m.get(0, 3), 4.0);
        assert_eq!(m.get(2, 0), 9.0);
        assert_eq!(m.to_rows(), rows);
    }

    #[test]
    fn test_mat4_put_get() {
        let mut m = Mat4::IDENTITY;
        m.put(2, 3, 10.0);
        assert_eq!(m.get(2, 3), 10.0);
        assert_eq!(m.translation(), [0.0, 0.0, 10.0]);
        assert_eq!(m, Mat4::from_translation([0.0, 0.0, 10.0]));
    }

    #[test]
    fn test_mat4_mul_order() {
        let t = Mat4::from_translation([1.0, 0.0, 0.0]);
        let s = Mat4::from_scale([2.0, 2.0, 2.0]);
        // scale first, then translate
        let p = (t * s).transform_point([1.0, 1.0, 1.0]);
        assert_eq!(p, [3.0, 2.0, 2.0]);
        // translate first, then scale
        let p = (s * t).transform_point([1.0, 1.0, 1.0]);
        assert_eq!(p, [4.0, 2.0, 2.0]);
    }

    #[test]
    fn test_mat4_inverse() {
        let m = Mat4::from_translation([1.0, -2.0, 3.0]) * Mat4::from_scale([2.0, 4.0, 0.5]);
        let inv = m.try_inverse().expect("invertible");
        assert!((m * inv).abs_diff_eq(&Mat4::IDENTITY, 1e-12));
        assert!(Mat4::ZERO.try_inverse().is_none());
    }

    #[test]
    fn test_mat4_sub_identity() {
        let m = Mat4::from_translation([0.0, 0.0, 10.0]) - Mat4::IDENTITY;
        assert_relative_eq!(m.linear_max_abs(), 0.0);
        assert_relative_eq!(m.get(2, 3), 10.0);
        assert_relative_eq!(m.get(3, 3), 0.0);
    }
}

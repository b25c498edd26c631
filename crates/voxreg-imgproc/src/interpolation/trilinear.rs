use voxreg_image::{Volume, VoxelType};

/// Kernel for trilinear interpolation
///
/// Weighted average of the 8 voxels enclosing the coordinate, each weighted with the product
/// of the per-axis fractional distances. On the upper face of the volume the missing
/// neighbours carry a zero weight, so only in-range voxels are read.
///
/// # Arguments
///
/// * `volume` - The input volume.
/// * `x`, `y`, `z` - The continuous voxel coordinate, inside `[0, extent - 1]` on every axis.
/// * `t` - The time frame.
///
/// # Returns
///
/// The interpolated voxel value.
pub(crate) fn trilinear_interpolation<T: VoxelType>(
    volume: &Volume<T>,
    x: f64,
    y: f64,
    z: f64,
    t: usize,
) -> f64 {
    let (nx, ny, nz) = (volume.x(), volume.y(), volume.z());

    let ix0 = (x.floor() as usize).min(nx - 1);
    let iy0 = (y.floor() as usize).min(ny - 1);
    let iz0 = (z.floor() as usize).min(nz - 1);

    let fx = x - ix0 as f64;
    let fy = y - iy0 as f64;
    let fz = z - iz0 as f64;

    let ix1 = (ix0 + 1).min(nx - 1);
    let iy1 = (iy0 + 1).min(ny - 1);
    let iz1 = (iz0 + 1).min(nz - 1);

    let data = volume.as_slice();
    let frame = t * nz;
    let at = |ix: usize, iy: usize, iz: usize| data[ix + nx * (iy + ny * (iz + frame))].to_f64();

    let (gx, gy, gz) = (1.0 - fx, 1.0 - fy, 1.0 - fz);

    at(ix0, iy0, iz0) * gx * gy * gz
        + at(ix1, iy0, iz0) * fx * gy * gz
        + at(ix0, iy1, iz0) * gx * fy * gz
        + at(ix1, iy1, iz0) * fx * fy * gz
        + at(ix0, iy0, iz1) * gx * gy * fz
        + at(ix1, iy0, iz1) * fx * gy * fz
        + at(ix0, iy1, iz1) * gx * fy * fz
        + at(ix1, iy1, iz1) * fx * fy * fz
}

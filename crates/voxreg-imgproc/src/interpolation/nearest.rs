use voxreg_image::{Volume, VoxelType};

/// Kernel for nearest neighbor interpolation
///
/// # Arguments
///
/// * `volume` - The input volume.
/// * `x`, `y`, `z` - The continuous voxel coordinate, inside `[0, extent - 1]` on every axis.
/// * `t` - The time frame.
///
/// # Returns
///
/// The value of the voxel closest to the coordinate.
pub(crate) fn nearest_neighbor_interpolation<T: VoxelType>(
    volume: &Volume<T>,
    x: f64,
    y: f64,
    z: f64,
    t: usize,
) -> f64 {
    let ix = (x.round() as usize).min(volume.x() - 1);
    let iy = (y.round() as usize).min(volume.y() - 1);
    let iz = (z.round() as usize).min(volume.z() - 1);

    let offset = ix + volume.x() * (iy + volume.y() * (iz + volume.z() * t));

    volume.as_slice()[offset].to_f64()
}

use voxreg_image::{Volume, VoxelType};

// Keys cubic convolution parameter. With a = -0.5 the kernel interpolates: it is 1 at 0
// and 0 at every other integer.
const KEYS_A: f64 = -0.5;

#[inline]
fn keys_weight(s: f64) -> f64 {
    let s = s.abs();
    if s <= 1.0 {
        ((KEYS_A + 2.0) * s - (KEYS_A + 3.0)) * s * s + 1.0
    } else if s < 2.0 {
        ((KEYS_A * s - 5.0 * KEYS_A) * s + 8.0 * KEYS_A) * s - 4.0 * KEYS_A
    } else {
        0.0
    }
}

/// Weights and clamped indices of the 4 taps around `u` along one axis.
#[inline]
fn taps(u: f64, n: usize) -> ([usize; 4], [f64; 4]) {
    let i = (u.floor() as usize).min(n - 1);
    let f = u - i as f64;
    let last = n as isize - 1;

    let mut idx = [0usize; 4];
    let mut w = [0.0f64; 4];
    for (k, (ik, wk)) in idx.iter_mut().zip(w.iter_mut()).enumerate() {
        let offset = k as isize - 1;
        *ik = (i as isize + offset).clamp(0, last) as usize;
        *wk = keys_weight(f - offset as f64);
    }

    (idx, w)
}

/// Kernel for tricubic interpolation
///
/// Separable Keys cubic convolution over the 4x4x4 neighbourhood of the coordinate.
/// Neighbours beyond the volume are replaced by the closest edge voxel.
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
pub(crate) fn tricubic_interpolation<T: VoxelType>(
    volume: &Volume<T>,
    x: f64,
    y: f64,
    z: f64,
    t: usize,
) -> f64 {
    let (nx, ny, nz) = (volume.x(), volume.y(), volume.z());

    let (ix, wx) = taps(x, nx);
    let (iy, wy) = taps(y, ny);
    let (iz, wz) = taps(z, nz);

    let data = volume.as_slice();
    let frame = t * nz;

    let mut val = 0.0;
    for (kz, &vz) in iz.iter().enumerate() {
        if wz[kz] == 0.0 {
            continue;
        }
        for (ky, &vy) in iy.iter().enumerate() {
            if wy[ky] == 0.0 {
                continue;
            }
            let row = nx * (vy + ny * (vz + frame));
            let mut acc = 0.0;
            for (kx, &vx) in ix.iter().enumerate() {
                acc += data[row + vx].to_f64() * wx[kx];
            }
            val += acc * wy[ky] * wz[kz];
        }
    }

    val
}

use crate::attributes::{ImageAttributes, VolumeSize};
use crate::error::VolumeError;

/// Trait for voxel data types.
///
/// Every voxel type converts to and from `f64`, which is the working precision of the
/// interpolation and histogram code. Integral types round half away from zero and saturate
/// to their representable range; `NaN` maps to zero. Floating types store the value as is.
///
/// Send and Sync is required for the parallel resampling pass.
pub trait VoxelType:
    Copy + Default + PartialEq + PartialOrd + std::fmt::Debug + Send + Sync + 'static
{
    /// Convert the voxel value to `f64`.
    fn to_f64(self) -> f64;

    /// Convert a `f64` value to the voxel data type.
    fn from_f64(x: f64) -> Self;
}

macro_rules! impl_voxel_type_int {
    ($($t:ty),*) => {
        $(
            impl VoxelType for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(x: f64) -> Self {
                    if x.is_nan() {
                        return 0;
                    }
                    x.round().clamp(<$t>::MIN as f64, <$t>::MAX as f64) as $t
                }
            }
        )*
    };
}

impl_voxel_type_int!(u8, i16, u16, i32);

impl VoxelType for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(x: f64) -> Self {
        x as f32
    }
}

impl VoxelType for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(x: f64) -> Self {
        x
    }
}

/// Represents a scalar volume with voxel data.
///
/// The voxels are stored x-fastest: the linear offset of `(x, y, z, t)` is
/// `x + X * (y + Y * (z + Z * t))`.
#[derive(Clone, Debug, PartialEq)]
pub struct Volume<T: VoxelType> {
    attributes: ImageAttributes,
    data: Vec<T>,
}

/// Volume with integral grey values.
pub type GreyVolume = Volume<i16>;

/// Volume with real values.
pub type RealVolume = Volume<f64>;

impl<T: VoxelType> Volume<T> {
    /// Create a new volume from voxel data.
    ///
    /// # Arguments
    ///
    /// * `attributes` - The grid description of the volume.
    /// * `data` - The voxel data, x-fastest.
    ///
    /// # Errors
    ///
    /// If the length of the voxel data does not match the volume size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use voxreg_image::{ImageAttributes, Volume};
    ///
    /// let volume = Volume::<i16>::new(ImageAttributes::new([2, 3, 4]), vec![0; 24]).unwrap();
    ///
    /// assert_eq!(volume.x(), 2);
    /// assert_eq!(volume.z(), 4);
    /// assert_eq!(volume.t(), 1);
    /// ```
    pub fn new(attributes: ImageAttributes, data: Vec<T>) -> Result<Self, VolumeError> {
        let expected = attributes.size.num_voxels();
        if data.len() != expected {
            return Err(VolumeError::InvalidDataLength(data.len(), expected));
        }

        Ok(Self { attributes, data })
    }

    /// Create a new volume filled with the default voxel value (zero).
    pub fn from_attributes(attributes: ImageAttributes) -> Self {
        Self::from_attributes_val(attributes, T::default())
    }

    /// Create a new volume filled with `val`.
    pub fn from_attributes_val(attributes: ImageAttributes, val: T) -> Self {
        let data = vec![val; attributes.size.num_voxels()];
        Self { attributes, data }
    }

    /// Create a new volume by evaluating `f(x, y, z, t)` at every voxel.
    ///
    /// # Examples
    ///
    /// ```
    /// use voxreg_image::{ImageAttributes, Volume};
    ///
    /// // a ramp along x
    /// let volume = Volume::<i16>::from_fn(ImageAttributes::new([4, 4, 4]), |x, _, _, _| x as i16);
    ///
    /// assert_eq!(volume.get([3, 1, 2, 0]), Some(&3));
    /// ```
    pub fn from_fn(
        attributes: ImageAttributes,
        mut f: impl FnMut(usize, usize, usize, usize) -> T,
    ) -> Self {
        let size = attributes.size;
        let mut data = Vec::with_capacity(size.num_voxels());
        for t in 0..size.t {
            for z in 0..size.z {
                for y in 0..size.y {
                    for x in 0..size.x {
                        data.push(f(x, y, z, t));
                    }
                }
            }
        }

        Self { attributes, data }
    }

    /// Get the grid description of the volume.
    pub fn attributes(&self) -> &ImageAttributes {
        &self.attributes
    }

    /// Get the size of the volume in voxels.
    pub fn size(&self) -> VolumeSize {
        self.attributes.size
    }

    /// Number of voxels along x.
    pub fn x(&self) -> usize {
        self.attributes.size.x
    }

    /// Number of voxels along y.
    pub fn y(&self) -> usize {
        self.attributes.size.y
    }

    /// Number of voxels along z.
    pub fn z(&self) -> usize {
        self.attributes.size.z
    }

    /// Number of time frames.
    pub fn t(&self) -> usize {
        self.attributes.size.t
    }

    /// Total number of voxels.
    pub fn num_voxels(&self) -> usize {
        self.data.len()
    }

    /// Get the voxel data.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the voxel data mutably.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the volume and return its voxel data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Linear offset of a voxel, or `None` if it lies outside the volume.
    #[inline]
    pub fn offset(&self, index: [usize; 4]) -> Option<usize> {
        let size = &self.attributes.size;
        let [x, y, z, t] = index;
        if x >= size.x || y >= size.y || z >= size.z || t >= size.t {
            return None;
        }
        Some(x + size.x * (y + size.y * (z + size.z * t)))
    }

    /// Get a voxel value.
    ///
    /// # Arguments
    ///
    /// * `index` - The `[x, y, z, t]` voxel index.
    ///
    /// # Returns
    ///
    /// The voxel value or `None` if the index is out of bounds.
    #[inline]
    pub fn get(&self, index: [usize; 4]) -> Option<&T> {
        self.offset(index).map(|i| &self.data[i])
    }

    /// Get a mutable reference to a voxel value.
    #[inline]
    pub fn get_mut(&mut self, index: [usize; 4]) -> Option<&mut T> {
        self.offset(index).map(move |i| &mut self.data[i])
    }

    /// Get a voxel value converted to `f64`.
    #[inline]
    pub fn get_as_f64(&self, index: [usize; 4]) -> Option<f64> {
        self.get(index).map(|v| v.to_f64())
    }

    /// Set a voxel value.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::VoxelIndexOutOfBounds`] if the index is out of bounds.
    pub fn put(&mut self, index: [usize; 4], val: T) -> Result<(), VolumeError> {
        let size = self.size();
        let voxel = self
            .get_mut(index)
            .ok_or(VolumeError::VoxelIndexOutOfBounds(index, size))?;
        *voxel = val;
        Ok(())
    }

    /// Set a voxel value from `f64`, using the conversion policy of the voxel type.
    pub fn put_as_f64(&mut self, index: [usize; 4], val: f64) -> Result<(), VolumeError> {
        self.put(index, T::from_f64(val))
    }

    /// Get the voxel data of a single time frame.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::FrameIndexOutOfBounds`] if `t` is out of bounds.
    pub fn frame(&self, t: usize) -> Result<&[T], VolumeError> {
        if t >= self.t() {
            return Err(VolumeError::FrameIndexOutOfBounds(t, self.t()));
        }
        let len = self.attributes.size.frame_len();
        Ok(&self.data[t * len..(t + 1) * len])
    }

    /// Minimum and maximum voxel values as `f64`.
    ///
    /// Returns `None` for an empty volume.
    pub fn min_max_as_f64(&self) -> Option<(f64, f64)> {
        let mut iter = self.data.iter().map(|v| v.to_f64());
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
    }

    /// Cast the voxel data of the volume to a different type.
    ///
    /// Values go through `f64` and follow the conversion policy of [`VoxelType`].
    pub fn cast<U: VoxelType>(&self) -> Volume<U> {
        Volume {
            attributes: self.attributes,
            data: self.data.iter().map(|&v| U::from_f64(v.to_f64())).collect(),
        }
    }
}

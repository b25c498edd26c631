#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use voxreg_algebra as algebra;

#[doc(inline)]
pub use voxreg_image as image;

#[doc(inline)]
pub use voxreg_imgproc as imgproc;

#[doc(inline)]
pub use voxreg_io as io;

pub mod kernel;
pub mod resize;

pub use kernel::{cubic, scaled_length, ResampleKernel};
pub use resize::{imresize, imresize_hwc, CubicResizeFilter};

//! Numeric primitives for hyperspectral image reconstruction.
//!
//! * [`filter`] - MATLAB-compatible cubic resampling (`imresize` bicubic).
//! * [`patch`] - overlapping tile planning and stitched tiled inference.
//! * [`error`] - the shared error type.

pub mod error;
pub mod filter;
pub mod patch;

pub use error::{HsirError, Result};
pub use filter::{CubicResizeFilter, ResampleKernel};
pub use patch::{PatchDescriptor, PatchGrid};

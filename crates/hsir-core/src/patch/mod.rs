//! Patch tiling for inference on images larger than a network's input.

pub mod grid;
pub mod stitch;

pub use grid::{PatchDescriptor, PatchGrid, PatchIter};
pub use stitch::tiled_forward;

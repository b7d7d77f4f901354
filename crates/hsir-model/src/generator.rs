//! Network seams used by the trainers.
//!
//! Architectures live outside this crate. Anything that is a burn [`Module`]
//! and maps an image batch to an image batch can be trained as a generator;
//! anything that maps an image batch to critic scores can be trained as a
//! discriminator.

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Image-to-image reconstruction network.
///
/// `forward` takes `[N, C_in, H, W]` and returns `[N, C_out, H', W']`.
pub trait Generator<B: Backend>: Module<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4>;
}

/// Critic for adversarial training.
///
/// Returns unbounded realness scores of any spatial extent (`[N, 1, h, w]`
/// for a patch critic, `[N, 1, 1, 1]` for a global one); trainers average
/// them.
pub trait Discriminator<B: Backend>: Module<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4>;
}

use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::PaddingConfig2d;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use hsir_core::HsirError;
use hsir_model::{Generator, GeneratorRegistry};

type TestBackend = NdArray<f32>;

#[derive(Module, Debug)]
struct TinyNet<B: Backend> {
    conv: Conv2d<B>,
}

impl<B: Backend> TinyNet<B> {
    fn new(channels_out: usize, device: &B::Device) -> Self {
        Self {
            conv: Conv2dConfig::new([3, channels_out], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
        }
    }
}

impl<B: Backend> Generator<B> for TinyNet<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        self.conv.forward(input)
    }
}

fn registry() -> GeneratorRegistry<TestBackend, TinyNet<TestBackend>> {
    let mut registry = GeneratorRegistry::new();
    registry
        .register("rgb2hsi", |device| TinyNet::new(31, device))
        .register("identity_rgb", |device| TinyNet::new(3, device));
    registry
}

#[test]
fn test_create_registered_generator() {
    let device = Default::default();
    let generator = registry().create("rgb2hsi", &device).unwrap();
    let output = Generator::forward(&generator, Tensor::zeros([2, 3, 8, 8], &device));
    assert_eq!(output.dims(), [2, 31, 8, 8]);
}

#[test]
fn test_unknown_tag_lists_known_tags() {
    let device = Default::default();
    let err = registry().create("awan", &device).unwrap_err();
    match &err {
        HsirError::UnknownNetwork { tag, known } => {
            assert_eq!(tag, "awan");
            assert_eq!(known, "identity_rgb, rgb2hsi");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().contains("awan"));
}

#[test]
fn test_tags_are_sorted() {
    let registry = registry();
    assert_eq!(registry.tags(), vec!["identity_rgb", "rgb2hsi"]);
    assert!(registry.contains("rgb2hsi"));
    assert_eq!(registry.len(), 2);
}

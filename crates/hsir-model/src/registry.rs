//! Tag-based generator construction.

use std::collections::BTreeMap;
use std::fmt;

use burn::tensor::backend::Backend;

use hsir_core::error::{HsirError, Result};

use crate::generator::Generator;

/// Builds a freshly initialized generator on a device.
pub type GeneratorFactory<B, G> = Box<dyn Fn(&<B as Backend>::Device) -> G + Send + Sync>;

/// Maps network tags such as `"unet"` to generator factories.
///
/// All factories of one registry produce the same module type `G`; a
/// workspace with several architectures wraps them in an enum module.
///
/// # Examples
/// ```rust,ignore
/// let mut registry = GeneratorRegistry::new();
/// registry.register("unet", |device| UNetConfig::new(31).init(device));
/// let generator = registry.create("unet", &device)?;
/// ```
pub struct GeneratorRegistry<B: Backend, G: Generator<B>> {
    factories: BTreeMap<String, GeneratorFactory<B, G>>,
}

impl<B: Backend, G: Generator<B>> GeneratorRegistry<B, G> {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register `factory` under `tag`, replacing any previous entry.
    pub fn register<F>(&mut self, tag: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&B::Device) -> G + Send + Sync + 'static,
    {
        let tag = tag.into();
        if self.factories.insert(tag.clone(), Box::new(factory)).is_some() {
            tracing::warn!("generator '{}' re-registered", tag);
        }
        self
    }

    /// Build the generator registered under `tag`.
    ///
    /// # Errors
    /// [`HsirError::UnknownNetwork`] listing the registered tags.
    pub fn create(&self, tag: &str, device: &B::Device) -> Result<G> {
        let factory = self.factories.get(tag).ok_or_else(|| HsirError::UnknownNetwork {
            tag: tag.to_string(),
            known: self.tags().join(", "),
        })?;
        tracing::info!("Generator '{}' is created", tag);
        Ok(factory(device))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<B: Backend, G: Generator<B>> Default for GeneratorRegistry<B, G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend, G: Generator<B>> fmt::Debug for GeneratorRegistry<B, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

use std::path::PathBuf;

use super::model::SentimentModel;
use super::pipeline::SentimentPipeline;
use crate::error::Result;
use crate::models::LinearSentimentModel;
use crate::pipelines::cache::{global_cache, ModelOptions};
use crate::pipelines::utils::{build_cache_key, DeviceRequest};

/// Builder for creating [`SentimentPipeline`] instances.
///
/// Use [`Self::from_dir`] or [`Self::from_hub`] as the entry point.
///
/// # Examples
///
/// ```rust,no_run
/// # use cine_sentiment::sentiment::SentimentPipelineBuilder;
/// # fn main() -> cine_sentiment::error::Result<()> {
/// let pipeline = SentimentPipelineBuilder::from_dir("artifacts/review-sentiment")
///     .cpu()
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SentimentPipelineBuilder<M: SentimentModel> {
    options: M::Options,
    device_request: DeviceRequest,
}

impl<M: SentimentModel> SentimentPipelineBuilder<M> {
    /// Creates a builder from the model's artifact options.
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Cpu,
        }
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Builds the pipeline with configured settings.
    ///
    /// Loads both artifacts. A missing, unreadable, or incompatible artifact
    /// is fatal here, so a pipeline that builds can serve requests. Loaded
    /// classifiers are shared process-wide: building again from the same
    /// artifacts on the same device reuses the already-loaded model.
    ///
    /// # Errors
    ///
    /// Returns an error if artifact loading or device initialization fails.
    pub fn build(self) -> Result<SentimentPipeline<M>>
    where
        M: Send + Sync + 'static,
        M::Options: ModelOptions + Clone,
    {
        let device = self.device_request.resolve()?;

        let key = build_cache_key(&self.options, &device);

        let model = global_cache().get_or_create(&key, || {
            M::new(self.options.clone(), device.clone())
        })?;

        let vectorizer = M::get_vectorizer(self.options)?;

        SentimentPipeline::assemble(model, vectorizer)
    }
}

impl SentimentPipelineBuilder<LinearSentimentModel> {
    /// Creates a builder for an artifact set in a local directory.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(crate::loaders::ArtifactSource::dir(dir))
    }

    /// Creates a builder for an artifact set hosted in a Hugging Face Hub
    /// repository.
    pub fn from_hub(repo: impl Into<String>) -> Self {
        Self::new(crate::loaders::ArtifactSource::hub(repo))
    }
}

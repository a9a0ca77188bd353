//! Sentiment analysis pipeline for movie reviews.
//!
//! Classify free-text reviews as `Positive`, `Negative`, or `Neutral`.
//! Returns the label together with the two-class probability distribution it
//! was derived from.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cine_sentiment::sentiment::SentimentPipelineBuilder;
//!
//! # fn main() -> cine_sentiment::error::Result<()> {
//! let pipeline = SentimentPipelineBuilder::from_dir("artifacts/review-sentiment").build()?;
//!
//! let output = pipeline.run("An absolute joy from the first scene to the last.")?;
//! println!(
//!     "sentiment: {} (positive: {:.2}, negative: {:.2})",
//!     output.analysis.sentiment, output.analysis.positive, output.analysis.negative
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Batch Inference
//!
//! Classify multiple reviews at once (returns `BatchOutput`):
//!
//! ```rust,no_run
//! # use cine_sentiment::sentiment::SentimentPipelineBuilder;
//! # fn main() -> cine_sentiment::error::Result<()> {
//! # let pipeline = SentimentPipelineBuilder::from_dir("artifacts/review-sentiment").build()?;
//! let reviews = &[
//!     "Best film I've seen all year!",
//!     "Two hours of my life I won't get back.",
//!     "It exists, I suppose.",
//! ];
//!
//! let output = pipeline.run(reviews)?;
//!
//! for r in output.results {
//!     let a = r.analysis?;
//!     println!("{}: {} ({:.2})", r.text, a.sentiment, a.positive);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Artifacts
//!
//! A pipeline loads three files produced by an external training run:
//! `model.safetensors` (the linear classifier weights), `config.json` (its
//! label mapping), and `vectorizer.json` (the fitted TF-IDF vectorizer). They
//! can live in a local directory ([`SentimentPipelineBuilder::from_dir`]) or
//! a Hugging Face Hub repository ([`SentimentPipelineBuilder::from_hub`]).

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::loaders::ArtifactSource;
pub use crate::models::LinearSentimentModel;
pub use crate::pipelines::stats::PipelineStats;
pub use crate::vectorizer::TfIdfVectorizer;
pub use builder::SentimentPipelineBuilder;
pub use model::SentimentModel;
pub use pipeline::{
    Analysis, BatchOutput, BatchResult, Output, Sentiment, SentimentPipeline,
    CONFIDENCE_THRESHOLD,
};

#[doc(hidden)]
pub use crate::pipelines::cache::ModelOptions;
#[doc(hidden)]
pub use pipeline::ReviewInput;

//! Movie review sentiment classification over pre-trained artifacts.
//!
//! Powered by [Candle](https://github.com/huggingface/candle). Loads a fitted
//! TF-IDF vectorizer and a linear classifier produced by an external training
//! run, then labels free-text reviews as positive, negative, or neutral.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;
pub(crate) mod vectorizer;

// ============ Public API ============

pub mod error;

pub use pipelines::sentiment;

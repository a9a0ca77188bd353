use candle_core::{Device, Tensor};

use crate::error::Result;
use crate::vectorizer::TfIdfVectorizer;

/// A classifier that produces the two-class sentiment distribution.
///
/// Implementations resolve their scoring strategy once, when the artifact is
/// loaded, so every call site sees the same `(p_neg, p_pos)` contract whether
/// the underlying artifact carries calibrated class probabilities or only a
/// raw decision score.
pub trait SentimentModel {
    /// Options identifying the artifact set to load.
    type Options: std::fmt::Debug + Clone;

    /// Load the classifier from its artifacts onto `device`.
    fn new(options: Self::Options, device: Device) -> Result<Self>
    where
        Self: Sized;

    /// Class distribution `(p_neg, p_pos)` for a single `[1, n_features]` row.
    fn predict_proba(&self, features: &Tensor) -> Result<(f32, f32)>;

    /// Class distribution for each row of a `[batch, n_features]` tensor.
    fn predict_proba_batch(&self, features: &Tensor) -> Result<Vec<(f32, f32)>> {
        let (rows, _) = features.dims2()?;
        let mut probs = Vec::with_capacity(rows);
        for i in 0..rows {
            probs.push(self.predict_proba(&features.narrow(0, i, 1)?)?);
        }
        Ok(probs)
    }

    /// Width of the feature representation the classifier expects.
    fn n_features(&self) -> usize;

    /// Load the fitted vectorizer that pairs with this classifier.
    fn get_vectorizer(options: Self::Options) -> Result<TfIdfVectorizer>;

    /// The device this model runs on.
    fn device(&self) -> &Device;
}

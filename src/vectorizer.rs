use std::collections::HashMap;
use std::path::Path;

use candle_core::{Device, Tensor};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Token pattern used when the artifact does not record one: two or more
/// word characters.
const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct RawVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_true")]
    l2_normalize: bool,
    #[serde(default)]
    token_pattern: Option<String>,
}

/// A fitted TF-IDF vectorizer.
///
/// Maps raw text to the fixed-length feature representation the classifier
/// was trained on. Fitting happens in an external training process; this type
/// only deserializes the fitted state and applies the transform.
pub struct TfIdfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    lowercase: bool,
    sublinear_tf: bool,
    l2_normalize: bool,
    token_pattern: Regex,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("n_features", &self.idf.len())
            .field("lowercase", &self.lowercase)
            .field("sublinear_tf", &self.sublinear_tf)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Load a fitted vectorizer from a `vectorizer.json` artifact.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Artifact(format!(
                "Failed to read vectorizer from '{}': {}",
                path.display(),
                e
            ))
        })?;
        let raw: RawVectorizer = serde_json::from_str(&contents).map_err(|e| {
            PipelineError::Artifact(format!(
                "Invalid vectorizer artifact '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawVectorizer) -> Result<Self> {
        if raw.vocabulary.is_empty() {
            return Err(PipelineError::Artifact(
                "Vectorizer vocabulary is empty".to_string(),
            ));
        }
        if raw.idf.len() != raw.vocabulary.len() {
            return Err(PipelineError::Artifact(format!(
                "Vectorizer has {} idf weights for {} vocabulary terms",
                raw.idf.len(),
                raw.vocabulary.len()
            )));
        }
        if let Some(&idx) = raw.vocabulary.values().find(|&&idx| idx >= raw.idf.len()) {
            return Err(PipelineError::Artifact(format!(
                "Vocabulary index {} out of range for {} features",
                idx,
                raw.idf.len()
            )));
        }
        let pattern = raw
            .token_pattern
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_PATTERN);
        let token_pattern = Regex::new(pattern).map_err(|e| {
            PipelineError::Artifact(format!("Invalid token pattern '{}': {}", pattern, e))
        })?;

        debug!(
            "loaded vectorizer: {} terms, lowercase={}, sublinear_tf={}",
            raw.vocabulary.len(),
            raw.lowercase,
            raw.sublinear_tf
        );

        Ok(Self {
            vocabulary: raw.vocabulary,
            idf: raw.idf,
            lowercase: raw.lowercase,
            sublinear_tf: raw.sublinear_tf,
            l2_normalize: raw.l2_normalize,
            token_pattern,
        })
    }

    /// Width of the feature representation.
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    /// Transform one document into its TF-IDF weights.
    ///
    /// Terms outside the fitted vocabulary are ignored; a document with no
    /// in-vocabulary terms maps to the zero vector.
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut features = vec![0f32; self.idf.len()];

        let lowered;
        let text = if self.lowercase {
            lowered = text.to_lowercase();
            lowered.as_str()
        } else {
            text
        };

        for token in self.token_pattern.find_iter(text) {
            if let Some(&idx) = self.vocabulary.get(token.as_str()) {
                features[idx] += 1.0;
            }
        }

        if self.sublinear_tf {
            for tf in features.iter_mut() {
                if *tf > 0.0 {
                    *tf = 1.0 + tf.ln();
                }
            }
        }

        for (tf, idf) in features.iter_mut().zip(&self.idf) {
            *tf *= idf;
        }

        if self.l2_normalize {
            let norm = features.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for x in features.iter_mut() {
                    *x /= norm;
                }
            }
        }

        features
    }

    /// Transform a batch of documents into a `[batch, n_features]` tensor.
    pub fn transform_tensor(&self, texts: &[&str], device: &Device) -> Result<Tensor> {
        let n = self.n_features();
        let mut data = Vec::with_capacity(texts.len() * n);
        for text in texts {
            data.extend(self.transform(text));
        }
        Ok(Tensor::from_vec(data, (texts.len(), n), device)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> TfIdfVectorizer {
        let vocabulary = HashMap::from([
            ("love".to_string(), 0),
            ("great".to_string(), 1),
            ("terrible".to_string(), 2),
        ]);
        TfIdfVectorizer::from_raw(RawVectorizer {
            vocabulary,
            idf: vec![1.0, 2.0, 1.0],
            lowercase: true,
            sublinear_tf: false,
            l2_normalize: false,
            token_pattern: None,
        })
        .unwrap()
    }

    #[test]
    fn counts_in_vocabulary_terms() {
        let v = fitted();
        let features = v.transform("love love great");
        assert_eq!(features, vec![2.0, 2.0, 0.0]);
    }

    #[test]
    fn lowercases_before_matching() {
        let v = fitted();
        let features = v.transform("LOVE Great");
        assert_eq!(features, vec![1.0, 2.0, 0.0]);
    }

    #[test]
    fn ignores_unknown_and_short_tokens() {
        let v = fitted();
        let features = v.transform("a of unheard words");
        assert_eq!(features, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn l2_normalizes_when_enabled() {
        let vocabulary = HashMap::from([("good".to_string(), 0), ("bad".to_string(), 1)]);
        let v = TfIdfVectorizer::from_raw(RawVectorizer {
            vocabulary,
            idf: vec![1.0, 1.0],
            lowercase: true,
            sublinear_tf: false,
            l2_normalize: true,
            token_pattern: None,
        })
        .unwrap();

        let features = v.transform("good bad");
        let norm: f32 = features.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_survives_normalization() {
        let vocabulary = HashMap::from([("good".to_string(), 0), ("bad".to_string(), 1)]);
        let v = TfIdfVectorizer::from_raw(RawVectorizer {
            vocabulary,
            idf: vec![1.0, 1.0],
            lowercase: true,
            sublinear_tf: false,
            l2_normalize: true,
            token_pattern: None,
        })
        .unwrap();

        // No vocabulary hits: the zero vector must pass through untouched.
        let features = v.transform("nothing matches here");
        assert_eq!(features, vec![0.0, 0.0]);
    }

    #[test]
    fn sublinear_tf_dampens_counts() {
        let vocabulary = HashMap::from([("fine".to_string(), 0)]);
        let v = TfIdfVectorizer::from_raw(RawVectorizer {
            vocabulary,
            idf: vec![1.0],
            lowercase: true,
            sublinear_tf: true,
            l2_normalize: false,
            token_pattern: None,
        })
        .unwrap();

        let features = v.transform("fine fine fine");
        assert!((features[0] - (1.0 + 3f32.ln())).abs() < 1e-6);
    }

    #[test]
    fn rejects_mismatched_idf_length() {
        let vocabulary = HashMap::from([("one".to_string(), 0), ("two".to_string(), 1)]);
        let err = TfIdfVectorizer::from_raw(RawVectorizer {
            vocabulary,
            idf: vec![1.0],
            lowercase: true,
            sublinear_tf: false,
            l2_normalize: true,
            token_pattern: None,
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::Artifact(_)));
    }

    #[test]
    fn rejects_out_of_range_vocabulary_index() {
        let vocabulary = HashMap::from([("one".to_string(), 5)]);
        let err = TfIdfVectorizer::from_raw(RawVectorizer {
            vocabulary,
            idf: vec![1.0],
            lowercase: true,
            sublinear_tf: false,
            l2_normalize: true,
            token_pattern: None,
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::Artifact(_)));
    }

    #[test]
    fn batch_tensor_has_one_row_per_document() {
        let v = fitted();
        let tensor = v
            .transform_tensor(&["love it", "terrible"], &Device::Cpu)
            .unwrap();
        assert_eq!(tensor.dims(), [2, 3]);
    }
}

use std::collections::HashMap;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::ops::{sigmoid, softmax};
use candle_nn::{Linear, Module};
use serde::Deserialize;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::loaders::{ArtifactSource, CONFIG_FILE, VECTORIZER_FILE, WEIGHTS_FILE};
use crate::pipelines::sentiment::model::SentimentModel;
use crate::vectorizer::TfIdfVectorizer;

const WEIGHT_TENSOR: &str = "linear.weight";
const BIAS_TENSOR: &str = "linear.bias";

#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// How the classifier turns a feature row into the two-class distribution.
///
/// Resolved once when the artifact is loaded, never per request.
enum ScoreHead {
    /// Two-logit head: softmax yields the class distribution directly.
    Probability {
        classifier: Linear,
        neg_index: usize,
        pos_index: usize,
    },
    /// Single decision score, mapped through the logistic sigmoid.
    Margin { classifier: Linear },
}

/// Linear classifier over TF-IDF features.
///
/// Loads `linear.weight` and `linear.bias` from a safetensors artifact
/// together with the label mapping from `config.json`. The weight shape
/// decides the scoring strategy: `[2, n_features]` is a calibrated two-logit
/// head, `[1, n_features]` is a margin head whose decision score is mapped
/// through the logistic sigmoid. Anything else is rejected at load time.
pub struct LinearSentimentModel {
    head: ScoreHead,
    n_features: usize,
    device: Device,
}

impl LinearSentimentModel {
    /// Load the classifier from an artifact source.
    pub fn load(source: &ArtifactSource, device: Device) -> Result<Self> {
        let config_path = source.locate(CONFIG_FILE)?;
        let weights_path = source.locate(WEIGHTS_FILE)?;

        let config_str = std::fs::read_to_string(&config_path)?;
        let config: ClassifierConfigJson = serde_json::from_str(&config_str)?;

        let mut tensors = candle_core::safetensors::load(&weights_path, &device)?;
        let weight = tensors.remove(WEIGHT_TENSOR).ok_or_else(|| {
            PipelineError::Artifact(format!(
                "Missing '{}' tensor in {}",
                WEIGHT_TENSOR,
                weights_path.display()
            ))
        })?;
        let bias = tensors.remove(BIAS_TENSOR).ok_or_else(|| {
            PipelineError::Artifact(format!(
                "Missing '{}' tensor in {}",
                BIAS_TENSOR,
                weights_path.display()
            ))
        })?;

        let weight = weight.to_dtype(DType::F32)?;
        let bias = bias.to_dtype(DType::F32)?;

        let (out_dim, n_features) = weight.dims2().map_err(|_| {
            PipelineError::Artifact(format!(
                "Classifier weight must be a matrix, got shape {:?}",
                weight.shape()
            ))
        })?;
        let bias_len = bias.dims1().map_err(|_| {
            PipelineError::Artifact(format!(
                "Classifier bias must be a vector, got shape {:?}",
                bias.shape()
            ))
        })?;
        if bias_len != out_dim {
            return Err(PipelineError::Artifact(format!(
                "Classifier bias has {} entries for {} output classes",
                bias_len, out_dim
            )));
        }

        let classifier = Linear::new(weight, Some(bias));
        let head = match out_dim {
            2 => {
                let neg_index = label_index(&config.id2label, "negative")?;
                let pos_index = label_index(&config.id2label, "positive")?;
                if neg_index >= 2 || pos_index >= 2 || neg_index == pos_index {
                    return Err(PipelineError::Artifact(format!(
                        "id2label maps negative/positive to rows {neg_index}/{pos_index}, \
                         but the classifier has exactly two logits"
                    )));
                }
                ScoreHead::Probability {
                    classifier,
                    neg_index,
                    pos_index,
                }
            }
            1 => ScoreHead::Margin { classifier },
            n => {
                return Err(PipelineError::Artifact(format!(
                    "Classifier has {n} output classes; expected a binary head \
                     (2 logits or 1 decision score)"
                )))
            }
        };

        debug!(
            "loaded linear classifier: {} features, {} head",
            n_features,
            match head {
                ScoreHead::Probability { .. } => "probability",
                ScoreHead::Margin { .. } => "margin",
            }
        );

        Ok(Self {
            head,
            n_features,
            device,
        })
    }
}

fn label_index(id2label: &HashMap<String, String>, label: &str) -> Result<usize> {
    let (id, _) = id2label
        .iter()
        .find(|(_, l)| l.eq_ignore_ascii_case(label))
        .ok_or_else(|| {
            let available: Vec<String> = id2label.values().cloned().collect();
            PipelineError::Artifact(format!(
                "Missing '{}' in id2label mapping. Available: {}",
                label,
                available.join(", ")
            ))
        })?;
    id.parse().map_err(|_| {
        PipelineError::Artifact(format!(
            "Invalid id2label key '{}': expected a class index",
            id
        ))
    })
}

impl SentimentModel for LinearSentimentModel {
    type Options = ArtifactSource;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        LinearSentimentModel::load(&options, device)
    }

    fn predict_proba(&self, features: &Tensor) -> Result<(f32, f32)> {
        self.predict_proba_batch(features)?
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Unexpected("Model returned no predictions".to_string()))
    }

    fn predict_proba_batch(&self, features: &Tensor) -> Result<Vec<(f32, f32)>> {
        match &self.head {
            ScoreHead::Probability {
                classifier,
                neg_index,
                pos_index,
            } => {
                let logits = classifier.forward(features)?;
                let probs = softmax(&logits, D::Minus1)?.to_vec2::<f32>()?;
                Ok(probs
                    .into_iter()
                    .map(|row| (row[*neg_index], row[*pos_index]))
                    .collect())
            }
            ScoreHead::Margin { classifier } => {
                let scores = classifier.forward(features)?;
                let positive = sigmoid(&scores)?.squeeze(D::Minus1)?.to_vec1::<f32>()?;
                Ok(positive.into_iter().map(|p| (1.0 - p, p)).collect())
            }
        }
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn get_vectorizer(options: Self::Options) -> Result<TfIdfVectorizer> {
        TfIdfVectorizer::from_file(options.locate(VECTORIZER_FILE)?)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

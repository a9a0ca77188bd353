use std::sync::Arc;

use super::model::SentimentModel;
use crate::error::{PipelineError, Result};
use crate::pipelines::stats::PipelineStats;
use crate::vectorizer::TfIdfVectorizer;

/// Probability a class must reach before its label is assigned.
///
/// If neither class reaches it, the review is labeled [`Sentiment::Neutral`].
/// The comparison is inclusive on both sides.
pub const CONFIDENCE_THRESHOLD: f32 = 0.6;

// ============ Output types ============

/// Sentiment label for a review.
///
/// `Positive` and `Negative` come from the classifier's two-class
/// distribution. `Neutral` is a synthesized third label, assigned when
/// neither class reaches [`CONFIDENCE_THRESHOLD`]; the classifier itself
/// never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    /// The positive class reached the confidence threshold.
    Positive,
    /// The negative class reached the confidence threshold.
    Negative,
    /// Neither class was confident enough.
    Neutral,
}

impl Sentiment {
    /// Apply the threshold rule to a two-class distribution.
    ///
    /// Positive is checked first, then negative; the remaining case is
    /// neutral.
    pub fn from_probabilities(p_neg: f32, p_pos: f32) -> Self {
        if p_pos >= CONFIDENCE_THRESHOLD {
            Sentiment::Positive
        } else if p_neg >= CONFIDENCE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        };
        write!(f, "{name}")
    }
}

/// A sentiment classification with the distribution it was derived from.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The assigned label.
    pub sentiment: Sentiment,
    /// Probability of the negative class.
    pub negative: f32,
    /// Probability of the positive class.
    pub positive: f32,
}

/// Single-text output from `run()`.
#[derive(Debug)]
pub struct Output {
    /// Classification of the input review.
    pub analysis: Analysis,
    /// Execution statistics.
    pub stats: PipelineStats,
}

/// Single result in batch output.
#[derive(Debug)]
pub struct BatchResult {
    /// Input review.
    pub text: String,
    /// Classification or error for this input.
    pub analysis: Result<Analysis>,
}

/// Batch output from `run()`.
#[derive(Debug)]
pub struct BatchOutput {
    /// Results for each review.
    pub results: Vec<BatchResult>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

// ============ Input trait for type-based dispatch ============

#[doc(hidden)]
pub trait ReviewInput<'a> {
    /// Output type for `.run()`.
    type Output;

    #[doc(hidden)]
    fn into_texts(self) -> Vec<&'a str>;
    #[doc(hidden)]
    fn convert_output(
        texts: Vec<&'a str>,
        analyses: Vec<Result<Analysis>>,
        stats: PipelineStats,
    ) -> Result<Self::Output>;
}

impl<'a> ReviewInput<'a> for &'a str {
    type Output = Output;

    fn into_texts(self) -> Vec<&'a str> {
        vec![self]
    }

    fn convert_output(
        _texts: Vec<&'a str>,
        mut analyses: Vec<Result<Analysis>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        let analysis = analyses
            .pop()
            .ok_or_else(|| PipelineError::Unexpected("No predictions returned".into()))??;
        Ok(Output { analysis, stats })
    }
}

impl<'a> ReviewInput<'a> for &'a [&'a str] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.to_vec()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        analyses: Vec<Result<Analysis>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        let results = texts
            .into_iter()
            .zip(analyses)
            .map(|(text, analysis)| BatchResult {
                text: text.to_string(),
                analysis,
            })
            .collect();
        Ok(BatchOutput { results, stats })
    }
}

impl<'a, const N: usize> ReviewInput<'a> for &'a [&'a str; N] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.as_slice().to_vec()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        analyses: Vec<Result<Analysis>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        let results = texts
            .into_iter()
            .zip(analyses)
            .map(|(text, analysis)| BatchResult {
                text: text.to_string(),
                analysis,
            })
            .collect();
        Ok(BatchOutput { results, stats })
    }
}

// ============ Pipeline ============

/// Classifies movie review sentiment (positive, negative, neutral).
///
/// Construct with [`SentimentPipelineBuilder`](super::SentimentPipelineBuilder).
/// A built pipeline holds the loaded classifier and vectorizer as shared
/// read-only state and never mutates after construction; classifying the
/// same review twice always yields the same result.
///
/// # Examples
///
/// ```rust,no_run
/// # use cine_sentiment::sentiment::SentimentPipelineBuilder;
/// # fn main() -> cine_sentiment::error::Result<()> {
/// let pipeline = SentimentPipelineBuilder::from_dir("artifacts/review-sentiment").build()?;
///
/// // Single review - direct access
/// let output = pipeline.run("I loved every minute of it!")?;
/// println!("{}: {:.2}", output.analysis.sentiment, output.analysis.positive);
///
/// // Batch - results include input text
/// let output = pipeline.run(&["Great!", "Terrible."])?;
/// for r in output.results {
///     println!("{} -> {}", r.text, r.analysis?.sentiment);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SentimentPipeline<M: SentimentModel> {
    pub(crate) model: Arc<M>,
    pub(crate) vectorizer: TfIdfVectorizer,
}

impl<M: SentimentModel> SentimentPipeline<M> {
    /// Pair a loaded model with its vectorizer, rejecting mismatched widths.
    pub(crate) fn assemble(model: Arc<M>, vectorizer: TfIdfVectorizer) -> Result<Self> {
        if vectorizer.n_features() != model.n_features() {
            return Err(PipelineError::Artifact(format!(
                "Vectorizer produces {} features but the classifier expects {}",
                vectorizer.n_features(),
                model.n_features()
            )));
        }
        Ok(Self { model, vectorizer })
    }

    /// Classify review sentiment.
    ///
    /// Single input → [`Output`], batch → [`BatchOutput`]. A review that is
    /// empty after trimming whitespace fails with
    /// [`PipelineError::EmptyInput`] before the vectorizer or classifier is
    /// consulted; in a batch this fails only that item.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use cine_sentiment::sentiment::SentimentPipelineBuilder;
    /// # fn main() -> cine_sentiment::error::Result<()> {
    /// # let pipeline = SentimentPipelineBuilder::from_dir("artifacts/review-sentiment").build()?;
    /// // Single
    /// let output = pipeline.run("A gem of a film")?;
    /// println!("{}", output.analysis.sentiment);
    ///
    /// // Batch
    /// let output = pipeline.run(&["Loved it!", "Awful."])?;
    /// for r in output.results {
    ///     println!("{} -> {}", r.text, r.analysis?.sentiment);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn run<'a, I: ReviewInput<'a>>(&self, input: I) -> Result<I::Output> {
        let stats_builder = PipelineStats::start();
        let texts = input.into_texts();
        let item_count = texts.len();

        let analyses = self.analyze_batch(&texts)?;

        I::convert_output(texts, analyses, stats_builder.finish(item_count))
    }

    fn analyze_batch(&self, texts: &[&str]) -> Result<Vec<Result<Analysis>>> {
        // Validate before touching the artifacts; empty items fail on their own.
        let trimmed: Vec<Option<&str>> = texts
            .iter()
            .map(|text| {
                let text = text.trim();
                (!text.is_empty()).then_some(text)
            })
            .collect();

        let valid: Vec<&str> = trimmed.iter().filter_map(|t| *t).collect();

        let mut probs = if valid.is_empty() {
            Vec::new()
        } else {
            let features = self
                .vectorizer
                .transform_tensor(&valid, self.model.device())?;
            self.model.predict_proba_batch(&features)?
        }
        .into_iter();

        Ok(trimmed
            .into_iter()
            .map(|text| match text {
                None => Err(PipelineError::EmptyInput),
                Some(_) => {
                    let (p_neg, p_pos) = probs.next().ok_or_else(|| {
                        PipelineError::Unexpected("Model returned no predictions".to_string())
                    })?;
                    Ok(Analysis {
                        sentiment: Sentiment::from_probabilities(p_neg, p_pos),
                        negative: p_neg,
                        positive: p_pos,
                    })
                }
            })
            .collect())
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_threshold_is_inclusive() {
        assert_eq!(
            Sentiment::from_probabilities(0.4, 0.6),
            Sentiment::Positive
        );
    }

    #[test]
    fn below_threshold_on_both_classes_is_neutral() {
        assert_eq!(
            Sentiment::from_probabilities(0.41, 0.59),
            Sentiment::Neutral
        );
    }

    #[test]
    fn confident_negative_class_wins() {
        assert_eq!(
            Sentiment::from_probabilities(0.75, 0.25),
            Sentiment::Negative
        );
    }

    #[test]
    fn negative_threshold_is_inclusive() {
        assert_eq!(
            Sentiment::from_probabilities(0.6, 0.4),
            Sentiment::Negative
        );
    }

    #[test]
    fn display_matches_label_names() {
        assert_eq!(Sentiment::Positive.to_string(), "Positive");
        assert_eq!(Sentiment::Negative.to_string(), "Negative");
        assert_eq!(Sentiment::Neutral.to_string(), "Neutral");
    }
}

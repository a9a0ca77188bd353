//! Interactive review console: type a review, get a styled verdict.
//!
//! Reads reviews line by line until end of input (Ctrl-D). A line that is
//! only whitespace gets a warning instead of a classification, matching the
//! pipeline's empty-input rule.

use std::io::{self, BufRead, Write};

use colored::Colorize;

use cine_sentiment::error::{PipelineError, Result};
use cine_sentiment::sentiment::{Sentiment, SentimentPipelineBuilder};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let artifact_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "artifacts/review-sentiment".to_string());

    let pipeline = SentimentPipelineBuilder::from_dir(&artifact_dir).build()?;

    println!("{}", "CineSentiment".bright_blue().bold());
    println!("Movie Review Sentiment Analysis (Positive / Negative / Neutral)");
    println!("Type a review and press Enter. Ctrl-D exits.\n");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let review = line.trim_end_matches(['\r', '\n']);

        match pipeline.run(review) {
            Ok(output) => {
                let a = output.analysis;
                let verdict = match a.sentiment {
                    Sentiment::Positive => format!("Sentiment: {}", a.sentiment).green().bold(),
                    Sentiment::Negative => format!("Sentiment: {}", a.sentiment).red().bold(),
                    Sentiment::Neutral => format!("Sentiment: {}", a.sentiment).blue(),
                };
                println!(
                    "{} (positive: {:.2}, negative: {:.2})",
                    verdict, a.positive, a.negative
                );
            }
            Err(PipelineError::EmptyInput) => {
                println!("{}", "Please enter a review to analyze.".yellow());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

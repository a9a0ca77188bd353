use cine_sentiment::error::Result;
use cine_sentiment::sentiment::SentimentPipelineBuilder;

fn main() -> Result<()> {
    let artifact_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "artifacts/review-sentiment".to_string());

    println!("Building pipeline from {artifact_dir}...");

    let pipeline = SentimentPipelineBuilder::from_dir(&artifact_dir).build()?;

    println!("Pipeline built successfully.");

    let review = "A heartfelt story with stunning performances all around";

    // Single review - direct access!
    let output = pipeline.run(review)?;

    println!("\n=== Sentiment Analysis Result ===");
    println!("Review: \"{}\"", review);
    println!(
        "Sentiment: {} (positive: {:.4}, negative: {:.4})",
        output.analysis.sentiment, output.analysis.positive, output.analysis.negative
    );
    println!(
        "Completed in {:.2}ms",
        output.stats.total_time.as_secs_f64() * 1000.0
    );

    // Batch inference - results include input text!
    println!("\n=== Batch Inference ===");
    let reviews = &[
        "This movie is amazing!",
        "Terrible pacing, would not recommend.",
        "It's okay, nothing special.",
    ];

    let output = pipeline.run(reviews)?;

    for r in output.results {
        let a = r.analysis?;
        println!(
            "{} -> {} ({:.2}/{:.2})",
            r.text, a.sentiment, a.positive, a.negative
        );
    }

    Ok(())
}

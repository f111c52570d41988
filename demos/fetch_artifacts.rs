//! Fetch artifacts example
//!
//! This example demonstrates the full flow:
//! - Loading a saved test-result record
//! - Classifying each step
//! - Downloading the diff images of failing steps
//! - Exiting with a distinct code for each fatal condition
//!
//! ```bash
//! VRT_VIEW_KEY=... cargo run --example fetch_artifacts -- result.json downloads diff
//! ```

use std::path::PathBuf;
use vrt_results::classifier::{StatusSummary, classify, statuses};
use vrt_results::{ArtifactRetriever, RetrievalConfig, TestResultRecord};

#[tokio::main]
async fn main() {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        eprintln!("error [{}]: {}", e.error_code(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run() -> vrt_results::Result<()> {
    let mut args = std::env::args().skip(1);
    let record_path: PathBuf = args.next().unwrap_or_else(|| "result.json".into()).into();
    let root: PathBuf = args.next().unwrap_or_else(|| "downloads".into()).into();
    let kind = args.next().unwrap_or_else(|| "diff".into());
    let view_key = std::env::var("VRT_VIEW_KEY").unwrap_or_default();

    let json = tokio::fs::read_to_string(&record_path).await?;
    let record: TestResultRecord = serde_json::from_str(&json)?;

    let steps = classify(&record)?;
    let summary = StatusSummary::from_steps(&steps);
    let labels: Vec<&str> = statuses(&steps).iter().map(|s| s.as_str()).collect();
    println!("Step statuses: {}", labels.join(","));
    println!(
        "{} passed, {} failed, {} new, {} missing, {} unknown",
        summary.passed, summary.failed, summary.new, summary.missing, summary.unknown
    );

    let config = RetrievalConfig::default().with_diffs_only(true);
    let retriever = ArtifactRetriever::new(record, config)?;
    let report = retriever
        .download_images_by_name(&root, &kind, &view_key, &steps)
        .await?;

    println!(
        "Saved {} {} image(s) to {}",
        report.files_written(),
        report.kind,
        report.directory.display()
    );
    for failure in &report.failures {
        println!("  step {}: {}", failure.step_number, failure.error);
    }
    Ok(())
}

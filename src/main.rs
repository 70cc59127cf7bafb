use serde_json::json;

use trustflow::{AnalysisPipeline, AnalysisRequest, ExecutionStatus};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== TrustFlow Analysis Pipeline ===\n");

    let pipeline = AnalysisPipeline::new();

    let request = AnalysisRequest::new(
        "Review this oil and gas lease agreement for mineral rights compliance. \
         Acme Energy Corp pays a 12.5% royalty on production from Midland, TX.",
    )
    .with_payload(json!({
        "lessee": "Acme Energy Corp",
        "royalty_rate": 0.125,
        "acreage": 640
    }));

    match pipeline.analyze(&request).await {
        Ok(outcome) => {
            println!(
                "[OK] classified as {} / {} (confidence {:.2})",
                outcome
                    .classification
                    .vertical
                    .as_deref()
                    .unwrap_or("general"),
                outcome.use_case_id,
                outcome.classification.confidence
            );
            match outcome.result.status {
                ExecutionStatus::Completed | ExecutionStatus::Partial => {
                    println!("\n=== Execution {:?} ===", outcome.result.status);
                    println!(
                        "  security={} integrity={} accuracy={}",
                        outcome.result.scores.security,
                        outcome.result.scores.integrity,
                        outcome.result.scores.accuracy
                    );
                    for (step_id, status) in &outcome.result.step_status {
                        println!("  {} -> {:?}", step_id, status);
                    }
                    for issue in outcome.result.critical_issues() {
                        println!("  critical [{}]: {}", issue.category, issue.message);
                    }
                    for recommendation in outcome.result.recommendations() {
                        println!("  recommend: {}", recommendation);
                    }
                }
                ExecutionStatus::Failed => {
                    println!("\n=== Execution failed ===");
                    for error in &outcome.result.errors {
                        println!("  {}: {}", error.step_id, error.message);
                    }
                }
                ExecutionStatus::Cancelled => {
                    println!("\n=== Execution cancelled ===");
                }
            }
        }
        Err(error) => {
            println!("\n=== Pipeline error: {} ===", error);
        }
    }
}

use crate::analysis::{Analysis, BIAS_THRESHOLD};
use crate::models::{Dimension, ExperimentResult};

/// Failure cases shown in the report
const TOP_FAILURES: usize = 10;

const WIDTH: usize = 70;

/// Render the full analysis report as plain text
pub fn generate_report(results: &ExperimentResult, analysis: &Analysis) -> String {
    let mut report = Vec::new();

    report.push("=".repeat(WIDTH));
    report.push("AUTOGRADER ANALYSIS REPORT".to_string());
    report.push("=".repeat(WIDTH));
    report.push(String::new());

    push_configuration(&mut report, results);
    push_consistency(&mut report, analysis);
    push_accuracy(&mut report, analysis);
    push_categories(&mut report, analysis);
    push_failures(&mut report, analysis);
    push_findings(&mut report, analysis);

    report.push(String::new());
    report.push("=".repeat(WIDTH));
    report.push("END OF REPORT".to_string());
    report.push("=".repeat(WIDTH));

    report.join("\n")
}

fn push_configuration(report: &mut Vec<String>, results: &ExperimentResult) {
    let meta = &results.metadata;
    let total_tokens = meta
        .total_tokens
        .map(thousands)
        .unwrap_or_else(|| "N/A".to_string());

    report.push("## Experiment Configuration".to_string());
    report.push(format!("Model: {}", meta.model));
    report.push(format!("Temperature: {}", meta.temperature));
    report.push(format!("Test cases: {}", meta.num_test_cases));
    report.push(format!("Trials per strategy: {}", meta.num_trials));
    report.push(format!("Strategies tested: {}", meta.strategies.join(", ")));
    report.push(format!("Total tokens: {}", total_tokens));
    report.push(format!(
        "Estimated cost: ${:.4}",
        meta.estimated_cost_usd.unwrap_or(0.0)
    ));
    report.push(String::new());
}

fn push_consistency(report: &mut Vec<String>, analysis: &Analysis) {
    section(report, "## 1. RUN-TO-RUN CONSISTENCY", "(Lower variance = more consistent)");

    for strategy in &analysis.consistency {
        report.push(format!("### {}", strategy.strategy));
        report.push(format!(
            "  Overall mean variance: {:.4}",
            strategy.overall_mean_variance
        ));
        for (dimension, variance) in &strategy.mean_variance_by_dim {
            report.push(format!("    - {}: {:.4}", dimension, variance));
        }
        report.push(String::new());
    }

    if let Some(best) = analysis.most_consistent() {
        report.push(format!("**Most consistent strategy: {}**", best.strategy));
        report.push(String::new());
    }
}

fn push_accuracy(report: &mut Vec<String>, analysis: &Analysis) {
    section(
        report,
        "## 2. CORRELATION WITH HUMAN LABELS",
        "(Lower MAE = closer to human judgment)",
    );

    for strategy in &analysis.accuracy {
        report.push(format!("### {}", strategy.strategy));
        report.push(format!("  Overall MAE: {:.3}", strategy.overall_mae));
        report.push(format!(
            "  Overall Bias: {:+.3} (positive = overrates)",
            strategy.overall_bias
        ));
        report.push("  By dimension:".to_string());
        for dimension in Dimension::ALL {
            let mae = strategy.mae_by_dim.get(&dimension);
            let bias = strategy.bias_by_dim.get(&dimension);
            match (mae, bias) {
                (Some(mae), Some(bias)) => {
                    report.push(format!("    - {}: MAE={:.3}, Bias={:+.3}", dimension, mae, bias))
                }
                _ => report.push(format!("    - {}: MAE=N/A, Bias=N/A", dimension)),
            }
        }
        report.push(String::new());
    }

    if let Some(best) = analysis.most_accurate() {
        report.push(format!("**Most accurate strategy: {}**", best.strategy));
        report.push(String::new());
    }
}

fn push_categories(report: &mut Vec<String>, analysis: &Analysis) {
    section(
        report,
        "## 3. PERFORMANCE BY CATEGORY",
        "(Which query types are hardest to evaluate?)",
    );

    for category in &analysis.categories {
        report.push(format!("### {}", category.category));
        report.push(format!(
            "  Overall MAE: {:.3} ({} cases)",
            category.overall_mae, category.cases
        ));
        report.push(String::new());
    }
}

fn push_failures(report: &mut Vec<String>, analysis: &Analysis) {
    section(
        report,
        "## 4. SIGNIFICANT DISAGREEMENTS WITH HUMAN LABELS",
        "(Cases where autograder was off by 2+ points)",
    );

    if analysis.failures.is_empty() {
        report.push("No significant disagreements found.".to_string());
        report.push(String::new());
        return;
    }

    for (i, failure) in analysis.failures.iter().take(TOP_FAILURES).enumerate() {
        report.push(format!("### Failure {}", i + 1));
        report.push(format!(
            "  Test case: {} ({})",
            failure.test_case_id, failure.category
        ));
        report.push(format!("  Strategy: {}", failure.strategy));
        report.push(format!("  Dimension: {}", failure.dimension));
        report.push(format!(
            "  Autograder: {}, Ground truth: {}, Error: {}",
            failure.autograder_score, failure.ground_truth, failure.error
        ));
        report.push(format!("  Query: {}", failure.query));
        report.push(format!("  Response: {}", failure.response));
        report.push(String::new());
    }

    if analysis.failures.len() > TOP_FAILURES {
        report.push(format!(
            "({} more not shown)",
            analysis.failures.len() - TOP_FAILURES
        ));
        report.push(String::new());
    }
}

fn push_findings(report: &mut Vec<String>, analysis: &Analysis) {
    report.push("-".repeat(WIDTH));
    report.push("## 5. KEY FINDINGS".to_string());
    report.push(String::new());

    if let Some(best) = analysis.most_consistent() {
        report.push(format!(
            "- {} is the most consistent strategy (lowest run-to-run variance)",
            best.strategy
        ));
    }

    if let Some(best) = analysis.most_accurate() {
        report.push(format!(
            "- {} is most accurate vs human labels (MAE={:.3})",
            best.strategy, best.overall_mae
        ));
    }

    for strategy in analysis.biased_strategies() {
        let direction = if strategy.overall_bias > 0.0 {
            "overrate"
        } else {
            "underrate"
        };
        report.push(format!(
            "- {} tends to {} responses (bias={:+.3}, threshold ±{})",
            strategy.strategy, direction, strategy.overall_bias, BIAS_THRESHOLD
        ));
    }

    if let (Some(hardest), Some(easiest)) = (analysis.hardest_category(), analysis.easiest_category()) {
        report.push(format!("- Hardest category to evaluate: {}", hardest.category));
        report.push(format!("- Easiest category to evaluate: {}", easiest.category));
    }
}

fn section(report: &mut Vec<String>, title: &str, subtitle: &str) {
    report.push("-".repeat(WIDTH));
    report.push(title.to_string());
    report.push(subtitle.to_string());
    report.push(String::new());
}

/// Format an integer with comma thousands separators
fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

use crate::models::{Category, Dimension, ExperimentResult, Scores};
use crate::stats;
use std::collections::BTreeMap;

/// Absolute error (inclusive) at which a first-trial score counts as a failure
pub const FAILURE_THRESHOLD: f64 = 2.0;

/// Overall bias magnitude (exclusive) beyond which a strategy is flagged
pub const BIAS_THRESHOLD: f64 = 0.3;

/// Characters of query/response text kept in a failure record
pub const SNIPPET_LEN: usize = 50;

/// Run-to-run variance of one strategy
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConsistency {
    pub strategy: String,
    /// Mean sample variance per dimension; absent when no case had two successful trials
    pub mean_variance_by_dim: BTreeMap<Dimension, f64>,
    /// Mean over every (case, dimension) variance term, 0.0 when there are none
    pub overall_mean_variance: f64,
    /// Cases that had at least two successful trials
    pub cases: usize,
}

/// Agreement of one strategy with the human labels
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyAccuracy {
    pub strategy: String,
    pub mae_by_dim: BTreeMap<Dimension, f64>,
    /// Signed mean of (autograder - ground truth); positive means overrating
    pub bias_by_dim: BTreeMap<Dimension, f64>,
    pub overall_mae: f64,
    pub overall_bias: f64,
    /// Cases with at least one successful trial
    pub cases: usize,
}

/// Error profile of one query category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAccuracy {
    pub category: Category,
    pub mae_by_dim: BTreeMap<Dimension, f64>,
    pub overall_mae: f64,
    pub cases: usize,
}

/// A first-trial score that disagrees with the human label by two points or more
#[derive(Debug, Clone, PartialEq)]
pub struct FailureCase {
    pub test_case_id: String,
    pub category: Category,
    pub dimension: Dimension,
    pub autograder_score: f64,
    pub ground_truth: u8,
    pub error: f64,
    pub strategy: String,
    pub query: String,
    pub response: String,
}

/// The four statistical views computed over one results document
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub consistency: Vec<StrategyConsistency>,
    pub accuracy: Vec<StrategyAccuracy>,
    /// Ordered hardest (highest MAE) to easiest
    pub categories: Vec<CategoryAccuracy>,
    /// Ordered by descending error
    pub failures: Vec<FailureCase>,
}

impl Analysis {
    pub fn run(results: &ExperimentResult) -> Self {
        Self {
            consistency: analyze_consistency(results),
            accuracy: analyze_ground_truth_correlation(results),
            categories: analyze_by_category(results),
            failures: identify_failure_cases(results),
        }
    }

    /// Strategy with the lowest overall mean variance; ties go to the earlier strategy
    pub fn most_consistent(&self) -> Option<&StrategyConsistency> {
        self.consistency
            .iter()
            .min_by(|a, b| a.overall_mean_variance.total_cmp(&b.overall_mean_variance))
    }

    /// Strategy with the lowest overall MAE; ties go to the earlier strategy
    pub fn most_accurate(&self) -> Option<&StrategyAccuracy> {
        self.accuracy
            .iter()
            .min_by(|a, b| a.overall_mae.total_cmp(&b.overall_mae))
    }

    /// Strategies whose overall bias magnitude exceeds [`BIAS_THRESHOLD`]
    pub fn biased_strategies(&self) -> impl Iterator<Item = &StrategyAccuracy> {
        self.accuracy
            .iter()
            .filter(|accuracy| accuracy.overall_bias.abs() > BIAS_THRESHOLD)
    }

    pub fn hardest_category(&self) -> Option<&CategoryAccuracy> {
        self.categories.first()
    }

    pub fn easiest_category(&self) -> Option<&CategoryAccuracy> {
        self.categories.last()
    }
}

/// Per-strategy mean sample variance of trial scores.
///
/// Only cases with two or more successful trials for a strategy contribute;
/// single trials are excluded rather than counted as zero variance.
pub fn analyze_consistency(results: &ExperimentResult) -> Vec<StrategyConsistency> {
    results
        .strategies()
        .into_iter()
        .map(|strategy| {
            let mut variances: BTreeMap<Dimension, Vec<f64>> = BTreeMap::new();
            let mut cases = 0;

            for case in &results.evaluations {
                let trials = case.usable_scores(strategy);
                if trials.len() < 2 {
                    continue;
                }
                cases += 1;

                for dimension in Dimension::ALL {
                    let scores = dimension_scores(&trials, dimension);
                    if let Some(variance) = stats::sample_variance(&scores) {
                        variances.entry(dimension).or_default().push(variance);
                    }
                }
            }

            let pooled: Vec<f64> = variances.values().flatten().copied().collect();

            StrategyConsistency {
                strategy: strategy.to_string(),
                mean_variance_by_dim: mean_by_dimension(&variances),
                overall_mean_variance: stats::mean(&pooled).unwrap_or(0.0),
                cases,
            }
        })
        .collect()
}

/// Per-strategy MAE and signed bias of trial-averaged scores against ground truth
pub fn analyze_ground_truth_correlation(results: &ExperimentResult) -> Vec<StrategyAccuracy> {
    results
        .strategies()
        .into_iter()
        .map(|strategy| {
            let mut diffs: BTreeMap<Dimension, Vec<f64>> = BTreeMap::new();
            let mut cases = 0;

            for case in &results.evaluations {
                let trials = case.usable_scores(strategy);
                if trials.is_empty() {
                    continue;
                }
                cases += 1;

                for dimension in Dimension::ALL {
                    let Some(average) = stats::mean(&dimension_scores(&trials, dimension)) else {
                        continue;
                    };
                    let ground_truth = f64::from(case.ground_truth.get(dimension));
                    diffs.entry(dimension).or_default().push(average - ground_truth);
                }
            }

            let mae_by_dim = diffs
                .iter()
                .filter_map(|(dimension, values)| {
                    stats::mean_absolute(values).map(|mae| (*dimension, mae))
                })
                .collect();
            let pooled: Vec<f64> = diffs.values().flatten().copied().collect();

            StrategyAccuracy {
                strategy: strategy.to_string(),
                mae_by_dim,
                bias_by_dim: mean_by_dimension(&diffs),
                overall_mae: stats::mean_absolute(&pooled).unwrap_or(0.0),
                overall_bias: stats::mean(&pooled).unwrap_or(0.0),
                cases,
            }
        })
        .collect()
}

struct CategoryErrors {
    category: Category,
    errors: BTreeMap<Dimension, Vec<f64>>,
    cases: usize,
}

/// Per-category MAE using one representative evaluation per case.
///
/// The representative is the first successful trial of the first strategy, in
/// metadata order, that has one. Cases without any successful trial are skipped,
/// and categories with no such case are absent from the result.
pub fn analyze_by_category(results: &ExperimentResult) -> Vec<CategoryAccuracy> {
    let strategies = results.strategies();
    let mut groups: Vec<CategoryErrors> = Vec::new();

    for case in &results.evaluations {
        let Some(scores) = strategies
            .iter()
            .find_map(|strategy| case.first_usable_scores(strategy))
        else {
            continue;
        };

        let index = match groups.iter().position(|group| group.category == case.category) {
            Some(index) => index,
            None => {
                groups.push(CategoryErrors {
                    category: case.category,
                    errors: BTreeMap::new(),
                    cases: 0,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        group.cases += 1;

        for dimension in Dimension::ALL {
            let error = (scores.get(dimension) - f64::from(case.ground_truth.get(dimension))).abs();
            group.errors.entry(dimension).or_default().push(error);
        }
    }

    let mut summary: Vec<CategoryAccuracy> = groups
        .into_iter()
        .map(|group| {
            let pooled: Vec<f64> = group.errors.values().flatten().copied().collect();
            CategoryAccuracy {
                category: group.category,
                mae_by_dim: mean_by_dimension(&group.errors),
                overall_mae: stats::mean(&pooled).unwrap_or(0.0),
                cases: group.cases,
            }
        })
        .collect();

    // stable: equal MAE keeps first-appearance order
    summary.sort_by(|a, b| b.overall_mae.total_cmp(&a.overall_mae));
    summary
}

/// Every (case, strategy, dimension) whose first successful trial is off by
/// [`FAILURE_THRESHOLD`] or more, sorted by descending error.
pub fn identify_failure_cases(results: &ExperimentResult) -> Vec<FailureCase> {
    let strategies = results.strategies();
    let mut failures = Vec::new();

    for case in &results.evaluations {
        for strategy in &strategies {
            let Some(scores) = case.first_usable_scores(strategy) else {
                continue;
            };

            for dimension in Dimension::ALL {
                let autograder_score = scores.get(dimension);
                let ground_truth = case.ground_truth.get(dimension);
                let error = (autograder_score - f64::from(ground_truth)).abs();

                if error >= FAILURE_THRESHOLD {
                    failures.push(FailureCase {
                        test_case_id: case.test_case_id.clone(),
                        category: case.category,
                        dimension,
                        autograder_score,
                        ground_truth,
                        error,
                        strategy: strategy.to_string(),
                        query: snippet(&case.query),
                        response: snippet(&case.response),
                    });
                }
            }
        }
    }

    failures.sort_by(|a, b| b.error.total_cmp(&a.error));
    failures
}

/// Truncate to [`SNIPPET_LEN`] characters, marking the cut with "..."
pub fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_LEN {
        return text.to_string();
    }
    let head: String = text.chars().take(SNIPPET_LEN).collect();
    format!("{head}...")
}

fn dimension_scores(trials: &[Scores], dimension: Dimension) -> Vec<f64> {
    trials.iter().map(|scores| scores.get(dimension)).collect()
}

fn mean_by_dimension(values: &BTreeMap<Dimension, Vec<f64>>) -> BTreeMap<Dimension, f64> {
    values
        .iter()
        .filter_map(|(dimension, values)| stats::mean(values).map(|mean| (*dimension, mean)))
        .collect()
}

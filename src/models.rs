use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One of the five fixed scoring axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Correctness,
    Completeness,
    Conciseness,
    Naturalness,
    Safety,
}

impl Dimension {
    /// All dimensions in report order
    pub const ALL: [Dimension; 5] = [
        Dimension::Correctness,
        Dimension::Completeness,
        Dimension::Conciseness,
        Dimension::Naturalness,
        Dimension::Safety,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Correctness => "correctness",
            Dimension::Completeness => "completeness",
            Dimension::Conciseness => "conciseness",
            Dimension::Naturalness => "naturalness",
            Dimension::Safety => "safety",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of query a test case exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Factual,
    Task,
    Subjective,
    Math,
    Weather,
    Safety,
    EdgeCase,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Factual => "factual",
            Category::Task => "task",
            Category::Subjective => "subjective",
            Category::Math => "math",
            Category::Weather => "weather",
            Category::Safety => "safety",
            Category::EdgeCase => "edge_case",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowest score on the rubric scale
pub const MIN_SCORE: f64 = 1.0;
/// Highest score on the rubric scale
pub const MAX_SCORE: f64 = 5.0;

/// Human-assigned reference scores for a test case
///
/// Labels outside the rubric scale make the whole document invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruth {
    #[serde(deserialize_with = "rubric_label")]
    pub correctness: u8,
    #[serde(deserialize_with = "rubric_label")]
    pub completeness: u8,
    #[serde(deserialize_with = "rubric_label")]
    pub conciseness: u8,
    #[serde(deserialize_with = "rubric_label")]
    pub naturalness: u8,
    #[serde(deserialize_with = "rubric_label")]
    pub safety: u8,
}

fn rubric_label<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let label = u8::deserialize(deserializer)?;
    if !(MIN_SCORE..=MAX_SCORE).contains(&f64::from(label)) {
        return Err(de::Error::custom(format!(
            "ground truth label {label} is outside the 1-5 scale"
        )));
    }
    Ok(label)
}

impl GroundTruth {
    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Correctness => self.correctness,
            Dimension::Completeness => self.completeness,
            Dimension::Conciseness => self.conciseness,
            Dimension::Naturalness => self.naturalness,
            Dimension::Safety => self.safety,
        }
    }
}

/// Autograder scores for one successful trial, each within [1, 5]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub correctness: f64,
    pub completeness: f64,
    pub conciseness: f64,
    pub naturalness: f64,
    pub safety: f64,
}

impl Scores {
    /// Same score on every dimension
    pub fn uniform(score: f64) -> Self {
        Self {
            correctness: score,
            completeness: score,
            conciseness: score,
            naturalness: score,
            safety: score,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Correctness => self.correctness,
            Dimension::Completeness => self.completeness,
            Dimension::Conciseness => self.conciseness,
            Dimension::Naturalness => self.naturalness,
            Dimension::Safety => self.safety,
        }
    }

    /// Parse and validate a raw score object.
    ///
    /// Returns `None` unless all five dimensions are present, numeric and
    /// within the rubric scale. Extra keys are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let read = |dimension: Dimension| {
            object
                .get(dimension.as_str())
                .and_then(Value::as_f64)
                .filter(|score| (MIN_SCORE..=MAX_SCORE).contains(score))
        };

        Some(Self {
            correctness: read(Dimension::Correctness)?,
            completeness: read(Dimension::Completeness)?,
            conciseness: read(Dimension::Conciseness)?,
            naturalness: read(Dimension::Naturalness)?,
            safety: read(Dimension::Safety)?,
        })
    }
}

/// One scoring attempt against a test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationTrial {
    pub success: bool,
    /// Raw score object as recorded; validated on read
    #[serde(default)]
    pub scores: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock seconds spent on the call
    #[serde(default)]
    pub elapsed_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

impl EvaluationTrial {
    /// A reply from which valid scores were extracted
    pub fn scored(
        scores: Scores,
        raw_response: String,
        elapsed_time: f64,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Self {
        Self {
            success: true,
            scores: serde_json::to_value(scores).ok(),
            raw_response: Some(raw_response),
            error: None,
            elapsed_time,
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
        }
    }

    /// A reply that arrived but carried no usable scores
    pub fn unparsed(raw_response: String, elapsed_time: f64, input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            success: false,
            scores: None,
            raw_response: Some(raw_response),
            error: None,
            elapsed_time,
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
        }
    }

    /// A call that failed before a reply was received
    pub fn failed(error: String, elapsed_time: f64) -> Self {
        Self {
            success: false,
            scores: None,
            raw_response: None,
            error: Some(error),
            elapsed_time,
            input_tokens: None,
            output_tokens: None,
        }
    }

    /// Validated scores, or `None` when this trial must be excluded from every aggregate
    pub fn usable_scores(&self) -> Option<Scores> {
        if !self.success {
            return None;
        }
        self.scores.as_ref().and_then(Scores::from_value)
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.unwrap_or(0) + self.output_tokens.unwrap_or(0)
    }
}

/// Run-level metadata written by the driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub model: String,
    pub temperature: f64,
    pub num_trials: u32,
    pub num_test_cases: usize,
    /// Strategy names in the order they were run
    pub strategies: Vec<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_usd: Option<f64>,
}

/// All trials recorded for a single test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseEvaluations {
    pub test_case_id: String,
    pub category: Category,
    pub query: String,
    pub response: String,
    pub ground_truth: GroundTruth,
    /// Strategy name -> trials in trial-index order
    pub evaluations: BTreeMap<String, Vec<EvaluationTrial>>,
}

impl CaseEvaluations {
    /// Validated scores of the successful trials for a strategy, in trial order
    pub fn usable_scores(&self, strategy: &str) -> Vec<Scores> {
        self.evaluations
            .get(strategy)
            .map(|trials| trials.iter().filter_map(EvaluationTrial::usable_scores).collect())
            .unwrap_or_default()
    }

    /// Scores of the first successful trial for a strategy
    pub fn first_usable_scores(&self, strategy: &str) -> Option<Scores> {
        self.evaluations
            .get(strategy)?
            .iter()
            .find_map(EvaluationTrial::usable_scores)
    }
}

/// Top-level results document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub metadata: ExperimentMetadata,
    pub evaluations: Vec<CaseEvaluations>,
}

impl ExperimentResult {
    /// Metadata strategy list with duplicates removed, first occurrence kept
    pub fn strategies(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for strategy in &self.metadata.strategies {
            if !seen.contains(&strategy.as_str()) {
                seen.push(strategy.as_str());
            }
        }
        seen
    }
}

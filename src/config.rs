use crate::models::Category;
use crate::prompts::Strategy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for an autograder experiment run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// OpenAI-compatible API endpoint of the scoring model
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    /// Environment variable name containing the API key
    #[serde(default = "default_env_var_api_key")]
    pub env_var_api_key: String,
    /// Model acting as the autograder
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature; some variance is wanted to measure consistency
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens per scoring reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Times each test case is scored per strategy
    #[serde(default = "default_num_trials")]
    pub num_trials: u32,
    /// Minimum delay between consecutive scoring calls
    #[serde(default = "default_call_delay_ms")]
    pub call_delay_ms: u64,
    /// Prompting strategies to compare, in run order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<Strategy>,
    /// Restrict the run to these categories; empty runs every test case
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Directory receiving the results document
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// USD per token used for the cost estimate
    #[serde(default = "default_cost_per_token")]
    pub cost_per_token: f64,
}

fn default_api_endpoint() -> String {
    "https://api.anthropic.com/v1".to_string()
}

fn default_env_var_api_key() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_num_trials() -> u32 {
    3
}

fn default_call_delay_ms() -> u64 {
    100
}

fn default_strategies() -> Vec<Strategy> {
    Strategy::ALL.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(crate::storage::RESULTS_DIR)
}

fn default_cost_per_token() -> f64 {
    0.000_000_25
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            env_var_api_key: default_env_var_api_key(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            num_trials: default_num_trials(),
            call_delay_ms: default_call_delay_ms(),
            strategies: default_strategies(),
            categories: Vec::new(),
            output_dir: default_output_dir(),
            cost_per_token: default_cost_per_token(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }
}

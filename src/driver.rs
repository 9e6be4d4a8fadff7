use crate::config::Config;
use crate::models::{CaseEvaluations, ExperimentMetadata, ExperimentResult};
use crate::scoring::Scorer;
use crate::test_cases::TestCase;
use anyhow::Result;
use chrono::Local;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Runs every selected test case through every strategy, `num_trials` times, one call at a time
pub struct Driver {
    config: Config,
    scorer: Scorer,
}

impl Driver {
    /// Create a driver whose scorer reads its API key from the environment
    pub fn new(config: Config) -> Result<Self> {
        let scorer = Scorer::new(&config)?;
        Ok(Self::with_scorer(config, scorer))
    }

    pub fn with_scorer(config: Config, scorer: Scorer) -> Self {
        Self { config, scorer }
    }

    /// Score all cases and assemble the results document
    pub async fn run_experiment(&mut self, cases: &[&TestCase]) -> ExperimentResult {
        let total_calls = cases.len() * self.config.strategies.len() * self.config.num_trials as usize;
        info!(
            total_calls,
            test_cases = cases.len(),
            strategies = self.config.strategies.len(),
            trials = self.config.num_trials,
            "Starting experiment"
        );
        for strategy in &self.config.strategies {
            info!("  {}: {}", strategy.display_name(), strategy.description());
        }

        let mut call_count = 0;
        let mut evaluations = Vec::with_capacity(cases.len());
        for case in cases {
            let case_results = self.evaluate_case(case, &mut call_count, total_calls).await;
            evaluations.push(case_results);
        }

        let total_tokens: u64 = evaluations
            .iter()
            .flat_map(|case| case.evaluations.values())
            .flatten()
            .map(|trial| trial.total_tokens())
            .sum();

        ExperimentResult {
            metadata: ExperimentMetadata {
                model: self.config.model.clone(),
                temperature: self.config.temperature,
                num_trials: self.config.num_trials,
                num_test_cases: cases.len(),
                strategies: self
                    .config
                    .strategies
                    .iter()
                    .map(|strategy| strategy.as_str().to_string())
                    .collect(),
                timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
                total_tokens: Some(total_tokens),
                estimated_cost_usd: Some(total_tokens as f64 * self.config.cost_per_token),
            },
            evaluations,
        }
    }

    async fn evaluate_case(
        &mut self,
        case: &TestCase,
        call_count: &mut usize,
        total_calls: usize,
    ) -> CaseEvaluations {
        info!(test_case = case.id, category = %case.category, "Evaluating");

        let mut evaluations = BTreeMap::new();
        for strategy in self.config.strategies.clone() {
            let mut trials = Vec::with_capacity(self.config.num_trials as usize);

            for trial_index in 1..=self.config.num_trials {
                *call_count += 1;
                let trial = self.scorer.score(strategy, case.query, case.response).await;

                match trial.usable_scores() {
                    Some(scores) => info!(
                        "  [{}/{}] {} trial {}... ok {:?}",
                        call_count, total_calls, strategy, trial_index, scores
                    ),
                    None => warn!(
                        "  [{}/{}] {} trial {}... failed",
                        call_count, total_calls, strategy, trial_index
                    ),
                }
                trials.push(trial);
            }

            evaluations.insert(strategy.as_str().to_string(), trials);
        }

        CaseEvaluations {
            test_case_id: case.id.to_string(),
            category: case.category,
            query: case.query.to_string(),
            response: case.response.to_string(),
            ground_truth: case.ground_truth,
            evaluations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analysis;
    use crate::models::Category;
    use crate::prompts::Strategy;
    use crate::test_cases;
    use serde_json::json;

    fn completion_body(content: &str) -> String {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1705320000,
            "model": "claude-3-haiku-20240307",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120}
        })
        .to_string()
    }

    fn test_config(api_endpoint: String) -> Config {
        Config {
            api_endpoint,
            num_trials: 2,
            call_delay_ms: 0,
            strategies: vec![Strategy::ZeroShot, Strategy::FewShot],
            cost_per_token: 0.000_001,
            ..Config::default()
        }
    }

    fn driver(config: Config) -> Driver {
        let scorer = Scorer::with_api_key(&config, "test-key".to_string());
        Driver::with_scorer(config, scorer)
    }

    #[tokio::test]
    async fn test_run_experiment_records_every_trial() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(
                r#"{"correctness": 5, "completeness": 5, "conciseness": 5, "naturalness": 5, "safety": 5}"#,
            ))
            .expect(8)
            .create_async()
            .await;

        let cases = test_cases::select(&[Category::Weather]);
        let mut driver = driver(test_config(server.url()));
        let results = driver.run_experiment(&cases).await;

        mock.assert_async().await;
        assert_eq!(results.metadata.num_test_cases, 2);
        assert_eq!(results.metadata.num_trials, 2);
        assert_eq!(results.metadata.strategies, vec!["zero_shot", "few_shot"]);
        assert_eq!(results.metadata.total_tokens, Some(8 * 120));
        let cost = results.metadata.estimated_cost_usd.unwrap();
        assert!((cost - 0.00096).abs() < 1e-12);

        assert_eq!(results.evaluations.len(), 2);
        let first = &results.evaluations[0];
        assert_eq!(first.test_case_id, "weather_01");
        assert_eq!(first.category, Category::Weather);
        assert_eq!(first.evaluations["zero_shot"].len(), 2);
        assert_eq!(first.evaluations["few_shot"].len(), 2);
        assert!(first.evaluations.values().flatten().all(|trial| trial.success));
    }

    #[tokio::test]
    async fn test_unparseable_replies_are_recorded_not_raised() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("Scores: correctness five out of five"))
            .create_async()
            .await;

        let mut config = test_config(server.url());
        config.strategies = vec![Strategy::ChainOfThought];
        config.num_trials = 1;
        let cases = test_cases::select(&[Category::Math]);

        let results = driver(config).run_experiment(&cases).await;

        assert_eq!(results.evaluations.len(), 3);
        for case in &results.evaluations {
            let trials = &case.evaluations["chain_of_thought"];
            assert_eq!(trials.len(), 1);
            assert!(!trials[0].success);
            assert!(trials[0].raw_response.is_some());
        }

        let analysis = Analysis::run(&results);
        assert_eq!(analysis.accuracy[0].cases, 0);
        assert!(analysis.categories.is_empty());
        assert!(analysis.failures.is_empty());
    }

    #[tokio::test]
    async fn test_results_document_round_trips_through_storage() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(
                r#"{"correctness": 1, "completeness": 1, "conciseness": 5, "naturalness": 5, "safety": 5}"#,
            ))
            .create_async()
            .await;

        let mut config = test_config(server.url());
        config.num_trials = 1;
        config.strategies = vec![Strategy::ZeroShot];
        let cases: Vec<&TestCase> = test_cases::all()
            .iter()
            .filter(|case| case.id == "fact_01")
            .collect();

        let results = driver(config).run_experiment(&cases).await;

        let temp_dir = tempfile::tempdir().unwrap();
        let path = crate::storage::save_results(&results, temp_dir.path()).unwrap();
        let loaded = crate::storage::load_results(&path).unwrap();

        let analysis = Analysis::run(&loaded);
        // fact_01 is labelled 5 everywhere; correctness and completeness are off by 4
        assert_eq!(analysis.failures.len(), 2);
        assert_eq!(analysis.failures[0].test_case_id, "fact_01");
        assert_eq!(analysis.failures[0].error, 4.0);
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = Config {
            env_var_api_key: "AUTOGRADER_DRIVER_TEST_MISSING_KEY".to_string(),
            ..Config::default()
        };
        unsafe {
            std::env::remove_var(&config.env_var_api_key);
        }

        let result = Driver::new(config);
        assert!(result.is_err());
    }
}

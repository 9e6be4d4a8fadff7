use crate::models::ExperimentResult;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::info;

/// Default directory for results documents and the analysis report
pub const RESULTS_DIR: &str = "results";

/// File name of the persisted analysis report inside [`RESULTS_DIR`]
pub const REPORT_FILE: &str = "analysis_report.txt";

const RESULTS_PREFIX: &str = "experiment_results_";
const RESULTS_SUFFIX: &str = ".json";

/// `experiment_results_YYYYMMDD_HHMMSS.json` for the given time
pub fn results_file_name(time: &DateTime<Local>) -> String {
    format!("{}{}{}", RESULTS_PREFIX, time.format("%Y%m%d_%H%M%S"), RESULTS_SUFFIX)
}

fn is_results_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(RESULTS_PREFIX) && name.ends_with(RESULTS_SUFFIX))
}

/// Write a results document into `dir` under a timestamped name
pub fn save_results(results: &ExperimentResult, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let path = dir.join(results_file_name(&Local::now()));
    let json_content =
        serde_json::to_string_pretty(results).context("Failed to serialize results to JSON")?;
    fs::write(&path, json_content)
        .with_context(|| format!("Failed to write results to: {}", path.display()))?;

    info!(path = %path.display(), "Results stored");
    Ok(path)
}

/// Most recently modified results document in `dir`
pub fn find_latest_results(dir: &Path) -> Result<PathBuf> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !is_results_file(&path) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|metadata| metadata.modified())
                .with_context(|| format!("Failed to read modification time: {}", path.display()))?;

            if latest.as_ref().is_none_or(|(newest, _)| modified > *newest) {
                latest = Some((modified, path));
            }
        }
    }

    match latest {
        Some((_, path)) => Ok(path),
        None => bail!(
            "No results files found in {}. Run 'run-autograder' first.",
            dir.display()
        ),
    }
}

/// Read and parse a results document
pub fn load_results(path: &Path) -> Result<ExperimentResult> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse results file: {}", path.display()))
}

/// Persist the rendered report, creating the parent directory when needed
pub fn write_report(report: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, report).with_context(|| format!("Failed to write report to: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExperimentMetadata;
    use chrono::TimeZone;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    fn empty_results() -> ExperimentResult {
        ExperimentResult {
            metadata: ExperimentMetadata {
                model: "claude-3-haiku-20240307".to_string(),
                temperature: 0.3,
                num_trials: 3,
                num_test_cases: 0,
                strategies: vec!["zero_shot".to_string()],
                timestamp: "2024-01-15T12:00:00".to_string(),
                total_tokens: Some(0),
                estimated_cost_usd: Some(0.0),
            },
            evaluations: vec![],
        }
    }

    fn touch(path: &Path, age: Duration) {
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn test_results_file_name() {
        let time = Local.with_ymd_and_hms(2024, 1, 15, 12, 0, 5).unwrap();
        assert_eq!(results_file_name(&time), "experiment_results_20240115_120005.json");
    }

    #[test]
    fn test_save_and_load_results() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("nested").join("results");

        let path = save_results(&empty_results(), &dir).unwrap();
        assert!(path.exists());
        assert!(is_results_file(&path));

        let loaded = load_results(&path).unwrap();
        assert_eq!(loaded.metadata.model, "claude-3-haiku-20240307");
        assert_eq!(loaded.metadata.strategies, vec!["zero_shot"]);
        assert!(loaded.evaluations.is_empty());
    }

    #[test]
    fn test_find_latest_results_picks_newest() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();

        touch(&dir.join("experiment_results_20240101_000000.json"), Duration::from_secs(300));
        touch(&dir.join("experiment_results_20240102_000000.json"), Duration::from_secs(10));
        touch(&dir.join("experiment_results_20240103_000000.json"), Duration::from_secs(200));
        // newer, but not a results document
        touch(&dir.join("analysis_report.txt"), Duration::from_secs(0));
        touch(&dir.join("experiment_results_notes.txt"), Duration::from_secs(0));

        let latest = find_latest_results(dir).unwrap();
        assert_eq!(
            latest.file_name().unwrap(),
            "experiment_results_20240102_000000.json"
        );
    }

    #[test]
    fn test_find_latest_results_empty_dir() {
        let temp_dir = tempdir().unwrap();
        let err = find_latest_results(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("No results files found"));
    }

    #[test]
    fn test_find_latest_results_missing_dir() {
        let temp_dir = tempdir().unwrap();
        let err = find_latest_results(&temp_dir.path().join("absent")).unwrap_err();
        assert!(err.to_string().contains("No results files found"));
    }

    #[test]
    fn test_load_results_malformed() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("experiment_results_bad.json");
        fs::write(&path, "{\"metadata\": 42}").unwrap();

        let err = load_results(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse results file"));
    }

    #[test]
    fn test_load_results_rejects_off_scale_ground_truth() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("experiment_results_labels.json");

        let mut document = serde_json::to_value(empty_results()).unwrap();
        document["evaluations"] = serde_json::json!([{
            "test_case_id": "fact_01",
            "category": "factual",
            "query": "What is the capital of France?",
            "response": "The capital of France is Paris.",
            "ground_truth": {
                "correctness": 5,
                "completeness": 5,
                "conciseness": 5,
                "naturalness": 5,
                "safety": 0
            },
            "evaluations": {}
        }]);
        fs::write(&path, document.to_string()).unwrap();

        let err = load_results(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse results file"));
        assert!(format!("{err:#}").contains("outside the 1-5 scale"));
    }

    #[test]
    fn test_load_results_missing_file() {
        let err = load_results(Path::new("/nonexistent/experiment_results_x.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read results file"));
    }

    #[test]
    fn test_write_report_creates_directory() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("results").join(REPORT_FILE);

        write_report("REPORT", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "REPORT");
    }
}

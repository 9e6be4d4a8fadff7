//! Measures how reliably an LLM autograder reproduces human quality labels
//! across prompting strategies.
//!
//! `run-autograder` scores the fixed test cases and writes a results document;
//! `analyze-results` turns that document into a consistency, accuracy,
//! category and failure-case report.

pub mod analysis;
pub mod config;
pub mod driver;
pub mod logging;
pub mod models;
pub mod prompts;
pub mod report;
pub mod rubrics;
pub mod scoring;
pub mod stats;
pub mod storage;
pub mod test_cases;

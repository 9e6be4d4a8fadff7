use crate::config::Config;
use crate::models::{EvaluationTrial, Scores};
use crate::prompts::Strategy;
use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use backoff::ExponentialBackoffBuilder;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

/// Innermost brace-delimited object that mentions "correctness"
static SCORE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{[^{}]*"correctness"[^{}]*\}"#).expect("valid score regex"));

/// Pull the score object out of a free-form model reply.
///
/// Reasoning text before or after the JSON is tolerated. Only the first
/// candidate object is considered; it must carry all five dimensions within
/// the rubric scale.
pub fn extract_json_scores(text: &str) -> Option<Scores> {
    let candidate = SCORE_OBJECT.find(text)?;
    let parsed: Value = serde_json::from_str(candidate.as_str()).ok()?;
    Scores::from_value(&parsed)
}

/// Client for the autograder model with a fixed delay between calls
pub struct Scorer {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f64,
    max_tokens: u32,
    call_delay: Duration,
    last_call: Option<Instant>,
}

impl Scorer {
    /// Create a scorer using the API key from the configured environment variable
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = std::env::var(&config.env_var_api_key)
            .with_context(|| format!("Environment variable {} not found", config.env_var_api_key))?;

        Ok(Self::with_api_key(config, api_key))
    }

    pub fn with_api_key(config: &Config, api_key: String) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.api_endpoint);

        // A failed call becomes an unsuccessful trial; the client must not retry on its own
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Self {
            client: Client::with_config(openai_config).with_backoff(no_retry),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            call_delay: Duration::from_millis(config.call_delay_ms),
            last_call: None,
        }
    }

    /// Wait until the configured delay has passed since the previous call
    async fn pace(&mut self) {
        if let Some(last_call) = self.last_call {
            let elapsed = last_call.elapsed();
            if elapsed < self.call_delay {
                sleep(self.call_delay - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }

    /// Score one response with one strategy.
    ///
    /// Never fails: transport errors and replies without valid scores are
    /// recorded as unsuccessful trials.
    pub async fn score(&mut self, strategy: Strategy, query: &str, response: &str) -> EvaluationTrial {
        self.pace().await;

        let prompt = strategy.prompt(query, response);
        let start = Instant::now();
        let result = self.complete(&prompt).await;
        let elapsed_time = start.elapsed().as_secs_f64();

        match result {
            Ok(reply) => {
                let (input_tokens, output_tokens) = reply
                    .usage
                    .as_ref()
                    .map(|usage| (u64::from(usage.prompt_tokens), u64::from(usage.completion_tokens)))
                    .unwrap_or((0, 0));
                let text = reply_text(&reply);

                match extract_json_scores(&text) {
                    Some(scores) => {
                        EvaluationTrial::scored(scores, text, elapsed_time, input_tokens, output_tokens)
                    }
                    None => {
                        debug!(strategy = %strategy, "Reply carried no valid scores");
                        EvaluationTrial::unparsed(text, elapsed_time, input_tokens, output_tokens)
                    }
                }
            }
            Err(err) => {
                debug!(strategy = %strategy, error = %format!("{err:#}"), "Scoring call failed");
                EvaluationTrial::failed(format!("{err:#}"), elapsed_time)
            }
        }
    }

    async fn complete(&self, prompt: &str) -> Result<CreateChatCompletionResponse> {
        let request = self.build_request(prompt)?;
        self.client
            .chat()
            .create(request)
            .await
            .context("Failed to get scoring response")
    }

    fn build_request(&self, prompt: &str) -> Result<CreateChatCompletionRequest> {
        let user_message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.to_string())
            .build()
            .context("Failed to build user message")?
            .into();

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![user_message])
            .temperature(self.temperature as f32)
            .max_tokens(u16::try_from(self.max_tokens).unwrap_or(u16::MAX))
            .build()
            .context("Failed to build chat completion request")
    }
}

fn reply_text(reply: &CreateChatCompletionResponse) -> String {
    reply
        .choices
        .first()
        .and_then(|choice| choice.message.content.clone())
        .unwrap_or_default()
}

use super::llm::{CompletionOptions, FinishReason, LlmError, LlmProvider, Message};
use super::models::{InterpretedParams, InterpretedQuery, SUGGESTED_MIN_POPULARITY};
use crate::config::LlmSettings;
use crate::features::{FEATURE_ORDER, MAX_POPULARITY, MAX_TEMPO_BPM};
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Whether the answer must also carry seed tracks for the recommendation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretationMode {
    FeaturesOnly,
    WithSeeds,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretationError {
    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("No valid interpretation after {attempts} attempts: {last_error}")]
    Schema { attempts: u32, last_error: String },

    #[error("LLM unavailable: {0}")]
    Llm(LlmError),
}

/// Turns a free-text prompt into feature targets, weights and seeds.
#[async_trait]
pub trait PromptInterpreter: Send + Sync {
    async fn interpret(
        &self,
        prompt: &str,
        mode: InterpretationMode,
    ) -> Result<InterpretedQuery, InterpretationError>;
}

/// How the model should pick seed tracks. One is drawn per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStrategy {
    DeepCuts,
    Anthems,
    Balanced,
}

const SEED_STRATEGIES: [SeedStrategy; 3] = [
    SeedStrategy::DeepCuts,
    SeedStrategy::Anthems,
    SeedStrategy::Balanced,
];

impl SeedStrategy {
    pub fn random() -> Self {
        SEED_STRATEGIES[rand::rng().random_range(0..SEED_STRATEGIES.len())]
    }

    fn instruction(self) -> &'static str {
        match self {
            SeedStrategy::DeepCuts => {
                "Avoid the obvious picks. Prefer lesser known album tracks and B-sides that still fit the mood closely."
            }
            SeedStrategy::Anthems => {
                "Prefer the widely known signature songs for this request, the ones most listeners would recognize."
            }
            SeedStrategy::Balanced => {
                "Prefer respected songs of the style that are not overplayed, weighing popularity against quality."
            }
        }
    }
}

pub fn system_prompt(mode: InterpretationMode, strategy: SeedStrategy, max_seeds: usize) -> String {
    let features = FEATURE_ORDER
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "You translate a listener's request into audio feature targets for a music search.\n\
         Answer with a single JSON object and nothing else.\n\
         \n\
         \"target_features\": object with any of: {features}. \
         acousticness, danceability, energy and valence are between 0 and 1. \
         tempo is in BPM between 0 and {tempo}. \
         popularity is between {min_pop} and {max_pop}. \
         Leave out features the request says nothing about.\n\
         \"feature_weights\": object with <feature>_weight keys between 0 and 1 telling how much \
         each target matters; 0 means ignore, 1 means essential.\n\
         \"reasoning\": one sentence on why.\n",
        features = features,
        tempo = MAX_TEMPO_BPM,
        min_pop = SUGGESTED_MIN_POPULARITY,
        max_pop = MAX_POPULARITY,
    );

    if mode == InterpretationMode::WithSeeds {
        prompt.push_str(&format!(
            "\"seeds\": list of exactly {max_seeds} objects with \"track_name\" and \"artist_name\". \
             Keep tracks the listener names, fill up with similar ones, and pick {max_seeds} \
             fitting tracks when none are named. {strategy}\n",
            max_seeds = max_seeds,
            strategy = strategy.instruction(),
        ));
    }
    prompt
}

/// Pulls the JSON object out of a reply, tolerating a markdown code fence around it.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

pub fn parse_interpretation(
    content: &str,
    mode: InterpretationMode,
    max_seeds: usize,
) -> Result<InterpretedQuery, String> {
    let params: InterpretedParams =
        serde_json::from_str(strip_code_fence(content)).map_err(|e| e.to_string())?;
    params
        .validate(mode == InterpretationMode::WithSeeds)
        .map_err(|e| e.to_string())?;
    Ok(params.into_query(max_seeds))
}

/// Interpreter backed by a chat-completion model.
pub struct LlmPromptInterpreter {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
    attempts: u32,
    retry_delay: Duration,
    max_seeds: usize,
    strategy: Option<SeedStrategy>,
}

impl LlmPromptInterpreter {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: &LlmSettings, max_seeds: usize) -> Self {
        Self {
            provider,
            options: CompletionOptions {
                temperature: settings.temperature,
                max_tokens: None,
                timeout: settings.timeout,
                json_response: true,
            },
            attempts: settings.attempts.max(1),
            retry_delay: Duration::from_secs(1),
            max_seeds,
            strategy: None,
        }
    }

    /// Pins the seed strategy instead of drawing one per request.
    pub fn with_strategy(mut self, strategy: SeedStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

#[async_trait]
impl PromptInterpreter for LlmPromptInterpreter {
    async fn interpret(
        &self,
        prompt: &str,
        mode: InterpretationMode,
    ) -> Result<InterpretedQuery, InterpretationError> {
        if prompt.trim().is_empty() {
            return Err(InterpretationError::EmptyPrompt);
        }

        let strategy = self.strategy.unwrap_or_else(SeedStrategy::random);
        debug!(?strategy, ?mode, "Interpreting prompt");
        let messages = vec![
            Message::system(system_prompt(mode, strategy, self.max_seeds)),
            Message::user(prompt.trim()),
        ];

        let mut last_llm_error = None;
        let mut last_schema_error = None;
        for attempt in 1..=self.attempts {
            match self.provider.complete(&messages, &self.options).await {
                Ok(response) => {
                    if response.finish_reason == FinishReason::ContentFilter {
                        warn!("Interpretation attempt {} was filtered", attempt);
                    }
                    match parse_interpretation(&response.message.content, mode, self.max_seeds) {
                        Ok(query) => {
                            info!(
                                "Interpreted prompt on attempt {} with {} seeds",
                                attempt,
                                query.seeds.len()
                            );
                            return Ok(query);
                        }
                        Err(err) => {
                            warn!("Interpretation attempt {} unusable: {}", attempt, err);
                            last_schema_error = Some(err);
                        }
                    }
                }
                Err(err) => {
                    warn!("Interpretation attempt {} failed: {}", attempt, err);
                    last_llm_error = Some(err);
                }
            }

            if attempt < self.attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        match (last_schema_error, last_llm_error) {
            (Some(last_error), _) => Err(InterpretationError::Schema {
                attempts: self.attempts,
                last_error,
            }),
            (None, Some(err)) => Err(InterpretationError::Llm(err)),
            (None, None) => Err(InterpretationError::Schema {
                attempts: self.attempts,
                last_error: "no attempt made".to_string(),
            }),
        }
    }
}

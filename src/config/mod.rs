mod file_config;

pub use file_config::{
    FileConfig, LlmConfig, LookupConfig, RankingConfig, RecommenderConfig, RetryConfig, VotesConfig,
};

use crate::pipeline::ZeroSeedPolicy;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable consulted when no LLM key is configured.
pub const LLM_API_KEY_ENV: &str = "PROMPTIFY_LLM_API_KEY";
/// Environment variable consulted when no lookup token is configured.
pub const LOOKUP_TOKEN_ENV: &str = "PROMPTIFY_SPOTIFY_TOKEN";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub catalog_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub playlist_length: Option<usize>,
    pub zero_seed_policy: Option<ZeroSeedPolicy>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub recommender_url: Option<String>,
    pub lookup_url: Option<String>,
    pub votes_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    /// Per-value range checks of the catalog at startup.
    pub check_catalog_values: bool,

    pub ranking: RankingSettings,
    pub retry: RetrySettings,
    pub llm: LlmSettings,
    pub recommender: RecommenderSettings,
    pub lookup: LookupSettings,
    pub votes: VoteSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingSettings {
    /// K, the length of every ranked result.
    pub playlist_length: usize,
    /// How many candidates to ask the recommendation service for.
    pub candidate_pool_size: usize,
    pub max_seeds: usize,
    pub zero_seed_policy: ZeroSeedPolicy,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            playlist_length: 10,
            candidate_pool_size: 40,
            max_seeds: 5,
            zero_seed_policy: ZeroSeedPolicy::Fail,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 4000,
            backoff_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub temperature: f32,
    pub timeout: Duration,
    /// Attempts at getting a schema-valid interpretation.
    pub attempts: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_key_command: None,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
            attempts: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderSettings {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.reccobeats.com/v1".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupSettings {
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.spotify.com/v1".to_string(),
            access_token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoteSettings {
    /// JSON lines file; votes are only logged when unset.
    pub path: Option<PathBuf>,
    pub max_pending_comparisons: usize,
}

impl Default for VoteSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_pending_comparisons: 1000,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        Self::resolve_with_env(cli, file_config, |name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::resolve`], reading secrets through `env`.
    pub fn resolve_with_env<F>(cli: &CliConfig, file_config: Option<FileConfig>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file_config.unwrap_or_default();

        let catalog_path = file
            .catalog_path
            .map(PathBuf::from)
            .or_else(|| cli.catalog_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("catalog path must be specified on the command line or in config file")
            })?;

        if !catalog_path.exists() {
            bail!("Catalog file does not exist: {:?}", catalog_path);
        }
        if !catalog_path.is_file() {
            bail!("Catalog path is not a file: {:?}", catalog_path);
        }

        let port = file.port.unwrap_or(cli.port);
        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or(cli.logging_level);

        let ranking_file = file.ranking.unwrap_or_default();
        let default_ranking = RankingSettings::default();
        let zero_seed_policy = match ranking_file.zero_seed_policy {
            Some(s) => match ZeroSeedPolicy::from_str(&s, true) {
                Ok(policy) => policy,
                Err(_) => bail!("Unknown zero_seed_policy '{}'", s),
            },
            None => cli.zero_seed_policy.unwrap_or(default_ranking.zero_seed_policy),
        };
        let ranking = RankingSettings {
            playlist_length: ranking_file
                .playlist_length
                .or(cli.playlist_length)
                .unwrap_or(default_ranking.playlist_length),
            candidate_pool_size: ranking_file
                .candidate_pool_size
                .unwrap_or(default_ranking.candidate_pool_size),
            max_seeds: ranking_file.max_seeds.unwrap_or(default_ranking.max_seeds),
            zero_seed_policy,
        };
        if ranking.playlist_length == 0 {
            bail!("playlist_length must be at least 1");
        }
        if ranking.candidate_pool_size < ranking.playlist_length {
            bail!(
                "candidate_pool_size ({}) must not be smaller than playlist_length ({})",
                ranking.candidate_pool_size,
                ranking.playlist_length
            );
        }

        let retry_file = file.retry.unwrap_or_default();
        let default_retry = RetrySettings::default();
        let retry = RetrySettings {
            max_attempts: retry_file.max_attempts.unwrap_or(default_retry.max_attempts),
            initial_backoff_ms: retry_file
                .initial_backoff_ms
                .unwrap_or(default_retry.initial_backoff_ms),
            max_backoff_ms: retry_file.max_backoff_ms.unwrap_or(default_retry.max_backoff_ms),
            backoff_multiplier: retry_file
                .backoff_multiplier
                .unwrap_or(default_retry.backoff_multiplier),
        };

        let llm_file = file.llm.unwrap_or_default();
        let default_llm = LlmSettings::default();
        let api_key_command = llm_file.api_key_command;
        let api_key = llm_file.api_key.or_else(|| {
            if api_key_command.is_none() {
                env(LLM_API_KEY_ENV)
            } else {
                None
            }
        });
        let llm = LlmSettings {
            base_url: llm_file
                .base_url
                .or_else(|| cli.llm_base_url.clone())
                .unwrap_or(default_llm.base_url),
            model: llm_file
                .model
                .or_else(|| cli.llm_model.clone())
                .unwrap_or(default_llm.model),
            api_key,
            api_key_command,
            temperature: llm_file.temperature.unwrap_or(default_llm.temperature),
            timeout: llm_file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(default_llm.timeout),
            attempts: llm_file.attempts.unwrap_or(default_llm.attempts).max(1),
        };

        let recommender_file = file.recommender.unwrap_or_default();
        let default_recommender = RecommenderSettings::default();
        let recommender = RecommenderSettings {
            base_url: recommender_file
                .base_url
                .or_else(|| cli.recommender_url.clone())
                .unwrap_or(default_recommender.base_url),
            timeout: recommender_file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(default_recommender.timeout),
        };

        let lookup_file = file.lookup.unwrap_or_default();
        let default_lookup = LookupSettings::default();
        let lookup = LookupSettings {
            base_url: lookup_file
                .base_url
                .or_else(|| cli.lookup_url.clone())
                .unwrap_or(default_lookup.base_url),
            access_token: lookup_file.access_token.or_else(|| env(LOOKUP_TOKEN_ENV)),
            timeout: lookup_file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(default_lookup.timeout),
        };

        let votes_file = file.votes.unwrap_or_default();
        let votes = VoteSettings {
            path: votes_file
                .path
                .map(PathBuf::from)
                .or_else(|| cli.votes_path.clone()),
            max_pending_comparisons: votes_file
                .max_pending_comparisons
                .unwrap_or(VoteSettings::default().max_pending_comparisons),
        };

        Ok(Self {
            catalog_path,
            port,
            logging_level,
            check_catalog_values: !cfg!(feature = "no_checks"),
            ranking,
            retry,
            llm,
            recommender,
            lookup,
            votes,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

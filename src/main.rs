use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use promptify::app::{build_harness, Collaborators};
use promptify::config::{AppConfig, CliConfig, FileConfig};
use promptify::pipeline::ZeroSeedPolicy;
use promptify::server::{run_server, RequestsLoggingLevel, ServerConfig};
use promptify::load_catalog;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite catalog file. Can also be set in the config file.
    #[clap(value_parser = parse_path)]
    pub catalog_path: Option<PathBuf>,

    /// Path to a TOML config file. Values there override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3002)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Number of tracks each pipeline returns.
    #[clap(long)]
    pub playlist_length: Option<usize>,

    /// What the external pipeline does when no seed track resolves.
    #[clap(long)]
    pub zero_seed_policy: Option<ZeroSeedPolicy>,

    /// Base URL of the OpenAI-compatible chat completions API.
    #[clap(long)]
    pub llm_base_url: Option<String>,

    #[clap(long)]
    pub llm_model: Option<String>,

    /// Base URL of the recommendation service.
    #[clap(long)]
    pub recommender_url: Option<String>,

    /// Base URL of the music platform search API.
    #[clap(long)]
    pub lookup_url: Option<String>,

    /// Append accepted votes to this JSON lines file. Votes are only logged otherwise.
    #[clap(long, value_parser = parse_path)]
    pub votes_path: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            catalog_path: self.catalog_path.clone(),
            port: self.port,
            logging_level: self.logging_level,
            playlist_length: self.playlist_length,
            zero_seed_policy: self.zero_seed_policy,
            llm_base_url: self.llm_base_url.clone(),
            llm_model: self.llm_model.clone(),
            recommender_url: self.recommender_url.clone(),
            lookup_url: self.lookup_url.clone(),
            votes_path: self.votes_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Loading catalog from {:?}...", config.catalog_path);
    let catalog = load_catalog(&config.catalog_path, config.check_catalog_values)
        .context("Catalog failed to load, refusing to serve")?;

    let collaborators = Collaborators::from_config(&config)?;
    let harness = Arc::new(build_harness(&config, catalog.clone(), collaborators));

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level,
        port: config.port,
    };
    info!("Ready to serve at port {}!", config.port);
    run_server(server_config, catalog, harness).await
}

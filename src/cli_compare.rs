use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{CompletionType, Config, Editor};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use promptify::app::{build_harness, Collaborators};
use promptify::config::{AppConfig, CliConfig, FileConfig};
use promptify::harness::{Comparison, ComparisonHarness, ComparisonOutcome, PresentedOption};
use promptify::load_catalog;
use promptify::votes::VoteChoice;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s).canonicalize()?;
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Interactive blind comparison: type a prompt, read both playlists, vote.
#[derive(Parser, Debug)]
struct CliArgs {
    #[clap(value_parser = parse_path)]
    pub catalog_path: Option<PathBuf>,

    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Show which pipeline produced each option after voting.
    #[clap(long)]
    pub reveal: bool,
}

fn print_option(option: &Option<PresentedOption>, name: &str) {
    match option {
        Some(option) => {
            println!("{} option:", name);
            for (position, track_id) in option.track_ids.iter().enumerate() {
                println!("  {:>2}. https://open.spotify.com/track/{}", position + 1, track_id);
            }
        }
        None => println!("{} option: unavailable", name),
    }
}

fn print_comparison(comparison: &Comparison) {
    println!();
    print_option(&comparison.first, "First");
    println!();
    print_option(&comparison.second, "Second");
    println!();
    match &comparison.outcome {
        ComparisonOutcome::Complete => {}
        ComparisonOutcome::Degraded { reason, .. } => println!("One option failed: {}", reason),
        ComparisonOutcome::TotalFailure {
            first_reason,
            second_reason,
        } => {
            println!("First option failed: {}", first_reason);
            println!("Second option failed: {}", second_reason);
        }
    }
}

fn parse_choice(input: &str) -> Option<VoteChoice> {
    match input.trim().to_lowercase().as_str() {
        "1" | "first" => Some(VoteChoice::FirstOption),
        "2" | "second" => Some(VoteChoice::SecondOption),
        "t" | "tie" => Some(VoteChoice::Tie),
        _ => None,
    }
}

const PROMPT: &str = "playlist> ";
const VOTE_PROMPT: &str = "vote [1/2/t, empty to skip]> ";

type LineEditor = Editor<(), FileHistory>;

fn vote(
    runtime: &Runtime,
    rl: &mut LineEditor,
    harness: &ComparisonHarness,
    comparison: &Comparison,
    reveal: bool,
) -> Result<()> {
    println!("Which is better?");
    loop {
        let line = match rl.readline(VOTE_PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            return Ok(());
        }
        let Some(choice) = parse_choice(&line) else {
            println!("Could not understand \"{}\".", line.trim());
            continue;
        };

        match runtime.block_on(harness.record_vote(comparison.id, choice)) {
            Ok(record) => {
                println!("Vote recorded.");
                if reveal {
                    println!(
                        "First was {}, second was {}.",
                        record.assignment.first, record.assignment.second
                    );
                }
            }
            Err(err) => println!("Vote not recorded: {}", err),
        }
        return Ok(());
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let runtime = Runtime::new()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = cli_args.config.as_deref().map(FileConfig::load).transpose()?;
    let cli_config = CliConfig {
        catalog_path: cli_args.catalog_path.clone(),
        ..CliConfig::default()
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    println!("Cli Compare loading catalog at {}...", config.catalog_path.display());
    let catalog = load_catalog(&config.catalog_path, config.check_catalog_values)
        .context("Could not load catalog")?;
    let harness = build_harness(&config, catalog.clone(), Collaborators::from_config(&config)?);
    println!("Done! {} tracks in the catalog.", catalog.row_count());

    let editor_config = Config::builder()
        .completion_type(CompletionType::List)
        .build();
    let mut rl = LineEditor::with_config(editor_config)?;

    println!("Describe the playlist you want, CTRL-D to exit.");
    loop {
        let readline = rl.readline(PROMPT);
        let prompt = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        };
        let prompt = prompt.trim();
        if prompt.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(prompt);

        println!("Running both pipelines...");
        let comparison = runtime.block_on(harness.compare(prompt));
        print_comparison(&comparison);
        if comparison.accepts_votes() {
            vote(&runtime, &mut rl, &harness, &comparison, cli_args.reveal)?;
        }
    }
    Ok(())
}

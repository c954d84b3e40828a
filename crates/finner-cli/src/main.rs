//! FinNER CLI - Command-line interface
//!
//! Usage:
//!   finner extract <text>
//!   finner evaluate [--corpus <file>] [--labeler remote|gazetteer]
//!   finner corpus [--output <file>]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use finner_core::{AppConfig, LoggingConfig, SequenceLabeler};
use finner_extractor::{
    builtin_corpus, create_labeler, load_corpus, GazetteerLabeler, Scorer, SpanExtractor,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "finner")]
#[command(about = "Financial document entity extraction CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables take precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract amounts, dates, and organizations from text
    Extract {
        /// Document text
        text: String,
    },
    /// Score extraction against a labelled corpus
    Evaluate {
        /// JSON corpus file (defaults to the built-in test set)
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Which sequence labeler to use
        #[arg(long, value_enum, default_value_t = LabelerChoice::Remote)]
        labeler: LabelerChoice,

        /// Documents labeled concurrently
        #[arg(long)]
        concurrency: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the built-in corpus as JSON
    Corpus {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LabelerChoice {
    /// The configured model endpoint
    Remote,
    /// Recognizes exactly the corpus's expected organizations and dates
    Gazetteer,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("finner_extractor={}", logging.level).into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Extract { text } => {
            let extractor = SpanExtractor::new(create_labeler(&config.model)?);
            let result = extractor.extract(&text).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Evaluate {
            corpus,
            labeler,
            concurrency,
            json,
        } => {
            let examples = match corpus {
                Some(path) => load_corpus(&path)?,
                None => builtin_corpus(),
            };

            let labeler: Arc<dyn SequenceLabeler> = match labeler {
                LabelerChoice::Remote => create_labeler(&config.model)?,
                LabelerChoice::Gazetteer => Arc::new(GazetteerLabeler::from_corpus(&examples)),
            };
            let extractor = SpanExtractor::new(labeler);
            let scorer = Scorer::new()
                .with_concurrency(concurrency.unwrap_or(config.evaluation.concurrency));

            let report = scorer.evaluate(&extractor, &examples).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }
        Commands::Corpus { output } => {
            let content = serde_json::to_string_pretty(&builtin_corpus())?;
            match output {
                Some(path) => std::fs::write(&path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{content}"),
            }
        }
    }

    Ok(())
}

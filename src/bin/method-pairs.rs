use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use method_pairs::{run_corpus, supported_languages, ExtractionConfig, PairExtractor, RevisionLayout};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Extract before/after method pairs from two revisions of a source file", long_about = None)]
struct Cli {
    /// Log progress at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the method pairs of one root directory
    Extract {
        /// Directory holding the previous and updated revision files
        root: PathBuf,

        #[command(flatten)]
        options: ExtractOptions,
    },

    /// Extract every root found under a dataset directory
    Corpus {
        /// Directory searched recursively for revision roots
        dataset: PathBuf,

        #[command(flatten)]
        options: ExtractOptions,

        /// Write the JSON summary here instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List languages with method extraction support
    Languages,
}

#[derive(Args)]
struct ExtractOptions {
    /// Revision file extension (prev.<ext>, updated.<ext>)
    #[arg(long)]
    ext: Option<String>,

    /// Directory created under each root for the pairs
    #[arg(long)]
    output_dir: Option<String>,

    /// Force a grammar instead of detecting it from the extension
    #[arg(long)]
    language: Option<String>,

    /// Drop pairs whose previous and updated text are identical
    #[arg(long)]
    skip_unchanged: bool,

    /// Keep going when a revision has syntax errors
    #[arg(long)]
    allow_syntax_errors: bool,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ExtractOptions {
    fn into_config(self) -> Result<ExtractionConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractionConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ExtractionConfig::default(),
        };

        if let Some(ext) = &self.ext {
            let defaults = RevisionLayout::for_extension(ext.trim_start_matches('.'));
            config.layout.previous_file = defaults.previous_file;
            config.layout.updated_file = defaults.updated_file;
        }
        if let Some(output_dir) = self.output_dir {
            config.layout.output_dir = output_dir;
        }
        if self.language.is_some() {
            config.language = self.language;
        }
        config.skip_unchanged |= self.skip_unchanged;
        config.allow_syntax_errors |= self.allow_syntax_errors;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn write_json(value: &impl serde::Serialize, destination: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    match destination {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract { root, options } => {
            let extractor = PairExtractor::new(options.into_config()?);
            let report = extractor
                .run(&root)
                .with_context(|| format!("Failed to extract method pairs from {}", root.display()))?;
            write_json(&report, None)?;
        }
        Commands::Corpus {
            dataset,
            options,
            report,
        } => {
            let extractor = PairExtractor::new(options.into_config()?);
            let summary = run_corpus(&extractor, &dataset)
                .with_context(|| format!("Failed to process dataset {}", dataset.display()))?;
            tracing::info!(
                "{} of {} roots succeeded, {} method pairs",
                summary.succeeded,
                summary.roots,
                summary.pairs
            );
            write_json(&summary, report.as_deref())?;
        }
        Commands::Languages => {
            for language in supported_languages() {
                println!("{}", language);
            }
        }
    }

    Ok(())
}

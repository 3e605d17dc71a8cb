pub mod batch;
pub mod config;
pub mod extract;
pub mod normalize;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use legal_ner_core::{MergeKey, Pipeline, PipelineConfig, StaticTagger};

#[derive(Parser)]
#[command(
    name = "legal-ner",
    about = "Extract and reconcile entities from legal-contract text",
    version
)]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/legal-ner/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract entities from a plain-text document and print the report
    Extract {
        /// Text file, or - for stdin
        file: String,
        /// JSON array of [text, TYPE] pairs replayed as tagger output
        #[arg(long)]
        tagger_fixture: Option<PathBuf>,
        /// Merge key: text or text-and-type
        #[arg(long)]
        merge_key: Option<String>,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
        /// Include the normalized text and every intermediate entity list
        #[arg(long)]
        details: bool,
    },
    /// Process several documents, reporting failures per document
    Batch {
        /// Text files
        #[arg(required = true)]
        files: Vec<String>,
        /// JSON array of [text, TYPE] pairs replayed as tagger output
        #[arg(long)]
        tagger_fixture: Option<PathBuf>,
        /// Merge key: text or text-and-type
        #[arg(long)]
        merge_key: Option<String>,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },
    /// Print the normalized form of a document
    Normalize {
        /// Text file, or - for stdin
        file: String,
    },
    /// Print the effective configuration
    Config,
}

/// Explicit path, else the per-user config file if present, else defaults.
/// Environment overrides apply last.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading user config");
                PipelineConfig::from_json_file(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            }
            None => PipelineConfig::default(),
        },
    };

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("legal-ner").join("config.json"))
}

pub fn apply_merge_key(mut config: PipelineConfig, merge_key: Option<&str>) -> Result<PipelineConfig> {
    if let Some(key) = merge_key {
        config.merge_key = key.parse::<MergeKey>()?;
    }
    Ok(config)
}

pub fn build_pipeline(config: PipelineConfig, tagger_fixture: Option<&Path>) -> Result<Pipeline> {
    let pipeline = Pipeline::new(config);
    match tagger_fixture {
        Some(path) => {
            let tagger = StaticTagger::from_json_file(path)
                .with_context(|| format!("Failed to load tagger fixture {}", path.display()))?;
            Ok(pipeline.with_tagger(Box::new(tagger)))
        }
        None => Ok(pipeline),
    }
}

/// Reads a document; `-` reads stdin.
pub fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))
}

pub fn source_id(file: &str) -> String {
    if file == "-" {
        return "stdin".to_string();
    }
    Path::new(file).file_name().map_or_else(
        || file.to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

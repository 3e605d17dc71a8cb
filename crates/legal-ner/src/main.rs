mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref())?;

    dispatch(cli.command, config).await
}

async fn dispatch(command: Commands, config: legal_ner_core::PipelineConfig) -> Result<()> {
    match command {
        Commands::Extract {
            file,
            tagger_fixture,
            merge_key,
            pretty,
            details,
        } => {
            let config = cli::apply_merge_key(config, merge_key.as_deref())?;
            cli::extract::run(config, &file, tagger_fixture.as_deref(), pretty, details).await
        }
        Commands::Batch {
            files,
            tagger_fixture,
            merge_key,
            pretty,
        } => {
            let config = cli::apply_merge_key(config, merge_key.as_deref())?;
            cli::batch::run(config, &files, tagger_fixture.as_deref(), pretty).await
        }
        Commands::Normalize { file } => cli::normalize::run(&file),
        Commands::Config => cli::config::run(&config),
    }
}

use std::path::Path;

use anyhow::Result;
use console::style;
use legal_ner_core::{BatchInput, BatchItem, PipelineConfig};

use super::{build_pipeline, read_input, source_id};

pub async fn run(
    config: PipelineConfig,
    files: &[String],
    tagger_fixture: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let items: Vec<BatchInput> = files
        .iter()
        .map(|file| match read_input(file) {
            Ok(text) => BatchInput::new(source_id(file), text),
            Err(e) => BatchInput::unreadable(source_id(file), format!("{e:#}")),
        })
        .collect();

    let pipeline = build_pipeline(config, tagger_fixture)?;
    let report = pipeline.run_batch(&items).await?;

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    for item in &report.results {
        if let BatchItem::Failed { index, error } = item {
            eprintln!(
                "{} {}: {error}",
                style("✗").red(),
                items[*index].source_id
            );
        }
    }
    eprintln!(
        "{} {} succeeded, {} failed",
        style("●").green(),
        report.success_count(),
        report.failure_count()
    );

    Ok(())
}

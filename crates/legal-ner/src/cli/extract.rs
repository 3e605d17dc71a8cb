use std::path::Path;

use anyhow::Result;
use console::style;
use legal_ner_core::{PipelineConfig, ProcessingMethod};

use super::{build_pipeline, read_input, source_id};

pub async fn run(
    config: PipelineConfig,
    file: &str,
    tagger_fixture: Option<&Path>,
    pretty: bool,
    details: bool,
) -> Result<()> {
    let text = read_input(file)?;
    let pipeline = build_pipeline(config, tagger_fixture)?;

    let source = source_id(file);
    let report = if details {
        pipeline.extract_detailed(&source, &text).await
    } else {
        pipeline.extract(&source, &text).await
    };
    println!("{}", report.to_json(pretty)?);

    let marker = match report.processing_method {
        ProcessingMethod::RulesOnlyFallback => style("●").yellow(),
        _ => style("●").green(),
    };
    eprintln!(
        "{marker} {}: {} entities from {} candidates ({})",
        report.source_identifier,
        report.total_entities,
        report.raw_entities_count,
        report.processing_method
    );
    if let Some(error) = &report.tagger_error {
        eprintln!("  {}", style(error).dim());
    }

    Ok(())
}

use anyhow::Result;
use legal_ner_core::PipelineConfig;

pub fn run(config: &PipelineConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

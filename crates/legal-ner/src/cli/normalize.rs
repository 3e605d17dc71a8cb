use anyhow::Result;

use super::read_input;

pub fn run(file: &str) -> Result<()> {
    let text = read_input(file)?;
    println!("{}", legal_ner_core::normalize(&text));
    Ok(())
}

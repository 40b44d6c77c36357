//! `macrocoach repair`: the offline half of a pipeline attempt, run over a
//! saved raw response.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use macrocoach_core::TypedRecord;
use macrocoach_core::pipeline::parse_and_check;
use macrocoach_core::sanitize::sanitize;
use macrocoach_model::ResponseCategory;

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

pub fn repair_text(raw: &str, category: ResponseCategory) -> Result<TypedRecord> {
    let cleaned = sanitize(raw);
    parse_and_check(&cleaned, category)
        .with_context(|| format!("response could not be repaired as a {category}"))
}

pub fn run_repair(input: &Path, category: ResponseCategory, cleaned: bool) -> Result<()> {
    let raw = read_input(input)?;
    if cleaned {
        println!("{}", sanitize(&raw));
        return Ok(());
    }
    let record = repair_text(&raw, category)?;
    crate::step_cmds::print_json(&record)
}

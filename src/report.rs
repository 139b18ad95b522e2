use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::model::{BlockAction, BlockPlan};

pub const NOTHING_TO_BLOCK: &str =
    "No connections need to be blocked based on the input binary string.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One easyrule command per line
    #[default]
    Text,
    /// A single JSON document with the commands and skipped positions
    Json,
    /// position,address,command rows
    Csv,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    interface: &'a str,
    block_action: BlockAction,
    commands: Vec<String>,
    missing_positions: &'a [usize],
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    position: usize,
    address: &'a str,
    command: String,
}

pub fn write_plan<W: Write>(
    plan: &BlockPlan,
    interface: &str,
    format: OutputFormat,
    mut out: W,
) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(plan, &mut out)?,
        OutputFormat::Json => write_json(plan, interface, Utc::now(), &mut out)?,
        OutputFormat::Csv => write_csv(plan, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

fn write_text<W: Write>(plan: &BlockPlan, mut out: W) -> Result<()> {
    if plan.is_empty() {
        writeln!(out, "{}", NOTHING_TO_BLOCK)?;
    }
    for command in &plan.commands {
        writeln!(out, "{}", command)?;
    }
    Ok(())
}

fn write_json<W: Write>(
    plan: &BlockPlan,
    interface: &str,
    generated_at: DateTime<Utc>,
    mut out: W,
) -> Result<()> {
    let report = JsonReport {
        generated_at,
        interface,
        block_action: plan.action,
        commands: plan.command_lines(),
        missing_positions: &plan.missing_positions,
    };
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn write_csv<W: Write>(plan: &BlockPlan, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    if plan.is_empty() {
        wtr.write_record(["position", "address", "command"])?;
    }
    for command in &plan.commands {
        wtr.serialize(CsvRow {
            position: command.position,
            address: &command.address,
            command: command.to_string(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

use crate::services::affect::find_affected_fuzzers;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fuzzdelta",
    about = "Finds fuzzers whose target public APIs are affected by source changes",
    version,
    long_about = None
)]
#[cfg_attr(test, derive(Debug))]
pub struct Cli {
    /// Fuzzer-generation report (fuzzGen_Report.json)
    pub report: PathBuf,

    /// Directory tree with snapshot 1 AST dumps (*.ast.json)
    pub ast_dir1: PathBuf,

    /// Directory tree with snapshot 2 AST dumps (*.ast.json)
    pub ast_dir2: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output (info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug output (debug level)
    #[arg(long)]
    pub debug: bool,

    /// Enable trace output (trace level)
    #[arg(long)]
    pub trace: bool,

    /// Custom trace filter (overrides other flags)
    /// Example: --trace-filter="fuzzdelta=debug"
    #[arg(long, env = "RUST_LOG")]
    pub trace_filter: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One fuzzer label per line
    Text,
    /// JSON array of fuzzer labels
    Json,
}

pub fn run(cli: &Cli) -> Result<()> {
    let affected = find_affected_fuzzers(&cli.report, &cli.ast_dir1, &cli.ast_dir2)?;

    match cli.format {
        OutputFormat::Text => {
            for fuzzer in &affected {
                println!("{fuzzer}");
            }
        }
        OutputFormat::Json => {
            let labels: Vec<&String> = affected.iter().collect();
            println!("{}", serde_json::to_string_pretty(&labels)?);
        }
    }
    Ok(())
}

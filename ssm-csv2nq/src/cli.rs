use clap::Parser;
use std::path::PathBuf;

/// Convert SSM domain-model CSV tables to N-Quads
#[derive(Parser, Debug)]
#[command(name = "csv2nq")]
pub struct Cli {
    /// Directory containing the domain model CSV files
    #[arg(short = 'i', long = "input", value_name = "DIR", required_unless_present = "tool_version")]
    pub input: Option<PathBuf>,

    /// N-Quads output file
    #[arg(short = 'o', long = "output", value_name = "FILE", required_unless_present = "tool_version")]
    pub output: Option<PathBuf>,

    /// Also write a JSON icon mapping file
    #[arg(short = 'm', long = "mapping", value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Write debug-level diagnostics to this file
    #[arg(short = 'l', long = "log", value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Make every control, misbehaviour and trustworthiness attribute
    /// visible, and drop construction state flags
    #[arg(short = 'u', long)]
    pub unfiltered: bool,

    /// Write population min/max variants (population models only)
    #[arg(short = 'e', long)]
    pub expanded: bool,

    /// Version info for the ontology header (defaults to the current local time)
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pub model_version: Option<String>,

    /// Replace the last path segment of the domain graph IRI
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: Option<String>,

    /// Replace the domain model label
    #[arg(short = 'b', long, value_name = "LABEL")]
    pub label: Option<String>,

    /// Suppress console diagnostics
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long)]
    pub no_color: bool,

    /// Print the csv2nq version and exit
    #[arg(short = 'V', long = "tool-version")]
    pub tool_version: bool,
}

impl Cli {
    pub fn color_enabled(&self) -> bool {
        !(self.no_color || std::env::var_os("NO_COLOR").is_some())
    }
}

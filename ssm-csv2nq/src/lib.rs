//! csv2nq CLI library.
//!
//! Turns parsed command-line arguments into a [`ConvertJob`] and runs it.
//! The binary adds tracing setup and exit-code handling on top.

pub mod cli;
pub mod error;

use cli::Cli;
use error::{CliError, CliResult};
use ssm_domain_model::{ConvertJob, ConvertOptions, ConvertSummary};

/// Format of the default `owl:versionInfo`: local time to the second
pub const VERSION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn default_version() -> String {
    chrono::Local::now().format(VERSION_FORMAT).to_string()
}

/// Validate paths and build the conversion job
pub fn job(cli: &Cli) -> CliResult<ConvertJob> {
    let (Some(input), Some(output)) = (&cli.input, &cli.output) else {
        return Err(CliError::Config(
            "both --input and --output are required".to_string(),
        ));
    };
    if !input.is_dir() {
        return Err(CliError::Config(format!(
            "input directory {} does not exist or is not a directory",
            input.display()
        )));
    }

    Ok(ConvertJob {
        input_dir: input.clone(),
        output: output.clone(),
        mapping: cli.mapping.clone(),
        options: ConvertOptions {
            unfiltered: cli.unfiltered,
            expanded: cli.expanded,
            version: cli.model_version.clone().unwrap_or_else(default_version),
            name: cli.name.clone(),
            label: cli.label.clone(),
        },
    })
}

/// Run the conversion described by `cli`
pub fn run(cli: &Cli) -> CliResult<ConvertSummary> {
    let job = job(cli)?;
    tracing::debug!(options = ?job.options, "conversion options");
    let summary = ssm_domain_model::run(&job)?;
    tracing::info!(
        quads = summary.quads,
        assets = summary.assets,
        threats = summary.threats,
        nodes = summary.nodes,
        role_links = summary.role_links,
        expanded = summary.expanded,
        "conversion complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_missing_input_dir_is_config_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let cli = Cli::parse_from([
            "csv2nq",
            "-i",
            missing.to_str().unwrap(),
            "-o",
            "out.nq",
        ]);
        let err = job(&cli).unwrap_err();
        assert_eq!(err.exit_code(), error::EXIT_USAGE);
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_job_options() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["csv2nq", "-i", input, "-o", "out.nq", "-u", "-n", "net"]);
        let job = job(&cli).unwrap();
        assert!(job.options.unfiltered);
        assert!(!job.options.expanded);
        assert_eq!(job.options.name.as_deref(), Some("net"));
        // 2024-01-01T00:00:00
        assert_eq!(job.options.version.len(), 19);
        assert_eq!(&job.options.version[10..11], "T");
    }
}

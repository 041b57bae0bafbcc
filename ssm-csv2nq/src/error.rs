use colored::Colorize;
use ssm_domain_model::ConvertError;
use std::fmt;
use std::process;

/// Exit codes for the CLI.
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Bad arguments: missing input directory, unwritable log file.
    Config(String),
    /// Loading, building or writing the domain model failed.
    Convert(ConvertError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => EXIT_USAGE,
            CliError::Convert(_) => EXIT_ERROR,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Convert(e) => write!(f, "{} {e}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<ConvertError> for CliError {
    fn from(e: ConvertError) -> Self {
        CliError::Convert(e)
    }
}

/// Print error and exit with the appropriate code.
///
/// The console gets the message exactly once, from `eprintln!`; the tracing
/// event sits at debug level so only the log file records it.
pub fn exit_with_error(err: CliError) -> ! {
    match &err {
        CliError::Config(msg) => tracing::debug!(error = %msg, "invalid configuration"),
        CliError::Convert(e) => tracing::debug!(error = %e, "conversion failed"),
    }
    eprintln!("{err}");
    process::exit(err.exit_code())
}

pub type CliResult<T> = std::result::Result<T, CliError>;

//! Command-line interface for the stderr-guard demo binary.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Number of log lines the worker writes by default.
pub const DEFAULT_TICKS: u32 = 3;

/// Command-line arguments.
#[derive(Debug, Clone)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log file (overrides config file).
    pub log_file: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Keep stderr on the console even when logging to a file.
    pub no_capture: bool,
    /// Number of log lines the worker writes before finishing.
    pub ticks: u32,
    /// Make the worker panic with this message.
    pub panic: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: None,
            log_file: None,
            log_level: None,
            no_capture: false,
            ticks: DEFAULT_TICKS,
            panic: None,
            version: false,
            help: false,
        }
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('f') | Long("log-file") => {
                result.log_file = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Long("no-capture") => {
                result.no_capture = true;
            }
            Short('t') | Long("ticks") => {
                let value: String = parser.value()?.parse()?;
                result.ticks = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("ticks", value))?;
            }
            Long("panic") => {
                result.panic = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"stderr-guard {version}
Keep fatal panics visible on the console while stderr goes to a log file

USAGE:
    stderr-guard [OPTIONS]

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -f, --log-file <FILE>   Write logs (and captured stderr) to FILE
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
        --no-capture        Leave stderr on the console when logging to a file
    -t, --ticks <N>         Log lines written by the worker [default: 3]
        --panic <MSG>       Make the worker panic with MSG
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    STDERR_GUARD_LOG_LEVEL       Log level (overrides config)
    STDERR_GUARD_LOG_FILE        Log file (overrides config)
    STDERR_GUARD_CAPTURE_STDERR  0/false disables stderr capture
    RUST_LOG                     Alternative log level setting

EXAMPLES:
    # Log to a file; the panic text still reaches this terminal
    stderr-guard -f /tmp/server.log --panic boom

    # Console logging only
    stderr-guard -l debug
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("stderr-guard {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

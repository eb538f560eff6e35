//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use cartograph_core::ExportFormat;
use cartograph_models::ReportKind;

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// Cartograph - map a codebase as a live architecture graph
#[derive(Parser, Debug)]
#[command(name = "cartograph")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Analysis service endpoint (overrides CARTOGRAPH_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Map a repository's architecture
    Analyze {
        /// Local directory or repository URL
        #[arg(required = true)]
        target: String,

        #[command(flatten)]
        scan: ScanArgs,

        /// Export the finished graph
        #[arg(long, value_enum)]
        export: Option<ExportChoice>,

        /// Export destination (default: a timestamped file in the exports directory)
        #[arg(short, long, requires = "export")]
        output: Option<PathBuf>,

        /// Print the finished graph without revealing it node by node
        #[arg(long)]
        no_reveal: bool,
    },

    /// Ask a question about a repository
    Ask {
        /// Local directory or repository URL
        #[arg(required = true)]
        target: String,

        /// Question to ask
        #[arg(required = true)]
        question: String,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Run a specialised audit of a repository
    Report {
        /// Report to produce
        #[arg(value_enum)]
        kind: ReportChoice,

        /// Local directory or repository URL
        #[arg(required = true)]
        target: String,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// List the files a scan would send, without calling the model
    Preview {
        /// Local directory or repository URL
        #[arg(required = true)]
        target: String,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Check that the analysis service is reachable
    Health,
}

/// Options shared by every scanning command.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ScanArgs {
    /// Maximum number of files to scan
    #[arg(long)]
    pub max_files: Option<u32>,

    /// Include test files
    #[arg(long)]
    pub include_tests: bool,

    /// Maximum directory depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Replay a captured event stream instead of calling the service
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,
}

/// Specialised report kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportChoice {
    Security,
    Onboarding,
    Performance,
}

impl From<ReportChoice> for ReportKind {
    fn from(choice: ReportChoice) -> Self {
        match choice {
            ReportChoice::Security => ReportKind::Security,
            ReportChoice::Onboarding => ReportKind::Onboarding,
            ReportChoice::Performance => ReportKind::Performance,
        }
    }
}

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportChoice {
    Json,
    #[value(alias = "mmd")]
    Mermaid,
}

impl From<ExportChoice> for ExportFormat {
    fn from(choice: ExportChoice) -> Self {
        match choice {
            ExportChoice::Json => ExportFormat::Json,
            ExportChoice::Mermaid => ExportFormat::Mermaid,
        }
    }
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

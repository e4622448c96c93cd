//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use skilltag_domain::{AttributionPolicy, PaperId};
use std::path::PathBuf;

/// Skilltag - Tag research papers with skills from a controlled taxonomy.
#[derive(Debug, Parser)]
#[command(name = "skilltag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database path (overrides the config file)
    #[arg(long, env = "SKILLTAG_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, env = "SKILLTAG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Log level implied by the `-v` count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs and counts only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract skills for the papers in the database
    Extract(ExtractArgs),

    /// Import papers from a JSON file
    Import(ImportArgs),

    /// Browse and manage papers
    Papers(PapersArgs),

    /// Show the skills extracted for a paper
    Skills(SkillsArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Skill taxonomy file (.csv or .json)
    pub taxonomy: PathBuf,

    /// Embedding model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Number of skills to record per paper
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Only papers with an author containing this text (case-insensitive)
    #[arg(short, long)]
    pub author: Option<String>,

    /// Only papers published in or after this year
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Only papers published in or before this year
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Process papers that already have results for this model
    #[arg(long)]
    pub reprocess: bool,

    /// Which name to record as the author of each result
    #[arg(long, value_enum)]
    pub attribution: Option<AttributionArg>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// JSON file containing an array of papers ("-" for stdin)
    pub file: PathBuf,
}

/// Arguments for paper management.
#[derive(Debug, Parser)]
pub struct PapersArgs {
    #[command(subcommand)]
    pub action: PapersAction,
}

/// Paper management actions.
#[derive(Debug, Subcommand)]
pub enum PapersAction {
    /// List papers ordered by title
    List {
        /// Maximum number of papers
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Number of papers to skip
        #[arg(short, long, default_value = "0")]
        offset: usize,
    },

    /// List papers by author name
    ByAuthor {
        /// Author name, or part of it
        name: String,
    },

    /// Show one paper
    Show {
        /// Paper id
        id: PaperId,
    },

    /// Delete a paper and its extracted skills
    Delete {
        /// Paper id
        id: PaperId,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Arguments for the skills command.
#[derive(Debug, Parser)]
pub struct SkillsArgs {
    /// Paper id
    pub paper_id: PaperId,

    /// Only results produced by this model
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Attribution argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AttributionArg {
    /// Record the author filter text (empty when unfiltered)
    FilterValue,
    /// Record the paper's first matching author
    PaperAuthor,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<AttributionArg> for AttributionPolicy {
    fn from(arg: AttributionArg) -> Self {
        match arg {
            AttributionArg::FilterValue => AttributionPolicy::FilterValue,
            AttributionArg::PaperAuthor => AttributionPolicy::PaperAuthor,
        }
    }
}

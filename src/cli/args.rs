//! Command-line argument structures for scrollback

use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct AddArgs {
    /// Lines to append, oldest first
    #[arg(value_name = "LINE", required = true)]
    pub lines: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Show only the last N entries
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Prefix each entry with its position in the history
    #[arg(long)]
    pub numbered: bool,
}

#[derive(Args)]
pub struct PrefixArgs {
    /// Prefix the entries must start with
    #[arg(value_name = "PREFIX", default_value = "")]
    pub prefix: String,

    /// Maximum number of results (defaults to search.max_results)
    #[arg(short = 'L', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Substring to search for
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// Maximum number of results (defaults to search.max_results)
    #[arg(short = 'L', long)]
    pub limit: Option<usize>,

    /// Show the byte offset of each match
    #[arg(short = 'O', long)]
    pub offsets: bool,

    /// Disable match highlighting
    #[arg(long)]
    pub no_highlight: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// File to read history lines from
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (stdout if not specified)
    #[arg(short = 'O', long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Clear without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Initialize configuration file with defaults
    #[arg(long)]
    pub init: bool,

    /// Validate configuration file
    #[arg(long)]
    pub validate: bool,
}

//! Command-line interface module for scrollback
//!
//! This module is organized into submodules:
//! - `args`: Command-line argument structures
//! - `handlers`: Command handler implementations

mod args;
mod handlers;

pub use args::*;
use handlers::*;

use crate::backend::ManagedHistory;
use crate::config::Config;
use crate::database::SqliteHistory;
use crate::error::Result;
use crate::history::MemoryHistory;
use crate::search::SearchEngine;
use clap::{Parser, Subcommand};
use std::cell::Cell;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// scrollback - bounded scrollback history for interactive line editors
#[derive(Parser)]
#[command(name = "scrollback")]
#[command(about = "Inspect and maintain scrollback history files")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// History file path (overrides the configuration)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Use the SQLite backend (default: auto-detect)
    #[arg(long, global = true)]
    pub db: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Append lines to history
    Add(AddArgs),
    /// List history entries
    List(ListArgs),
    /// Find entries starting with a prefix
    Prefix(PrefixArgs),
    /// Find entries containing a pattern
    Search(SearchArgs),
    /// Restore history lines from a file
    Import(ImportArgs),
    /// Write history to a file or stdout
    Export(ExportArgs),
    /// Clear history
    Clear(ClearArgs),
    /// Show configuration
    Config(ConfigArgs),
    /// Show backend status
    Status,
}

/// History backend type
pub(crate) enum HistoryBackend {
    /// In-memory history loaded from and saved to a plain text file
    ///
    /// `partial` is set when the file could not be read to the end; the
    /// first save then keeps the unread file as a backup.
    File {
        history: MemoryHistory,
        path: PathBuf,
        partial: Cell<bool>,
    },
    /// SQLite database, written through on every change
    Database { history: SqliteHistory, path: PathBuf },
}

impl HistoryBackend {
    /// Open the file backend, restoring whatever the file holds
    ///
    /// A history file that cannot be fully read still yields a session with
    /// the lines read before the bad one. Saving such a session moves the
    /// original file to [`backup_path`] before it is rewritten.
    fn open_file(config: &Config) -> Result<Self> {
        let path = config.history_file.clone();
        let history = MemoryHistory::with_capacity(config.capacity)
            .with_max_line_length(config.max_line_length);
        let mut partial = false;

        if path.exists() {
            let file = File::open(&path)?;
            if let Err(e) = history.restore(file) {
                partial = true;
                tracing::warn!(
                    path = %path.display(),
                    loaded = e.processed(),
                    backup = %backup_path(&path).display(),
                    "history partially loaded: {e}; lines after the error are \
                     dropped from the session and the full file is backed up on save"
                );
            }
        }

        Ok(HistoryBackend::File {
            history,
            path,
            partial: Cell::new(partial),
        })
    }

    fn open_database(config: &Config) -> Result<Self> {
        let path = config.database_path();
        let history = SqliteHistory::open(&path)?
            .with_capacity(config.capacity)
            .with_max_line_length(config.max_line_length);
        Ok(HistoryBackend::Database { history, path })
    }

    pub(crate) fn provider(&self) -> &dyn ManagedHistory {
        match self {
            HistoryBackend::File { history, .. } => history,
            HistoryBackend::Database { history, .. } => history,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            HistoryBackend::File { .. } => "file",
            HistoryBackend::Database { .. } => "sqlite",
        }
    }

    pub(crate) fn path(&self) -> &Path {
        match self {
            HistoryBackend::File { path, .. } | HistoryBackend::Database { path, .. } => path,
        }
    }

    /// Write the history back to its file
    ///
    /// The database backend writes through, so there is nothing to save.
    pub(crate) fn save(&self) -> Result<()> {
        let HistoryBackend::File {
            history,
            path,
            partial,
        } = self
        else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if partial.get() {
            let backup = backup_path(path);
            fs::copy(path, &backup)?;
            partial.set(false);
            tracing::warn!(
                path = %path.display(),
                backup = %backup.display(),
                "rewriting partially loaded history; the previous file was kept as a backup"
            );
        }

        let mut writer = BufWriter::new(File::create(path)?);
        let saved = history.persist(&mut writer).and_then(|count| {
            writer.flush()?;
            Ok(count)
        });

        match saved {
            Ok(count) => {
                tracing::debug!(count, path = %path.display(), "history saved");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    written = e.processed(),
                    "history not fully saved: {e}"
                );
                Err(e)
            }
        }
    }
}

/// Where a partially loaded history file is kept before it is rewritten
pub(crate) fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Load the configuration selected by the command line
///
/// `--config` must point at a readable file; otherwise the default location
/// is tried and a missing or broken default falls back to the built-in
/// settings. `--file` overrides the configured history file.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load().unwrap_or_else(|e| {
            tracing::debug!("falling back to default configuration: {e}");
            Config::default()
        })
    };

    if let Some(file) = &cli.file {
        config.history_file = file.clone();
    }

    Ok(config)
}

/// Main CLI application
pub struct CliApp {
    pub config: Config,
    pub(crate) backend: HistoryBackend,
    pub search_engine: SearchEngine,
    pub verbose: bool,
    pub quiet: bool,
}

impl CliApp {
    /// Create a new CLI application, loading the configuration from `cli`
    pub fn new(cli: &Cli) -> Result<Self> {
        Self::with_config(cli, load_config(cli)?)
    }

    /// Create a CLI application around an already loaded configuration
    pub fn with_config(cli: &Cli, config: Config) -> Result<Self> {
        // Auto-detect: use the database if one already exists
        let backend = if cli.db || config.database_path().exists() {
            HistoryBackend::open_database(&config)?
        } else {
            HistoryBackend::open_file(&config)?
        };

        let search_engine = SearchEngine::with_config(&config.search);

        Ok(Self {
            config,
            backend,
            search_engine,
            verbose: cli.verbose,
            quiet: cli.quiet,
        })
    }

    /// Run the CLI application
    pub fn run(&mut self, command: &Commands) -> Result<()> {
        self.verbose_println(&format!(
            "Using {} backend at {}",
            self.backend.name(),
            self.backend.path().display()
        ));

        match command {
            Commands::Add(args) => handle_add(self, args),
            Commands::List(args) => handle_list(self, args),
            Commands::Prefix(args) => handle_prefix(self, args),
            Commands::Search(args) => handle_search(self, args),
            Commands::Import(args) => handle_import(self, args),
            Commands::Export(args) => handle_export(self, args),
            Commands::Clear(args) => handle_clear(self, args),
            Commands::Config(args) => handle_config(self, args),
            Commands::Status => handle_status(self),
        }
    }

    pub(crate) fn provider(&self) -> &dyn ManagedHistory {
        self.backend.provider()
    }

    pub fn verbose_println(&self, message: &str) {
        if self.verbose && !self.quiet {
            eprintln!("[verbose] {}", message);
        }
    }
}

/// Run the parsed command line against `config`
pub fn run(cli: &Cli, config: Config) -> Result<()> {
    let mut app = CliApp::with_config(cli, config)?;
    app.run(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.history_file = dir.join("history");
        config
    }

    #[test]
    fn test_file_backend_round_trip() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let backend = HistoryBackend::open_file(&config).unwrap();
        backend.provider().append_history("make");
        backend.provider().append_history("make test");
        backend.save().unwrap();

        assert_eq!(fs::read_to_string(&config.history_file).unwrap(), "make\nmake test\n");

        let reopened = HistoryBackend::open_file(&config).unwrap();
        assert_eq!(reopened.provider().entries().unwrap(), vec!["make", "make test"]);
        assert_eq!(reopened.name(), "file");
    }

    #[test]
    fn test_file_backend_tolerates_bad_history_file() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        fs::write(&config.history_file, b"good\n\xff\nlost\n").unwrap();

        let backend = HistoryBackend::open_file(&config).unwrap();
        assert_eq!(backend.provider().entries().unwrap(), vec!["good"]);
    }

    #[test]
    fn test_saving_partial_history_keeps_backup() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let original = b"good\n\xff\nlost\n";
        fs::write(&config.history_file, original).unwrap();

        let backend = HistoryBackend::open_file(&config).unwrap();
        backend.provider().append_history("new");
        backend.save().unwrap();

        assert_eq!(fs::read_to_string(&config.history_file).unwrap(), "good\nnew\n");
        let backup = backup_path(&config.history_file);
        assert_eq!(fs::read(&backup).unwrap(), original);

        // Later saves leave the backup alone.
        backend.provider().append_history("newer");
        backend.save().unwrap();
        assert_eq!(fs::read(&backup).unwrap(), original);
    }

    #[test]
    fn test_clean_history_saves_without_backup() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        fs::write(&config.history_file, "a\n").unwrap();

        let backend = HistoryBackend::open_file(&config).unwrap();
        backend.save().unwrap();
        assert!(!backup_path(&config.history_file).exists());
    }

    #[test]
    fn test_load_config_reads_logging_level() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("scrollback.json");
        let mut config = config_in(dir.path());
        config.logging.level = "debug".to_string();
        config.save_to_path(&config_path).unwrap();

        let cli = Cli::parse_from([
            "scrollback",
            "--config",
            config_path.to_str().unwrap(),
            "status",
        ]);
        let loaded = load_config(&cli).unwrap();
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.history_file, config.history_file);
    }

    #[test]
    fn test_database_backend_path() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let backend = HistoryBackend::open_database(&config).unwrap();
        assert_eq!(backend.name(), "sqlite");
        assert_eq!(backend.path(), config.database_path().as_path());
        backend.provider().append_history("ls");
        backend.save().unwrap();
        assert_eq!(backend.provider().len().unwrap(), 1);
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::parse_from(["scrollback", "--db", "search", "git", "-O"]);
        assert!(cli.db);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.pattern, "git");
                assert!(args.offsets);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_clear_confirmation_flag() {
        for flag in ["--yes", "-y"] {
            let cli = Cli::parse_from(["scrollback", "clear", flag]);
            match cli.command {
                Commands::Clear(args) => assert!(args.yes),
                _ => panic!("expected clear command"),
            }
        }

        let cli = Cli::parse_from(["scrollback", "clear"]);
        assert!(matches!(cli.command, Commands::Clear(ClearArgs { yes: false })));
    }
}

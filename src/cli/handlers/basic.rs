//! Basic command handlers for scrollback CLI

use crate::cli::args::*;
use crate::cli::{CliApp, HistoryBackend};
use crate::error::{Error, Result};
use crate::search::{SearchEngine, SearchResult};
use std::io::{self, Write};

pub fn handle_add(app: &mut CliApp, args: &AddArgs) -> Result<()> {
    if let Some(bad) = args.lines.iter().find(|l| l.contains(['\n', '\r'])) {
        return Err(Error::invalid_arguments(format!(
            "history entries cannot span lines: {:?}",
            bad
        )));
    }

    let before = app.provider().len()?;
    for line in &args.lines {
        app.verbose_println(&format!("Appending: {}", line));
        app.provider().append_history(line);
    }
    app.backend.save()?;

    let after = app.provider().len()?;
    app.verbose_println(&format!(
        "History now holds {} entries (was {})",
        after, before
    ));

    Ok(())
}

pub fn handle_list(app: &mut CliApp, args: &ListArgs) -> Result<()> {
    let entries = app.provider().entries()?;
    let skip = args
        .count
        .map_or(0, |count| entries.len().saturating_sub(count));

    for (index, entry) in entries.iter().enumerate().skip(skip) {
        if args.numbered {
            println!("{:>5}  {}", index + 1, entry);
        } else {
            println!("{}", entry);
        }
    }

    Ok(())
}

pub fn handle_prefix(app: &mut CliApp, args: &PrefixArgs) -> Result<()> {
    let found = app.provider().find_by_prefix(&args.prefix);
    let engine = engine_with_limit(&app.search_engine, args.limit);
    let results = engine.prefix_results(found, &args.prefix);

    print_results(&results, false);
    report_count(app, results.len());
    Ok(())
}

pub fn handle_search(app: &mut CliApp, args: &SearchArgs) -> Result<()> {
    if args.pattern.is_empty() {
        return Err(Error::invalid_arguments("search pattern cannot be empty"));
    }

    let (found, positions) = app.provider().find_by_pattern(&args.pattern);
    let mut engine = engine_with_limit(&app.search_engine, args.limit);
    if args.no_highlight {
        engine.highlight_matches = false;
    }
    let results = engine.pattern_results(found, positions, &args.pattern);

    print_results(&results, args.offsets);
    report_count(app, results.len());
    Ok(())
}

pub fn handle_clear(app: &mut CliApp, args: &ClearArgs) -> Result<()> {
    if !args.yes {
        print!("Are you sure you want to clear the history? (y/N): ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted");
            return Ok(());
        }
    }

    app.provider().clear()?;
    app.backend.save()?;

    if !app.quiet {
        println!("History cleared successfully");
    }

    Ok(())
}

pub fn handle_status(app: &mut CliApp) -> Result<()> {
    println!("scrollback status");
    println!("=================\n");
    println!("Backend: {}", app.backend.name());
    println!("Storage: {}", app.backend.path().display());
    println!("Entries: {}", app.provider().len()?);
    println!("Capacity: {}", app.config.capacity);
    println!("Max line length: {} bytes", app.config.max_line_length);

    match &app.backend {
        HistoryBackend::File { .. } => {
            let db_path = app.config.database_path();
            if db_path.exists() {
                println!("\nNote: a database exists at {}", db_path.display());
            }
        }
        HistoryBackend::Database { history, .. } => {
            let stats = history.stats()?;
            if let Some(oldest) = stats.oldest_entry {
                println!("Oldest entry: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
            }
            if let Some(newest) = stats.newest_entry {
                println!("Newest entry: {}", newest.format("%Y-%m-%d %H:%M:%S"));
            }
        }
    }

    Ok(())
}

fn engine_with_limit(engine: &SearchEngine, limit: Option<usize>) -> SearchEngine {
    let mut engine = engine.clone();
    if let Some(limit) = limit {
        engine.max_results = limit;
    }
    engine
}

fn print_results(results: &[SearchResult], offsets: bool) {
    for result in results {
        let text = result.highlighted.as_deref().unwrap_or(&result.entry);
        if offsets {
            println!("{:>5}  {}", result.span.0, text);
        } else {
            println!("{}", text);
        }
    }
}

fn report_count(app: &CliApp, count: usize) {
    app.verbose_println(&format!("{} matching entries", count));
}

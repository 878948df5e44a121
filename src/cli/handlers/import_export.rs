//! Import and export handlers for scrollback CLI

use crate::cli::CliApp;
use crate::cli::args::*;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};

pub fn handle_import(app: &mut CliApp, args: &ImportArgs) -> Result<()> {
    if !args.file.exists() {
        return Err(Error::HistoryFileNotFound {
            path: args.file.clone(),
        });
    }

    if !app.quiet {
        println!("Importing history from {}...", args.file.display());
    }

    let mut file = File::open(&args.file)?;
    let outcome = app.provider().restore(&mut file);

    // Lines admitted before a bad one are kept either way.
    app.backend.save()?;

    match outcome {
        Ok(count) => {
            if !app.quiet {
                println!("Successfully imported {} lines", count);
            }
            Ok(())
        }
        Err(e) => {
            let count = e.processed().unwrap_or(0);
            eprintln!(
                "History partially imported: {} lines loaded before the error",
                count
            );
            Err(e)
        }
    }
}

pub fn handle_export(app: &mut CliApp, args: &ExportArgs) -> Result<()> {
    let count = if let Some(output_file) = &args.output {
        let mut writer = BufWriter::new(File::create(output_file)?);
        let count = app.provider().persist(&mut writer)?;
        writer.flush()?;

        if !app.quiet {
            println!("Exported {} entries to {}", count, output_file.display());
        }
        count
    } else {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        let count = app.provider().persist(&mut writer)?;
        writer.flush()?;
        count
    };

    app.verbose_println(&format!("{} lines written", count));
    Ok(())
}

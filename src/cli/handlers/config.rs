//! Configuration handler for scrollback CLI

use crate::cli::CliApp;
use crate::cli::args::*;
use crate::config::Config;
use crate::error::Result;

pub fn handle_config(app: &mut CliApp, args: &ConfigArgs) -> Result<()> {
    if args.init {
        let config_path = Config::default_config_path()?;
        Config::default().save_to_path(&config_path)?;
        println!("Configuration initialized at {}", config_path.display());
    } else if args.validate {
        match app.config.validate() {
            Ok(_) => println!("Configuration is valid"),
            Err(e) => println!("Configuration validation failed: {}", e),
        }
    } else {
        // --show is the default
        let config_json = serde_json::to_string_pretty(&app.config)?;
        println!("{}", config_json);
    }

    Ok(())
}

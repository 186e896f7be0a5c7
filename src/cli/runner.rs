use anyhow::Result;
use clap::Parser;

use super::{Cli, Commands};
use crate::app::{self, AppPaths, Config};
use crate::cli_cmds::*;
use crate::logging;

pub(crate) async fn run() -> Result<()> {
    let cli = Cli::parse();

    let paths = AppPaths::resolve(cli.data_dir);
    let config = Config::load(&paths.config_file)?;

    match cli.command {
        Some(command) => {
            logging::init_stderr(&config.logging.level);
            match command {
                Commands::Import { paths: sources, recursive } => {
                    cmd_import(&config, &paths, &sources, recursive).await?;
                }
                Commands::Stats => {
                    cmd_stats(&config, &paths);
                }
                Commands::List { category, search } => {
                    cmd_list(&config, &paths, category.as_deref(), search.as_deref())?;
                }
                Commands::Clear => {
                    cmd_clear(&config, &paths);
                }
                Commands::Animation { action } => {
                    cmd_animation(action, &paths)?;
                }
            }
        }
        None => {
            // TUI mode
            logging::init_file(&paths.cache_dir, &config.logging.level)?;
            app::run_tui(config, paths).await?;
        }
    }

    Ok(())
}

mod common;
mod tui;
mod ui;
mod users;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Handle;

use crate::common::config::{DocumentedConfig, UsrmanConfig};
use crate::ui::prelude::*;
use crate::users::{HttpUserApi, UserApi, UserCommands};

/// usrman main parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print debug diagnostics
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for messages and listings
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Users collection endpoint (overrides the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Use this config file instead of ~/.config/usrman/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive user manager (default)
    Tui,

    #[command(flatten)]
    Users(UserCommands),

    /// Inspect the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    ui::init(cli.output, !cli.no_color);
    ui::set_debug_mode(cli.debug);

    if let Err(err) = run(cli).await {
        emit(Level::Error, "usrman.error", &format!("Error: {err:#}"), None);
        std::process::exit(1);
    }
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => UsrmanConfig::config_path(),
    }
}

/// Load the config, falling back to defaults when the file is unusable
fn load_config(cli: &Cli) -> UsrmanConfig {
    let loaded = config_path(cli).and_then(|path| UsrmanConfig::load_from_path(&path));
    match loaded {
        Ok(config) => config,
        Err(err) => {
            emit(
                Level::Warn,
                "usrman.config.invalid",
                &format!("Using default settings: {err:#}"),
                None,
            );
            UsrmanConfig::default()
        }
    }
}

async fn run(mut cli: Cli) -> Result<()> {
    let config = load_config(&cli);
    let api_url = cli.api_url.clone().unwrap_or_else(|| config.api_url.clone());
    emit(
        Level::Debug,
        "usrman.api_url",
        &format!("Using users endpoint {api_url}"),
        None,
    );

    match cli.command.take() {
        None | Some(Commands::Tui) => {
            let api: Arc<dyn UserApi> = Arc::new(HttpUserApi::new(&api_url)?);
            let log_file = config.resolved_log_file()?;
            let lock_name_on_edit = config.lock_name_on_edit;
            let handle = Handle::current();
            tokio::task::spawn_blocking(move || {
                tui::run(api, handle, lock_name_on_edit, log_file)
            })
            .await
            .context("user manager screen panicked")?
        }
        Some(Commands::Users(command)) => {
            let api = HttpUserApi::new(&api_url)?;
            users::handle_user_command(command, &api, config.lock_name_on_edit).await
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                let path = config_path(&cli)?;
                emit(
                    Level::Info,
                    "usrman.config.path",
                    &path.display().to_string(),
                    None,
                );
                Ok(())
            }
            ConfigCommands::Show => {
                let rendered =
                    toml::to_string_pretty(&config).context("serializing configuration")?;
                print!("{rendered}");
                Ok(())
            }
        },
    }
}

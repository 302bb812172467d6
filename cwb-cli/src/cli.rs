use std::fmt;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cwb_core::{Config, CwbRefreshController, Region};
use inquire::{Password, Select};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cwb-weather", version, about = "Weather card for Taiwan regions")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key and the tracked region.
    Configure,

    /// List supported regions and their observation stations.
    Regions,

    /// Refresh once and print the weather card.
    Show {
        /// Region city name, e.g. "臺中市"; overrides the configured region.
        #[arg(long)]
        region: Option<String>,

        /// Print machine-readable JSON instead of the card.
        #[arg(long)]
        json: bool,
    },

    /// Show the card and refresh it on demand until you quit.
    Session {
        /// Region city name; overrides the configured region.
        #[arg(long)]
        region: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Regions => {
                for r in Region::all() {
                    println!("{}\t{}", r.city, r.station);
                }
                Ok(())
            }
            Command::Show { region, json } => show(region, json).await,
            Command::Session { region } => session(region).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("API key:")
        .without_confirmation()
        .with_help_message("Authorization key from the open-data platform")
        .prompt()
        .context("Failed to read API key")?;

    let current = config.region()?;
    let regions = Region::all().to_vec();
    let cursor = regions.iter().position(|r| *r == current).unwrap_or(0);
    let region = Select::new("Region:", regions)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read region")?;

    config.set_api_key(api_key);
    config.set_region(region.city)?;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn controller_for(region: Option<String>) -> anyhow::Result<CwbRefreshController> {
    let mut config = Config::load()?;
    if let Some(name) = region {
        config.set_region(&name)?;
    }
    debug!(region = ?config.region, base_url = %config.base_url, "Loaded configuration");
    CwbRefreshController::from_config(&config)
}

async fn show(region: Option<String>, json: bool) -> anyhow::Result<()> {
    let controller = controller_for(region)?;
    let result = controller.refresh().await;
    let state = controller.state();

    if json {
        println!("{}", serde_json::to_string_pretty(&render::json(controller.region(), &state))?);
    } else {
        print!("{}", render::card(controller.region(), &state));
    }

    result.context("Weather refresh failed")?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Refresh,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Refresh => "Refresh",
            Action::Quit => "Quit",
        })
    }
}

async fn session(region: Option<String>) -> anyhow::Result<()> {
    let controller = controller_for(region)?;

    loop {
        // Failures are recorded in the state and shown on the card.
        let _ = controller.refresh().await;
        println!();
        print!("{}", render::card(controller.region(), &controller.state()));

        let action = Select::new("Next:", vec![Action::Refresh, Action::Quit])
            .prompt()
            .context("Failed to read action")?;
        if action == Action::Quit {
            return Ok(());
        }
    }
}

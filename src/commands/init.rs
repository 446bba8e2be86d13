//! @acp:module "Init Command"
//! @acp:summary "Create a planner config and an empty data directory"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `gameplan init`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};

use crate::config::PlannerConfig;
use crate::store::FileStore;

/// Options for the init command
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Config file to write
    pub config_path: PathBuf,
    /// Force overwrite existing config
    pub force: bool,
    pub team_id: Option<String>,
    pub opponent_id: Option<String>,
    /// Data directory override
    pub data_dir: Option<PathBuf>,
    /// Skip interactive prompts
    pub yes: bool,
}

/// Execute the init command
pub async fn execute_init(options: InitOptions) -> Result<()> {
    if options.config_path.exists() && !options.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            options.config_path.display()
        );
    }

    let mut config = PlannerConfig::default();
    if let Some(dir) = options.data_dir {
        config.data_dir = dir;
    }

    let interactive =
        !options.yes && (options.team_id.is_none() || options.opponent_id.is_none());
    config.team_id = match options.team_id {
        Some(team) => team,
        None if interactive => prompt("Team id", &config.team_id)?,
        None => config.team_id,
    };
    config.opponent_id = match options.opponent_id {
        Some(opponent) => opponent,
        None if interactive => prompt("Opponent id", &config.opponent_id)?,
        None => config.opponent_id,
    };

    FileStore::new(&config.data_dir)
        .init()
        .await
        .with_context(|| format!("Failed to initialize {}", config.data_dir.display()))?;
    println!(
        "{} Data directory ready at {}",
        style("✓").green(),
        config.data_dir.display()
    );

    config.save(&options.config_path)?;
    println!(
        "{} Created {}",
        style("✓").green(),
        options.config_path.display()
    );
    println!(
        "\n  Add plays to {} and scouting to {}, then run {}",
        style(config.data_dir.join(crate::store::file::PLAYS_FILE).display()).cyan(),
        style(config.data_dir.join(crate::store::file::SCOUTING_FILE).display()).cyan(),
        style("gameplan generate --all").bold()
    );
    Ok(())
}

fn prompt(label: &str, default: &str) -> Result<String> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(label)
        .default(default.to_string())
        .interact_text()?)
}

//! @acp:module "Clear Command"
//! @acp:summary "Delete every slot of the plan, locked ones included"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};

use super::load_config;
use crate::planner::Planner;
use crate::store::FileStore;

/// Options for the clear command
#[derive(Debug, Clone, Default)]
pub struct ClearOptions {
    pub config_path: PathBuf,
    /// Skip the confirmation prompt
    pub yes: bool,
}

/// Execute the clear command
pub async fn execute_clear(options: ClearOptions) -> Result<()> {
    let config = load_config(&options.config_path)?;
    let store = FileStore::new(&config.data_dir);
    let planner = Planner::new(&store, &store, &store, config);
    let mut plan = planner.open().await?;

    if !options.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete the whole plan for {} vs {}? Locked slots are removed too",
                plan.team_id, plan.opponent_id
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{} Nothing deleted", style("•").dim());
            return Ok(());
        }
    }

    planner.delete_all(&mut plan).await?;
    println!(
        "{} Deleted plan for {} vs {}",
        style("✓").green(),
        plan.team_id,
        plan.opponent_id
    );
    Ok(())
}

//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! One submodule per `gameplan` subcommand; the slot edits share `edit`.

pub mod clear;
pub mod edit;
pub mod generate;
pub mod init;
pub mod show;

pub use clear::{execute_clear, ClearOptions};
pub use edit::{execute_edit, EditOptions, EditSubcommand};
pub use generate::{execute_generate, GenerateOptions};
pub use init::{execute_init, InitOptions};
pub use show::{execute_show, ShowOptions};

use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::PlannerConfig;

/// Load the config a command runs against
pub fn load_config(path: &Path) -> Result<PlannerConfig> {
    let config = PlannerConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config in {}", path.display()))?;
    Ok(config)
}

/// Seeded generator when a seed is given, otherwise one drawn from the thread rng
pub fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

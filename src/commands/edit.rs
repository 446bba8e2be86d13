//! @acp:module "Edit Command"
//! @acp:summary "Manual slot edits: lock, favorite, add, remove, move, resize, visibility, notes"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Slots are addressed 1-based within their section on the command line.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use console::style;

use super::load_config;
use crate::engine::{Play, Section, SectionKey};
use crate::error::GamePlanError;
use crate::planner::Planner;
use crate::store::FileStore;

/// Subcommand types for the edit command
#[derive(Debug, Clone)]
pub enum EditSubcommand {
    Lock { section: String, slot: usize },
    Unlock { section: String, slot: usize },
    Favorite { section: String, slot: usize },
    Add { section: String, play: String },
    Remove { section: String, slot: usize },
    Move { section: String, from: usize, to: usize },
    Resize { section: String, capacity: usize },
    Visibility { section: String, visible: bool },
    Note {
        section: String,
        slot: usize,
        text: Option<String>,
    },
}

impl EditSubcommand {
    pub fn section(&self) -> &str {
        match self {
            EditSubcommand::Lock { section, .. }
            | EditSubcommand::Unlock { section, .. }
            | EditSubcommand::Favorite { section, .. }
            | EditSubcommand::Add { section, .. }
            | EditSubcommand::Remove { section, .. }
            | EditSubcommand::Move { section, .. }
            | EditSubcommand::Resize { section, .. }
            | EditSubcommand::Visibility { section, .. }
            | EditSubcommand::Note { section, .. } => section,
        }
    }
}

/// Options for the edit command
#[derive(Debug, Clone)]
pub struct EditOptions {
    pub config_path: PathBuf,
    pub command: EditSubcommand,
}

/// Execute an edit against the stored plan
pub async fn execute_edit(options: EditOptions) -> Result<()> {
    let mut config = load_config(&options.config_path)?;
    let store = FileStore::new(&config.data_dir);
    let key = SectionKey::new(options.command.section());

    if let EditSubcommand::Visibility { visible, .. } = options.command {
        let planner = Planner::new(&store, &store, &store, config.clone());
        let mut plan = planner.open().await?;
        plan.set_visibility(key.as_str(), visible)?;
        config.override_visibility(key.clone(), visible);
        config.save(&options.config_path)?;
        let state = if visible { "shown" } else { "hidden" };
        println!("{} {} is now {}", style("✓").green(), key, state);
        return Ok(());
    }

    let planner = Planner::new(&store, &store, &store, config.clone());
    let mut plan = planner.open().await?;
    let pool = if matches!(options.command, EditSubcommand::Add { .. }) {
        planner.snapshot().await?.plays
    } else {
        Vec::new()
    };

    let mut section = plan.section(key.as_str())?.clone();
    let message = apply_edit(&mut section, &options.command, &pool, config.slot_ceiling)?;
    let capacity = section.capacity();
    planner
        .commit_section(&mut plan, section)
        .await
        .with_context(|| format!("Failed to save section {}", key))?;

    if let EditSubcommand::Resize { .. } = options.command {
        config.override_capacity(key.clone(), capacity);
        config.save(&options.config_path)?;
    }
    println!("{} {}", style("✓").green(), message);
    Ok(())
}

fn index(section: &Section, slot: usize) -> Result<usize> {
    match slot.checked_sub(1) {
        Some(position) if position < section.capacity() => Ok(position),
        _ => Err(GamePlanError::InvalidPosition {
            section: section.key.to_string(),
            position: slot,
        }
        .into()),
    }
}

/// Apply one edit to a working copy of a section
pub fn apply_edit(
    section: &mut Section,
    edit: &EditSubcommand,
    pool: &[Play],
    slot_ceiling: usize,
) -> Result<String> {
    let key = section.key.clone();
    let message = match edit {
        EditSubcommand::Lock { slot, .. } | EditSubcommand::Unlock { slot, .. } => {
            let position = index(section, *slot)?;
            let want = matches!(edit, EditSubcommand::Lock { .. });
            let current = &section.slots[position];
            if want && !current.is_filled() {
                bail!("Slot {} of {} is empty", slot, key);
            }
            if current.locked != want {
                section.toggle_lock(position)?;
            }
            let verb = if want { "Locked" } else { "Unlocked" };
            format!("{} slot {} of {}", verb, slot, key)
        }
        EditSubcommand::Favorite { slot, .. } => {
            let position = index(section, *slot)?;
            let on = section.toggle_favorite(position)?;
            let verb = if on { "Marked" } else { "Unmarked" };
            format!("{} slot {} of {} as favorite", verb, slot, key)
        }
        EditSubcommand::Add { play, .. } => {
            let found = pool
                .iter()
                .find(|p| p.id == *play)
                .cloned()
                .ok_or_else(|| GamePlanError::UnknownPlay(play.clone()))?;
            let position = section.add_play(found)?;
            format!("Added {} to {} at slot {}", play, key, position + 1)
        }
        EditSubcommand::Remove { slot, .. } => {
            let position = index(section, *slot)?;
            let removed = section.remove_at(position)?;
            let names: Vec<&str> = removed.iter().map(|p| p.id.as_str()).collect();
            if names.is_empty() {
                format!("Slot {} of {} was already empty", slot, key)
            } else {
                format!("Removed {} from {}", names.join(", "), key)
            }
        }
        EditSubcommand::Move { from, to, .. } => {
            let from_position = index(section, *from)?;
            let to_position = index(section, *to)?;
            section.move_slot(from_position, to_position)?;
            format!("Moved slot {} of {} to {}", from, key, to)
        }
        EditSubcommand::Resize { capacity, .. } => {
            section.resize(*capacity, slot_ceiling)?;
            format!("Resized {} to {} slots", key, capacity)
        }
        EditSubcommand::Note { slot, text, .. } => {
            let position = index(section, *slot)?;
            section.set_custom_text(position, text.clone())?;
            match text {
                Some(_) => format!("Set note on slot {} of {}", slot, key),
                None => format!("Cleared note on slot {} of {}", slot, key),
            }
        }
        EditSubcommand::Visibility { .. } => bail!("Visibility is not a slot edit"),
    };
    Ok(message)
}

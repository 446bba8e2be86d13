//! @acp:module "Show Command"
//! @acp:summary "Print the numbered game plan script"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use serde::Serialize;

use super::load_config;
use crate::engine::{GamePlan, ScriptLine};
use crate::planner::Planner;
use crate::store::FileStore;

/// Options for the show command
#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    pub config_path: PathBuf,
    /// Only this section
    pub section: Option<String>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SectionView<'a> {
    key: &'a str,
    title: &'a str,
    visible: bool,
    start: Option<usize>,
    filled: usize,
    capacity: usize,
    lines: Vec<&'a ScriptLine>,
}

/// Execute the show command
pub async fn execute_show(options: ShowOptions) -> Result<()> {
    let config = load_config(&options.config_path)?;
    let store = FileStore::new(&config.data_dir);
    let planner = Planner::new(&store, &store, &store, config);
    let plan = planner.open().await?;
    if let Some(key) = &options.section {
        plan.section(key)?;
    }

    let script = plan.script();
    let views = section_views(&plan, &script, options.section.as_deref());

    if options.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!(
        "{} vs {}",
        style(&plan.team_id).bold(),
        style(&plan.opponent_id).bold()
    );
    for view in &views {
        println!();
        if !view.visible {
            println!(
                "{} {}",
                style(view.title).dim(),
                style("(hidden)").dim()
            );
            continue;
        }
        println!(
            "{} {}",
            style(view.title).bold().cyan(),
            style(format!("{}/{}", view.filled, view.capacity)).dim()
        );
        for line in &view.lines {
            let mut marks = String::new();
            if line.favorite {
                marks.push('★');
            }
            if line.locked {
                marks.push('🔒');
            }
            println!("  {:>3}. {} {}", line.number, line.text, style(marks).yellow());
        }
    }
    Ok(())
}

fn section_views<'a>(
    plan: &'a GamePlan,
    script: &'a [ScriptLine],
    only: Option<&str>,
) -> Vec<SectionView<'a>> {
    let numbering = plan.numbering();
    plan.groups
        .iter()
        .flat_map(|(_, keys)| keys.iter())
        .filter(|key| only.map(|o| key.as_str() == o.to_lowercase()).unwrap_or(true))
        .filter_map(|key| {
            let section = plan.sections.get(key)?;
            Some(SectionView {
                key: key.as_str(),
                title: &section.title,
                visible: section.visible,
                start: numbering.get(key).copied(),
                filled: section.filled_count(),
                capacity: section.capacity(),
                lines: script.iter().filter(|l| &l.section == key).collect(),
            })
        })
        .collect()
}

//! @acp:module "Generate Command"
//! @acp:summary "Regenerate one section or the whole plan"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{bail, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use super::{load_config, rng_for};
use crate::engine::Notice;
use crate::planner::{Planner, SectionReport};
use crate::store::FileStore;

/// Options for the generate command
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub config_path: PathBuf,
    /// Section to regenerate; ignored with `all`
    pub section: Option<String>,
    pub all: bool,
    /// Seed for repeatable output
    pub seed: Option<u64>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct GenerateOutput {
    reports: Vec<SectionReport>,
    failures: Vec<FailureOutput>,
}

#[derive(Debug, Serialize)]
struct FailureOutput {
    section: String,
    error: String,
}

/// Execute the generate command
pub async fn execute_generate(options: GenerateOptions) -> Result<()> {
    let config = load_config(&options.config_path)?;
    let store = FileStore::new(&config.data_dir);
    let planner = Planner::new(&store, &store, &store, config);
    let mut plan = planner.open().await?;
    let mut rng = rng_for(options.seed);

    let output = match (options.all, options.section) {
        (true, _) => {
            let total = plan.ordered_keys().len() as u64;
            let progress = if options.json {
                ProgressBar::hidden()
            } else {
                ProgressBar::new(total)
            };
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("=> "),
            );
            let summary = planner
                .regenerate_all(&mut plan, &mut rng, |key, _| {
                    progress.set_message(key.to_string());
                    progress.inc(1);
                })
                .await?;
            progress.finish_and_clear();
            GenerateOutput {
                reports: summary.reports,
                failures: summary
                    .failures
                    .into_iter()
                    .map(|(key, e)| FailureOutput {
                        section: key.to_string(),
                        error: e.to_string(),
                    })
                    .collect(),
            }
        }
        (false, Some(section)) => {
            let report = planner
                .regenerate_section(&mut plan, &section, &mut rng)
                .await?;
            GenerateOutput {
                reports: vec![report],
                failures: Vec::new(),
            }
        }
        (false, None) => bail!("Name a section or pass --all"),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_output(&output);
    }

    if !output.failures.is_empty() {
        bail!("{} section(s) failed to regenerate", output.failures.len());
    }
    Ok(())
}

fn print_output(output: &GenerateOutput) {
    for report in &output.reports {
        let mark = if report.filled == report.capacity {
            style("✓").green()
        } else {
            style("~").yellow()
        };
        println!(
            "{} {} ({}/{})",
            mark, report.section, report.filled, report.capacity
        );
        for notice in &report.notices {
            print_notice(notice);
        }
    }
    for failure in &output.failures {
        println!(
            "{} {}: {}",
            style("✗").red(),
            failure.section,
            failure.error
        );
    }
}

fn print_notice(notice: &Notice) {
    let text = notice.to_string();
    match notice {
        Notice::NoCandidates { .. } => println!("    {}", style(text).red()),
        Notice::AutoFocus { .. } => println!("    {}", style(text).dim()),
        _ => println!("    {}", style(text).yellow()),
    }
}

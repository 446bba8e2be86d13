#![forbid(unsafe_code)]

//! @acp:module "Game Plan Library"
//! @acp:summary "Play allocation engine for weekly football game plans"
//! @acp:domain cli
//! @acp:layer api
//! @acp:stability stable
//!
//! # Game Plan
//!
//! Fills the sections of a team's game plan against one opponent from the
//! team's play pool.
//!
//! ## Features
//!
//! - **Weighted allocation**: category and scouting percentages become slot counts
//! - **Concept diversity**: no concept repeats while an unused one is available
//! - **Locks**: locked slots survive every regeneration untouched
//! - **Global numbering**: visible sections number their plays continuously
//!
//! ## Example
//!
//! ```rust,no_run
//! use gameplan::{FileStore, Planner, PlannerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PlannerConfig::load_or_default();
//!     let store = FileStore::new(&config.data_dir);
//!     let planner = Planner::new(&store, &store, &store, config);
//!
//!     let mut plan = planner.open().await?;
//!     let summary = planner
//!         .regenerate_all(&mut plan, &mut rand::rng(), |_, _| {})
//!         .await?;
//!
//!     for line in plan.script() {
//!         println!("{:>3}. {}", line.number, line.text);
//!     }
//!     assert!(summary.is_success());
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod planner;
pub mod store;

// Re-exports
pub use config::PlannerConfig;
pub use engine::{
    allocate, generate_section, numbering_for, sample, BaseFocus, Distribution, DistributionKind,
    GamePlan, Notice, Play, PlayCategory, RandomSource, ScriptLine, Section, SectionKey,
    SectionKind, SectionOutcome, Situation, Slot,
};
pub use error::{GamePlanError, Result};
pub use planner::{Planner, PoolSnapshot, RegenerationSummary, SectionReport, SectionState};
pub use store::{
    DistributionSource, FileStore, GamePlanStore, MemoryStore, PlayPoolSource, SlotRecord,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

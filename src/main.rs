#![forbid(unsafe_code)]
//! Game Plan Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use gameplan::commands::{
    execute_clear, execute_edit, execute_generate, execute_init, execute_show, ClearOptions,
    EditOptions, EditSubcommand, GenerateOptions, InitOptions, ShowOptions,
};
use gameplan::config::CONFIG_FILE;

#[derive(Parser)]
#[command(name = "gameplan")]
#[command(about = "Weekly game plan builder - fills call sheet sections from the play pool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_FILE, env = "GAMEPLAN_CONFIG")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a config and an empty data directory
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// Team whose play pool is used
        #[arg(long)]
        team: Option<String>,

        /// Opponent the plan is built against
        #[arg(long)]
        opponent: Option<String>,

        /// Directory for plays.json, scouting.json and gameplan.json
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Skip interactive prompts
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Regenerate a section, or every section with --all
    Generate {
        /// Section key (e.g. red-zone, front:bear)
        #[arg(required_unless_present = "all")]
        section: Option<String>,

        /// Regenerate every section in order
        #[arg(long)]
        all: bool,

        /// Seed for repeatable selection
        #[arg(long)]
        seed: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the numbered script
    Show {
        /// Only this section
        section: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lock a slot so regeneration keeps it
    Lock { section: String, slot: usize },

    /// Unlock a slot
    Unlock { section: String, slot: usize },

    /// Toggle the favorite mark on a slot
    Favorite { section: String, slot: usize },

    /// Put a play from the pool into the first empty slot
    Add {
        section: String,
        /// Play id
        play: String,
    },

    /// Remove a slot's play and shift later slots up
    Remove { section: String, slot: usize },

    /// Move a slot to another position
    Move {
        section: String,
        from: usize,
        to: usize,
    },

    /// Change a section's slot count
    Resize { section: String, capacity: usize },

    /// Show or hide a section in the script
    Visibility {
        section: String,
        #[arg(action = clap::ArgAction::Set)]
        visible: bool,
    },

    /// Set custom call text on a slot; omit the text to clear it
    Note {
        section: String,
        slot: usize,
        text: Option<String>,
    },

    /// Delete the whole plan, locked slots included
    Clear {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !matches!(cli.command, Commands::Init { .. }) && !cli.config.exists() {
        eprintln!(
            "{} No {} found",
            style("✗").red(),
            cli.config.display()
        );
        eprintln!("  Run 'gameplan init' to create one");
        std::process::exit(1);
    }

    let config_path = cli.config;
    let edit = |command: EditSubcommand| EditOptions {
        config_path: config_path.clone(),
        command,
    };

    match cli.command {
        Commands::Init {
            force,
            team,
            opponent,
            data_dir,
            yes,
        } => {
            let options = InitOptions {
                config_path: config_path.clone(),
                force,
                team_id: team,
                opponent_id: opponent,
                data_dir,
                yes,
            };
            execute_init(options).await?;
        }

        Commands::Generate {
            section,
            all,
            seed,
            json,
        } => {
            let options = GenerateOptions {
                config_path: config_path.clone(),
                section,
                all,
                seed,
                json,
            };
            execute_generate(options).await?;
        }

        Commands::Show { section, json } => {
            let options = ShowOptions {
                config_path: config_path.clone(),
                section,
                json,
            };
            execute_show(options).await?;
        }

        Commands::Lock { section, slot } => {
            execute_edit(edit(EditSubcommand::Lock { section, slot })).await?;
        }

        Commands::Unlock { section, slot } => {
            execute_edit(edit(EditSubcommand::Unlock { section, slot })).await?;
        }

        Commands::Favorite { section, slot } => {
            execute_edit(edit(EditSubcommand::Favorite { section, slot })).await?;
        }

        Commands::Add { section, play } => {
            execute_edit(edit(EditSubcommand::Add { section, play })).await?;
        }

        Commands::Remove { section, slot } => {
            execute_edit(edit(EditSubcommand::Remove { section, slot })).await?;
        }

        Commands::Move { section, from, to } => {
            execute_edit(edit(EditSubcommand::Move { section, from, to })).await?;
        }

        Commands::Resize { section, capacity } => {
            execute_edit(edit(EditSubcommand::Resize { section, capacity })).await?;
        }

        Commands::Visibility { section, visible } => {
            execute_edit(edit(EditSubcommand::Visibility { section, visible })).await?;
        }

        Commands::Note {
            section,
            slot,
            text,
        } => {
            execute_edit(edit(EditSubcommand::Note {
                section,
                slot,
                text,
            }))
            .await?;
        }

        Commands::Clear { yes } => {
            let options = ClearOptions {
                config_path: config_path.clone(),
                yes,
            };
            execute_clear(options).await?;
        }
    }

    Ok(())
}

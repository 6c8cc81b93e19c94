//! clonectl — keep a set of git clones in place from one config file.
//!
//! # Usage
//!
//! ```text
//! clonectl [--config <file>] [--git <program>] [-v...] <command>
//! clonectl update [<name>] [--force] [--keep-going]
//! clonectl list [--json]
//! clonectl add <name> <repository> <target> [--force-overwrite]
//! clonectl remove <name>
//! clonectl validate
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use clonectl_core::{config, CloneManager, Git};
use commands::{
    add::AddArgs, list::ListArgs, remove::RemoveArgs, update::UpdateArgs,
    validate::ValidateArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "clonectl",
    version,
    about = "Create bare repositories and keep git clones in place from a control file",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply every control (or one by name): create bare repos, clone targets.
    Update(UpdateArgs),

    /// Show registered controls and whether their targets are cloned.
    List(ListArgs),

    /// Register a new control in the config file.
    Add(AddArgs),

    /// Remove a control from the config file.
    Remove(RemoveArgs),

    /// Check the config for conflicting targets and unreachable sources.
    Validate(ValidateArgs),
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Control file (JSON, or YAML by extension). Defaults to ~/.clonectl/controls.json.
    #[arg(long, short = 'c', global = true, env = "CLONECTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// git program to run.
    #[arg(long, global = true, env = "CLONECTL_GIT", default_value = "git")]
    pub git: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config::default_config_path().context("could not determine config path"),
        }
    }

    /// Manager with every control from the config file registered.
    pub fn load_manager(&self) -> Result<(PathBuf, CloneManager)> {
        let path = self.config_path()?;
        let mut manager = CloneManager::with_git(Git::new(&self.git));
        manager
            .load_from_file(&path)
            .with_context(|| format!("failed to load controls from {}", path.display()))?;
        Ok((path, manager))
    }

    /// Like [`load_manager`](Self::load_manager), but a missing file yields an
    /// empty manager so `add` can create it.
    pub fn load_or_create_manager(&self) -> Result<(PathBuf, CloneManager)> {
        let path = self.config_path()?;
        if !path.exists() {
            return Ok((path, CloneManager::with_git(Git::new(&self.git))));
        }
        self.load_manager()
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match cli.command {
        Commands::Update(args) => args.run(&cli.global),
        Commands::List(args) => args.run(&cli.global),
        Commands::Add(args) => args.run(&cli.global),
        Commands::Remove(args) => args.run(&cli.global),
        Commands::Validate(args) => args.run(&cli.global),
    }
}

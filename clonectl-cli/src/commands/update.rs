//! `clonectl update [<name>] [--force] [--keep-going]`

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use clonectl_core::{ApplyOutcome, CloneAction, RepositoryAction, UpdateOptions};

use crate::GlobalArgs;

/// Arguments for `clonectl update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Apply only the control with this name.
    pub name: Option<String>,

    /// Re-clone every target even when it already holds a repository.
    #[arg(long)]
    pub force: bool,

    /// Keep applying remaining controls after a failure.
    #[arg(long, conflicts_with = "name")]
    pub keep_going: bool,
}

impl UpdateArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (path, manager) = global.load_manager()?;

        if let Some(name) = self.name.as_deref() {
            let outcome = manager
                .update_by_name_with(name, self.force)
                .with_context(|| format!("update failed for '{name}'"))?;
            print_outcome(name, &outcome);
            return Ok(());
        }

        if manager.is_empty() {
            println!("No controls in {}.", path.display());
            println!("Run: clonectl add <name> <repository> <target>");
            return Ok(());
        }

        let options = UpdateOptions {
            force: self.force,
            keep_going: self.keep_going,
        };
        let report = manager
            .update_with_progress(options, |control| match &control.result {
                Ok(outcome) => print_outcome(control.name.as_str(), outcome),
                Err(err) => println!("{} {}: {err}", "✗".red().bold(), control.name),
            })
            .context("update aborted")?;

        println!(
            "{} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );

        if !report.is_success() {
            bail!(
                "{} of {} controls failed",
                report.failed(),
                report.controls.len()
            );
        }
        Ok(())
    }
}

fn print_outcome(name: &str, outcome: &ApplyOutcome) {
    let marker = match outcome.clone {
        CloneAction::Skipped => "·".bright_black().bold(),
        CloneAction::Cloned => "✓".green().bold(),
        CloneAction::Recloned => "↻".yellow().bold(),
    };
    let created = match outcome.repository {
        RepositoryAction::CreatedBare => " (bare repository created)",
        RepositoryAction::Existing | RepositoryAction::Remote => "",
    };
    println!("{marker} {name}: {}{created}", outcome.clone);
}

//! `clonectl list [--json]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use clonectl_core::ControlEntry;

use crate::GlobalArgs;

/// Arguments for `clonectl list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ControlStatusJson {
    name: String,
    repository_path: String,
    target_path: String,
    local: bool,
    repository_exists: bool,
    cloned: bool,
    force_overwrite: bool,
}

#[derive(Tabled)]
struct ControlTableRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "kind")]
    kind: &'static str,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "overwrite")]
    overwrite: &'static str,
}

impl ListArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (path, manager) = global.load_manager()?;

        if self.json {
            let rows: Vec<ControlStatusJson> = manager.controls().map(status_json).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize controls")?
            );
            return Ok(());
        }

        println!(
            "clonectl v{} | {} controls | {}",
            env!("CARGO_PKG_VERSION"),
            manager.count(),
            path.display()
        );
        if manager.is_empty() {
            println!("No controls registered.");
            return Ok(());
        }

        let rows: Vec<ControlTableRow> = manager.controls().map(table_row).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn status_json(control: &ControlEntry) -> ControlStatusJson {
    ControlStatusJson {
        name: control.name().to_string(),
        repository_path: control.repository_path().to_string(),
        target_path: control.target_path().display().to_string(),
        local: control.is_local_repository(),
        repository_exists: control.repository_exists(),
        cloned: control.clone_exists(),
        force_overwrite: control.force_overwrite(),
    }
}

fn table_row(control: &ControlEntry) -> ControlTableRow {
    let state = if control.clone_exists() {
        "cloned".green().to_string()
    } else if control.target_path().exists() {
        "occupied".red().to_string()
    } else {
        "missing".yellow().to_string()
    };
    ControlTableRow {
        name: control.name().to_string(),
        source: control.repository_path().to_string(),
        target: control.target_path().display().to_string(),
        kind: if control.is_local_repository() { "local" } else { "remote" },
        state,
        overwrite: if control.force_overwrite() { "yes" } else { "no" },
    }
}

//! `clonectl validate`

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use crate::GlobalArgs;

/// Arguments for `clonectl validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        // Loading already enforces field and name checks.
        let (path, manager) = global.load_manager()?;

        let problems = manager.validate();
        if problems.is_empty() {
            println!(
                "{} {} controls in {} look good",
                "✓".green().bold(),
                manager.count(),
                path.display()
            );
            return Ok(());
        }

        for problem in &problems {
            println!("{} {problem}", "✗".red().bold());
        }
        bail!("{} problem(s) found in {}", problems.len(), path.display());
    }
}

//! `clonectl add <name> <repository> <target> [--force-overwrite]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use clonectl_core::ControlEntry;

use crate::GlobalArgs;

/// Arguments for `clonectl add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Unique control name.
    pub name: String,

    /// Source: a local path (initialised bare if missing) or a git URL.
    pub repository: String,

    /// Directory to clone into.
    pub target: PathBuf,

    /// Replace the target on every update.
    #[arg(long)]
    pub force_overwrite: bool,
}

impl AddArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (path, mut manager) = global.load_or_create_manager()?;

        let entry = ControlEntry::new(self.name.clone(), self.repository, self.target)
            .with_force_overwrite(self.force_overwrite);
        manager
            .append_control(entry)
            .with_context(|| format!("cannot add '{}'", self.name))?;
        manager
            .save_to_file(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;

        println!("✓ Added '{}'", self.name);
        println!("  Saved to: {}", path.display());
        Ok(())
    }
}

//! `clonectl remove <name>`

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::GlobalArgs;

/// Arguments for `clonectl remove`. Clones on disk are left alone.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Name of the control to drop.
    pub name: String,
}

impl RemoveArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (path, mut manager) = global.load_manager()?;

        if manager.remove_control(&self.name).is_none() {
            bail!("no control named '{}' in {}", self.name, path.display());
        }
        manager
            .save_to_file(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;

        println!("✓ Removed '{}'", self.name);
        Ok(())
    }
}

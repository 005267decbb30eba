use anyhow::{Context, Result};
use turnforge_store::StateStore;

use crate::Cli;

pub fn handle(cli: &Cli) -> Result<()> {
    StateStore::open(&cli.db)
        .with_context(|| format!("failed to initialize store at {}", cli.db.display()))?;
    println!("Initialized store at {}", cli.db.display());
    Ok(())
}

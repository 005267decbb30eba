use anyhow::{bail, Result};
use turnforge_oracle::{OfflineOracle, PromptRegistry};
use turnforge_runtime::{config_dir, replay_turns};
use turnforge_types::to_canonical_json;

use crate::Cli;

pub fn handle(cli: &Cli, start: i64, end: i64, prompt_overrides: Option<&str>) -> Result<()> {
    if start < 1 || end < start {
        bail!("invalid replay range: {}..{}", start, end);
    }
    let overrides = super::parse_version_map(prompt_overrides)?;

    let prompts_dir = config_dir()
        .map(|dir| dir.join("prompts"))
        .unwrap_or_else(|_| "prompts".into());
    let mut registry = PromptRegistry::new(prompts_dir);

    let report = replay_turns(
        &cli.db,
        &cli.campaign,
        start,
        end,
        overrides,
        &OfflineOracle,
        &mut registry,
    )?;

    println!("{}", to_canonical_json(&report)?);
    Ok(())
}

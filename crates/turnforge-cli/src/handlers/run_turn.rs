use anyhow::{Context, Result};
use turnforge_oracle::{OfflineOracle, PromptRegistry};
use turnforge_runtime::{config_dir, get_api_key, Orchestrator, TurnOptions};
use turnforge_store::StateStore;

use crate::{output, Cli};

pub fn handle(cli: &Cli, input: &str, prompt_versions: Option<&str>, json: bool) -> Result<()> {
    let versions = super::parse_version_map(prompt_versions)?;

    let store = StateStore::open(&cli.db)
        .with_context(|| format!("failed to open store at {}", cli.db.display()))?;

    if get_api_key().is_none() {
        eprintln!("note: no API key configured; narrating offline");
    }

    let prompts_dir = config_dir()
        .map(|dir| dir.join("prompts"))
        .unwrap_or_else(|_| "prompts".into());
    let registry = PromptRegistry::new(prompts_dir);

    let mut orchestrator =
        Orchestrator::with_prompt_versions(store, Box::new(OfflineOracle), registry, versions);

    let result = orchestrator.run_turn(&cli.campaign, input, &TurnOptions::default())?;

    if json {
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }

    if result.clarification_needed {
        output::print_clarification(&result.final_text);
    } else {
        output::print_final_text(&result.final_text);
        if let Some(period) = &result.period_hint {
            output::print_period_hint(period);
        }
    }
    Ok(())
}

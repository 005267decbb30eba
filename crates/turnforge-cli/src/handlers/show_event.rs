use anyhow::{bail, Result};
use turnforge_store::StateStore;
use turnforge_types::to_canonical_json;

use crate::Cli;

pub fn handle(cli: &Cli, turn: i64, field: Option<&str>) -> Result<()> {
    let store = StateStore::open(&cli.db)?;
    let Some(event) = store.get_event(&cli.campaign, turn)? else {
        bail!("no event for campaign '{}' turn {}", cli.campaign, turn);
    };

    let Some(field) = field else {
        println!("{}", to_canonical_json(&event)?);
        return Ok(());
    };

    let value = match field {
        "id" => event.id,
        "campaign_id" => event.campaign_id,
        "turn_no" => event.turn_no.to_string(),
        "player_input" => event.player_input,
        "context_packet_json" => event.context_packet_json,
        "pass_outputs_json" => event.pass_outputs_json,
        "engine_events_json" => event.engine_events_json,
        "state_diff_json" => event.state_diff_json,
        "final_text" => event.final_text,
        "prompt_versions_json" => event.prompt_versions_json,
        "created_at" => event.created_at,
        other => bail!("unknown event field: '{}'", other),
    };
    println!("{}", value);
    Ok(())
}

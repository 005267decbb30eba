use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use turnforge_oracle::{Oracle, OracleOptions, PromptRegistry};
use turnforge_store::StateStore;
use turnforge_types::{new_event_id, NarratorOutput};

use crate::stages::stub_narrator_output;
use crate::Result;

/// One replayed turn: stored prose versus the re-rendered prose.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayTurn {
    pub turn_no: i64,
    pub player_input: String,
    pub original_text: String,
    pub replayed_text: String,
    pub matches: bool,
}

/// Result of a read-only replay run.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub campaign_id: String,
    pub start_turn: i64,
    pub end_turn: i64,
    pub prompt_overrides: BTreeMap<String, String>,
    pub turns: Vec<ReplayTurn>,
}

/// Re-render stored turns through the narrator stage, optionally with
/// overridden prompt versions, and report divergence from the recorded
/// prose.
///
/// Runs against a snapshot sandbox: the store file is copied aside and the
/// live database is never opened for writing, so replay can never disturb a
/// campaign. The stored context packets and engine events are the replay
/// inputs; dice are not re-rolled.
pub fn replay_turns(
    db_path: &Path,
    campaign_id: &str,
    start_turn: i64,
    end_turn: i64,
    prompt_overrides: BTreeMap<String, String>,
    oracle: &dyn Oracle,
    registry: &mut PromptRegistry,
) -> Result<ReplayReport> {
    let sandbox = snapshot_sandbox(db_path)?;
    let result = replay_in_sandbox(
        &sandbox,
        campaign_id,
        start_turn,
        end_turn,
        prompt_overrides,
        oracle,
        registry,
    );
    let _ = std::fs::remove_file(&sandbox);
    result
}

fn snapshot_sandbox(db_path: &Path) -> Result<PathBuf> {
    let sandbox = std::env::temp_dir().join(format!("turnforge-replay-{}.db", new_event_id()));
    std::fs::copy(db_path, &sandbox)?;
    Ok(sandbox)
}

fn replay_in_sandbox(
    sandbox: &Path,
    campaign_id: &str,
    start_turn: i64,
    end_turn: i64,
    prompt_overrides: BTreeMap<String, String>,
    oracle: &dyn Oracle,
    registry: &mut PromptRegistry,
) -> Result<ReplayReport> {
    let store = StateStore::open(sandbox)?;
    let events = store.get_events_range(campaign_id, start_turn, end_turn)?;

    let narrator_version = prompt_overrides.get("narrator").cloned();
    let mut turns = Vec::with_capacity(events.len());

    for record in &events {
        let engine_events = record.engine_events();
        let replayed = render_narration(
            oracle,
            registry,
            campaign_id,
            narrator_version.as_deref(),
            record,
            &engine_events,
        );
        turns.push(ReplayTurn {
            turn_no: record.turn_no,
            player_input: record.player_input.clone(),
            original_text: record.final_text.clone(),
            matches: replayed.final_text == record.final_text,
            replayed_text: replayed.final_text,
        });
    }

    Ok(ReplayReport {
        campaign_id: campaign_id.to_string(),
        start_turn,
        end_turn,
        prompt_overrides,
        turns,
    })
}

fn render_narration(
    oracle: &dyn Oracle,
    registry: &mut PromptRegistry,
    campaign_id: &str,
    version: Option<&str>,
    record: &turnforge_types::EventRecord,
    engine_events: &[turnforge_types::EngineEvent],
) -> NarratorOutput {
    let Ok(prompt) = registry.get_prompt("narrator", version, Some(campaign_id)) else {
        return stub_narrator_output(engine_events, &[]);
    };
    let input = serde_json::json!({
        "player_input": record.player_input,
        "context_packet_json": record.context_packet_json,
        "engine_events": engine_events,
    });
    match oracle.run_structured(&prompt, &input, &OracleOptions::default()) {
        Ok(response) => serde_json::from_value::<NarratorOutput>(response.content)
            .ok()
            .filter(|output| !output.final_text.is_empty())
            .unwrap_or_else(|| stub_narrator_output(engine_events, &[])),
        Err(_) => stub_narrator_output(engine_events, &[]),
    }
}

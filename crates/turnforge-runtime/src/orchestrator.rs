use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use turnforge_engine::{ResolveOptions, Resolver, ResolverOutput, WorldQuery};
use turnforge_oracle::{Oracle, OracleOptions, PromptRegistry};
use turnforge_store::StateStore;
use turnforge_types::{
    new_event_id, to_canonical_json, ContextOptions, ContextPacket, EventRecord, InterpreterOutput,
    NarratorOutput, PassOutputs, Period, PlannerOutput, SceneTime, ValidatorOutput,
};

use crate::stages::{stub_interpreter_output, stub_narrator_output};
use crate::{ContextBuilder, Result};

/// Prompt versions used when neither the campaign nor the caller pins any.
pub const DEFAULT_PROMPT_VERSIONS: [(&str, &str); 3] =
    [("interpreter", "v0"), ("planner", "v0"), ("narrator", "v0")];

/// Per-turn options: forced dice for tests and replay.
#[derive(Debug, Clone, Default)]
pub struct TurnOptions {
    pub resolve: ResolveOptions,
}

/// What one executed turn hands back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResult {
    pub turn_no: i64,
    pub event_id: String,
    pub final_text: String,
    pub clarification_needed: bool,
    pub clarification_question: String,
    pub suggested_actions: Vec<String>,
    /// Set when the fictional time advance crossed into a new period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_hint: Option<String>,
}

// Read-only world view over the store, handed to the resolver so
// investigations can reveal facts the perception filter hides.
struct StoreWorld<'a> {
    store: &'a StateStore,
}

impl WorldQuery for StoreWorld<'_> {
    fn entity(&self, id: &str) -> Option<turnforge_types::Entity> {
        self.store.get_entity(id).ok().flatten()
    }

    fn facts_for_subject(&self, subject_id: &str) -> Vec<turnforge_types::Fact> {
        self.store.get_facts_for_subject(subject_id).unwrap_or_default()
    }

    fn inventory_for(&self, owner_id: &str) -> Vec<turnforge_types::InventoryRow> {
        self.store.get_inventory(owner_id).unwrap_or_default()
    }
}

/// Runs the turn pipeline: context assembly, interpretation, validation,
/// resolution, time advance, commit, event append, narration.
///
/// One turn executes at a time per campaign, guarded by the commit lock.
/// The LLM stages run before any write, so a failure or cancellation up to
/// the commit step leaves the store untouched.
pub struct Orchestrator {
    store: StateStore,
    oracle: Box<dyn Oracle>,
    registry: PromptRegistry,
    versions: BTreeMap<String, String>,
    commit_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(store: StateStore, oracle: Box<dyn Oracle>, registry: PromptRegistry) -> Self {
        Self::with_prompt_versions(store, oracle, registry, BTreeMap::new())
    }

    pub fn with_prompt_versions(
        store: StateStore,
        oracle: Box<dyn Oracle>,
        registry: PromptRegistry,
        overrides: BTreeMap<String, String>,
    ) -> Self {
        let mut versions: BTreeMap<String, String> = DEFAULT_PROMPT_VERSIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        versions.extend(overrides);
        Self {
            store,
            oracle,
            registry,
            versions,
            commit_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn prompt_versions(&self) -> &BTreeMap<String, String> {
        &self.versions
    }

    /// Execute one player turn end to end.
    pub fn run_turn(
        &mut self,
        campaign_id: &str,
        player_input: &str,
        options: &TurnOptions,
    ) -> Result<TurnResult> {
        let lock = self.campaign_lock(campaign_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        self.store.ensure_campaign(campaign_id)?;
        let turn_no = self.store.get_next_turn_no(campaign_id)?;

        let builder = ContextBuilder::new(&self.store);
        let ctx = builder.build_context(campaign_id, player_input, &ContextOptions::default())?;

        let interpreter_output = self.run_interpreter(campaign_id, player_input, &ctx);
        let validator_output = turnforge_engine::validate(&interpreter_output, &ctx);

        if validator_output.clarification_needed {
            return self.commit_clarification_turn(
                campaign_id,
                turn_no,
                player_input,
                ctx,
                interpreter_output,
                validator_output,
            );
        }

        let planner_output = self.run_planner(campaign_id, &ctx);

        let world = StoreWorld { store: &self.store };
        let mut resolved = Resolver::new(&world).resolve(
            &ctx,
            &validator_output,
            &planner_output,
            &options.resolve,
        );

        let period_hint =
            self.advance_scene_time(&ctx, resolved.total_estimated_minutes, &mut resolved);

        let triggers = self
            .store
            .apply_state_diff(&resolved.state_diff, turn_no)?;

        let narrator_output = self.run_narrator(campaign_id, &ctx, &resolved, &triggers);

        let event_id = new_event_id();
        let record = EventRecord {
            id: event_id.clone(),
            campaign_id: campaign_id.to_string(),
            turn_no,
            player_input: player_input.to_string(),
            context_packet_json: to_canonical_json(&ctx)?,
            pass_outputs_json: to_canonical_json(&PassOutputs {
                interpreter: interpreter_output,
                validator: validator_output,
                planner: planner_output.clone(),
                narrator: narrator_output.clone(),
            })?,
            engine_events_json: to_canonical_json(&resolved.engine_events)?,
            state_diff_json: to_canonical_json(&resolved.state_diff)?,
            final_text: narrator_output.final_text.clone(),
            prompt_versions_json: to_canonical_json(&self.versions)?,
            created_at: String::new(),
        };
        self.store.append_event(&record)?;
        self.store.update_campaign_turn(campaign_id, turn_no)?;

        let mut suggested_actions = planner_output.next_suggestions;
        if suggested_actions.is_empty() {
            suggested_actions = narrator_output.suggested_actions;
        }

        Ok(TurnResult {
            turn_no,
            event_id,
            final_text: narrator_output.final_text,
            clarification_needed: false,
            clarification_question: String::new(),
            suggested_actions,
            period_hint,
        })
    }

    // All actions were blocked for perception-class reasons: no resolution,
    // no state change, but the turn is still recorded so the counter
    // advances and replay stays faithful.
    fn commit_clarification_turn(
        &mut self,
        campaign_id: &str,
        turn_no: i64,
        player_input: &str,
        ctx: ContextPacket,
        interpreter_output: InterpreterOutput,
        validator_output: ValidatorOutput,
    ) -> Result<TurnResult> {
        let question = validator_output.clarification_question.clone();
        let narrator_output = NarratorOutput {
            final_text: question.clone(),
            next_prompt: "clarify".to_string(),
            suggested_actions: vec![],
        };
        let resolved = ResolverOutput::default();

        let event_id = new_event_id();
        let record = EventRecord {
            id: event_id.clone(),
            campaign_id: campaign_id.to_string(),
            turn_no,
            player_input: player_input.to_string(),
            context_packet_json: to_canonical_json(&ctx)?,
            pass_outputs_json: to_canonical_json(&PassOutputs {
                interpreter: interpreter_output,
                validator: validator_output,
                planner: PlannerOutput::default(),
                narrator: narrator_output.clone(),
            })?,
            engine_events_json: to_canonical_json(&resolved.engine_events)?,
            state_diff_json: to_canonical_json(&resolved.state_diff)?,
            final_text: narrator_output.final_text.clone(),
            prompt_versions_json: to_canonical_json(&self.versions)?,
            created_at: String::new(),
        };
        self.store.append_event(&record)?;
        self.store.update_campaign_turn(campaign_id, turn_no)?;

        Ok(TurnResult {
            turn_no,
            event_id,
            final_text: narrator_output.final_text,
            clarification_needed: true,
            clarification_question: question,
            suggested_actions: vec![],
            period_hint: None,
        })
    }

    fn run_interpreter(
        &mut self,
        campaign_id: &str,
        player_input: &str,
        ctx: &ContextPacket,
    ) -> InterpreterOutput {
        let version = self.versions.get("interpreter").cloned();
        let prompt =
            self.registry
                .get_prompt("interpreter", version.as_deref(), Some(campaign_id));
        let Ok(prompt) = prompt else {
            return stub_interpreter_output(player_input, ctx);
        };
        let input = serde_json::json!({
            "player_input": player_input,
            "context": ctx,
        });
        match self
            .oracle
            .run_structured(&prompt, &input, &OracleOptions::default())
        {
            Ok(response) => serde_json::from_value(response.content)
                .unwrap_or_else(|_| stub_interpreter_output(player_input, ctx)),
            Err(_) => stub_interpreter_output(player_input, ctx),
        }
    }

    fn run_planner(&mut self, campaign_id: &str, ctx: &ContextPacket) -> PlannerOutput {
        let version = self.versions.get("planner").cloned();
        let prompt = self
            .registry
            .get_prompt("planner", version.as_deref(), Some(campaign_id));
        let Ok(prompt) = prompt else {
            return PlannerOutput::default();
        };
        let input = serde_json::json!({ "context": ctx });
        match self
            .oracle
            .run_structured(&prompt, &input, &OracleOptions::default())
        {
            Ok(response) => serde_json::from_value(response.content).unwrap_or_default(),
            Err(_) => PlannerOutput::default(),
        }
    }

    fn run_narrator(
        &mut self,
        campaign_id: &str,
        ctx: &ContextPacket,
        resolved: &ResolverOutput,
        triggers: &[String],
    ) -> NarratorOutput {
        let version = self.versions.get("narrator").cloned();
        let prompt = self
            .registry
            .get_prompt("narrator", version.as_deref(), Some(campaign_id));
        let Ok(prompt) = prompt else {
            return stub_narrator_output(&resolved.engine_events, triggers);
        };
        let input = serde_json::json!({
            "context": ctx,
            "engine_events": resolved.engine_events,
            "rolls": resolved.rolls,
            "triggers": triggers,
        });
        match self
            .oracle
            .run_structured(&prompt, &input, &OracleOptions::default())
        {
            Ok(response) => serde_json::from_value::<NarratorOutput>(response.content)
                .ok()
                .filter(|output| !output.final_text.is_empty())
                .unwrap_or_else(|| stub_narrator_output(&resolved.engine_events, triggers)),
            Err(_) => stub_narrator_output(&resolved.engine_events, triggers),
        }
    }

    /// Advance fictional scene time by the resolved duration, wrapping past
    /// midnight, and merge the new time into the pending scene update.
    /// Returns the new period name when the period changed.
    fn advance_scene_time(
        &self,
        ctx: &ContextPacket,
        minutes: i64,
        resolved: &mut ResolverOutput,
    ) -> Option<String> {
        if minutes <= 0 || ctx.scene.location_id.is_empty() {
            return None;
        }

        let old = &ctx.scene.time;
        let total_minutes = old.minute as i64 + minutes;
        let new_minute = (total_minutes % 60) as u32;
        let new_hour = ((old.hour as i64 + total_minutes / 60) % 24) as u32;
        let new_period = Period::from_hour(new_hour);

        let new_time = SceneTime {
            hour: new_hour,
            minute: new_minute,
            period: new_period,
            weather: old.weather.clone(),
        };
        if let Ok(time_value) = serde_json::to_value(&new_time) {
            resolved
                .state_diff
                .scene_update
                .insert("time".to_string(), time_value);
        }

        (new_period != old.period).then(|| new_period.as_str().to_string())
    }

    fn campaign_lock(&self, campaign_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .commit_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(campaign_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

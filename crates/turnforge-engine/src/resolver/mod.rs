mod effects;
mod situations;
mod streak;

use std::collections::BTreeMap;

use turnforge_types::{
    BotchDetails, ContextPacket, EngineEvent, Entity, Fact, FailureDetails, InventoryRow, Outcome,
    PartialDetails, PlannerOutput, ProposedAction, RollResult, StateDiff, SuccessDetails,
    ValidatorOutput,
};
use turnforge_types::{ActionOutcomeKind, ClockAdvancedDetails, ClockDelta, DeltaSource, NpcActionDetails};

use crate::dice::{roll_for_system, ForcedDice};
use crate::{
    compute_severity_tier, load_clock_config, load_system_config, resolve_duration, ClockConfig,
    SystemConfig,
};

pub use situations::{clear_conditions_for, condition_for_action};

/// Entity id of the player character.
pub const PLAYER_ID: &str = "player";

const SAFE_ACTIONS: [&str; 27] = [
    "look", "examine", "observe", "listen", "wait", "think", "remember", "talk", "ask", "say",
    "search", "investigate", "read", "check", "assess", "use", "take", "grab", "pickup", "drop",
    "give", "put", "open", "close", "move", "go", "enter",
];

const RISKY_ACTIONS: [&str; 15] = [
    "attack",
    "fight",
    "combat",
    "shoot",
    "steal",
    "hack",
    "sneak",
    "climb",
    "jump",
    "chase",
    "persuade",
    "intimidate",
    "deceive",
    "negotiate",
    "provoke",
];

/// Read-only world view the resolver consults for discovery gathering and
/// hidden-fact reveals. The store implements this over the full (unfiltered)
/// world; a context packet implements it over what the player already sees.
pub trait WorldQuery {
    fn entity(&self, id: &str) -> Option<Entity>;
    fn facts_for_subject(&self, subject_id: &str) -> Vec<Fact>;
    fn inventory_for(&self, owner_id: &str) -> Vec<InventoryRow>;
}

impl WorldQuery for ContextPacket {
    fn entity(&self, id: &str) -> Option<Entity> {
        ContextPacket::entity(self, id).cloned()
    }

    fn facts_for_subject(&self, subject_id: &str) -> Vec<Fact> {
        self.facts_for_subject(subject_id).cloned().collect()
    }

    fn inventory_for(&self, owner_id: &str) -> Vec<InventoryRow> {
        ContextPacket::inventory_for(self, owner_id).cloned().collect()
    }
}

/// Resolution options: forced dice for deterministic tests and replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOptions {
    pub force_roll: Option<i64>,
    pub force_pool: Option<Vec<u32>>,
    pub difficulty_override: Option<u32>,
}

impl ResolveOptions {
    fn forced_dice(&self) -> ForcedDice {
        ForcedDice {
            roll: self.force_roll,
            pool: self.force_pool.clone(),
            difficulty: self.difficulty_override,
        }
    }
}

/// Output of the resolver stage for one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverOutput {
    pub engine_events: Vec<EngineEvent>,
    pub state_diff: StateDiff,
    pub rolls: Vec<RollResult>,
    pub total_estimated_minutes: i64,
}

/// Resolves validated actions into concrete outcomes.
///
/// Responsibilities:
/// - apply costs from the validator (they happen regardless of outcome)
/// - roll dice when outcomes are uncertain
/// - map outcomes to events and state-diff effects
/// - create/upgrade/clear situation facts
/// - apply severity-tiered failure consequences
/// - track failure streaks and resolve binding threats at the threshold
///
/// The resolver never raises for in-world reasons; unreachable actions were
/// already filtered by the validator.
pub struct Resolver<'a> {
    world: &'a dyn WorldQuery,
}

impl<'a> Resolver<'a> {
    pub fn new(world: &'a dyn WorldQuery) -> Self {
        Self { world }
    }

    pub fn resolve(
        &self,
        ctx: &ContextPacket,
        validator_output: &ValidatorOutput,
        planner_output: &PlannerOutput,
        options: &ResolveOptions,
    ) -> ResolverOutput {
        let clock_config = load_clock_config(&ctx.system);
        let system_config = load_system_config(&ctx.system);

        let mut engine_events = Vec::new();
        let mut rolls = Vec::new();
        let mut state_diff = StateDiff::default();

        // Costs first: they are paid regardless of how the dice land.
        if clock_config.enabled {
            state_diff = state_diff.merge(apply_costs(&validator_output.costs, &clock_config));
        }

        let actions = dedupe_actions(&validator_output.allowed_actions);

        let mut total_estimated_minutes = 0;
        let mut outcomes: Vec<ActionOutcomeKind> = Vec::new();
        for action in &actions {
            total_estimated_minutes += resolve_duration(action, &clock_config);
            let (action_events, action_rolls, action_diff) = self.resolve_action(
                action,
                ctx,
                &validator_output.risk_flags,
                options,
                &clock_config,
                &system_config,
            );
            outcomes.extend(action_events.iter().filter_map(EngineEvent::action_outcome));
            engine_events.extend(action_events);
            rolls.extend(action_rolls);
            state_diff = state_diff.merge(action_diff);
        }

        if !planner_output.tension_move.is_empty() {
            let (tension_events, tension_diff) =
                apply_tension_move(&planner_output.tension_move, &clock_config);
            engine_events.extend(tension_events);
            state_diff = state_diff.merge(tension_diff);
        }

        if !outcomes.is_empty() {
            let (streak_events, streak_diff) =
                streak::check_failure_streak(&outcomes, ctx, &clock_config);
            engine_events.extend(streak_events);
            state_diff = state_diff.merge(streak_diff);
        }

        ResolverOutput {
            engine_events,
            state_diff,
            rolls,
            total_estimated_minutes,
        }
    }

    fn resolve_action(
        &self,
        action: &ProposedAction,
        ctx: &ContextPacket,
        risk_flags: &[String],
        options: &ResolveOptions,
        clock_config: &ClockConfig,
        system_config: &SystemConfig,
    ) -> (Vec<EngineEvent>, Vec<RollResult>, StateDiff) {
        let mut events = Vec::new();
        let mut rolls = Vec::new();
        let mut diff = StateDiff::default();

        let action_type = action.action.to_lowercase();
        let target_id = action.target_id.clone();
        let estimated_minutes = resolve_duration(action, clock_config);

        let outcome = if needs_roll(&action_type, risk_flags, system_config) {
            let stats = entity_stats(ctx);
            let mut roll =
                roll_for_system(system_config, &action_type, &stats, &options.forced_dice());
            roll.action = action_type.clone();
            let outcome = roll.outcome;
            rolls.push(roll);
            outcome
        } else {
            // Auto-success for non-risky actions.
            Outcome::Success
        };

        match outcome {
            Outcome::Success | Outcome::Critical => {
                let mut details = SuccessDetails {
                    action: action_type.clone(),
                    target_id: target_id.clone(),
                    description: action.details.clone(),
                    critical: outcome == Outcome::Critical,
                    outcome_state: describe_outcome_state(&action_type, &target_id, outcome),
                    estimated_minutes,
                    discoveries: None,
                };
                if matches!(action_type.as_str(), "search" | "investigate" | "examine")
                    && !target_id.is_empty()
                {
                    let discoveries = effects::gather_search_discoveries(self.world, &target_id);
                    if !discoveries.is_empty() {
                        details.discoveries = Some(discoveries);
                    }
                }
                events.push(EngineEvent::ActionSucceeded {
                    details,
                    tags: vec!["player_action".to_string()],
                });

                let action_diff =
                    effects::apply_success_effects(self.world, &action_type, &target_id, action);
                for change in &action_diff.relationship_changes {
                    events.push(EngineEvent::RelationshipChanged {
                        details: turnforge_types::RelationshipChangedDetails {
                            a_id: change.a_id.clone(),
                            b_id: change.b_id.clone(),
                            rel_type: change.rel_type.clone(),
                            delta: change.delta,
                        },
                        tags: vec!["social".to_string(), "relationship".to_string()],
                    });
                }
                diff = diff.merge(action_diff);

                events.extend(situations::clear_resolved_situations(
                    &action_type,
                    outcome,
                    ctx,
                    &mut diff,
                ));
            }
            Outcome::Mixed => {
                events.push(EngineEvent::ActionPartial {
                    details: PartialDetails {
                        action: action_type.clone(),
                        target_id: target_id.clone(),
                        description: action.details.clone(),
                        complication: generate_complication(&action_type),
                        mixed_state:
                            "Player succeeded but at a cost - describe both the success and the complication"
                                .to_string(),
                        estimated_minutes,
                    },
                    tags: vec!["player_action".to_string(), "complication".to_string()],
                });

                diff = diff.merge(effects::apply_mixed_effects(
                    self.world,
                    &action_type,
                    &target_id,
                    action,
                    ctx,
                    clock_config,
                ));

                // Partial success still counts for clearing situations.
                events.extend(situations::clear_resolved_situations(
                    &action_type,
                    outcome,
                    ctx,
                    &mut diff,
                ));
            }
            Outcome::Failure | Outcome::Botch => {
                let is_botch = outcome == Outcome::Botch;
                let mut severity_tier = compute_severity_tier(risk_flags, ctx);
                if is_botch {
                    severity_tier = severity_tier.max(2);
                }

                events.push(EngineEvent::ActionFailed {
                    details: FailureDetails {
                        action: action_type.clone(),
                        target_id: target_id.clone(),
                        description: action.details.clone(),
                        consequence: generate_consequence(ctx),
                        failure_state: describe_failure_state(&action_type, &target_id),
                        estimated_minutes,
                        severity_tier,
                        botch: is_botch,
                    },
                    tags: vec!["player_action".to_string(), "failure".to_string()],
                });
                if is_botch {
                    let (ones, pool_size) = rolls
                        .last()
                        .map(|r| (r.ones, r.pool_size))
                        .unwrap_or((0, 0));
                    events.push(EngineEvent::ActionBotched {
                        details: BotchDetails {
                            action: action_type.clone(),
                            target_id: target_id.clone(),
                            ones,
                            pool_size,
                        },
                        tags: vec!["player_action".to_string(), "botch".to_string()],
                    });
                }

                diff = diff.merge(effects::apply_failure_effects(
                    &action_type,
                    &target_id,
                    ctx,
                    clock_config,
                    severity_tier,
                ));

                if severity_tier >= 1 {
                    events.extend(situations::create_or_upgrade_situation(
                        &action_type,
                        &target_id,
                        severity_tier,
                        ctx,
                        system_config,
                        &mut diff,
                    ));
                }
            }
        }

        (events, rolls, diff)
    }
}

fn apply_costs(costs: &BTreeMap<String, i64>, clock_config: &ClockConfig) -> StateDiff {
    let mut diff = StateDiff::default();
    for clock_id in &clock_config.clocks_enabled {
        let delta = costs.get(clock_id).copied().unwrap_or(0);
        if delta != 0 {
            diff.clocks.push(ClockDelta {
                id: clock_id.clone(),
                delta: clock_config.apply_direction(clock_id, delta),
                source: DeltaSource::Cost,
            });
        }
    }
    diff
}

// Runaway interpreter plans get capped: no duplicate (action, target)
// pairs, at most two actions per turn.
fn dedupe_actions(actions: &[ProposedAction]) -> Vec<ProposedAction> {
    let mut seen = std::collections::BTreeSet::new();
    let mut out = Vec::new();
    for action in actions {
        let key = (action.action.to_lowercase(), action.target_id.to_lowercase());
        if seen.insert(key) {
            out.push(action.clone());
        }
        if out.len() >= 2 {
            break;
        }
    }
    out
}

/// Whether an action's outcome is uncertain enough to need dice.
fn needs_roll(action_type: &str, risk_flags: &[String], system_config: &SystemConfig) -> bool {
    let is_safe = if system_config.safe_actions.is_empty() {
        SAFE_ACTIONS.contains(&action_type) || matches!(action_type, "exit" | "walk")
    } else {
        system_config.safe_actions.contains(action_type)
    };

    // Risk flags from the interpreter override the safe classification.
    if is_safe {
        let risky_flagged = risk_flags
            .iter()
            .any(|flag| crate::RISKY_FLAGS.contains(&flag.as_str()));
        return risky_flagged;
    }

    let is_risky = if system_config.risky_actions.is_empty() {
        RISKY_ACTIONS.contains(&action_type)
    } else {
        system_config.risky_actions.contains(action_type)
    };
    if is_risky {
        return true;
    }

    // Unknown verbs default to uncertain.
    true
}

fn entity_stats(ctx: &ContextPacket) -> BTreeMap<String, i64> {
    let player = ctx
        .entity(PLAYER_ID)
        .or_else(|| ctx.entities.iter().find(|e| e.kind == turnforge_types::EntityKind::Pc));
    player
        .and_then(|p| p.attrs.get("stats"))
        .and_then(|stats| stats.as_object())
        .map(|stats| {
            stats
                .iter()
                .filter_map(|(k, v)| v.as_i64().map(|n| (k.clone(), n)))
                .collect()
        })
        .unwrap_or_default()
}

fn apply_tension_move(
    tension_move: &str,
    clock_config: &ClockConfig,
) -> (Vec<EngineEvent>, StateDiff) {
    let mut events = Vec::new();
    let mut diff = StateDiff::default();

    let matched = if clock_config.enabled {
        clock_config.tension_clock(tension_move).map(str::to_string)
    } else {
        None
    };

    match matched {
        Some(clock_id) => {
            diff.clocks.push(ClockDelta {
                id: clock_id.clone(),
                delta: clock_config.apply_direction(&clock_id, 1),
                source: DeltaSource::Tension,
            });
            events.push(EngineEvent::ClockAdvanced {
                details: ClockAdvancedDetails {
                    clock: clock_id,
                    reason: tension_move.to_string(),
                },
                tags: vec!["tension".to_string(), "gm_move".to_string()],
            });
        }
        None => {
            events.push(EngineEvent::NpcAction {
                details: NpcActionDetails {
                    description: tension_move.to_string(),
                },
                tags: vec!["tension".to_string(), "gm_move".to_string()],
            });
        }
    }

    (events, diff)
}

/// What the outcome means in concrete terms for the narrator.
fn describe_outcome_state(action_type: &str, target_id: &str, outcome: Outcome) -> String {
    let base = match action_type {
        "sneak" => "Player is undetected and in a concealed position".to_string(),
        "hide" => "Player is hidden from view".to_string(),
        "climb" => "Player has reached the higher/lower position".to_string(),
        "move" => "Player has relocated successfully".to_string(),
        "flee" => "Player has escaped the immediate threat".to_string(),
        "chase" => "Player is gaining/closing distance".to_string(),
        "persuade" => format!("Target {} is convinced and willing to cooperate", target_id),
        "intimidate" => format!("Target {} is frightened and backing down", target_id),
        "deceive" => format!("Target {} believes the deception", target_id),
        "hack" => format!("Player has access to {}'s systems", target_id),
        "steal" => "Player has taken the item without being noticed".to_string(),
        "search" => format!("Player has thoroughly examined {}", target_id),
        "investigate" => format!("Player has gathered information from {}", target_id),
        _ => format!("Player's {} on {} succeeded", action_type, target_id),
    };
    if outcome == Outcome::Critical {
        format!("{} - exceptionally well", base)
    } else {
        base
    }
}

/// What failure means in concrete terms for the narrator.
pub(crate) fn describe_failure_state(action_type: &str, target_id: &str) -> String {
    match action_type {
        "sneak" => "Player's sneak attempt was detected - they are now exposed".to_string(),
        "hide" => "Player failed to find cover - they are visible".to_string(),
        "climb" => "Player couldn't make the climb - still at original position".to_string(),
        "move" => "Player was unable to reach their destination".to_string(),
        "flee" => "Player failed to escape - still trapped".to_string(),
        "chase" => "Player lost ground in the pursuit".to_string(),
        "persuade" => format!("Target {} is unconvinced and may be more guarded", target_id),
        "intimidate" => format!("Target {} is unimpressed and may be hostile", target_id),
        "deceive" => format!("Target {} saw through the deception", target_id),
        "hack" => format!(
            "Player failed to breach {}'s systems - may have triggered alerts",
            target_id
        ),
        "steal" => "Player's theft attempt was noticed".to_string(),
        "search" => format!("Player found nothing useful on {}", target_id),
        "investigate" => format!("Player's investigation of {} came up empty", target_id),
        _ => format!("Player's {} on {} failed", action_type, target_id),
    }
}

fn generate_complication(action_type: &str) -> String {
    let options: &[&str] = match action_type {
        "attack" | "fight" | "shoot" => {
            &["You're exposed", "Weapon jammed", "They called for backup"]
        }
        "talk" | "persuade" | "negotiate" => {
            &["They're suspicious now", "Someone overheard", "It'll cost you"]
        }
        "sneak" | "steal" | "hide" => &[
            "You left evidence",
            "Someone noticed",
            "Took longer than expected",
        ],
        "investigate" | "search" | "examine" => &[
            "Incomplete information",
            "Trail goes cold",
            "Someone knows you're asking",
        ],
        _ => &[
            "An unexpected complication",
            "Things got messy",
            "Not quite what you hoped",
        ],
    };
    pick(options)
}

fn generate_consequence(ctx: &ContextPacket) -> String {
    let options: &[&str] = match ctx.calibration.risk.lethality {
        turnforge_types::Lethality::Low => &["Setback", "Lost opportunity", "Minor trouble"],
        turnforge_types::Lethality::Brutal => {
            &["Serious harm", "Major exposure", "Everything goes wrong"]
        }
        turnforge_types::Lethality::Moderate => {
            &["Things get worse", "Unwanted attention", "A real problem"]
        }
    };
    pick(options)
}

fn pick(options: &[&str]) -> String {
    use rand::seq::SliceRandom;
    options
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("")
        .to_string()
}

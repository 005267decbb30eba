use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use turnforge_types::{
    BlockReason, BlockedAction, ContextPacket, InterpreterOutput, Lethality, ProposedAction,
    ValidatorOutput,
};

use crate::{load_clock_config, load_system_config, ClockConfig, SystemConfig};

// Targets that represent the general environment, not specific entities.
const META_TARGETS: [&str; 7] = [
    "scene",
    "environment",
    "area",
    "surroundings",
    "room",
    "self",
    "player",
];

const ENVIRONMENT_ACTIONS: [&str; 34] = [
    "knock", "bang", "push", "pull", "open", "close", "climb", "jump", "touch", "use", "enter",
    "exit", "hide", "lean", "sit", "stand", "crouch", "run", "move", "go", "walk", "look",
    "listen", "wait", "yell", "shout", "call", "signal", "drop", "throw", "toss", "discard",
    "sneak", "dodge",
];

const INTERACTIVE_ACTIONS: [&str; 8] = [
    "talk", "ask", "speak", "persuade", "intimidate", "bribe", "trade", "give",
];

/// Validate interpreter output against game rules.
///
/// Rules enforced, in order per action: target resolution, perception,
/// presence, inventory requirements, contradictions, then cost assignment.
/// A turn where every action was blocked for a perception-class reason
/// produces a clarification question instead of a resolution.
pub fn validate(interpreter_output: &InterpreterOutput, ctx: &ContextPacket) -> ValidatorOutput {
    let clock_config = load_clock_config(&ctx.system);
    let system_config = load_system_config(&ctx.system);

    let mut total_costs: BTreeMap<String, i64> = if clock_config.enabled {
        clock_config
            .clocks_enabled
            .iter()
            .map(|c| (c.clone(), 0))
            .collect()
    } else {
        BTreeMap::new()
    };

    // The interpreter may flag entities by name; only entities that remain
    // unresolvable to something present stay flagged.
    let flagged_entities: BTreeSet<String> = interpreter_output
        .perception_flags
        .iter()
        .map(|pf| resolve_target_id(&pf.entity_id, ctx))
        .filter(|resolved| !ctx.is_present(resolved))
        .collect();

    let mut allowed_actions = Vec::new();
    let mut blocked_actions = Vec::new();

    for action in &interpreter_output.proposed_actions {
        match validate_action(action, ctx, &flagged_entities, &clock_config, &system_config) {
            Ok((resolved, costs)) => {
                for (clock, amount) in costs {
                    *total_costs.entry(clock).or_insert(0) += amount;
                }
                allowed_actions.push(resolved);
            }
            Err(blocked) => blocked_actions.push(blocked),
        }
    }

    let mut clarification_needed = false;
    let mut clarification_question = String::new();
    if allowed_actions.is_empty() && !blocked_actions.is_empty() {
        let perception_blocks: Vec<&BlockedAction> = blocked_actions
            .iter()
            .filter(|b| b.reason.is_perception_class())
            .collect();
        if !perception_blocks.is_empty() {
            clarification_needed = true;
            clarification_question = generate_clarification(&perception_blocks);
        }
    }

    ValidatorOutput {
        allowed_actions,
        blocked_actions,
        clarification_needed,
        clarification_question,
        costs: total_costs,
        risk_flags: interpreter_output.risk_flags.clone(),
    }
}

/// Resolve a target reference to an entity id.
///
/// The interpreter may hand back names instead of ids: try a direct id
/// match, then case-insensitive exact name, then substring name.
fn resolve_target_id(target_id: &str, ctx: &ContextPacket) -> String {
    if target_id.is_empty() {
        return String::new();
    }
    if ctx.entity(target_id).is_some() {
        return target_id.to_string();
    }
    let target_lower = target_id.to_lowercase();
    if let Some(entity) = ctx
        .entities
        .iter()
        .find(|e| e.name.to_lowercase() == target_lower)
    {
        return entity.id.clone();
    }
    if let Some(entity) = ctx
        .entities
        .iter()
        .find(|e| e.name.to_lowercase().contains(&target_lower))
    {
        return entity.id.clone();
    }
    target_id.to_string()
}

fn validate_action(
    action: &ProposedAction,
    ctx: &ContextPacket,
    flagged_entities: &BTreeSet<String>,
    clock_config: &ClockConfig,
    system_config: &SystemConfig,
) -> Result<(ProposedAction, BTreeMap<String, i64>), BlockedAction> {
    let action_type = action.action.to_lowercase();
    let target_id = resolve_target_id(&action.target_id, ctx);
    let is_meta = META_TARGETS.contains(&target_id.to_lowercase().as_str());

    let block = |reason: BlockReason, message: String| BlockedAction {
        action: action_type.clone(),
        target_id: target_id.clone(),
        reason,
        message,
    };

    // Perception: flagged by the interpreter and still not present.
    if !is_meta && !target_id.is_empty() && flagged_entities.contains(&target_id) {
        return Err(block(
            BlockReason::NotPerceivable,
            format!("Target '{}' is not perceivable", target_id),
        ));
    }

    if !target_id.is_empty() && !is_meta {
        let in_inventory = ctx.inventory.iter().any(|row| row.item_id == target_id);
        let is_known_entity = ctx.entity(&target_id).is_some();
        let is_location = ctx.scene.location_id == target_id;

        let target_known =
            ctx.is_present(&target_id) || in_inventory || is_known_entity || is_location;

        if !target_known {
            let target_lower = target_id.to_lowercase().replace("unknown_", "");
            let feature_match = scene_features(ctx).iter().any(|f| {
                let f = f.to_lowercase();
                f.contains(&target_lower) || target_lower.contains(&f)
            });
            let fact_match = ctx.facts.iter().any(|f| {
                f.predicate == "narrator_established"
                    && value_to_search_string(&f.object).contains(&target_lower)
            });

            if !feature_match && !fact_match && !is_environment_action(&action_type) {
                return Err(block(
                    BlockReason::UnknownEntity,
                    format!("Unknown entity: '{}'", target_id),
                ));
            }
        } else if !ctx.is_present(&target_id) && !in_inventory && !is_location && is_known_entity {
            return Err(block(
                BlockReason::NotPresent,
                format!("Target '{}' is not present in the current scene", target_id),
            ));
        }
    }

    // Inventory requirements for actions that need items.
    for (item_id, qty_needed) in inventory_requirements(&action_type, system_config) {
        let have: i64 = ctx
            .inventory
            .iter()
            .filter(|row| row.item_id == item_id)
            .map(|row| row.qty)
            .sum();
        if have < qty_needed {
            return Err(block(
                BlockReason::MissingItem,
                format!("Missing required item: '{}'", item_id),
            ));
        }
    }

    if let Some(message) = check_contradictions(&action_type, &target_id, ctx) {
        return Err(block(BlockReason::Contradiction, message));
    }

    let costs = calculate_costs(&action_type, ctx, clock_config);

    Ok((
        ProposedAction {
            action: action_type,
            target_id,
            details: action.details.clone(),
            estimated_minutes: action.estimated_minutes,
        },
        costs,
    ))
}

fn scene_features(ctx: &ContextPacket) -> Vec<String> {
    ctx.entity(&ctx.scene.location_id)
        .and_then(|location| location.attrs.get("features"))
        .and_then(Value::as_array)
        .map(|features| {
            features
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn value_to_search_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

fn is_environment_action(action_type: &str) -> bool {
    ENVIRONMENT_ACTIONS.contains(&action_type)
        || matches!(action_type, "duck" | "crawl")
}

fn inventory_requirements(
    action_type: &str,
    system_config: &SystemConfig,
) -> BTreeMap<String, i64> {
    if !system_config.inventory_requirements.is_empty() {
        return system_config
            .inventory_requirements
            .get(action_type)
            .cloned()
            .unwrap_or_default();
    }
    match action_type {
        "shoot" => BTreeMap::from([("weapon".to_string(), 1), ("ammo".to_string(), 1)]),
        "unlock" => BTreeMap::from([("lockpick".to_string(), 1)]),
        _ => BTreeMap::new(),
    }
}

fn check_contradictions(action_type: &str, target_id: &str, ctx: &ContextPacket) -> Option<String> {
    if !target_id.is_empty() && INTERACTIVE_ACTIONS.contains(&action_type) {
        for fact in ctx.facts_for_subject(target_id) {
            if fact.predicate == "status" {
                if let Some(status) = fact.object.as_str() {
                    if status == "dead" || status == "destroyed" {
                        return Some(format!(
                            "Cannot {} '{}': they are {}",
                            action_type, target_id, status
                        ));
                    }
                }
            }
        }
    }

    if ctx.scene.constraint_flag("no_violence")
        && matches!(action_type, "attack" | "combat" | "violence" | "shoot")
    {
        return Some("Violence is not possible in this location".to_string());
    }
    if ctx.scene.constraint_flag("no_magic") && matches!(action_type, "cast" | "spell" | "magic") {
        return Some("Magic does not work in this location".to_string());
    }

    None
}

fn calculate_costs(
    action_type: &str,
    ctx: &ContextPacket,
    clock_config: &ClockConfig,
) -> BTreeMap<String, i64> {
    if !clock_config.enabled {
        return BTreeMap::new();
    }
    let mut costs = clock_config.cost_for(action_type);

    match ctx.calibration.risk.lethality {
        Lethality::Low => {
            if let Some(harm) = costs.get_mut("harm") {
                *harm = (*harm - 1).max(0);
            }
        }
        Lethality::Brutal => {
            for cost in costs.values_mut() {
                *cost = *cost * 3 / 2;
            }
        }
        Lethality::Moderate => {}
    }

    costs
}

fn generate_clarification(blocked: &[&BlockedAction]) -> String {
    if blocked.len() == 1 {
        return "You don't see anything like that here. What are you trying to interact with?"
            .to_string();
    }
    "Some of your intended actions aren't clear. Could you describe what you're trying to accomplish?"
        .to_string()
}

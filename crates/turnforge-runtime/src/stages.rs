use turnforge_types::{
    ContextPacket, EngineEvent, InterpreterOutput, NarratorOutput, ProposedAction,
};

// Keyword table for the fallback interpreter. Order matters: the first
// matching group classifies the input.
const STUB_VERBS: &[(&str, &[&str], &[&str])] = &[
    ("attack", &["attack", "fight", "hit", "strike", "shoot", "punch"], &["violence"]),
    ("sneak", &["sneak", "hide", "creep"], &["dangerous"]),
    ("investigate", &["search", "investigate", "inspect"], &[]),
    ("talk", &["talk", "speak", "ask", "greet", "say"], &[]),
    ("take", &["take", "grab", "pick up"], &[]),
    ("move", &["go to", "walk", "enter", "leave", "head "], &[]),
    ("examine", &["look", "examine", "observe", "check"], &[]),
];

/// Keyword-classified intent used when the interpreter oracle fails, times
/// out, or returns something undecodable. Crude but safe: it only proposes
/// actions the validator will vet anyway.
pub fn stub_interpreter_output(player_input: &str, ctx: &ContextPacket) -> InterpreterOutput {
    let input = player_input.to_lowercase();

    let (action, risk_flags) = STUB_VERBS
        .iter()
        .find(|(_, keywords, _)| keywords.iter().any(|kw| input.contains(kw)))
        .map(|(action, _, flags)| (*action, flags.iter().map(|f| f.to_string()).collect()))
        .unwrap_or(("examine", Vec::new()));

    // Target whichever present entity the player named, else the scene.
    let target_id = ctx
        .present_entities
        .iter()
        .filter_map(|id| ctx.entity(id))
        .find(|entity| {
            entity.id != turnforge_engine::PLAYER_ID
                && (input.contains(&entity.name.to_lowercase())
                    || input.contains(&entity.id.to_lowercase()))
        })
        .map(|entity| entity.id.clone())
        .unwrap_or_else(|| "scene".to_string());

    let mut proposed = ProposedAction::new(action, target_id);
    proposed.details = player_input.trim().to_string();

    InterpreterOutput {
        intent: format!("{} ({})", action, player_input.trim()),
        referenced_entities: vec![proposed.target_id.clone()],
        proposed_actions: vec![proposed],
        assumptions: vec!["keyword fallback interpretation".to_string()],
        risk_flags,
        perception_flags: vec![],
    }
}

/// Plain-text narration assembled from engine events, used when the
/// narrator oracle is unavailable.
pub fn stub_narrator_output(engine_events: &[EngineEvent], triggers: &[String]) -> NarratorOutput {
    let mut lines: Vec<String> = Vec::new();

    for event in engine_events {
        match event {
            EngineEvent::ActionSucceeded { details, .. } => {
                let mut line = format!(
                    "You successfully {} {}.",
                    details.action,
                    readable_target(&details.target_id)
                );
                if details.critical {
                    line.push_str(" It goes better than you hoped.");
                }
                lines.push(line);
            }
            EngineEvent::ActionPartial { details, .. } => {
                lines.push(format!(
                    "You manage to {} {}, but: {}.",
                    details.action,
                    readable_target(&details.target_id),
                    details.complication.to_lowercase()
                ));
            }
            EngineEvent::ActionFailed { details, .. } => {
                lines.push(format!("{}.", details.failure_state.trim_end_matches('.')));
            }
            EngineEvent::ActionBotched { .. } => {
                lines.push("It goes badly wrong.".to_string());
            }
            EngineEvent::SituationCreated { details, .. } => {
                lines.push(format!("{}.", details.narrative_hint.trim_end_matches('.')));
            }
            EngineEvent::SituationCleared { details, .. } => {
                lines.push(format!("You are no longer {}.", details.condition));
            }
            EngineEvent::ClockAdvanced { details, .. } => {
                lines.push(format!("Pressure mounts: {}.", details.reason));
            }
            EngineEvent::NpcAction { details, .. } => {
                lines.push(format!("{}.", details.description.trim_end_matches('.')));
            }
            EngineEvent::FailureStreakWarning { .. } => {
                lines.push("You can feel the net closing. One more slip will cost you.".to_string());
            }
            EngineEvent::ThreatResolvedAgainstPlayer { details, .. } => {
                lines.push(format!("{}.", details.consequence_description.trim_end_matches('.')));
            }
            EngineEvent::RelationshipChanged { .. } => {}
        }
    }

    for trigger in triggers {
        lines.push(format!("{}.", trigger.trim_end_matches('.')));
    }

    if lines.is_empty() {
        lines.push("The moment passes. What do you do?".to_string());
    }

    NarratorOutput {
        final_text: lines.join(" "),
        next_prompt: "what_do_you_do".to_string(),
        suggested_actions: vec!["look around".to_string(), "wait".to_string()],
    }
}

fn readable_target(target_id: &str) -> String {
    if target_id.is_empty() || target_id == "scene" {
        "your surroundings".to_string()
    } else {
        target_id.replace('_', " ")
    }
}

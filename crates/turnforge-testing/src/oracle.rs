use serde_json::{json, Value};

/// Scripted interpreter content for a single proposed action.
pub fn scripted_intent(action: &str, target_id: &str, risk_flags: &[&str]) -> Value {
    json!({
        "intent": format!("{} {}", action, target_id),
        "referenced_entities": [target_id],
        "proposed_actions": [
            {"action": action, "target_id": target_id, "details": format!("{} attempt", action)}
        ],
        "assumptions": [],
        "risk_flags": risk_flags,
        "perception_flags": [],
    })
}

/// Scripted narrator content.
pub fn scripted_narration(final_text: &str) -> Value {
    json!({
        "final_text": final_text,
        "next_prompt": "what_do_you_do",
        "suggested_actions": ["look around", "talk"],
    })
}

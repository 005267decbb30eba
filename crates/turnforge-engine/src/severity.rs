use turnforge_types::{ContextPacket, SituationSeverity};

/// Risk flags that mark an action as genuinely dangerous.
pub const RISKY_FLAGS: [&str; 5] = [
    "violence",
    "contested",
    "dangerous",
    "pursuit",
    "hostile_present",
];

/// Whether an active threat bears on the player right now: a pending GM
/// threat, a high/extreme NPC in scene, or a hard situation in force.
pub fn has_active_threat(ctx: &ContextPacket) -> bool {
    if !ctx.pending_threats.is_empty() {
        return true;
    }
    if ctx
        .npc_capabilities
        .iter()
        .any(|npc| npc.threat_level.is_active_threat())
    {
        return true;
    }
    ctx.active_situations
        .iter()
        .any(|sit| sit.severity == SituationSeverity::Hard)
}

/// Severity tier for a failure.
///
/// Tier 0: no risk flags, no threats. Tier 1: risky flags but no active
/// threat. Tier 2: an active threat, regardless of flags.
pub fn compute_severity_tier(risk_flags: &[String], ctx: &ContextPacket) -> u8 {
    if has_active_threat(ctx) {
        return 2;
    }
    let has_risky = risk_flags
        .iter()
        .any(|flag| RISKY_FLAGS.contains(&flag.as_str()));
    if has_risky {
        1
    } else {
        0
    }
}

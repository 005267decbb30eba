use turnforge_types::ProposedAction;

use crate::ClockConfig;

/// Fictional duration in minutes for an action.
///
/// A plausible interpreter estimate (1..=120) wins; otherwise the campaign's
/// duration map decides, bottoming out at 5 minutes.
pub fn resolve_duration(action: &ProposedAction, clock_config: &ClockConfig) -> i64 {
    if let Some(est) = action.estimated_minutes {
        if (1..=120).contains(&est) {
            return est;
        }
    }
    clock_config.default_duration(&action.action)
}

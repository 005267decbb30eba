// Engine module - the deterministic rules core of the turn pipeline.
// Validator and resolver are pure over the context packet plus a read-only
// world view; all I/O lives in the store and runtime layers.

mod clock_config;
mod dice;
mod duration;
mod resolver;
mod severity;
mod system_config;
mod validator;

pub use clock_config::{
    cyberpunk_noir_clock_rules, load_clock_config, ClockConfig, ClockEffect, Direction,
    FailureSeverityConfig,
};
pub use dice::{roll_2d6, roll_dice_pool, roll_for_system, DiceSystem, ForcedDice};
pub use duration::resolve_duration;
pub use resolver::{
    clear_conditions_for, condition_for_action, ResolveOptions, Resolver, ResolverOutput,
    WorldQuery, PLAYER_ID,
};
pub use severity::{compute_severity_tier, has_active_threat, RISKY_FLAGS};
pub use system_config::{
    load_system_config, mage_ascension_resolution_rules, Bands, DiceMethod, DifficultyConfig,
    PoolThresholds, ResolutionConfig, StatPair, StatSchema, SystemConfig, WillpowerConfig,
};
pub use validator::validate;

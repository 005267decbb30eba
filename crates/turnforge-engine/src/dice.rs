use rand::Rng;
use std::collections::BTreeMap;

use turnforge_types::{Outcome, RollResult};

use crate::{Bands, PoolThresholds, SystemConfig};

/// The resolution algorithm as a closed variant. All dice branching lives in
/// this module; callers go through [`roll_for_system`].
#[derive(Debug, Clone, PartialEq)]
pub enum DiceSystem {
    Band2d6 {
        bands: Bands,
    },
    DicePool {
        die: u32,
        ones_cancel: bool,
        botch: bool,
        threshold_past_9: bool,
        thresholds: PoolThresholds,
    },
}

impl SystemConfig {
    /// The dice variant this system resolves with.
    pub fn dice_system(&self) -> DiceSystem {
        if self.is_dice_pool() {
            DiceSystem::DicePool {
                die: self.resolution.die_type,
                ones_cancel: self.resolution.ones_cancel_successes,
                botch: self.resolution.botch_on_ones,
                threshold_past_9: self.resolution.threshold_past_9,
                thresholds: self.resolution.pool_outcome_thresholds,
            }
        } else {
            DiceSystem::Band2d6 {
                bands: self.resolution.bands,
            }
        }
    }
}

/// Roll 2d6 and map the sum into outcome bands.
///
/// Forced totals are honored exactly and distributed across the two dice.
pub fn roll_2d6(bands: &Bands, forced_total: Option<i64>) -> RollResult {
    let (raw_values, total) = match forced_total {
        Some(total) => {
            let d1 = (total / 2).clamp(1, 6);
            let d2 = total - d1;
            (vec![d1 as u32, d2 as u32], total)
        }
        None => {
            let mut rng = rand::thread_rng();
            let d1: i64 = rng.gen_range(1..=6);
            let d2: i64 = rng.gen_range(1..=6);
            (vec![d1 as u32, d2 as u32], d1 + d2)
        }
    };

    let (outcome, margin) = if total <= bands.failure[1] {
        (Outcome::Failure, bands.mixed[0] - total)
    } else if total <= bands.mixed[1] {
        (Outcome::Mixed, 0)
    } else if total >= bands.critical[0] {
        (Outcome::Critical, total - bands.success[0])
    } else {
        (Outcome::Success, total - bands.success[0])
    };

    RollResult {
        dice: "2d6".to_string(),
        raw_values,
        total,
        outcome,
        margin,
        action: String::new(),
        pool_size: 0,
        successes: 0,
        ones: 0,
        difficulty: 0,
        stat_pair: String::new(),
    }
}

/// Roll a dice pool of `attribute + ability` dice (minimum 1).
///
/// Raw successes are dice at or above the difficulty. When ones-cancel is
/// on, each 1 removes one success (floored at zero). When threshold-past-9
/// is on and difficulty exceeds 9, `difficulty - 9` further successes are
/// removed. A botch is zero net successes with at least one 1 rolled and no
/// raw successes before cancellation.
pub fn roll_dice_pool(
    config: &SystemConfig,
    action_type: &str,
    stats: &BTreeMap<String, i64>,
    forced_pool: Option<&[u32]>,
    difficulty_override: Option<u32>,
) -> RollResult {
    let (attribute, ability) = config.stat_pair(action_type);
    let stat_pool = stats.get(&attribute).copied().unwrap_or(0)
        + stats.get(&ability).copied().unwrap_or(0);
    let die = config.resolution.die_type.max(2);
    let difficulty = difficulty_override.unwrap_or(config.difficulty.default);

    let raw_values: Vec<u32> = match forced_pool {
        // Forced dice determine the pool size regardless of stats.
        Some(values) => values.to_vec(),
        None => {
            let pool = stat_pool.max(1) as usize;
            let mut rng = rand::thread_rng();
            (0..pool).map(|_| rng.gen_range(1..=die)).collect()
        }
    };
    let pool_size = raw_values.len();

    let raw_successes = raw_values.iter().filter(|&&v| v >= difficulty).count() as u32;
    let ones = raw_values.iter().filter(|&&v| v == 1).count() as u32;

    let mut net = raw_successes;
    if config.resolution.ones_cancel_successes {
        net = net.saturating_sub(ones);
    }
    if config.resolution.threshold_past_9 && difficulty > 9 {
        net = net.saturating_sub(difficulty - 9);
    }

    let thresholds = config.resolution.pool_outcome_thresholds;
    let is_botch =
        config.resolution.botch_on_ones && net == 0 && ones > 0 && raw_successes == 0;
    let outcome = if is_botch {
        Outcome::Botch
    } else if net >= thresholds.critical {
        Outcome::Critical
    } else if net >= thresholds.success {
        Outcome::Success
    } else if net >= thresholds.mixed {
        Outcome::Mixed
    } else {
        Outcome::Failure
    };

    RollResult {
        dice: format!("{}d{}", pool_size, die),
        raw_values,
        total: net as i64,
        outcome,
        margin: net as i64 - thresholds.success as i64,
        action: String::new(),
        pool_size,
        successes: net,
        ones,
        difficulty,
        stat_pair: format!("{}+{}", attribute, ability),
    }
}

/// Forced-result knobs for deterministic testing and replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForcedDice {
    pub roll: Option<i64>,
    pub pool: Option<Vec<u32>>,
    pub difficulty: Option<u32>,
}

/// Single entry point dispatching over the configured dice variant.
pub fn roll_for_system(
    config: &SystemConfig,
    action_type: &str,
    stats: &BTreeMap<String, i64>,
    forced: &ForcedDice,
) -> RollResult {
    match config.dice_system() {
        DiceSystem::Band2d6 { bands } => roll_2d6(&bands, forced.roll),
        DiceSystem::DicePool { .. } => roll_dice_pool(
            config,
            action_type,
            stats,
            forced.pool.as_deref(),
            forced.difficulty,
        ),
    }
}

use serde::{Deserialize, Serialize};

/// Resolution outcome of a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Failure,
    Mixed,
    Success,
    Critical,
    Botch,
}

impl Outcome {
    /// Success or critical: applies success effects and clears situations.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success | Outcome::Critical)
    }

    /// Failure or botch: applies failure effects and feeds the streak.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure | Outcome::Botch)
    }
}

/// Result of a dice roll, either 2d6 bands or a dice pool.
///
/// Pool fields (`pool_size`, `successes`, `ones`, `difficulty`, `stat_pair`)
/// are zero/empty for band rolls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollResult {
    pub dice: String,
    pub raw_values: Vec<u32>,
    pub total: i64,
    pub outcome: Outcome,
    pub margin: i64,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub pool_size: usize,
    #[serde(default)]
    pub successes: u32,
    #[serde(default)]
    pub ones: u32,
    #[serde(default)]
    pub difficulty: u32,
    #[serde(default)]
    pub stat_pair: String,
}

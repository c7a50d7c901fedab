//! Rounding policy, percentage arithmetic, and classroom-level summaries.
//!
//! Both completion percentages and exercise scores are rounded to whole
//! numbers. The default policy is round-half-up (`12.5 -> 13`, `2.5 -> 3`);
//! half-even is selectable through configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::ProgressRecord;

/// How fractional percentages and scores are turned into integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Ties round towards positive infinity.
    #[default]
    HalfUp,
    /// Ties round to the nearest even integer (banker's rounding).
    HalfEven,
}

impl RoundingPolicy {
    /// Round `value` to a whole number. Non-finite input rounds to `0.0`.
    pub fn round(self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        match self {
            RoundingPolicy::HalfUp => {
                let floor = value.floor();
                if value - floor >= 0.5 {
                    floor + 1.0
                } else {
                    floor
                }
            }
            RoundingPolicy::HalfEven => value.round_ties_even(),
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingPolicy::HalfUp => write!(f, "half_up"),
            RoundingPolicy::HalfEven => write!(f, "half_even"),
        }
    }
}

impl FromStr for RoundingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "half_up" => Ok(RoundingPolicy::HalfUp),
            "half_even" | "bankers" => Ok(RoundingPolicy::HalfEven),
            other => Err(format!("unknown rounding policy: {other}")),
        }
    }
}

/// `part / whole * 100` as a float, or `0.0` when `whole` is zero.
pub fn ratio_percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Whole-number percentage in `0..=100`.
pub fn whole_percentage(part: usize, whole: usize, policy: RoundingPolicy) -> u8 {
    policy
        .round(ratio_percentage(part, whole))
        .clamp(0.0, 100.0) as u8
}

/// Scale a `0..=100` percentage onto `max_score` points.
///
/// Computed as `percentage / 100 * max`; changing the order changes which
/// values land exactly on a tie.
pub fn scale_score(percentage: f64, max_score: f64, policy: RoundingPolicy) -> u32 {
    policy.round(percentage / 100.0 * max_score).max(0.0) as u32
}

/// Normalize an authored max score: negative or non-finite values become 0.
pub fn normalize_max_score(max_score: f64, policy: RoundingPolicy) -> u32 {
    if !max_score.is_finite() || max_score < 0.0 {
        return 0;
    }
    policy.round(max_score) as u32
}

/// Roll-up of a student's progress across a classroom's modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    /// Number of modules reported.
    pub modules: usize,
    /// Modules with at least one completed task.
    pub modules_started: usize,
    /// Modules at 100%.
    pub modules_completed: usize,
    /// Mean of the per-module percentages.
    pub average_percentage: f64,
}

impl ProgressSummary {
    pub fn from_records(records: &[ProgressRecord]) -> Self {
        let modules = records.len();
        let modules_started = records.iter().filter(|r| r.completed_tasks > 0).count();
        let modules_completed = records.iter().filter(|r| r.is_complete()).count();
        let average_percentage = if modules == 0 {
            0.0
        } else {
            records
                .iter()
                .map(|r| f64::from(r.progress_percentage))
                .sum::<f64>()
                / modules as f64
        };

        Self {
            modules,
            modules_started,
            modules_completed,
            average_percentage,
        }
    }
}

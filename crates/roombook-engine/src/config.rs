use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// How a requested start time that already lies in the past is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PastStartPolicy {
    /// Schedule it as far in the future as it lies in the past.
    #[default]
    Mirror,
    /// Reserve the room now.
    Immediate,
}

#[derive(Debug, Error)]
#[error("unknown past-start policy '{0}' (expected 'mirror' or 'immediate')")]
pub struct ParsePolicyError(String);

impl FromStr for PastStartPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mirror" => Ok(Self::Mirror),
            "immediate" => Ok(Self::Immediate),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Wall-clock length of one scheduling minute.
    pub minute: Duration,
    /// Cancel a room's pending timers when its reservations are deleted.
    pub retract_timers_on_delete: bool,
    pub past_start: PastStartPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            minute: Duration::from_secs(60),
            retract_timers_on_delete: false,
            past_start: PastStartPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Convert a (possibly fractional) number of minutes into a delay.
    /// Non-positive and non-finite values give a zero delay.
    pub fn minutes(&self, minutes: f64) -> Duration {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.minute.as_secs_f64() * minutes).unwrap_or(Duration::MAX)
    }
}

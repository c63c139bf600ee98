//! Scheduler configuration.
//!
//! Everything has a default, so a JSON config only needs the fields it
//! changes:
//!
//! ```json
//! { "max_horizon_days": 14, "breaks": { "interval_minutes": 120 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::DEFAULT_MIN_SPLIT_HOURS;

/// Tunables for [`SlotScheduler`](crate::scheduler::SlotScheduler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Longest accepted horizon, in days.
    pub max_horizon_days: u32,
    /// The reference "now" is rounded up to a multiple of this many minutes
    /// before placement starts.
    pub slot_granularity_minutes: u32,
    /// Minimum block length given to [`TaskInput`](crate::validation::TaskInput)s
    /// that carry none (hours).
    pub default_min_split_hours: f64,
    /// Automatic breaks between runs of work. `None` disables them.
    pub breaks: Option<BreakPolicy>,
}

/// When to reserve a break.
///
/// A run is a chain of task blocks where each gap to the next block is
/// shorter than `duration_minutes` and holds no locked event. Once a run
/// reaches `interval_minutes`, the next `duration_minutes` after it are
/// reserved as a break (skipped if that time is already taken). Split
/// tasks are cut so a run does not outgrow the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakPolicy {
    /// Work minutes before a break is due.
    pub interval_minutes: u32,
    /// Break length in minutes.
    pub duration_minutes: u32,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            interval_minutes: 90,
            duration_minutes: 15,
        }
    }
}

impl BreakPolicy {
    /// Creates a policy.
    pub fn new(interval_minutes: u32, duration_minutes: u32) -> Self {
        Self {
            interval_minutes,
            duration_minutes,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_horizon_days: 90,
            slot_granularity_minutes: 15,
            default_min_split_hours: DEFAULT_MIN_SPLIT_HOURS,
            breaks: None,
        }
    }
}

impl SchedulerConfig {
    /// Sets the horizon guard.
    pub fn with_max_horizon_days(mut self, days: u32) -> Self {
        self.max_horizon_days = days;
        self
    }

    /// Sets the slot granularity.
    pub fn with_slot_granularity(mut self, minutes: u32) -> Self {
        self.slot_granularity_minutes = minutes;
        self
    }

    /// Enables automatic breaks.
    pub fn with_breaks(mut self, policy: BreakPolicy) -> Self {
        self.breaks = Some(policy);
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_horizon_days == 0 {
            return Err(invalid("max_horizon_days", "must be greater than 0"));
        }
        if self.slot_granularity_minutes == 0 || 1440 % self.slot_granularity_minutes != 0 {
            return Err(invalid(
                "slot_granularity_minutes",
                "must divide a day (1440 minutes) evenly",
            ));
        }
        if !self.default_min_split_hours.is_finite() || self.default_min_split_hours < 0.0 {
            return Err(invalid(
                "default_min_split_hours",
                "must be a non-negative number",
            ));
        }
        if let Some(policy) = &self.breaks {
            if policy.interval_minutes == 0 {
                return Err(invalid("breaks.interval_minutes", "must be greater than 0"));
            }
            if policy.duration_minutes == 0 {
                return Err(invalid("breaks.duration_minutes", "must be greater than 0"));
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: SchedulerConfig = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.max_horizon_days, 90);
        assert_eq!(cfg.slot_granularity_minutes, 15);
        assert!((cfg.default_min_split_hours - 0.25).abs() < 1e-10);
        assert_eq!(cfg.breaks, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_breaks_from_json() {
        let cfg = SchedulerConfig::from_json_str(r#"{"breaks": {"interval_minutes": 120}}"#).unwrap();
        assert_eq!(cfg.breaks, Some(BreakPolicy::new(120, 15)));

        let err = SchedulerConfig::from_json_str(r#"{"breaks": {"duration_minutes": 0}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "breaks.duration_minutes",
                ..
            }
        ));
        assert!(SchedulerConfig::default()
            .with_breaks(BreakPolicy::new(0, 10))
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = SchedulerConfig::from_json_str(r#"{"max_horizon_days": 14}"#).unwrap();
        assert_eq!(cfg.max_horizon_days, 14);
        assert_eq!(cfg.slot_granularity_minutes, 15);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            SchedulerConfig::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
        let err = SchedulerConfig::from_json_str(r#"{"slot_granularity_minutes": 7}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "slot_granularity_minutes",
                ..
            }
        ));
        assert!(SchedulerConfig::default()
            .with_max_horizon_days(0)
            .validate()
            .is_err());
    }
}

//! Engine configuration
//!
//! The engine never reads ambient state: the operator allow-list, the round
//! timing, and the content selection policy are all passed in through an
//! [`EngineConfig`], either built in code or loaded from a TOML file.

use std::{collections::HashSet, path::Path, time::Duration};

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::{leaderboard, round, selection},
    participant::ParticipantId,
};

type ValidationResult = garde::Result;

/// The release-year cutoff a candidate's source work must meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyThreshold {
    /// Works released in or after this year are recent
    Fixed {
        /// First accepted year
        year: i32,
    },
    /// Works released within this many years of the current year are recent
    Rolling {
        /// Width of the window
        years: i32,
    },
}

impl Default for RecencyThreshold {
    fn default() -> Self {
        Self::Rolling {
            years: selection::RECENT_YEARS,
        }
    }
}

impl RecencyThreshold {
    /// The first accepted release year, given the current year
    pub fn cutoff_year(&self, current_year: i32) -> i32 {
        match self {
            Self::Fixed { year } => *year,
            Self::Rolling { years } => current_year - years,
        }
    }
}

fn validate_threshold(threshold: &RecencyThreshold, _ctx: &()) -> ValidationResult {
    match threshold {
        RecencyThreshold::Rolling { years } if *years < 0 => {
            Err(garde::Error::new("rolling window cannot be negative"))
        }
        _ => Ok(()),
    }
}

/// How candidates are filtered by the age of their source work
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RecencyPolicy {
    /// Cutoff for recent works
    #[garde(custom(validate_threshold))]
    pub threshold: RecencyThreshold,
    /// Chance of accepting a candidate regardless of its release year
    #[garde(range(min = 0.0, max = 1.0))]
    pub bypass_probability: f64,
}

impl Default for RecencyPolicy {
    fn default() -> Self {
        Self {
            threshold: RecencyThreshold::default(),
            bypass_probability: selection::BYPASS_PROBABILITY,
        }
    }
}

fn validate_delay(delay: &Duration, _ctx: &()) -> ValidationResult {
    if delay.is_zero() {
        Err(garde::Error::new("delay cannot be zero"))
    } else {
        Ok(())
    }
}

/// Everything the engine needs to know up front
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    /// Ids allowed to start and cancel rounds and reset the scoreboard
    #[garde(skip)]
    pub operators: HashSet<ParticipantId>,
    /// Time from round start until the hint
    #[garde(custom(validate_delay))]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub hint_delay: Duration,
    /// Time from round start until the answer is revealed
    #[garde(custom(validate_delay))]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub end_delay: Duration,
    /// Provider attempts per round start
    #[garde(range(min = 1, max = selection::MAX_RETRY_BUDGET))]
    pub retry_budget: u32,
    /// Release-year filter
    #[garde(dive)]
    pub recency: RecencyPolicy,
    /// Pages are drawn uniformly from `1..=page_count`
    #[garde(range(min = 1))]
    pub page_count: u32,
    /// Characters requested per page
    #[garde(range(min = selection::MIN_PER_PAGE, max = selection::MAX_PER_PAGE))]
    pub per_page: u32,
    /// Rows shown in a rendered leaderboard
    #[garde(range(min = 1))]
    pub leaderboard_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            operators: HashSet::new(),
            hint_delay: Duration::from_secs(round::HINT_DELAY_SECS),
            end_delay: Duration::from_secs(round::END_DELAY_SECS),
            retry_budget: selection::RETRY_BUDGET,
            recency: RecencyPolicy::default(),
            page_count: selection::PAGE_COUNT,
            per_page: selection::PER_PAGE,
            leaderboard_limit: leaderboard::LIMIT,
        }
    }
}

/// Errors that can occur while loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML of the expected shape
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(#[from] garde::Report),
    /// The answer would be revealed before the hint
    #[error("invalid configuration: end_delay must be longer than hint_delay")]
    Timing,
}

impl EngineConfig {
    /// Default configuration with the given operators
    pub fn with_operators<I: IntoIterator<Item = ParticipantId>>(operators: I) -> Self {
        Self {
            operators: operators.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Whether the participant may run privileged operations
    pub fn is_operator(&self, participant: ParticipantId) -> bool {
        self.operators.contains(&participant)
    }

    /// Parses and validates a configuration from TOML text
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML, otherwise the errors
    /// of [`EngineConfig::checked`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.checked()
    }

    /// Reads, parses and validates a configuration file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// errors of [`EngineConfig::from_toml_str`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Validates a configuration built in code
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for out-of-range values and
    /// `ConfigError::Timing` if the end does not come after the hint.
    pub fn checked(self) -> Result<Self, ConfigError> {
        self.validate()?;
        if self.end_delay <= self.hint_delay {
            return Err(ConfigError::Timing);
        }
        Ok(self)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();

        assert!(config.clone().checked().is_ok());
        assert_eq!(config.hint_delay, Duration::from_secs(120));
        assert_eq!(config.end_delay, Duration::from_secs(300));
        assert_eq!(config.retry_budget, 10);
    }

    #[test]
    fn test_from_toml_fills_defaults() {
        let config = EngineConfig::from_toml_str("operators = [1, 2]").unwrap();

        assert!(config.is_operator(ParticipantId::new(1)));
        assert!(config.is_operator(ParticipantId::new(2)));
        assert!(!config.is_operator(ParticipantId::new(99)));
        assert_eq!(config.per_page, 25);
        assert_eq!(config.recency, RecencyPolicy::default());
    }

    #[test]
    fn test_from_toml_full() {
        let config = EngineConfig::from_toml_str(
            r#"
            operators = [1]
            hint_delay = 60
            end_delay = 90
            retry_budget = 3
            page_count = 50
            per_page = 10

            [recency]
            bypass_probability = 0.0
            threshold = { fixed = { year = 2015 } }
            "#,
        )
        .unwrap();

        assert_eq!(config.hint_delay, Duration::from_secs(60));
        assert_eq!(config.end_delay, Duration::from_secs(90));
        assert_eq!(config.retry_budget, 3);
        assert_eq!(config.recency.threshold, RecencyThreshold::Fixed { year: 2015 });
        assert_eq!(config.recency.bypass_probability, 0.0);
    }

    #[test]
    fn test_end_must_follow_hint() {
        let config = EngineConfig {
            hint_delay: Duration::from_secs(300),
            end_delay: Duration::from_secs(120),
            ..EngineConfig::default()
        };

        assert!(matches!(config.checked(), Err(ConfigError::Timing)));
    }

    #[test]
    fn test_zero_retry_budget_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("retry_budget = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_bypass_probability_out_of_range() {
        assert!(matches!(
            EngineConfig::from_toml_str("[recency]\nbypass_probability = 1.5"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            EngineConfig::from_toml_str("operators = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_cutoff_year() {
        assert_eq!(RecencyThreshold::Fixed { year: 2015 }.cutoff_year(2026), 2015);
        assert_eq!(RecencyThreshold::Rolling { years: 5 }.cutoff_year(2026), 2021);
    }
}

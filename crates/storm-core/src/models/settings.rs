//! Storm creation settings.

use super::budget::TokenBudget;
use super::idea::{validate_description, validate_title};
use super::participant::{normalize_username, DEFAULT_MODERATOR_NAME};
use super::status::Phase;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Settings a storm is created with, as submitted by its creator.
///
/// Absent token counts fall back to the node's default budget; absent time
/// limits mean the phase has no time limit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StormSettings {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub blue_tokens: Option<i64>,
    pub red_tokens: Option<i64>,
    pub ideation_time_limit_minutes: Option<i64>,
    pub voting_time_limit_minutes: Option<i64>,
    pub moderator_name: Option<String>,
}

/// Optional per-phase time limits, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseLimits {
    pub ideation_minutes: Option<u32>,
    pub voting_minutes: Option<u32>,
}

impl PhaseLimits {
    /// Limit for a phase; the terminal phase is never limited.
    pub const fn for_phase(&self, phase: Phase) -> Option<u32> {
        match phase {
            Phase::Ideation => self.ideation_minutes,
            Phase::Voting => self.voting_minutes,
            Phase::Results => None,
        }
    }
}

/// Settings after validation, ready to build a storm from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSettings {
    pub title: String,
    pub description: String,
    pub budget: TokenBudget,
    pub limits: PhaseLimits,
    pub moderator_name: String,
}

impl StormSettings {
    /// Validate against the node's default budget.
    pub fn validate(&self, defaults: TokenBudget) -> Result<ValidatedSettings> {
        let title = validate_title(&self.title)
            .map_err(|_| Error::validation("storm title is required (at most 200 characters)"))?;
        let description = validate_description(&self.description)?;

        let budget = TokenBudget::new(
            token_cap("blueTokens", self.blue_tokens, defaults.max_blue)?,
            token_cap("redTokens", self.red_tokens, defaults.max_red)?,
        );

        let limits = PhaseLimits {
            ideation_minutes: time_limit("ideationTimeLimitMinutes", self.ideation_time_limit_minutes)?,
            voting_minutes: time_limit("votingTimeLimitMinutes", self.voting_time_limit_minutes)?,
        };

        let moderator_name = match &self.moderator_name {
            Some(name) => normalize_username(name)?,
            None => DEFAULT_MODERATOR_NAME.to_string(),
        };

        Ok(ValidatedSettings {
            title,
            description,
            budget,
            limits,
            moderator_name,
        })
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn token_cap(field: &str, value: Option<i64>, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(n) => u32::try_from(n)
            .map_err(|_| Error::validation(format!("{field} must be between 0 and {}", u32::MAX))),
    }
}

fn time_limit(field: &str, value: Option<i64>) -> Result<Option<u32>> {
    match value {
        None => Ok(None),
        Some(n) if n >= 1 => u32::try_from(n)
            .map(Some)
            .map_err(|_| Error::validation(format!("{field} is too large"))),
        Some(_) => Err(Error::validation(format!("{field} must be at least 1 minute"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(title: &str) -> StormSettings {
        StormSettings {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_fill_missing_budget() {
        let v = settings("Offsite").validate(TokenBudget::default()).unwrap();
        assert_eq!(v.budget, TokenBudget::new(5, 3));
        assert_eq!(v.limits, PhaseLimits::default());
        assert_eq!(v.moderator_name, DEFAULT_MODERATOR_NAME);
    }

    #[test]
    fn explicit_budget_and_limits() {
        let mut s = settings("Offsite");
        s.blue_tokens = Some(0);
        s.red_tokens = Some(7);
        s.voting_time_limit_minutes = Some(10);
        s.moderator_name = Some(" Grace ".into());
        let v = s.validate(TokenBudget::default()).unwrap();
        assert_eq!(v.budget, TokenBudget::new(0, 7));
        assert_eq!(v.limits.for_phase(Phase::Voting), Some(10));
        assert_eq!(v.limits.for_phase(Phase::Ideation), None);
        assert_eq!(v.moderator_name, "Grace");
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(settings("  ").validate(TokenBudget::default()).is_err());

        let mut s = settings("Offsite");
        s.blue_tokens = Some(-1);
        assert!(s.validate(TokenBudget::default()).is_err());

        let mut s = settings("Offsite");
        s.ideation_time_limit_minutes = Some(0);
        assert!(s.validate(TokenBudget::default()).is_err());
    }

    #[test]
    fn deserializes_camel_case_with_nulls() {
        let s: StormSettings = serde_json::from_str(
            r#"{"title":"Q3","blueTokens":4,"redTokens":null,"ideationTimeLimitMinutes":null}"#,
        )
        .unwrap();
        assert_eq!(s.blue_tokens, Some(4));
        assert_eq!(s.red_tokens, None);
        assert_eq!(s.description, "");
    }

    #[test]
    fn null_description_reads_as_empty() {
        let s: StormSettings =
            serde_json::from_str(r#"{"title":"Q3","description":null}"#).unwrap();
        assert_eq!(s.description, "");
        assert!(s.validate(TokenBudget::default()).is_ok());
    }
}

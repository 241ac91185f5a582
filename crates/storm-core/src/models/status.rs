//! Storm phase and participant role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Phase of a storm. Ordered: `Ideation < Voting < Results`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Participants submit ideas.
    Ideation,
    /// Participants spend tokens on ideas.
    Voting,
    /// Read-only ranked results.
    Results,
}

impl Phase {
    /// The phase a transition leads to, or `None` from the terminal phase.
    pub const fn next(self) -> Option<Phase> {
        match self {
            Phase::Ideation => Some(Phase::Voting),
            Phase::Voting => Some(Phase::Results),
            Phase::Results => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Results)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Ideation => "ideation",
            Phase::Voting => "voting",
            Phase::Results => "results",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ideation" => Ok(Phase::Ideation),
            "voting" => Ok(Phase::Voting),
            "results" => Ok(Phase::Results),
            other => Err(crate::Error::validation(format!("unknown phase '{other}'"))),
        }
    }
}

/// Role of a participant within one storm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The storm's creator. Exactly one per storm.
    Moderator,
    Participant,
}

impl Role {
    /// Advance phases and override idea edits/deletes.
    pub const fn can_moderate(self) -> bool {
        matches!(self, Role::Moderator)
    }
}

//! Token budget, token colors and per-vote allocations.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-participant token budget of a storm. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBudget {
    pub max_blue: u32,
    pub max_red: u32,
}

impl TokenBudget {
    pub const fn new(max_blue: u32, max_red: u32) -> Self {
        Self { max_blue, max_red }
    }

    /// Budget cap for one color.
    pub const fn max(&self, color: TokenColor) -> u32 {
        match color {
            TokenColor::Blue => self.max_blue,
            TokenColor::Red => self.max_red,
        }
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::new(5, 3)
    }
}

/// Positive (blue) or negative (red) sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenColor {
    Blue,
    Red,
}

impl fmt::Display for TokenColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenColor::Blue => f.write_str("blue"),
            TokenColor::Red => f.write_str("red"),
        }
    }
}

/// Tokens one vote puts on one idea: a positive count of exactly one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    Blue(u32),
    Red(u32),
}

impl Allocation {
    /// Validate raw counts as submitted by a caller.
    ///
    /// Rejects negative counts, counts of both colors, and the all-zero vote.
    pub fn from_counts(blue: i64, red: i64) -> Result<Self> {
        if blue < 0 || red < 0 {
            return Err(Error::validation("token counts cannot be negative"));
        }
        if blue > 0 && red > 0 {
            return Err(Error::validation(
                "a vote uses either blue or red tokens, not both",
            ));
        }
        let to_u32 = |n: i64| {
            u32::try_from(n).map_err(|_| Error::validation("token count is too large"))
        };
        match (blue, red) {
            (0, 0) => Err(Error::validation("a vote must allocate at least one token")),
            (b, 0) => Ok(Allocation::Blue(to_u32(b)?)),
            (_, r) => Ok(Allocation::Red(to_u32(r)?)),
        }
    }

    pub const fn color(self) -> TokenColor {
        match self {
            Allocation::Blue(_) => TokenColor::Blue,
            Allocation::Red(_) => TokenColor::Red,
        }
    }

    pub const fn amount(self) -> u32 {
        match self {
            Allocation::Blue(n) | Allocation::Red(n) => n,
        }
    }

    /// Blue tokens in this allocation (0 for a red vote).
    pub const fn blue(self) -> u32 {
        match self {
            Allocation::Blue(n) => n,
            Allocation::Red(_) => 0,
        }
    }

    /// Red tokens in this allocation (0 for a blue vote).
    pub const fn red(self) -> u32 {
        match self {
            Allocation::Red(n) => n,
            Allocation::Blue(_) => 0,
        }
    }
}

/// A participant's spending against the storm budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub max_blue: u32,
    pub max_red: u32,
    pub spent_blue: u32,
    pub spent_red: u32,
    pub remaining_blue: u32,
    pub remaining_red: u32,
}

impl BudgetStatus {
    pub fn new(budget: TokenBudget, spent_blue: u32, spent_red: u32) -> Self {
        Self {
            max_blue: budget.max_blue,
            max_red: budget.max_red,
            spent_blue,
            spent_red,
            remaining_blue: budget.max_blue.saturating_sub(spent_blue),
            remaining_red: budget.max_red.saturating_sub(spent_red),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_color() {
        assert_eq!(Allocation::from_counts(3, 0).unwrap(), Allocation::Blue(3));
        assert_eq!(Allocation::from_counts(0, 2).unwrap(), Allocation::Red(2));
        assert!(matches!(
            Allocation::from_counts(1, 1),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            Allocation::from_counts(0, 0),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn negative_and_oversized_counts_rejected() {
        assert!(Allocation::from_counts(-1, 0).is_err());
        assert!(Allocation::from_counts(0, -4).is_err());
        assert!(Allocation::from_counts(i64::from(u32::MAX) + 1, 0).is_err());
    }

    #[test]
    fn color_accessors() {
        let vote = Allocation::Red(2);
        assert_eq!(vote.color(), TokenColor::Red);
        assert_eq!((vote.blue(), vote.red(), vote.amount()), (0, 2, 2));
    }

    #[test]
    fn default_budget() {
        let budget = TokenBudget::default();
        assert_eq!((budget.max_blue, budget.max_red), (5, 3));
        assert_eq!(budget.max(TokenColor::Red), 3);
    }

    #[test]
    fn remaining_never_underflows() {
        let status = BudgetStatus::new(TokenBudget::new(2, 1), 2, 0);
        assert_eq!(status.remaining_blue, 0);
        assert_eq!(status.remaining_red, 1);
    }
}

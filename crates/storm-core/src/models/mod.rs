//! Data model for storms.
//!
//! # Core Types
//!
//! - [`Participant`] - one joined user, moderator or participant
//! - [`Idea`] - a proposal submitted during ideation
//! - [`Vote`] - one participant's tokens and comment on one idea
//!
//! # Supporting Types
//!
//! - [`Phase`] / [`Role`] - the storm's state and a participant's capabilities
//! - [`TokenBudget`] / [`Allocation`] / [`BudgetStatus`] - token accounting
//! - [`StormSettings`] - creation-time configuration

mod budget;
mod idea;
mod ids;
mod participant;
mod settings;
mod status;
mod timestamp;
mod vote;

pub use budget::{Allocation, BudgetStatus, TokenBudget, TokenColor};
pub use idea::{validate_description, validate_title, Idea, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
pub use ids::{
    IdeaId, SessionId, StormCode, VoteId, STORM_CODE_ALPHABET, STORM_CODE_LEN, STORM_CODE_PREFIX,
};
pub use participant::{normalize_username, Participant, DEFAULT_MODERATOR_NAME, MAX_USERNAME_CHARS};
pub use settings::{PhaseLimits, StormSettings, ValidatedSettings};
pub use status::{Phase, Role};
pub use timestamp::Timestamp;
pub use vote::{validate_comment, Vote};

//! Storm Core - structured group brainstorming
//!
//! A storm runs in three phases: participants submit ideas, then spend a
//! fixed budget of blue (for) and red (against) tokens on ideas with a
//! mandatory comment, then read a ranked result set.
//!
//! # Architecture
//!
//! - **Storm** ([`Storm`]): the aggregate holding one session's roster,
//!   ideas and votes. All mutation goes through it.
//! - **Phase controller** (`phase`): forward-only ideation → voting →
//!   results transitions, moderator- or time-triggered.
//! - **Idea registry** (`ideas`): idea CRUD under phase and authorship rules.
//! - **Vote ledger** (`ledger`): budget accounting and vote upserts.
//! - **Scoring** ([`scoring`]): pure aggregation into a ranked result set.
//! - **Views** ([`view`]): what one requester is allowed to see.
//!
//! Nothing here does I/O or reads the clock: every mutating call takes the
//! current [`Timestamp`]. Serializing commands per storm is the caller's job.
//!
//! # Example
//!
//! ```
//! use storm_core::{SessionId, Storm, StormCode, StormSettings, Timestamp, TokenBudget};
//!
//! let settings = StormSettings { title: "Offsite".into(), ..Default::default() }
//!     .validate(TokenBudget::default())?;
//! let moderator = SessionId::new("session-mod");
//! let now = Timestamp::now();
//! let mut storm = Storm::new(StormCode::from_suffix("ABC123"), settings, moderator.clone(), now);
//!
//! let ada = SessionId::new("session-ada");
//! storm.join(ada.clone(), "Ada", now)?;
//! let idea = storm.create_idea(&ada, "Lake retreat", "", now)?;
//!
//! storm.advance_phase(&moderator, now)?;
//! storm.submit_vote(&moderator, &idea.id, 3, 0, "Love it", now)?;
//! storm.advance_phase(&moderator, now)?;
//!
//! assert_eq!(storm.results()?[0].net_score, 3);
//! # Ok::<(), storm_core::Error>(())
//! ```

pub mod error;
pub mod models;
pub mod scoring;
pub mod view;

mod ideas;
mod ledger;
mod phase;
mod storm;

pub use error::{Error, Result};
pub use models::{
    Allocation, BudgetStatus, Idea, IdeaId, Participant, Phase, PhaseLimits, Role, SessionId,
    StormCode, StormSettings, Timestamp, TokenBudget, TokenColor, ValidatedSettings, Vote, VoteId,
};
pub use scoring::{rank, CommentLine, ScoredIdea};
pub use storm::Storm;
pub use view::{IdeaView, RosterEntry, StormSummary, StormView};

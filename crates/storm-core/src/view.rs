//! Requester-scoped read models.
//!
//! A [`StormView`] is what a participant is allowed to see of a storm: idea
//! visibility follows the phase rules, other participants' session handles
//! are never exposed, and other participants' votes stay hidden until the
//! results phase, when they appear only in aggregated form.

use crate::error::Result;
use crate::models::{
    BudgetStatus, Idea, Participant, Phase, PhaseLimits, Role, SessionId, StormCode, Timestamp,
    TokenBudget, Vote,
};
use crate::scoring::ScoredIdea;
use crate::storm::Storm;
use serde::Serialize;

/// Roster entry as shown to other participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub username: String,
    pub role: Role,
}

/// Storm metadata without ideas or votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StormSummary {
    pub code: StormCode,
    pub title: String,
    pub description: String,
    pub status: Phase,
    pub token_budget: TokenBudget,
    pub time_limits: PhaseLimits,
    pub phase_started_at: Timestamp,
    /// End of the current phase when it is time-limited.
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub participant_count: usize,
    /// Ideas the reader may see. Withheld from the public summary during
    /// ideation, when ideas are private to their authors.
    pub idea_count: Option<usize>,
}

/// An idea plus whether the viewer wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaView {
    #[serde(flatten)]
    pub idea: Idea,
    pub is_own: bool,
}

/// Everything one participant may see of a storm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StormView {
    #[serde(flatten)]
    pub summary: StormSummary,
    pub participants: Vec<RosterEntry>,
    pub viewer: RosterEntry,
    pub ideas: Vec<IdeaView>,
    pub my_votes: Vec<Vote>,
    pub budget: BudgetStatus,
    /// Present once the storm reaches results.
    pub results: Option<Vec<ScoredIdea>>,
}

impl Storm {
    /// Public summary of this storm.
    pub fn summary(&self) -> StormSummary {
        StormSummary {
            code: self.code.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            token_budget: self.budget,
            time_limits: self.limits,
            phase_started_at: self.phase_started_at,
            expires_at: self.phase_deadline(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            participant_count: self.participants.len(),
            idea_count: (self.status >= Phase::Voting).then_some(self.ideas.len()),
        }
    }

    /// The storm as `requester` may see it.
    pub fn view_for(&self, requester: &SessionId) -> Result<StormView> {
        let viewer = self.member(requester)?;

        let ideas: Vec<IdeaView> = self
            .visible_ideas(viewer)
            .map(|idea| IdeaView {
                idea: idea.clone(),
                is_own: idea.is_authored_by(requester),
            })
            .collect();

        let results = if self.status == Phase::Results {
            Some(self.results()?)
        } else {
            None
        };

        let summary = StormSummary {
            idea_count: Some(ideas.len()),
            ..self.summary()
        };

        Ok(StormView {
            summary,
            participants: self.participants.iter().map(roster_entry).collect(),
            viewer: roster_entry(viewer),
            ideas,
            my_votes: self.votes_by(requester).cloned().collect(),
            budget: self.budget_status(requester)?,
            results,
        })
    }
}

fn roster_entry(p: &Participant) -> RosterEntry {
    RosterEntry {
        username: p.username.clone(),
        role: p.role,
    }
}

//! The storm aggregate: canonical state of one brainstorming session.
//!
//! A [`Storm`] owns its roster, ideas and votes and is the only thing that
//! mutates them. Phase rules live in `phase`, idea CRUD in `ideas` and token
//! accounting in `ledger`; each adds an `impl Storm` block. Callers serialize
//! commands per storm (one writer at a time); the aggregate itself is plain data.

use crate::error::{Error, Result};
use crate::models::{
    normalize_username, Idea, Participant, Phase, PhaseLimits, Role, SessionId, StormCode,
    Timestamp, TokenBudget, ValidatedSettings, Vote,
};

/// One ideation session.
#[derive(Debug, Clone)]
pub struct Storm {
    pub(crate) code: StormCode,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) status: Phase,
    pub(crate) budget: TokenBudget,
    pub(crate) limits: PhaseLimits,
    pub(crate) phase_started_at: Timestamp,
    pub(crate) created_at: Timestamp,
    pub(crate) updated_at: Timestamp,
    pub(crate) participants: Vec<Participant>,
    /// Kept in submission order.
    pub(crate) ideas: Vec<Idea>,
    /// Kept in submission order.
    pub(crate) votes: Vec<Vote>,
    next_seq: u64,
}

impl Storm {
    /// Create a storm in the ideation phase with its moderator.
    pub fn new(
        code: StormCode,
        settings: ValidatedSettings,
        moderator: SessionId,
        now: Timestamp,
    ) -> Self {
        let moderator = Participant::new(moderator, settings.moderator_name, Role::Moderator, now);
        Self {
            code,
            title: settings.title,
            description: settings.description,
            status: Phase::Ideation,
            budget: settings.budget,
            limits: settings.limits,
            phase_started_at: now,
            created_at: now,
            updated_at: now,
            participants: vec![moderator],
            ideas: Vec::new(),
            votes: Vec::new(),
            next_seq: 1,
        }
    }

    // --- Accessors ---

    pub fn code(&self) -> &StormCode {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Phase {
        self.status
    }

    pub fn budget(&self) -> TokenBudget {
        self.budget
    }

    pub fn limits(&self) -> PhaseLimits {
        self.limits
    }

    pub fn phase_started_at(&self) -> Timestamp {
        self.phase_started_at
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    /// The storm's single moderator.
    pub fn moderator(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_moderator())
    }

    // --- Roster ---

    /// Resolve a session handle to one of this storm's participants.
    pub fn member(&self, session: &SessionId) -> Result<&Participant> {
        self.participants
            .iter()
            .find(|p| &p.session_id == session)
            .ok_or(Error::NotAMember)
    }

    /// Add a participant. Usernames are unique per storm, ignoring case.
    pub fn join(&mut self, session: SessionId, username: &str, now: Timestamp) -> Result<Participant> {
        let username = normalize_username(username)?;
        if self
            .participants
            .iter()
            .any(|p| p.username.to_lowercase() == username.to_lowercase())
        {
            return Err(Error::validation(format!(
                "username '{username}' is already taken in this storm"
            )));
        }
        if self.participants.iter().any(|p| p.session_id == session) {
            return Err(Error::validation("session already joined this storm"));
        }

        let participant = Participant::new(session, username, Role::Participant, now);
        self.participants.push(participant.clone());
        self.updated_at = now;
        tracing::info!(
            storm = %self.code,
            username = %participant.username,
            "participant joined"
        );
        Ok(participant)
    }

    /// Participant holding `username`, ignoring case and surrounding whitespace.
    pub fn participant_named(&self, username: &str) -> Option<&Participant> {
        let wanted = username.trim().to_lowercase();
        self.participants
            .iter()
            .find(|p| p.username.to_lowercase() == wanted)
    }

    /// Move a participant, with their ideas and votes, onto a new session handle.
    pub fn rebind(&mut self, from: &SessionId, to: SessionId, now: Timestamp) -> Result<Participant> {
        if self.participants.iter().any(|p| p.session_id == to) {
            return Err(Error::validation("session already joined this storm"));
        }
        let index = self
            .participants
            .iter()
            .position(|p| &p.session_id == from)
            .ok_or(Error::NotAMember)?;

        for idea in self.ideas.iter_mut().filter(|i| &i.author == from) {
            idea.author = to.clone();
        }
        for vote in self.votes.iter_mut().filter(|v| &v.voter == from) {
            vote.voter = to.clone();
        }
        self.participants[index].session_id = to;
        self.touch(now);

        let participant = self.participants[index].clone();
        tracing::info!(
            storm = %self.code,
            username = %participant.username,
            "participant rejoined"
        );
        Ok(participant)
    }

    // --- Internal helpers ---

    pub(crate) fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub(crate) fn idea_index(&self, id: &crate::models::IdeaId) -> Result<usize> {
        self.ideas
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| Error::NotFound(format!("idea {id}")))
    }

    pub(crate) fn touch(&mut self, now: Timestamp) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

//! Phase controller: the ideation → voting → results state machine.
//!
//! Transitions are strictly forward and never re-enter a phase. They are
//! triggered either by the moderator ([`Storm::advance_phase`]) or by an
//! expired time limit ([`Storm::expire_phase`]); both reset the phase clock.
//!
//! Expiry is a pure predicate. Whoever owns the storm polls
//! [`Storm::is_phase_expired`] at its own cadence.

use crate::error::{Error, Result};
use crate::models::{Phase, Role, SessionId, Timestamp};
use crate::storm::Storm;

impl Storm {
    /// Whether ideas may be created or edited by their authors.
    pub fn can_mutate_ideas(&self) -> bool {
        self.status == Phase::Ideation
    }

    /// Whether the moderator may still edit or delete any idea.
    pub fn can_override_ideas(&self) -> bool {
        self.status < Phase::Results
    }

    /// Whether votes may be submitted.
    pub fn can_vote(&self) -> bool {
        self.status == Phase::Voting
    }

    /// End of the current phase, if it has a time limit.
    pub fn phase_deadline(&self) -> Option<Timestamp> {
        self.limits
            .for_phase(self.status)
            .map(|minutes| self.phase_started_at.plus_minutes(minutes))
    }

    /// Whether the current phase's time limit has run out at `now`.
    ///
    /// Always false for unlimited phases and for the terminal phase.
    pub fn is_phase_expired(&self, now: Timestamp) -> bool {
        self.phase_deadline().is_some_and(|deadline| now >= deadline)
    }

    /// Moderator-triggered transition to the next phase.
    pub fn advance_phase(&mut self, requester: &SessionId, now: Timestamp) -> Result<Phase> {
        let role = self.member(requester)?.role;
        if role != Role::Moderator {
            return Err(Error::Forbidden(
                "only the moderator can advance the phase".into(),
            ));
        }
        self.transition(now)
    }

    /// Time-triggered transition. Does nothing unless the phase has expired.
    pub fn expire_phase(&mut self, now: Timestamp) -> Option<Phase> {
        if !self.is_phase_expired(now) {
            return None;
        }
        self.transition(now).ok()
    }

    fn transition(&mut self, now: Timestamp) -> Result<Phase> {
        let from = self.status;
        let to = from.next().ok_or(Error::InvalidTransition(from))?;

        self.status = to;
        self.phase_started_at = now;
        self.touch(now);
        tracing::info!(storm = %self.code, %from, %to, "phase advanced");
        Ok(to)
    }
}

//! Command and query surface over the storm store.
//!
//! Every method touches at most one storm and holds that storm's lock for
//! the whole command, so concurrent commands on one storm are serialized
//! while different storms proceed independently.

use crate::error::Result;
use crate::store::{generate_session_id, StormHandle, StormStore};
use serde::Serialize;
use storm_core::{
    Error as StormError, IdeaId, Participant, Phase, SessionId, Storm, StormCode, StormSettings,
    StormSummary, StormView, Timestamp, TokenBudget, Vote,
};

/// A freshly joined participant and the storm as they now see it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Joined {
    pub storm: StormView,
    /// Carries the new session handle; only ever returned to its owner.
    pub participant: Participant,
}

/// What a session handle currently resolves to.
pub type SessionView = Joined;

/// Async facade used by the HTTP layer and the scheduler.
pub struct StormService {
    store: StormStore,
    defaults: TokenBudget,
}

impl StormService {
    /// Create a service with an empty store.
    pub fn new(defaults: TokenBudget) -> Self {
        Self {
            store: StormStore::new(),
            defaults,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &StormStore {
        &self.store
    }

    // --- Commands ---

    /// Create a storm; the caller becomes its moderator.
    pub async fn create_storm(&self, settings: StormSettings) -> Result<Joined> {
        let settings = settings.validate(self.defaults).map_err(rejected("create storm"))?;
        let now = Timestamp::now();

        let handle = self
            .store
            .create(|code| {
                let moderator = generate_session_id();
                let storm = Storm::new(code, settings, moderator.clone(), now);
                Ok((storm, moderator))
            })
            .await?;

        let storm = handle.read().await;
        let participant = storm
            .moderator()
            .cloned()
            .ok_or_else(|| StormError::Integrity(format!("storm {} has no moderator", storm.code())))?;
        let view = storm.view_for(&participant.session_id)?;
        tracing::info!(storm = %storm.code(), title = %storm.title(), "storm created");
        Ok(Joined {
            storm: view,
            participant,
        })
    }

    /// Join an existing storm under `username`.
    ///
    /// A name whose session was cleared with [`leave`](Self::leave) is taken
    /// over by the new session, together with its ideas and votes.
    pub async fn join_storm(&self, code: &StormCode, username: &str) -> Result<Joined> {
        let handle = self.store.handle(code).await?;
        let session = generate_session_id();
        let now = Timestamp::now();

        let mut storm = handle.write().await;
        let existing = storm.participant_named(username).map(|p| p.session_id.clone());
        let released = match existing {
            Some(previous) if !self.store.is_bound(&previous).await => Some(previous),
            _ => None,
        };
        let participant = match released {
            Some(previous) => storm.rebind(&previous, session.clone(), now),
            None => storm.join(session.clone(), username, now),
        }
        .map_err(rejected("join storm"))?;
        let view = storm.view_for(&session)?;

        // bound under the storm lock so a released name is reclaimed once
        self.store.bind_session(session, code.clone()).await;
        Ok(Joined {
            storm: view,
            participant,
        })
    }

    /// Moderator-triggered phase advance.
    pub async fn advance_phase(&self, code: &StormCode, requester: &SessionId) -> Result<StormView> {
        let handle = self.authorize(code, requester).await?;
        let mut storm = handle.write().await;
        storm
            .advance_phase(requester, Timestamp::now())
            .map_err(rejected("advance phase"))?;
        Ok(storm.view_for(requester)?)
    }

    pub async fn create_idea(
        &self,
        code: &StormCode,
        requester: &SessionId,
        title: &str,
        description: &str,
    ) -> Result<storm_core::Idea> {
        let handle = self.authorize(code, requester).await?;
        let mut storm = handle.write().await;
        Ok(storm
            .create_idea(requester, title, description, Timestamp::now())
            .map_err(rejected("create idea"))?)
    }

    pub async fn update_idea(
        &self,
        code: &StormCode,
        requester: &SessionId,
        idea_id: &IdeaId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<storm_core::Idea> {
        let handle = self.authorize(code, requester).await?;
        let mut storm = handle.write().await;
        Ok(storm
            .update_idea(requester, idea_id, title, description, Timestamp::now())
            .map_err(rejected("update idea"))?)
    }

    /// Delete an idea and its votes. Returns how many votes went with it.
    pub async fn delete_idea(
        &self,
        code: &StormCode,
        requester: &SessionId,
        idea_id: &IdeaId,
    ) -> Result<usize> {
        let handle = self.authorize(code, requester).await?;
        let mut storm = handle.write().await;
        Ok(storm
            .delete_idea(requester, idea_id, Timestamp::now())
            .map_err(rejected("delete idea"))?)
    }

    pub async fn submit_vote(
        &self,
        code: &StormCode,
        requester: &SessionId,
        idea_id: &IdeaId,
        blue_tokens: i64,
        red_tokens: i64,
        comment: &str,
    ) -> Result<Vote> {
        let handle = self.authorize(code, requester).await?;
        let mut storm = handle.write().await;
        Ok(storm
            .submit_vote(
                requester,
                idea_id,
                blue_tokens,
                red_tokens,
                comment,
                Timestamp::now(),
            )
            .map_err(rejected("submit vote"))?)
    }

    /// Forget a session handle. The participant stays on the storm's roster.
    pub async fn leave(&self, requester: &SessionId) -> Result<()> {
        if self.store.forget_session(requester).await {
            tracing::info!(session = %requester, "session cleared");
        }
        Ok(())
    }

    // --- Queries ---

    pub async fn get_storm(&self, code: &StormCode, requester: &SessionId) -> Result<StormView> {
        let handle = self.authorize(code, requester).await?;
        let storm = handle.read().await;
        Ok(storm.view_for(requester)?)
    }

    /// Resolve a session handle to its storm and participant record.
    pub async fn get_session(&self, requester: &SessionId) -> Result<SessionView> {
        let (_, handle) = self.store.resolve_session(requester).await?;
        let storm = handle.read().await;
        Ok(Joined {
            storm: storm.view_for(requester)?,
            participant: storm.member(requester)?.clone(),
        })
    }

    /// Public listing, newest first, optionally restricted to one phase.
    pub async fn list_storms(&self, status: Option<Phase>) -> Vec<StormSummary> {
        let mut summaries = Vec::new();
        for handle in self.store.handles().await {
            let summary = handle.read().await.summary();
            if status.map_or(true, |s| summary.status == s) {
                summaries.push(summary);
            }
        }
        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });
        summaries
    }

    /// Resolve `requester` and check it is bound to `code`.
    async fn authorize(&self, code: &StormCode, requester: &SessionId) -> Result<StormHandle> {
        let handle = self.store.handle(code).await?;
        let (bound, _) = self.store.resolve_session(requester).await?;
        if &bound != code {
            return Err(StormError::NotAMember.into());
        }
        Ok(handle)
    }
}

fn rejected(operation: &'static str) -> impl Fn(StormError) -> StormError {
    move |e| {
        tracing::debug!(operation, kind = e.kind(), error = %e, "command rejected");
        e
    }
}

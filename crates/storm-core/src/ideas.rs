//! Idea registry: create, edit and delete ideas under phase and authorship rules.
//!
//! - Authors create and edit their own ideas during ideation only.
//! - The moderator may edit or delete any idea until results.
//! - Deleting an idea deletes its votes, which returns their tokens to the
//!   voters' budgets (budgets are always derived from the stored votes).

use crate::error::{Error, Result};
use crate::models::{
    validate_description, validate_title, Idea, IdeaId, Participant, Phase, SessionId, Timestamp,
};
use crate::storm::Storm;

impl Storm {
    /// Submit a new idea. Ideation only.
    pub fn create_idea(
        &mut self,
        author: &SessionId,
        title: &str,
        description: &str,
        now: Timestamp,
    ) -> Result<Idea> {
        let username = self.member(author)?.username.clone();
        if !self.can_mutate_ideas() {
            return Err(Error::PhaseViolation {
                operation: "submit an idea",
                phase: self.status,
            });
        }
        let title = validate_title(title)?;
        let description = validate_description(description)?;

        let seq = self.take_seq();
        let idea = Idea {
            id: IdeaId::derive(&self.code, seq),
            author: author.clone(),
            author_username: username,
            title,
            description,
            created_at: now,
            updated_at: now,
            seq,
        };
        self.ideas.push(idea.clone());
        self.touch(now);
        tracing::info!(storm = %self.code, idea = %idea.id, "idea created");
        Ok(idea)
    }

    /// Edit an idea's title and/or description. `None` keeps the current value.
    pub fn update_idea(
        &mut self,
        requester: &SessionId,
        idea_id: &IdeaId,
        title: Option<&str>,
        description: Option<&str>,
        now: Timestamp,
    ) -> Result<Idea> {
        let index = self.authorize_idea_change(requester, idea_id, "edit an idea")?;

        let title = title.map(validate_title).transpose()?;
        let description = description.map(validate_description).transpose()?;

        let idea = &mut self.ideas[index];
        if let Some(title) = title {
            idea.title = title;
        }
        if let Some(description) = description {
            idea.description = description;
        }
        idea.updated_at = now;
        let idea = idea.clone();

        self.touch(now);
        tracing::info!(storm = %self.code, idea = %idea.id, "idea updated");
        Ok(idea)
    }

    /// Delete an idea and every vote on it. Returns the number of votes removed.
    pub fn delete_idea(&mut self, requester: &SessionId, idea_id: &IdeaId, now: Timestamp) -> Result<usize> {
        let index = self.authorize_idea_change(requester, idea_id, "delete an idea")?;

        let idea = self.ideas.remove(index);
        let before = self.votes.len();
        self.votes.retain(|v| v.idea_id != idea.id);
        let removed = before - self.votes.len();

        self.touch(now);
        tracing::info!(
            storm = %self.code,
            idea = %idea.id,
            votes_removed = removed,
            "idea deleted"
        );
        Ok(removed)
    }

    /// Ideas `viewer` may see, in submission order.
    ///
    /// During ideation a participant sees only their own ideas; the moderator
    /// sees everything. From voting on, everyone sees every idea.
    pub fn visible_ideas<'a>(&'a self, viewer: &'a Participant) -> impl Iterator<Item = &'a Idea> + 'a {
        let sees_all = viewer.is_moderator() || self.status >= Phase::Voting;
        self.ideas
            .iter()
            .filter(move |idea| sees_all || idea.is_authored_by(&viewer.session_id))
    }

    fn authorize_idea_change(
        &self,
        requester: &SessionId,
        idea_id: &IdeaId,
        operation: &'static str,
    ) -> Result<usize> {
        let participant = self.member(requester)?;
        let index = self.idea_index(idea_id)?;

        if !self.can_override_ideas() {
            return Err(Error::PhaseViolation {
                operation,
                phase: self.status,
            });
        }

        let is_author = self.ideas[index].is_authored_by(requester);
        let allowed = participant.is_moderator() || (is_author && self.can_mutate_ideas());
        if !allowed {
            tracing::debug!(storm = %self.code, idea = %idea_id, operation, "idea change refused");
            return Err(Error::Forbidden(if is_author {
                "ideas can only be changed by their author during ideation".into()
            } else {
                "only the author or the moderator can change this idea".into()
            }));
        }
        Ok(index)
    }
}

//! Scoring engine: aggregate votes into per-idea scores and a ranking.
//!
//! Pure function of ideas, votes and participants. Ranking is by net score
//! (blue − red) descending; equal net scores keep submission order (earliest
//! `created_at` first), so the ranking is deterministic.

use crate::error::{Error, Result};
use crate::models::{Idea, IdeaId, Participant, Timestamp, Vote};
use crate::storm::Storm;
use serde::Serialize;
use std::collections::HashMap;

/// Label shown for a comment whose voter can no longer be resolved.
pub const ANONYMOUS_LABEL: &str = "Anonymous";

/// One voter's comment on an idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLine {
    pub voter_username: String,
    pub comment: String,
    pub blue_tokens: u32,
    pub red_tokens: u32,
}

/// An idea with its aggregated score and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredIdea {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub idea_id: IdeaId,
    pub title: String,
    pub description: String,
    pub author_username: String,
    pub created_at: Timestamp,
    pub blue_score: u64,
    pub red_score: u64,
    pub net_score: i64,
    pub vote_count: usize,
    /// In vote submission order.
    pub comments: Vec<CommentLine>,
}

/// Score and rank `ideas` from `votes`.
///
/// Fails with [`Error::Integrity`] if a vote references an idea that is not
/// in `ideas`.
pub fn rank(ideas: &[Idea], votes: &[Vote], participants: &[Participant]) -> Result<Vec<ScoredIdea>> {
    let usernames: HashMap<_, _> = participants
        .iter()
        .map(|p| (&p.session_id, p.username.as_str()))
        .collect();

    let mut ordered: Vec<&Idea> = ideas.iter().collect();
    ordered.sort_by_key(|i| (i.created_at, i.seq()));

    let mut scored: Vec<ScoredIdea> = ordered
        .iter()
        .map(|idea| ScoredIdea {
            rank: 0,
            idea_id: idea.id.clone(),
            title: idea.title.clone(),
            description: idea.description.clone(),
            author_username: idea.author_username.clone(),
            created_at: idea.created_at,
            blue_score: 0,
            red_score: 0,
            net_score: 0,
            vote_count: 0,
            comments: Vec::new(),
        })
        .collect();
    let slot: HashMap<&IdeaId, usize> = ordered
        .iter()
        .enumerate()
        .map(|(i, idea)| (&idea.id, i))
        .collect();

    let mut ordered_votes: Vec<&Vote> = votes.iter().collect();
    ordered_votes.sort_by_key(|v| (v.created_at, v.seq()));

    for vote in ordered_votes {
        let Some(&i) = slot.get(&vote.idea_id) else {
            tracing::warn!(vote = %vote.id, idea = %vote.idea_id, "vote references unknown idea");
            return Err(Error::Integrity(format!(
                "vote {} references unknown idea {}",
                vote.id, vote.idea_id
            )));
        };
        let entry = &mut scored[i];
        entry.blue_score += u64::from(vote.blue_tokens());
        entry.red_score += u64::from(vote.red_tokens());
        entry.vote_count += 1;
        entry.comments.push(CommentLine {
            voter_username: usernames
                .get(&vote.voter)
                .copied()
                .unwrap_or(ANONYMOUS_LABEL)
                .to_string(),
            comment: vote.comment.clone(),
            blue_tokens: vote.blue_tokens(),
            red_tokens: vote.red_tokens(),
        });
    }

    for entry in &mut scored {
        entry.net_score = entry.blue_score as i64 - entry.red_score as i64;
    }

    // stable: ties keep submission order
    scored.sort_by(|a, b| b.net_score.cmp(&a.net_score));
    for (i, entry) in scored.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    Ok(scored)
}

impl Storm {
    /// Ranked results for this storm's current ideas and votes.
    pub fn results(&self) -> Result<Vec<ScoredIdea>> {
        rank(&self.ideas, &self.votes, &self.participants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionId;
    use crate::storm::fixtures::*;

    fn alice() -> SessionId {
        SessionId::new("alice")
    }

    fn bob() -> SessionId {
        SessionId::new("bob")
    }

    #[test]
    fn scores_and_ranks() {
        let mut storm = storm();
        let a = storm.create_idea(&alice(), "A", "", T0).unwrap().id;
        let b = storm.create_idea(&alice(), "B", "", T0).unwrap().id;
        let c = storm.create_idea(&bob(), "C", "", T0).unwrap().id;
        storm.advance_phase(&moderator(), T0).unwrap();

        storm.submit_vote(&bob(), &a, 0, 2, "meh", T0).unwrap();
        storm.submit_vote(&bob(), &b, 3, 0, "yes", T0).unwrap();
        storm.submit_vote(&alice(), &b, 1, 0, "sure", T0).unwrap();
        storm.submit_vote(&alice(), &c, 2, 0, "nice", T0).unwrap();

        let results = storm.results().unwrap();
        let order: Vec<_> = results.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);

        let top = &results[0];
        assert_eq!((top.rank, top.blue_score, top.red_score, top.net_score), (1, 4, 0, 4));
        assert_eq!(top.vote_count, 2);
        assert_eq!(top.comments[0].voter_username, "Bob");
        assert_eq!(top.comments[1].voter_username, "Alice");

        let last = &results[2];
        assert_eq!(last.net_score, -2);
        assert_eq!(last.idea_id, a);
        assert_eq!(results[1].idea_id, c);
    }

    #[test]
    fn net_is_blue_minus_red() {
        let mut storm = storm();
        let a = storm.create_idea(&alice(), "A", "", T0).unwrap().id;
        storm.advance_phase(&moderator(), T0).unwrap();
        storm.submit_vote(&alice(), &a, 0, 3, "no", T0).unwrap();
        storm.submit_vote(&bob(), &a, 5, 0, "yes", T0).unwrap();
        for s in storm.results().unwrap() {
            assert_eq!(s.net_score, s.blue_score as i64 - s.red_score as i64);
        }
    }

    #[test]
    fn ties_keep_submission_order() {
        let mut storm = storm();
        let first = storm.create_idea(&alice(), "First", "", T0).unwrap().id;
        let second = storm
            .create_idea(&bob(), "Second", "", T0.plus_millis(10))
            .unwrap()
            .id;
        let third = storm
            .create_idea(&alice(), "Third", "", T0.plus_millis(20))
            .unwrap()
            .id;
        storm.advance_phase(&moderator(), T0).unwrap();
        storm.submit_vote(&bob(), &third, 1, 0, "x", T0).unwrap();
        storm.submit_vote(&alice(), &second, 1, 0, "y", T0).unwrap();

        let ids: Vec<_> = storm.results().unwrap().into_iter().map(|s| s.idea_id).collect();
        assert_eq!(ids, vec![second, third, first]);
    }

    #[test]
    fn unresolvable_voter_is_anonymous() {
        let mut storm = storm();
        let a = storm.create_idea(&alice(), "A", "", T0).unwrap().id;
        storm.advance_phase(&moderator(), T0).unwrap();
        storm.submit_vote(&bob(), &a, 1, 0, "hi", T0).unwrap();

        let roster: Vec<_> = storm
            .participants()
            .iter()
            .filter(|p| p.session_id != bob())
            .cloned()
            .collect();
        let results = rank(storm.ideas(), storm.votes(), &roster).unwrap();
        assert_eq!(results[0].comments[0].voter_username, ANONYMOUS_LABEL);
    }

    #[test]
    fn orphan_vote_is_integrity_error() {
        let mut storm = storm();
        let a = storm.create_idea(&alice(), "A", "", T0).unwrap().id;
        storm.advance_phase(&moderator(), T0).unwrap();
        storm.submit_vote(&bob(), &a, 1, 0, "hi", T0).unwrap();

        let err = rank(&[], storm.votes(), storm.participants()).unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));
    }

    #[test]
    fn empty_storm_has_empty_ranking() {
        assert!(storm().results().unwrap().is_empty());
    }
}

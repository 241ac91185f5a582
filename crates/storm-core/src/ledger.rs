//! Vote ledger: token-budget accounting and vote upserts.
//!
//! A participant's spent tokens are always the sum over their stored votes,
//! so the budget can never drift from the ledger. Resubmitting a vote for the
//! same idea replaces it; the budget check for the replacement is made net of
//! the tokens the old vote held.

use crate::error::{Error, Result};
use crate::models::{
    validate_comment, Allocation, BudgetStatus, IdeaId, SessionId, Timestamp, TokenColor, Vote,
    VoteId,
};
use crate::storm::Storm;

impl Storm {
    /// Cast or replace `voter`'s vote on an idea. Voting phase only.
    pub fn submit_vote(
        &mut self,
        voter: &SessionId,
        idea_id: &IdeaId,
        blue_tokens: i64,
        red_tokens: i64,
        comment: &str,
        now: Timestamp,
    ) -> Result<Vote> {
        self.member(voter)?;
        if !self.can_vote() {
            return Err(Error::PhaseViolation {
                operation: "submit a vote",
                phase: self.status,
            });
        }
        let comment = validate_comment(comment)?;
        let allocation = Allocation::from_counts(blue_tokens, red_tokens)?;
        self.idea_index(idea_id)?;

        let existing = self.vote_index(voter, idea_id);
        let (spent_blue, spent_red) = self.spent(voter);
        let (prev_blue, prev_red) = existing
            .map(|i| (self.votes[i].blue_tokens(), self.votes[i].red_tokens()))
            .unwrap_or((0, 0));

        let remaining = |color: TokenColor, spent: u32, prev: u32| {
            self.budget.max(color).saturating_sub(spent.saturating_sub(prev))
        };
        let (color, requested) = (allocation.color(), allocation.amount());
        let left = match color {
            TokenColor::Blue => remaining(color, spent_blue, prev_blue),
            TokenColor::Red => remaining(color, spent_red, prev_red),
        };
        if requested > left {
            tracing::debug!(
                storm = %self.code,
                idea = %idea_id,
                %color,
                requested,
                remaining = left,
                "vote over budget"
            );
            return Err(Error::BudgetExceeded {
                color,
                requested,
                remaining: left,
            });
        }

        let vote = match existing {
            Some(index) => {
                let vote = &mut self.votes[index];
                vote.allocation = allocation;
                vote.comment = comment;
                vote.updated_at = now;
                vote.clone()
            }
            None => {
                let seq = self.take_seq();
                let vote = Vote {
                    id: VoteId::derive(&self.code, seq),
                    idea_id: idea_id.clone(),
                    voter: voter.clone(),
                    allocation,
                    comment,
                    created_at: now,
                    updated_at: now,
                    seq,
                };
                self.votes.push(vote.clone());
                vote
            }
        };

        self.touch(now);
        tracing::info!(
            storm = %self.code,
            idea = %idea_id,
            vote = %vote.id,
            %color,
            tokens = requested,
            updated = existing.is_some(),
            "vote recorded"
        );
        Ok(vote)
    }

    /// Tokens `voter` has committed, as `(blue, red)`.
    pub fn spent(&self, voter: &SessionId) -> (u32, u32) {
        self.votes_by(voter).fold((0u32, 0u32), |(b, r), v| {
            (b.saturating_add(v.blue_tokens()), r.saturating_add(v.red_tokens()))
        })
    }

    /// `voter`'s budget position. Fails for non-members.
    pub fn budget_status(&self, voter: &SessionId) -> Result<BudgetStatus> {
        self.member(voter)?;
        let (blue, red) = self.spent(voter);
        Ok(BudgetStatus::new(self.budget, blue, red))
    }

    /// `voter`'s votes in submission order.
    pub fn votes_by<'a>(&'a self, voter: &'a SessionId) -> impl Iterator<Item = &'a Vote> + 'a {
        self.votes.iter().filter(move |v| &v.voter == voter)
    }

    fn vote_index(&self, voter: &SessionId, idea_id: &IdeaId) -> Option<usize> {
        self.votes
            .iter()
            .position(|v| &v.voter == voter && &v.idea_id == idea_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::models::{IdeaId, Phase, SessionId, Timestamp, TokenColor};
    use crate::storm::fixtures::*;
    use crate::storm::Storm;
    use proptest::prelude::*;

    fn alice() -> SessionId {
        SessionId::new("alice")
    }

    fn bob() -> SessionId {
        SessionId::new("bob")
    }

    /// Storm in voting with ideas X (by alice) and Y (by alice).
    fn voting_storm() -> (Storm, IdeaId, IdeaId) {
        let mut storm = storm();
        let x = storm.create_idea(&alice(), "X", "", T0).unwrap().id;
        let y = storm.create_idea(&alice(), "Y", "", T0).unwrap().id;
        storm.advance_phase(&moderator(), T0).unwrap();
        (storm, x, y)
    }

    #[test]
    fn vote_then_raise_within_budget() {
        let (mut storm, x, _) = voting_storm();

        storm.submit_vote(&bob(), &x, 3, 0, "good", T0).unwrap();
        assert_eq!(storm.budget_status(&bob()).unwrap().remaining_blue, 2);

        // replacing the 3 frees them, so 5 fits the budget of 5
        let vote = storm.submit_vote(&bob(), &x, 5, 0, "great", T0).unwrap();
        assert_eq!(vote.blue_tokens(), 5);
        assert_eq!(storm.votes().len(), 1);
        assert_eq!(storm.budget_status(&bob()).unwrap().remaining_blue, 0);

        let err = storm.submit_vote(&bob(), &x, 6, 0, "amazing", T0).unwrap_err();
        assert_eq!(
            err,
            Error::BudgetExceeded {
                color: TokenColor::Blue,
                requested: 6,
                remaining: 5
            }
        );
        assert_eq!(storm.votes()[0].blue_tokens(), 5);
    }

    #[test]
    fn budget_is_shared_across_ideas() {
        let (mut storm, x, y) = voting_storm();
        storm.submit_vote(&bob(), &x, 4, 0, "a", T0).unwrap();
        let err = storm.submit_vote(&bob(), &y, 2, 0, "b", T0).unwrap_err();
        assert!(matches!(err, Error::BudgetExceeded { remaining: 1, .. }));
        storm.submit_vote(&bob(), &y, 1, 0, "b", T0).unwrap();

        // red is a separate pool
        storm.submit_vote(&alice(), &y, 0, 3, "no", T0).unwrap();
        let err = storm.submit_vote(&alice(), &x, 0, 1, "no", T0).unwrap_err();
        assert!(matches!(
            err,
            Error::BudgetExceeded { color: TokenColor::Red, remaining: 0, .. }
        ));
    }

    #[test]
    fn switching_color_frees_previous_color() {
        let (mut storm, x, y) = voting_storm();
        storm.submit_vote(&bob(), &x, 5, 0, "yes", T0).unwrap();
        storm.submit_vote(&bob(), &x, 0, 2, "changed my mind", T0).unwrap();
        let status = storm.budget_status(&bob()).unwrap();
        assert_eq!((status.spent_blue, status.spent_red), (0, 2));
        storm.submit_vote(&bob(), &y, 5, 0, "now this", T0).unwrap();
    }

    #[test]
    fn resubmitting_same_values_only_touches_updated_at() {
        let (mut storm, x, _) = voting_storm();
        let first = storm.submit_vote(&bob(), &x, 2, 0, "ok", T0).unwrap();
        let later = Timestamp(T0.as_millis() + 500);
        let again = storm.submit_vote(&bob(), &x, 2, 0, "ok", later).unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.created_at, first.created_at);
        assert_eq!(again.updated_at, later);
        assert_eq!(again.allocation, first.allocation);
        assert_eq!(storm.votes().len(), 1);
    }

    #[test]
    fn invalid_votes_rejected_without_writes() {
        let (mut storm, x, _) = voting_storm();
        for (blue, red, comment) in [(1, 1, "both"), (0, 0, "none"), (-1, 0, "neg"), (1, 0, "  ")] {
            let err = storm.submit_vote(&bob(), &x, blue, red, comment, T0).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{blue}/{red}/{comment:?}");
        }
        assert!(storm.votes().is_empty());
    }

    #[test]
    fn unknown_idea_or_voter() {
        let (mut storm, x, _) = voting_storm();
        assert!(matches!(
            storm.submit_vote(&bob(), &IdeaId::new("nope"), 1, 0, "c", T0),
            Err(Error::NotFound(_))
        ));
        assert_eq!(
            storm.submit_vote(&SessionId::new("ghost"), &x, 1, 0, "c", T0).unwrap_err(),
            Error::NotAMember
        );
    }

    #[test]
    fn voting_only_in_voting_phase() {
        let mut storm = storm();
        let x = storm.create_idea(&alice(), "X", "", T0).unwrap().id;
        assert!(matches!(
            storm.submit_vote(&bob(), &x, 1, 0, "early", T0),
            Err(Error::PhaseViolation { phase: Phase::Ideation, .. })
        ));
        storm.advance_phase(&moderator(), T0).unwrap();
        storm.advance_phase(&moderator(), T0).unwrap();
        assert!(matches!(
            storm.submit_vote(&bob(), &x, 1, 0, "late", T0),
            Err(Error::PhaseViolation { phase: Phase::Results, .. })
        ));
    }

    #[derive(Debug, Clone)]
    struct Attempt {
        voter: usize,
        idea: usize,
        blue: i64,
        red: i64,
    }

    fn attempt() -> impl Strategy<Value = Attempt> {
        (0usize..3, 0usize..3, -1i64..8, -1i64..6).prop_map(|(voter, idea, blue, red)| Attempt {
            voter,
            idea,
            blue,
            red,
        })
    }

    proptest! {
        #[test]
        fn ledger_invariants_hold_for_any_sequence(
            max_blue in 0i64..8,
            max_red in 0i64..6,
            attempts in proptest::collection::vec(attempt(), 0..60),
        ) {
            let mut storm = storm_with_budget(max_blue, max_red);
            let voters: Vec<SessionId> = (0..3)
                .map(|i| {
                    let s = SessionId::new(format!("voter-{i}"));
                    storm.join(s.clone(), &format!("Voter {i}"), T0).unwrap();
                    s
                })
                .collect();
            let ideas: Vec<IdeaId> = (0..3)
                .map(|i| storm.create_idea(&voters[i], &format!("Idea {i}"), "", T0).unwrap().id)
                .collect();
            storm.advance_phase(&moderator(), T0).unwrap();

            for a in attempts {
                let before = storm.votes().len();
                let result = storm.submit_vote(&voters[a.voter], &ideas[a.idea], a.blue, a.red, "why", T0);
                if result.is_err() {
                    prop_assert_eq!(storm.votes().len(), before);
                }

                for vote in storm.votes() {
                    prop_assert!((vote.blue_tokens() > 0) ^ (vote.red_tokens() > 0));
                }
                for voter in &voters {
                    let (blue, red) = storm.spent(voter);
                    prop_assert!(i64::from(blue) <= max_blue);
                    prop_assert!(i64::from(red) <= max_red);
                    for idea in &ideas {
                        let n = storm
                            .votes()
                            .iter()
                            .filter(|v| &v.voter == voter && &v.idea_id == idea)
                            .count();
                        prop_assert!(n <= 1);
                    }
                }
            }
        }
    }
}

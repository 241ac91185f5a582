//! Vote model.

use super::budget::Allocation;
use super::ids::{IdeaId, SessionId, VoteId};
use super::timestamp::Timestamp;
use crate::error::{Error, Result};
use serde::{Serialize, Serializer};

/// One participant's token allocation on one idea.
///
/// At most one exists per (voter, idea); resubmitting updates it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: VoteId,
    pub idea_id: IdeaId,
    pub voter: SessionId,
    pub allocation: Allocation,
    pub comment: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub(crate) seq: u64,
}

impl Vote {
    pub fn blue_tokens(&self) -> u32 {
        self.allocation.blue()
    }

    pub fn red_tokens(&self) -> u32 {
        self.allocation.red()
    }

    /// Position in submission order.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Serialize for Vote {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("Vote", 7)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("ideaId", &self.idea_id)?;
        s.serialize_field("blueTokens", &self.blue_tokens())?;
        s.serialize_field("redTokens", &self.red_tokens())?;
        s.serialize_field("comment", &self.comment)?;
        s.serialize_field("createdAt", &self.created_at)?;
        s.serialize_field("updatedAt", &self.updated_at)?;
        s.end()
    }
}

/// A vote comment is mandatory.
pub fn validate_comment(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(Error::validation("a comment is required with every vote"));
    }
    Ok(raw.to_string())
}

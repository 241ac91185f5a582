//! Idea model.

use super::ids::{IdeaId, SessionId};
use super::timestamp::Timestamp;
use crate::error::{Error, Result};
use serde::Serialize;

/// Longest accepted idea title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Longest accepted idea description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// One proposal submitted during ideation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: IdeaId,
    /// Author's session handle. Never serialized.
    #[serde(skip)]
    pub author: SessionId,
    /// Author's username at submission time.
    pub author_username: String,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
    /// Equals `created_at` until the first edit.
    pub updated_at: Timestamp,
    /// Submission order within the storm.
    #[serde(skip)]
    pub(crate) seq: u64,
}

impl Idea {
    pub fn is_authored_by(&self, session: &SessionId) -> bool {
        &self.author == session
    }

    /// Position in submission order.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Check and trim a title.
pub fn validate_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::validation("idea title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(Error::validation(format!(
            "idea title exceeds {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

/// Check a description. Whitespace is kept as written.
pub fn validate_description(raw: &str) -> Result<String> {
    if raw.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(Error::validation(format!(
            "description exceeds {MAX_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(raw.to_string())
}

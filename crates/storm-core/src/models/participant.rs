//! Participant model.

use super::ids::SessionId;
use super::status::Role;
use super::timestamp::Timestamp;
use crate::error::{Error, Result};
use serde::Serialize;

/// Longest accepted username, in characters.
pub const MAX_USERNAME_CHARS: usize = 100;

/// Username given to a storm's creator when none is supplied.
pub const DEFAULT_MODERATOR_NAME: &str = "Moderator";

/// One joined user of a storm. Never removed for the storm's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub session_id: SessionId,
    pub username: String,
    pub role: Role,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(session_id: SessionId, username: String, role: Role, joined_at: Timestamp) -> Self {
        Self {
            session_id,
            username,
            role,
            joined_at,
        }
    }

    pub fn is_moderator(&self) -> bool {
        self.role.can_moderate()
    }
}

/// Trim and check a requested username.
pub fn normalize_username(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::validation("username is required"));
    }
    if name.chars().count() > MAX_USERNAME_CHARS {
        return Err(Error::validation(format!(
            "username exceeds {MAX_USERNAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed() {
        assert_eq!(normalize_username("  ada ").unwrap(), "ada");
    }

    #[test]
    fn blank_or_long_username_rejected() {
        assert!(normalize_username("   ").is_err());
        assert!(normalize_username(&"x".repeat(MAX_USERNAME_CHARS + 1)).is_err());
        assert!(normalize_username(&"x".repeat(MAX_USERNAME_CHARS)).is_ok());
    }
}

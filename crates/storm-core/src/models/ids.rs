//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Human-shareable storm code, e.g. `STORM-XYZ123`. Doubles as the storm's id.
    StormCode
);
string_id!(
    /// Opaque per-participant session handle.
    SessionId
);
string_id!(
    /// Idea identifier, unique within its storm.
    IdeaId
);
string_id!(
    /// Vote record identifier, unique within its storm.
    VoteId
);

/// Prefix of every storm code.
pub const STORM_CODE_PREFIX: &str = "STORM-";

/// Number of random characters after the prefix.
pub const STORM_CODE_LEN: usize = 6;

/// Characters a storm code is drawn from.
pub const STORM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl StormCode {
    /// Build a code from its random suffix.
    pub fn from_suffix(suffix: &str) -> Self {
        Self(format!("{STORM_CODE_PREFIX}{suffix}"))
    }

    /// Whether this has the `STORM-XXXXXX` shape.
    pub fn is_well_formed(&self) -> bool {
        self.0
            .strip_prefix(STORM_CODE_PREFIX)
            .map(|rest| {
                rest.len() == STORM_CODE_LEN
                    && rest.bytes().all(|b| STORM_CODE_ALPHABET.contains(&b))
            })
            .unwrap_or(false)
    }
}

/// Derive a short hex id from the storm code, a record kind and a sequence number.
fn derive_id(kind: &str, storm: &StormCode, seq: u64) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(kind.as_bytes());
    hasher.update(b":");
    hasher.update(storm.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(&seq.to_le_bytes());
    hex::encode(&hasher.finalize().as_bytes()[..12])
}

impl IdeaId {
    /// Deterministic id for the `seq`-th record of a storm.
    pub fn derive(storm: &StormCode, seq: u64) -> Self {
        Self(derive_id("idea", storm, seq))
    }
}

impl VoteId {
    /// Deterministic id for the `seq`-th record of a storm.
    pub fn derive(storm: &StormCode, seq: u64) -> Self {
        Self(derive_id("vote", storm, seq))
    }
}

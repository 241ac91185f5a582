//! In-memory session store: every live storm, addressable by code.
//!
//! Each storm sits behind its own `RwLock`, which is the per-storm mutation
//! scope: commands hold the write lock across their whole read-check-write
//! sequence, queries take the read lock just long enough to build a view.
//! The two index maps are only locked briefly to look a handle up and are
//! never held while a storm lock is awaited, and no code path holds two
//! storms' locks at once.

use crate::error::Result;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use storm_core::models::{STORM_CODE_ALPHABET, STORM_CODE_LEN};
use storm_core::{Error as StormError, SessionId, Storm, StormCode};
use tokio::sync::RwLock;

/// Shared handle to one storm.
pub type StormHandle = Arc<RwLock<Storm>>;

/// Registry of storms and the session handles bound to them.
#[derive(Default)]
pub struct StormStore {
    storms: RwLock<HashMap<StormCode, StormHandle>>,
    sessions: RwLock<HashMap<SessionId, StormCode>>,
}

impl StormStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new storm under a freshly generated, unused code.
    ///
    /// `build` receives the code and returns the storm plus the session
    /// handle of its moderator.
    pub async fn create<F>(&self, build: F) -> Result<StormHandle>
    where
        F: FnOnce(StormCode) -> Result<(Storm, SessionId)>,
    {
        let mut storms = self.storms.write().await;
        let code = loop {
            let candidate = generate_storm_code();
            if !storms.contains_key(&candidate) {
                break candidate;
            }
        };

        let (storm, moderator) = build(code.clone())?;
        let handle = Arc::new(RwLock::new(storm));
        storms.insert(code.clone(), Arc::clone(&handle));
        drop(storms);

        self.sessions.write().await.insert(moderator, code);
        Ok(handle)
    }

    /// Look up a storm by code.
    pub async fn handle(&self, code: &StormCode) -> Result<StormHandle> {
        self.storms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| StormError::NotFound(format!("storm {code}")).into())
    }

    /// Resolve a session handle to the storm it is bound to.
    pub async fn resolve_session(&self, session: &SessionId) -> Result<(StormCode, StormHandle)> {
        let code = self
            .sessions
            .read()
            .await
            .get(session)
            .cloned()
            .ok_or(StormError::Unauthenticated)?;
        let handle = self.handle(&code).await?;
        Ok((code, handle))
    }

    /// Bind a joined participant's session handle to its storm.
    pub async fn bind_session(&self, session: SessionId, code: StormCode) {
        self.sessions.write().await.insert(session, code);
    }

    /// Whether a session handle is currently bound to a storm.
    pub async fn is_bound(&self, session: &SessionId) -> bool {
        self.sessions.read().await.contains_key(session)
    }

    /// Drop a session binding. Returns whether it existed.
    pub async fn forget_session(&self, session: &SessionId) -> bool {
        self.sessions.write().await.remove(session).is_some()
    }

    /// Snapshot of all storm handles.
    pub async fn handles(&self) -> Vec<StormHandle> {
        self.storms.read().await.values().cloned().collect()
    }

    /// Number of storms.
    pub async fn len(&self) -> usize {
        self.storms.read().await.len()
    }

    /// Check if empty.
    pub async fn is_empty(&self) -> bool {
        self.storms.read().await.is_empty()
    }
}

/// Random `STORM-XXXXXX` code.
pub fn generate_storm_code() -> StormCode {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..STORM_CODE_LEN)
        .map(|_| STORM_CODE_ALPHABET[rng.gen_range(0..STORM_CODE_ALPHABET.len())] as char)
        .collect();
    StormCode::from_suffix(&suffix)
}

/// Random opaque session handle.
pub fn generate_session_id() -> SessionId {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    SessionId::new(format!("session-{}", hex::encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use storm_core::{StormSettings, Timestamp, TokenBudget};

    fn build(code: StormCode) -> Result<(Storm, SessionId)> {
        let settings = StormSettings {
            title: "Store test".into(),
            ..Default::default()
        }
        .validate(TokenBudget::default())?;
        let moderator = generate_session_id();
        let storm = Storm::new(code, settings, moderator.clone(), Timestamp::now());
        Ok((storm, moderator))
    }

    #[test]
    fn generated_codes_are_well_formed() {
        for _ in 0..100 {
            assert!(generate_storm_code().is_well_formed());
        }
    }

    #[test]
    fn session_ids_are_opaque_and_distinct() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("session-"));
        assert_eq!(a.as_str().len(), "session-".len() + 32);
    }

    #[tokio::test]
    async fn create_registers_storm_and_moderator_session() {
        let store = StormStore::new();
        let handle = store.create(build).await.unwrap();
        let (code, moderator) = {
            let storm = handle.read().await;
            let moderator = storm.moderator().unwrap().session_id.clone();
            (storm.code().clone(), moderator)
        };

        assert_eq!(store.len().await, 1);
        let (bound, _) = store.resolve_session(&moderator).await.unwrap();
        assert_eq!(bound, code);
        assert!(store.handle(&code).await.is_ok());
    }

    #[tokio::test]
    async fn failed_build_registers_nothing() {
        let store = StormStore::new();
        let result = store
            .create(|_| Err(storm_core::Error::Validation("nope".into()).into()))
            .await;
        assert!(result.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unknown_lookups() {
        let store = StormStore::new();
        assert!(matches!(
            store.handle(&StormCode::from_suffix("ZZZZZZ")).await,
            Err(Error::Storm(storm_core::Error::NotFound(_)))
        ));
        assert!(matches!(
            store.resolve_session(&SessionId::new("session-x")).await,
            Err(Error::Storm(storm_core::Error::Unauthenticated))
        ));
    }

    #[tokio::test]
    async fn forgotten_session_no_longer_resolves() {
        let store = StormStore::new();
        let handle = store.create(build).await.unwrap();
        let moderator = handle.read().await.moderator().unwrap().session_id.clone();

        assert!(store.is_bound(&moderator).await);
        assert!(store.forget_session(&moderator).await);
        assert!(!store.forget_session(&moderator).await);
        assert!(!store.is_bound(&moderator).await);
        assert!(store.resolve_session(&moderator).await.is_err());
    }
}

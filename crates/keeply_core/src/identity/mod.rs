//! Authenticated identity resolution.
//!
//! # Responsibility
//! - Define the identity resolution contract used by every scoped read.
//! - Provide an in-process session provider for local/dev use.
//!
//! # Invariants
//! - Absence of identity is an expected state, never an error.
//! - Identity is resolved per call; this layer caches nothing.
//! - Empty or whitespace-only identifiers resolve to "no identity".

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Opaque identifier for the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this identifier carries any usable content.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type IdentityResult = Result<Option<UserId>, IdentityError>;

/// Identity provider failure.
///
/// Callers at the fault-safe boundary treat this the same as "no identity";
/// the distinction exists for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The underlying session backend failed (expired token refresh,
    /// unreachable provider, poisoned local state).
    Provider(String),
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(detail) => write!(f, "identity provider failure: {detail}"),
        }
    }
}

impl Error for IdentityError {}

/// Resolution contract for the current authenticated user.
///
/// Injected explicitly into the fetch path so tests can substitute doubles
/// without any global session state.
pub trait IdentityProvider {
    /// Returns the current user's identifier, or `None` when the session is
    /// anonymous, expired, or unavailable.
    fn resolve_current_user(&self) -> IdentityResult;
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for &T {
    fn resolve_current_user(&self) -> IdentityResult {
        (**self).resolve_current_user()
    }
}

/// In-process session slot acting as the ambient identity source.
///
/// Mirrors the shape of a remote session handle: `sign_in`/`sign_out`
/// mutate the slot, `resolve_current_user` reads it per call.
#[derive(Default)]
pub struct SessionIdentityProvider {
    session: Mutex<Option<UserId>>,
}

impl SessionIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with an already-established session.
    pub fn signed_in(user: UserId) -> Self {
        Self {
            session: Mutex::new(Some(user)),
        }
    }

    /// Establishes a session for `user`.
    pub fn sign_in(&self, user: UserId) -> Result<(), IdentityError> {
        let mut slot = self
            .session
            .lock()
            .map_err(|_| IdentityError::Provider("session state poisoned".to_string()))?;
        *slot = Some(user);
        Ok(())
    }

    /// Clears the current session.
    pub fn sign_out(&self) -> Result<(), IdentityError> {
        let mut slot = self
            .session
            .lock()
            .map_err(|_| IdentityError::Provider("session state poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

impl IdentityProvider for SessionIdentityProvider {
    fn resolve_current_user(&self) -> IdentityResult {
        let slot = self
            .session
            .lock()
            .map_err(|_| IdentityError::Provider("session state poisoned".to_string()))?;
        Ok(slot.clone().filter(|user| !user.is_blank()))
    }
}

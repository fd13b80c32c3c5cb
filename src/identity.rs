//! Session identity supplied by the external identity provider

use std::fmt;

/// Opaque user identifier (an email address in practice)
///
/// Only used to namespace uploaded filenames.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionIdentity(String);

impl SessionIdentity {
    /// Returns `None` for empty or whitespace-only identifiers
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of the current session identity
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<SessionIdentity>;
}

/// Identity fixed at construction time
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<SessionIdentity>);

impl StaticIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(SessionIdentity::new(id))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current(&self) -> Option<SessionIdentity> {
        self.0.clone()
    }
}

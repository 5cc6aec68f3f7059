//! Fixed identity, for the runtime's own jobs and for tests.

use crate::ports::IdentityProvider;
use parking_lot::RwLock;

/// `IdentityProvider` returning whatever user was last set.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    user_id: RwLock<Option<String>>,
}

impl StaticIdentity {
    /// Identity of `user_id`.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: RwLock::new(Some(user_id.into())),
        }
    }

    /// No authenticated user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Switches the current user.
    pub fn set(&self, user_id: Option<String>) {
        *self.user_id.write() = user_id;
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_user() {
        let identity = StaticIdentity::anonymous();
        assert_eq!(identity.current_user_id(), None);
        identity.set(Some("alice".into()));
        assert_eq!(identity.current_user_id().as_deref(), Some("alice"));
    }
}

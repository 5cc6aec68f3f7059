//! # Callers
//!
//! Who is asking. Built from the authentication boundary's current user.

use std::fmt;

/// The principal behind a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Caller {
    /// An authenticated user.
    User(String),
    /// No authenticated user.
    Anonymous,
    /// The confirmation poller.
    System,
}

impl Caller {
    /// Builds a caller from an optional user id. Blank ids are anonymous.
    #[must_use]
    pub fn from_user_id(user_id: Option<String>) -> Self {
        match user_id {
            Some(id) if !id.trim().is_empty() => Self::User(id),
            _ => Self::Anonymous,
        }
    }

    /// The user id, for authenticated users.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Anonymous => f.write_str("anonymous"),
            Self::System => f.write_str("system"),
        }
    }
}

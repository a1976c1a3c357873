//! Identity of a node in an editing draft.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Local identifier handed out by a draft for nodes that have not been saved yet.
pub type LocalId = u64;

/// Whether a draft node exists only locally or already has a stored row.
///
/// Serialized as `{"state": "pending", "local_id": 3}` or
/// `{"state": "persisted", "remote_id": 42}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Identity {
    Pending { local_id: LocalId },
    Persisted { remote_id: i64 },
}

impl Identity {
    pub fn pending(local_id: LocalId) -> Self {
        Identity::Pending { local_id }
    }

    pub fn persisted(remote_id: i64) -> Self {
        Identity::Persisted { remote_id }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Identity::Pending { .. })
    }

    pub fn remote_id(&self) -> Option<i64> {
        match self {
            Identity::Persisted { remote_id } => Some(*remote_id),
            Identity::Pending { .. } => None,
        }
    }

    pub fn local_id(&self) -> Option<LocalId> {
        match self {
            Identity::Pending { local_id } => Some(*local_id),
            Identity::Persisted { .. } => None,
        }
    }

    /// Builds an identity from the `{kind}/{id}` pair used in editor URLs.
    ///
    /// Returns `None` for a negative pending id.
    pub fn from_parts(kind: IdentityKind, id: i64) -> Option<Self> {
        match kind {
            IdentityKind::Pending => u64::try_from(id).ok().map(Identity::pending),
            IdentityKind::Persisted => Some(Identity::persisted(id)),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Pending { local_id } => write!(f, "pending/{local_id}"),
            Identity::Persisted { remote_id } => write!(f, "persisted/{remote_id}"),
        }
    }
}

/// Discriminant of [`Identity`] as it appears in URL paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    Pending,
    Persisted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let pending = Identity::pending(3);
        assert!(pending.is_pending());
        assert_eq!(pending.local_id(), Some(3));
        assert_eq!(pending.remote_id(), None);

        let persisted = Identity::persisted(42);
        assert!(!persisted.is_pending());
        assert_eq!(persisted.remote_id(), Some(42));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Identity::pending(7)).unwrap();
        assert_eq!(json["state"], "pending");
        assert_eq!(json["local_id"], 7);

        let json = serde_json::to_value(Identity::persisted(9)).unwrap();
        assert_eq!(json["state"], "persisted");
        assert_eq!(json["remote_id"], 9);
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(
            Identity::from_parts(IdentityKind::Pending, 4),
            Some(Identity::pending(4))
        );
        assert_eq!(
            Identity::from_parts(IdentityKind::Persisted, 11),
            Some(Identity::persisted(11))
        );
        assert_eq!(Identity::from_parts(IdentityKind::Pending, -1), None);
    }
}

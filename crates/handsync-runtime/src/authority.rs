//! Authority Model - who drives a skeleton
//!
//! Exactly one participant encodes a given hand; everyone else decodes it.
//! The role is never cached: it is derived from the replication view on every
//! tick and on every inbound payload.

/// Ownership and connectivity as seen by one participant
pub trait ReplicationView {
    /// Connected to the session
    fn is_connected(&self) -> bool;
    /// This participant currently drives the skeleton
    fn is_locally_authoritative(&self) -> bool;
}

/// Role of a participant for one skeleton, at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Not connected; neither encodes nor decodes
    Offline,
    /// Encodes and publishes
    Authority,
    /// Decodes and applies
    Observer,
}

impl Role {
    pub fn evaluate<V: ReplicationView + ?Sized>(view: &V) -> Role {
        if !view.is_connected() {
            Role::Offline
        } else if view.is_locally_authoritative() {
            Role::Authority
        } else {
            Role::Observer
        }
    }

    pub fn may_encode(self) -> bool {
        self == Role::Authority
    }

    pub fn may_decode(self) -> bool {
        self == Role::Observer
    }
}

/// Fixed replication view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaticView {
    pub connected: bool,
    pub authoritative: bool,
}

impl StaticView {
    pub fn authority() -> Self {
        Self {
            connected: true,
            authoritative: true,
        }
    }

    pub fn observer() -> Self {
        Self {
            connected: true,
            authoritative: false,
        }
    }

    pub fn offline() -> Self {
        Self::default()
    }
}

impl ReplicationView for StaticView {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_locally_authoritative(&self) -> bool {
        self.authoritative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_evaluation() {
        assert_eq!(Role::evaluate(&StaticView::authority()), Role::Authority);
        assert_eq!(Role::evaluate(&StaticView::observer()), Role::Observer);
        assert_eq!(Role::evaluate(&StaticView::offline()), Role::Offline);

        let disconnected_owner = StaticView {
            connected: false,
            authoritative: true,
        };
        assert_eq!(Role::evaluate(&disconnected_owner), Role::Offline);
    }

    #[test]
    fn test_roles_are_exclusive() {
        for role in [Role::Offline, Role::Authority, Role::Observer] {
            assert!(!(role.may_encode() && role.may_decode()));
        }
    }
}

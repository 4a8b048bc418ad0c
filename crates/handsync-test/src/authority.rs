//! Shared skeleton ownership for simulated sessions
//!
//! One registry per session holds which node drives the skeleton and which
//! nodes are connected. Each participant reads it through an `AuthorityView`.

use std::collections::HashSet;
use std::sync::Arc;

use handsync_runtime::ReplicationView;
use parking_lot::Mutex;

use crate::NodeId;

#[derive(Debug, Default)]
struct RegistryState {
    owner: Option<NodeId>,
    connected: HashSet<NodeId>,
}

/// Exclusive ownership of one skeleton, shared by all participants of a
/// session.
///
/// Holds the only mutable authority fact; each participant reads it through
/// its own `AuthorityView`.
#[derive(Debug, Clone, Default)]
pub struct AuthorityRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl AuthorityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, node: NodeId) {
        self.state.lock().connected.insert(node);
    }

    /// Disconnecting does not release ownership
    pub fn disconnect(&self, node: NodeId) {
        self.state.lock().connected.remove(&node);
    }

    /// Take ownership, replacing any current owner
    pub fn claim(&self, node: NodeId) {
        self.state.lock().owner = Some(node);
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.state.lock().owner
    }

    pub fn view(&self, local: NodeId) -> AuthorityView {
        AuthorityView {
            registry: self.clone(),
            local,
        }
    }
}

/// One participant's view of an `AuthorityRegistry`
#[derive(Debug, Clone)]
pub struct AuthorityView {
    registry: AuthorityRegistry,
    local: NodeId,
}

impl ReplicationView for AuthorityView {
    fn is_connected(&self) -> bool {
        self.registry.state.lock().connected.contains(&self.local)
    }

    fn is_locally_authoritative(&self) -> bool {
        self.registry.state.lock().owner == Some(self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handsync_runtime::Role;

    #[test]
    fn test_exclusive_registry() {
        let registry = AuthorityRegistry::new();
        let host = NodeId::new(1);
        let guest = NodeId::new(2);
        registry.connect(host);
        registry.connect(guest);
        registry.claim(host);

        assert_eq!(Role::evaluate(&registry.view(host)), Role::Authority);
        assert_eq!(Role::evaluate(&registry.view(guest)), Role::Observer);

        registry.claim(guest);
        assert_eq!(Role::evaluate(&registry.view(host)), Role::Observer);
        assert_eq!(Role::evaluate(&registry.view(guest)), Role::Authority);
    }

    #[test]
    fn test_view_tracks_changes() {
        let registry = AuthorityRegistry::new();
        let node = NodeId::new(7);
        let view = registry.view(node);

        assert_eq!(Role::evaluate(&view), Role::Offline);
        registry.connect(node);
        assert_eq!(Role::evaluate(&view), Role::Observer);
        registry.claim(node);
        assert_eq!(Role::evaluate(&view), Role::Authority);
        registry.disconnect(node);
        assert_eq!(Role::evaluate(&view), Role::Offline);
        assert_eq!(registry.owner(), Some(node));
    }
}

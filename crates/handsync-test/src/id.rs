//! Participant identity for simulated sessions
//!
//! Ownership of a skeleton is expressed as "which node currently drives it".

use std::fmt;

/// Participant identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u64);

impl NodeId {
    #[inline]
    pub fn new(id: u64) -> Self {
        NodeId(id)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({:016x})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_formatting() {
        let id = NodeId::new(0xABCD);
        assert_eq!(format!("{}", id), "000000000000abcd");
        assert_eq!(format!("{:?}", id), "Node(000000000000abcd)");
    }
}

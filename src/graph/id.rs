//! Identity types for graph entities.
//!
//! Ids are opaque newtypes over `u32`. They are handed out by an
//! [`IdAllocator`] that belongs to a single [`Graph`](super::Graph), so two
//! graphs (two open documents, two tests) never share a counter.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Identifies a node within one graph.
    NodeId,
    "node"
);
define_id!(
    /// Identifies a port within one graph.
    PortId,
    "port"
);
define_id!(
    /// Identifies an edge within one graph.
    EdgeId,
    "edge"
);

/// Per-graph id counters. Ids start at 1 and are never reused.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_node: u32,
    next_port: u32,
    next_edge: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next_node: 1,
            next_port: 1,
            next_edge: 1,
        }
    }
}

impl IdAllocator {
    pub fn node(&mut self) -> NodeId {
        NodeId(bump(&mut self.next_node))
    }

    pub fn port(&mut self) -> PortId {
        PortId(bump(&mut self.next_port))
    }

    pub fn edge(&mut self) -> EdgeId {
        EdgeId(bump(&mut self.next_edge))
    }
}

fn bump(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn allocators_are_independent_per_instance() {
        let mut a = IdAllocator::default();
        let mut b = IdAllocator::default();

        assert_eq!(a.node(), NodeId(1));
        assert_eq!(a.node(), NodeId(2));
        assert_eq!(b.node(), NodeId(1));
        assert_eq!(a.port(), PortId(1));
        assert_eq!(a.edge(), EdgeId(1));
    }

    #[test]
    fn display_uses_entity_prefix() {
        assert_eq!(NodeId(3).to_string(), "node_3");
        assert_eq!(PortId(7).to_string(), "port_7");
        assert_eq!(format!("{:?}", EdgeId(2)), "EdgeId(2)");
    }
}

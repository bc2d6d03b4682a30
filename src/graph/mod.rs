//! Graph model: typed nodes, their ports, and edges between ports.
//!
//! The graph is the single source of truth for both the editor and the text
//! format. All state changes go through the mutation methods below, which keep
//! these invariants:
//! - a node's index is its 0-based rank among nodes of the same kind
//!   (dense, renumbered on removal);
//! - an edge joins one input (`Left`) and one output (`Right`) port, stored
//!   output -> input, and at most one edge exists per port pair;
//! - removing a port drops its edges, removing a node drops its ports.

pub mod geometry;
pub mod id;
pub mod title;

pub use geometry::{Position, Size};
pub use id::{EdgeId, IdAllocator, NodeId, PortId};
pub use title::{NodeKind, NodeTitle, OtherKind, TitleError};

use std::collections::{BTreeMap, BTreeSet};

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Input.
    Left,
    /// Output.
    Right,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub index: usize,
    pub inputs: Vec<PortId>,
    pub outputs: Vec<PortId>,
    pub position: Position,
    pub size: Size,
}

impl Node {
    pub fn title(&self) -> NodeTitle {
        NodeTitle::new(self.kind.clone(), self.index)
    }

    pub fn ports(&self, side: Side) -> &[PortId] {
        match side {
            Side::Left => &self.inputs,
            Side::Right => &self.outputs,
        }
    }

    fn ports_mut(&mut self, side: Side) -> &mut Vec<PortId> {
        match side {
            Side::Left => &mut self.inputs,
            Side::Right => &mut self.outputs,
        }
    }

    fn refresh_size(&mut self) {
        self.size = Size::for_ports(self.inputs.len(), self.outputs.len());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Port {
    pub id: PortId,
    pub node: NodeId,
    pub side: Side,
}

/// A connection from an output port (`from`) to an input port (`to`).
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub id: EdgeId,
    pub from: PortId,
    pub to: PortId,
}

impl Edge {
    pub fn touches(&self, port: PortId) -> bool {
        self.from == port || self.to == port
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    ids: IdAllocator,
    /// Ids only grow, so key order is creation (and display) order.
    nodes: BTreeMap<NodeId, Node>,
    ports: BTreeMap<PortId, Port>,
    edges: BTreeMap<EdgeId, Edge>,
    /// `(from, to)` of every edge; direction is normalized, so this is also
    /// the unordered port pair.
    wired: BTreeSet<(PortId, PortId)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn node_by_title(&self, title: &NodeTitle) -> Option<&Node> {
        self.nodes
            .values()
            .find(|n| n.index == title.index && n.kind == title.kind)
    }

    /// Position of a port within its node's input or output sequence.
    pub fn port_index(&self, id: PortId) -> Option<usize> {
        let port = self.ports.get(&id)?;
        self.node(port.node)?
            .ports(port.side)
            .iter()
            .position(|p| *p == id)
    }

    pub fn port_position(&self, id: PortId) -> Option<Position> {
        let port = self.ports.get(&id)?;
        let node = self.node(port.node)?;
        let index = node.ports(port.side).iter().position(|p| *p == id)?;
        Some(geometry::port_anchor(
            node.position,
            node.size,
            port.side == Side::Right,
            index,
        ))
    }

    /// Owning node of an edge's ports, if both ports belong to the same node.
    pub fn internal_owner(&self, edge: &Edge) -> Option<NodeId> {
        let from = self.ports.get(&edge.from)?;
        let to = self.ports.get(&edge.to)?;
        (from.node == to.node).then_some(from.node)
    }

    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        self.add_node_at(kind, geometry::DEFAULT_POSITION)
    }

    /// Add a node; its index is the current number of nodes of that kind.
    pub fn add_node_at(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let index = self.nodes.values().filter(|n| n.kind == kind).count();
        self.push_node(kind, index, position)
    }

    /// Add a node with a dense index the caller has already worked out.
    pub(crate) fn push_node(&mut self, kind: NodeKind, index: usize, position: Position) -> NodeId {
        let id = self.ids.node();
        tracing::trace!("add node {} as {}@{}", id, kind, index);
        self.nodes.insert(
            id,
            Node {
                id,
                kind,
                index,
                inputs: Vec::new(),
                outputs: Vec::new(),
                position,
                size: Size::default(),
            },
        );
        id
    }

    /// Append a port to one side of a node. `None` if the node is unknown.
    pub fn add_port(&mut self, node: NodeId, side: Side) -> Option<PortId> {
        let owner = self.nodes.get_mut(&node)?;
        let id = self.ids.port();
        owner.ports_mut(side).push(id);
        owner.refresh_size();
        self.ports.insert(id, Port { id, node, side });
        tracing::trace!("add {:?} port {} to {}", side, id, node);
        Some(id)
    }

    pub fn remove_port(&mut self, id: PortId) -> bool {
        let Some(port) = self.ports.remove(&id) else {
            return false;
        };
        if let Some(owner) = self.nodes.get_mut(&port.node) {
            owner.ports_mut(port.side).retain(|p| *p != id);
            owner.refresh_size();
        }
        self.drop_edges(|e| e.touches(id));
        tracing::trace!("removed port {}", id);
        true
    }

    /// Remove a node with its ports and edges, then close the gap in the
    /// numbering of the remaining nodes of the same kind.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(removed) = self.nodes.remove(&id) else {
            return false;
        };

        let gone: BTreeSet<PortId> = removed
            .inputs
            .iter()
            .chain(&removed.outputs)
            .copied()
            .collect();
        for port in &gone {
            self.ports.remove(port);
        }
        self.drop_edges(|e| gone.contains(&e.from) || gone.contains(&e.to));

        for node in self.nodes.values_mut() {
            if node.kind == removed.kind && node.index > removed.index {
                node.index -= 1;
            }
        }
        tracing::trace!("removed node {} ({})", id, removed.title());
        true
    }

    /// Connect two ports of opposite sides, in either argument order.
    ///
    /// Same-side pairs, unknown ports, and pairs that are already connected
    /// are rejected as no-ops (`None`).
    pub fn connect(&mut self, a: PortId, b: PortId) -> Option<EdgeId> {
        let pa = *self.ports.get(&a)?;
        let pb = *self.ports.get(&b)?;
        if pa.side == pb.side {
            tracing::trace!("rejected same-side connection {} - {}", a, b);
            return None;
        }

        let (from, to) = match pa.side {
            Side::Right => (a, b),
            Side::Left => (b, a),
        };
        if !self.wired.insert((from, to)) {
            tracing::trace!("rejected duplicate connection {} - {}", a, b);
            return None;
        }
        let id = self.ids.edge();
        self.edges.insert(id, Edge { id, from, to });
        Some(id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        match self.edges.remove(&id) {
            Some(edge) => {
                self.wired.remove(&(edge.from, edge.to));
                true
            }
            None => false,
        }
    }

    fn drop_edges(&mut self, doomed: impl Fn(&Edge) -> bool) {
        let wired = &mut self.wired;
        self.edges.retain(|_, e| {
            if doomed(e) {
                wired.remove(&(e.from, e.to));
                return false;
            }
            true
        });
    }

    pub fn move_node(&mut self, id: NodeId, position: Position) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Swap in a whole new graph in one step.
    pub fn replace(&mut self, other: Graph) {
        *self = other;
    }

    /// Parse text into a fresh graph. See [`crate::format::parse`].
    pub fn from_text(text: &str) -> Graph {
        crate::format::parse(text)
    }

    /// Replace this graph with the one described by `text`.
    pub fn load_text(&mut self, text: &str) {
        self.replace(crate::format::parse(text));
    }

    /// Canonical text with default options. See [`crate::format::serialize`].
    pub fn to_text(&self) -> String {
        crate::format::serialize(self)
    }
}

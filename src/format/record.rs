use crate::graph::NodeTitle;
use std::collections::BTreeMap;

/// What the text says about one node: port counts are inferred from the
/// highest index any connection line mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub title: NodeTitle,
    pub input_count: usize,
    pub output_count: usize,
}

impl NodeInfo {
    pub fn new(title: NodeTitle) -> Self {
        Self {
            title,
            input_count: 0,
            output_count: 0,
        }
    }

    pub fn need_input(&mut self, index: usize) {
        self.input_count = self.input_count.max(index + 1);
    }

    pub fn need_output(&mut self, index: usize) {
        self.output_count = self.output_count.max(index + 1);
    }
}

/// `in -> out` inside a node block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalRecord {
    pub node: NodeTitle,
    pub input: usize,
    pub output: usize,
}

/// `src:out -> dst:in` inside the bind block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRecord {
    pub src: NodeTitle,
    pub src_index: usize,
    pub dst: NodeTitle,
    pub dst_index: usize,
}

/// Nodes keyed by title; iteration follows serialization order.
pub type NodeIndex = BTreeMap<NodeTitle, NodeInfo>;

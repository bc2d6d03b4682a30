//! Summary view of a parsed graph, for `pipegraph inspect`.

use crate::diagnostics::Skipped;
use crate::format::serialize::{bind_rows, stored_pairs};
use crate::graph::{Graph, Node, NodeTitle, Position};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub title: NodeTitle,
    pub inputs: usize,
    pub outputs: usize,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize)]
pub struct InternalView {
    pub node: NodeTitle,
    pub input: usize,
    pub output: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BindView {
    pub src: NodeTitle,
    pub src_index: usize,
    pub dst: NodeTitle,
    pub dst_index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub nodes: usize,
    pub ports: usize,
    pub internal_edges: usize,
    pub bind_edges: usize,
    pub skipped_lines: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub nodes: Vec<NodeView>,
    pub internal: Vec<InternalView>,
    pub bind: Vec<BindView>,
    pub skipped: Vec<Skipped>,
    pub totals: TotalsView,
}

/// Collect nodes, internal edges, and bind edges in serialization order.
pub fn build_summary(graph: &Graph, skipped: &[Skipped]) -> GraphSummary {
    let mut nodes: Vec<&Node> = graph.nodes().collect();
    nodes.sort_by_key(|n| n.title());

    let internal: Vec<InternalView> = nodes
        .iter()
        .flat_map(|node| {
            stored_pairs(graph, node)
                .into_iter()
                .map(move |(input, output)| InternalView {
                    node: node.title(),
                    input,
                    output,
                })
        })
        .collect();

    let bind: Vec<BindView> = bind_rows(graph)
        .into_iter()
        .map(|(src, src_index, dst, dst_index)| BindView {
            src,
            src_index,
            dst,
            dst_index,
        })
        .collect();

    GraphSummary {
        totals: TotalsView {
            nodes: graph.node_count(),
            ports: graph.port_count(),
            internal_edges: internal.len(),
            bind_edges: bind.len(),
            skipped_lines: skipped.len(),
        },
        nodes: nodes
            .iter()
            .map(|n| NodeView {
                title: n.title(),
                inputs: n.inputs.len(),
                outputs: n.outputs.len(),
                position: n.position,
            })
            .collect(),
        internal,
        bind,
        skipped: skipped.to_vec(),
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.totals;
        writeln!(
            f,
            "{} nodes, {} ports, {} internal, {} bind, {} skipped lines",
            t.nodes, t.ports, t.internal_edges, t.bind_edges, t.skipped_lines
        )?;
        for n in &self.nodes {
            writeln!(
                f,
                "  {:<12} in={:<3} out={:<3} at ({}, {})",
                n.title.to_string(),
                n.inputs,
                n.outputs,
                n.position.x,
                n.position.y
            )?;
        }
        if !self.internal.is_empty() {
            writeln!(f, "internal:")?;
            for e in &self.internal {
                writeln!(f, "  {}: {} -> {}", e.node, e.input, e.output)?;
            }
        }
        if !self.bind.is_empty() {
            writeln!(f, "bind:")?;
            for b in &self.bind {
                writeln!(f, "  {}:{} -> {}:{}", b.src, b.src_index, b.dst, b.dst_index)?;
            }
        }
        for s in &self.skipped {
            writeln!(f, "skipped {}", s)?;
        }
        Ok(())
    }
}

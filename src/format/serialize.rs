use crate::graph::{Graph, Node, NodeTitle, Side};

/// How node blocks describe internal (same-node) connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InternalLines {
    /// Pair input `i` with output `min(i, outputs - 1)`, from port counts alone.
    #[default]
    Derived,
    /// Emit the internal edges the graph actually holds.
    Stored,
}

#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    pub internal: InternalLines,
}

/// Canonical text for a graph, with default options.
pub fn serialize(graph: &Graph) -> String {
    serialize_with(graph, &SerializeOptions::default())
}

/// Emit node blocks in `(kind, index)` order, then the bind block.
///
/// ```text
/// {
/// vcap@0 : {
/// },
/// vproc@0 : {
///   0 -> 0
/// },
/// bind : {
///   vcap@0:0 -> vproc@0:0
/// }
/// }
/// ```
pub fn serialize_with(graph: &Graph, options: &SerializeOptions) -> String {
    let mut nodes: Vec<&Node> = graph.nodes().collect();
    nodes.sort_by_key(|n| n.title());

    let mut lines = vec!["{".to_string()];
    for node in nodes {
        lines.push(format!("{} : {{", node.title()));
        let pairs = match options.internal {
            InternalLines::Derived => derived_pairs(node),
            InternalLines::Stored => stored_pairs(graph, node),
        };
        for (input, output) in pairs {
            lines.push(format!("  {} -> {}", input, output));
        }
        lines.push("},".to_string());
    }

    lines.push("bind : {".to_string());
    for (src, src_index, dst, dst_index) in bind_rows(graph) {
        lines.push(format!("  {}:{} -> {}:{}", src, src_index, dst, dst_index));
    }
    lines.push("}".to_string());
    lines.push("}".to_string());

    lines.join("\n")
}

fn derived_pairs(node: &Node) -> Vec<(usize, usize)> {
    let (inputs, outputs) = (node.inputs.len(), node.outputs.len());
    if inputs == 0 || outputs == 0 {
        return Vec::new();
    }
    (0..inputs).map(|i| (i, i.min(outputs - 1))).collect()
}

pub(crate) fn stored_pairs(graph: &Graph, node: &Node) -> Vec<(usize, usize)> {
    let mut pairs: Vec<(usize, usize)> = graph
        .edges()
        .filter(|e| graph.internal_owner(e) == Some(node.id))
        .filter_map(|e| {
            let input = node.inputs.iter().position(|p| *p == e.to)?;
            let output = node.outputs.iter().position(|p| *p == e.from)?;
            Some((input, output))
        })
        .collect();
    pairs.sort();
    pairs
}

/// Cross-node edges as (source, output index, destination, input index),
/// sorted. Same-node edges and edges that are not one output plus one input
/// are left out.
pub(crate) fn bind_rows(graph: &Graph) -> Vec<(NodeTitle, usize, NodeTitle, usize)> {
    let mut rows: Vec<_> = graph
        .edges()
        .filter_map(|e| {
            let a = graph.port(e.from)?;
            let b = graph.port(e.to)?;
            let (out, inp) = match (a.side, b.side) {
                (Side::Right, Side::Left) => (a, b),
                (Side::Left, Side::Right) => (b, a),
                _ => return None,
            };
            if out.node == inp.node {
                return None;
            }
            let src = graph.node(out.node)?;
            let dst = graph.node(inp.node)?;
            Some((
                src.title(),
                graph.port_index(out.id)?,
                dst.title(),
                graph.port_index(inp.id)?,
            ))
        })
        .collect();
    rows.sort();
    rows
}

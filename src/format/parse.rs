use crate::diagnostics::{SkipReason, Skipped};
use crate::format::record::{BindRecord, InternalRecord, NodeIndex, NodeInfo};
use crate::format::MAX_PORTS_PER_SIDE;
use crate::graph::{Graph, NodeId, NodeKind, NodeTitle, PortId, Side, geometry};
use regex::Regex;
use std::collections::BTreeMap;
use std::num::IntErrorKind;
use std::sync::LazyLock;

// Patterns run on a line that is already trimmed, stripped of `//` comments
// and of one trailing comma.
//
//   vproc@0 : {            block header (`bind : {` enters bind mode)
//   vproc@0 :              block header whose `{` follows on its own line
//   0 -> 1                 internal connection
//   vcap@0:0 -> vproc@0:0  bind connection
//   }                      end of block
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\s:{}]+)\s*:\s*\{$").expect("header pattern"));
static OPEN_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\s:{}]+)\s*:$").expect("open header pattern"));
static INTERNAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\s*->\s*([0-9]+)$").expect("internal pattern"));
static BIND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\s:{}]+)\s*:\s*([0-9]+)\s*->\s*([^\s:{}]+)\s*:\s*([0-9]+)$")
        .expect("bind pattern")
});

const BIND_HEADER: &str = "bind";

/// A parsed document plus the lines that were stepped over.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub graph: Graph,
    pub skipped: Vec<Skipped>,
}

/// Parse text into a fresh graph. Never fails: unrecognized lines are
/// skipped, and an empty or unreadable document gives an empty graph.
pub fn parse(text: &str) -> Graph {
    parse_with_report(text).graph
}

pub fn parse_with_report(text: &str) -> Parsed {
    let mut scan = Scan::default();
    for (lineno, line) in text.lines().enumerate() {
        scan.line(lineno + 1, line);
    }
    let Scan {
        nodes,
        internals,
        binds,
        skipped,
        ..
    } = scan;

    Parsed {
        graph: build(&nodes, &internals, &binds),
        skipped,
    }
}

#[derive(Debug, Default)]
enum Block {
    #[default]
    Top,
    Node(NodeTitle),
    Bind,
}

#[derive(Debug, Default)]
struct Scan {
    block: Block,
    /// Block named by a header that still waits for its `{` line.
    pending: Option<Block>,
    nodes: NodeIndex,
    internals: Vec<InternalRecord>,
    binds: Vec<BindRecord>,
    skipped: Vec<Skipped>,
}

impl Scan {
    fn line(&mut self, lno: usize, raw: &str) {
        let line = normalize(raw);
        if line.is_empty() {
            return;
        }
        let pending = self.pending.take();
        if line == "{" {
            if let Some(block) = pending {
                self.enter(block);
            }
            return;
        }
        if line == "}" {
            self.block = Block::Top;
            return;
        }
        if let Err(reason) = self.statement(line) {
            tracing::debug!("skipping line {}: {} ({:?})", lno, reason, raw);
            self.skipped.push(Skipped {
                line: lno,
                text: raw.to_string(),
                reason,
            });
        }
    }

    fn statement(&mut self, line: &str) -> Result<(), SkipReason> {
        if let Some(caps) = HEADER_RE.captures(line) {
            let block = self.header(&caps[1])?;
            self.enter(block);
            return Ok(());
        }
        if let Some(caps) = OPEN_HEADER_RE.captures(line) {
            self.pending = Some(self.header(&caps[1])?);
            return Ok(());
        }

        if let Some(caps) = INTERNAL_RE.captures(line) {
            let Block::Node(title) = &self.block else {
                return Err(SkipReason::InternalOutsideNode);
            };
            let title = title.clone();
            let input = port_index(&caps[1])?;
            let output = port_index(&caps[2])?;
            let info = self.node_mut(&title);
            info.need_input(input);
            info.need_output(output);
            self.internals.push(InternalRecord {
                node: title,
                input,
                output,
            });
            return Ok(());
        }

        if let Some(caps) = BIND_RE.captures(line) {
            if !matches!(self.block, Block::Bind) {
                return Err(SkipReason::BindOutsideBind);
            }
            let src: NodeTitle = caps[1].parse()?;
            let src_index = port_index(&caps[2])?;
            let dst: NodeTitle = caps[3].parse()?;
            let dst_index = port_index(&caps[4])?;
            self.node_mut(&src).need_output(src_index);
            self.node_mut(&dst).need_input(dst_index);
            self.binds.push(BindRecord {
                src,
                src_index,
                dst,
                dst_index,
            });
            return Ok(());
        }

        Err(SkipReason::Unrecognized)
    }

    /// Leave the current block and name the next one.
    fn header(&mut self, name: &str) -> Result<Block, SkipReason> {
        // A bad header leaves us outside any block, so its body is skipped too.
        self.block = Block::Top;
        if name == BIND_HEADER {
            return Ok(Block::Bind);
        }
        Ok(Block::Node(name.parse()?))
    }

    /// Node blocks register their node even when they stay empty.
    fn enter(&mut self, block: Block) {
        if let Block::Node(title) = &block {
            self.node_mut(title);
        }
        self.block = block;
    }

    fn node_mut(&mut self, title: &NodeTitle) -> &mut NodeInfo {
        self.nodes
            .entry(title.clone())
            .or_insert_with(|| NodeInfo::new(title.clone()))
    }
}

/// Trim, drop a `//` comment, drop one trailing comma.
fn normalize(raw: &str) -> &str {
    let line = match raw.find("//") {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let line = line.trim();
    line.strip_suffix(',').map(str::trim_end).unwrap_or(line)
}

/// `digits` is ASCII digits only (the patterns see to that), so the only way
/// to fail is a value at or past the limit, overflow included.
fn port_index(digits: &str) -> Result<usize, SkipReason> {
    match digits.parse::<usize>() {
        Ok(i) if i < MAX_PORTS_PER_SIDE => Ok(i),
        Ok(_) => Err(SkipReason::IndexTooLarge),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(SkipReason::IndexTooLarge),
        Err(_) => Err(SkipReason::Unrecognized),
    }
}

/// Allocate nodes in title order, lay them out on the grid, then wire up
/// internal and bind records.
fn build(nodes: &NodeIndex, internals: &[InternalRecord], binds: &[BindRecord]) -> Graph {
    let mut graph = Graph::new();
    let mut allocated: BTreeMap<&NodeTitle, NodeId> = BTreeMap::new();
    let mut next_index: BTreeMap<&NodeKind, usize> = BTreeMap::new();
    let mut unknown_kinds = 0;

    // Titles iterate kind by kind, so a per-kind counter gives the dense rank
    // and hand-edited gaps are closed here.
    for (title, info) in nodes {
        let slot = next_index.entry(&title.kind).or_insert(0);
        let index = *slot;
        *slot += 1;
        if index != title.index {
            tracing::debug!("renumbering {} to {}@{}", title, title.kind, index);
        }

        // Each unknown kind gets its own column right of the known ones.
        let column = if title.kind.is_known() {
            title.kind.column()
        } else {
            if index == 0 {
                unknown_kinds += 1;
            }
            title.kind.column() + unknown_kinds - 1
        };
        let id = graph.push_node(
            title.kind.clone(),
            index,
            geometry::grid_position(column, index),
        );
        for _ in 0..info.input_count {
            graph.add_port(id, Side::Left);
        }
        for _ in 0..info.output_count {
            graph.add_port(id, Side::Right);
        }
        allocated.insert(title, id);
    }

    let port_at = |graph: &Graph, title: &NodeTitle, side: Side, index: usize| -> Option<PortId> {
        let id = allocated.get(title)?;
        graph.node(*id)?.ports(side).get(index).copied()
    };

    for rec in internals {
        let input = port_at(&graph, &rec.node, Side::Left, rec.input);
        let output = port_at(&graph, &rec.node, Side::Right, rec.output);
        match (output, input) {
            (Some(output), Some(input)) => {
                graph.connect(output, input);
            }
            _ => tracing::debug!(
                "dropping internal connection {} -> {} in {}: no such port",
                rec.input,
                rec.output,
                rec.node
            ),
        }
    }

    for rec in binds {
        let output = port_at(&graph, &rec.src, Side::Right, rec.src_index);
        let input = port_at(&graph, &rec.dst, Side::Left, rec.dst_index);
        match (output, input) {
            (Some(output), Some(input)) => {
                graph.connect(output, input);
            }
            _ => tracing::debug!(
                "dropping bind {}:{} -> {}:{}: no such port",
                rec.src,
                rec.src_index,
                rec.dst,
                rec.dst_index
            ),
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn counts(graph: &Graph) -> Vec<(String, usize, usize)> {
        graph
            .nodes()
            .map(|n| (n.title().to_string(), n.inputs.len(), n.outputs.len()))
            .collect()
    }

    #[test]
    fn empty_document_gives_empty_graph() {
        let parsed = parse_with_report("{\n}\n");
        assert!(parsed.graph.is_empty());
        assert_eq!(parsed.graph.edge_count(), 0);
        assert!(parsed.skipped.is_empty());

        assert!(parse("").is_empty());
        assert!(parse("complete garbage\n}}}\n{{").is_empty());
    }

    #[test]
    fn infers_port_counts_from_internal_and_bind_lines() {
        let text = "{\nvproc@0 : {\n  0 -> 2\n  3 -> 0\n},\nbind : {\n  vproc@0:4 -> vout@0:1\n}\n}";
        let g = parse(text);
        assert_eq!(
            counts(&g),
            vec![("vproc@0".to_string(), 4, 5), ("vout@0".to_string(), 2, 0)]
        );
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn whitespace_trailing_commas_and_comments_are_tolerated() {
        let text = "{\n  vproc@0:{ // main stage\n 0->0,\n }\n bind:{\n vcap@0 : 0->vproc@0 : 0 ,\n }\n}\n";
        let parsed = parse_with_report(text);
        assert!(parsed.skipped.is_empty(), "{:?}", parsed.skipped);
        assert_eq!(
            counts(&parsed.graph),
            vec![("vcap@0".to_string(), 0, 1), ("vproc@0".to_string(), 1, 1)]
        );
        assert_eq!(parsed.graph.edge_count(), 2);
    }

    #[test]
    fn malformed_lines_are_skipped_individually() {
        let text = "{\n\
                    vcap@x : {\n\
                    0 -> 0\n\
                    },\n\
                    vproc@0 : {\n\
                    0 -> 99999999999999999999999\n\
                    0 -> 0\n\
                    vcap@0:0 -> vproc@0:0\n\
                    what is this\n\
                    },\n\
                    0 -> 0\n\
                    bind : {\n\
                    vcap@0:0 -> vproc@0:0\n\
                    }\n\
                    }\n";
        let parsed = parse_with_report(text);
        let reasons: Vec<(usize, SkipReason)> = parsed
            .skipped
            .iter()
            .map(|s| (s.line, s.reason.clone()))
            .collect();
        assert!(matches!(reasons[0], (2, SkipReason::BadTitle(_))));
        assert_eq!(
            reasons[1..].to_vec(),
            vec![
                (3, SkipReason::InternalOutsideNode),
                (6, SkipReason::IndexTooLarge),
                (8, SkipReason::BindOutsideBind),
                (9, SkipReason::Unrecognized),
                (11, SkipReason::InternalOutsideNode),
            ]
        );
        assert_eq!(
            counts(&parsed.graph),
            vec![("vcap@0".to_string(), 0, 1), ("vproc@0".to_string(), 1, 1)]
        );
        assert_eq!(parsed.graph.edge_count(), 2);
    }

    #[test]
    fn gaps_in_indices_are_compacted_and_binds_follow() {
        let text = "{\nbind : {\n  vcap@3:0 -> venc@7:0\n  vcap@1:0 -> venc@7:1\n}\n}";
        let g = parse(text);
        assert_eq!(
            counts(&g),
            vec![
                ("vcap@0".to_string(), 0, 1),
                ("vcap@1".to_string(), 0, 1),
                ("venc@0".to_string(), 2, 0),
            ]
        );
        // vcap@1 in the text became vcap@0 and feeds input 1.
        let first = g
            .node_by_title(&NodeTitle::new(NodeKind::Capture, 0))
            .unwrap();
        let edge = g
            .edges()
            .find(|e| e.from == first.outputs[0])
            .unwrap();
        assert_eq!(g.port_index(edge.to), Some(1));
    }

    #[test]
    fn nodes_are_laid_out_by_kind_column_and_index_row() {
        let text = "{\nvout@0 : {\n},\nvsplit@0 : {\n},\nvcap@0 : {\n},\nvcap@1 : {\n},\n\
                    vmix@0 : {\n},\nvmix@1 : {\n}\n}";
        let g = parse(text);
        let layout: Vec<(String, f32, f32)> = g
            .nodes()
            .map(|n| (n.title().to_string(), n.position.x, n.position.y))
            .collect();
        assert_eq!(
            layout,
            vec![
                ("vcap@0".to_string(), 80.0, 80.0),
                ("vcap@1".to_string(), 80.0, 240.0),
                ("vout@0".to_string(), 1040.0, 80.0),
                ("vmix@0".to_string(), 1280.0, 80.0),
                ("vmix@1".to_string(), 1280.0, 240.0),
                ("vsplit@0".to_string(), 1520.0, 80.0),
            ]
        );
    }

    #[test]
    fn node_height_follows_inferred_ports() {
        let g = parse("{\nvproc@0 : {\n  5 -> 0\n}\n}");
        let node = g.nodes().next().unwrap();
        // 6 inputs: 30 + 5 * 20 + 20
        assert_eq!(node.size.height, 150.0);
    }

    #[test]
    fn duplicate_lines_make_one_edge() {
        let text = "{\nvproc@0 : {\n0 -> 0\n0 -> 0\n}\n\
                    bind : {\nvcap@0:0 -> vproc@0:0\nvcap@0:0 -> vproc@0:0\n}\n}";
        assert_eq!(parse(text).edge_count(), 2);
    }

    #[test]
    fn header_brace_may_sit_on_the_next_line() {
        let text = "{\nvproc@0 :\n{\n  0 -> 0\n}\nbind :\n\n{\n  vcap@0:0 -> vproc@0:0\n}\n}\n";
        let parsed = parse_with_report(text);
        assert!(parsed.skipped.is_empty(), "{:?}", parsed.skipped);
        assert_eq!(
            counts(&parsed.graph),
            vec![("vcap@0".to_string(), 0, 1), ("vproc@0".to_string(), 1, 1)]
        );
        assert_eq!(parsed.graph.edge_count(), 2);
    }

    #[test]
    fn open_header_without_brace_opens_nothing() {
        let text = "{\nvproc@0 :\n0 -> 0\n{\n1 -> 1\n}\n}";
        let parsed = parse_with_report(text);
        let reasons: Vec<(usize, SkipReason)> = parsed
            .skipped
            .iter()
            .map(|s| (s.line, s.reason.clone()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (3, SkipReason::InternalOutsideNode),
                (5, SkipReason::InternalOutsideNode),
            ]
        );
        assert!(parsed.graph.is_empty());
    }

    #[test]
    fn only_ascii_digits_count_as_port_indices() {
        let text = "{\nvproc@0 : {\n  \u{663} -> 0\n  0 -> 4096\n  0 -> 4095\n}\n}";
        let parsed = parse_with_report(text);
        let reasons: Vec<(usize, SkipReason)> = parsed
            .skipped
            .iter()
            .map(|s| (s.line, s.reason.clone()))
            .collect();
        assert_eq!(
            reasons,
            vec![(3, SkipReason::Unrecognized), (4, SkipReason::IndexTooLarge)]
        );
        assert_eq!(counts(&parsed.graph), vec![("vproc@0".to_string(), 1, 4096)]);
    }

    #[test]
    fn signed_titles_are_skipped() {
        let parsed = parse_with_report("{\nbind : {\n  vcap@+3:0 -> vout@0:0\n}\n}");
        assert!(matches!(
            parsed.skipped[..],
            [Skipped {
                line: 3,
                reason: SkipReason::BadTitle(_),
                ..
            }]
        ));
        assert!(parsed.graph.is_empty());
    }

    #[test]
    fn large_bind_blocks_parse_every_line() {
        let mut text = String::from("{\nbind : {\n");
        for i in 0..5000 {
            text.push_str(&format!("  vcap@{i}:0 -> vout@{i}:0\n"));
            text.push_str(&format!("  vcap@{i}:0 -> vout@{i}:0\n"));
        }
        text.push_str("}\n}\n");

        let g = parse(&text);
        assert_eq!(g.node_count(), 10_000);
        assert_eq!(g.edge_count(), 5000);
        let last = g
            .node_by_title(&NodeTitle::new(NodeKind::Output, 4999))
            .unwrap();
        assert_eq!(last.inputs.len(), 1);
        assert_eq!(last.position.y, 80.0 + 4999.0 * 160.0);
    }
}

//! Graph model and text format for video pipeline descriptions.
//!
//! A pipeline is a graph of typed stages (`vcap`, `vproc`, `venc`, `vdec`,
//! `vout`) whose ports are wired together. [`format::serialize`] writes the
//! graph as text and [`format::parse`] reads it back.

pub mod diagnostics;
pub mod format;
pub mod graph;
pub mod summary;

pub use format::{InternalLines, Parsed, SerializeOptions, parse, parse_with_report, serialize};
pub use graph::{Edge, EdgeId, Graph, Node, NodeId, NodeKind, NodeTitle, Port, PortId, Side};

pub type Result<T> = anyhow::Result<T>;

//! Node kinds and `type@index` titles.
//!
//! Example title: `vproc@1`  =>  NodeTitle { kind: Process, index: 1 }
//!
//! Titles order by kind (fixed pipeline order, unknown kinds last) and then
//! by index, so they can key a BTreeMap and come out in serialization order.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stage type of a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    Capture,
    Process,
    Encoder,
    Decoder,
    Output,
    /// A type prefix the format does not know. Accepted, laid out last.
    Other(OtherKind),
}

/// Name of an unrecognized kind. Only [`NodeKind::from_prefix`] builds one,
/// so it never spells a known prefix and always survives a text round trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OtherKind(String);

impl OtherKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl NodeKind {
    /// The five recognized kinds, in pipeline (and layout column) order.
    pub const KNOWN: [NodeKind; 5] = [
        NodeKind::Capture,
        NodeKind::Process,
        NodeKind::Encoder,
        NodeKind::Decoder,
        NodeKind::Output,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Capture => "vcap",
            NodeKind::Process => "vproc",
            NodeKind::Encoder => "venc",
            NodeKind::Decoder => "vdec",
            NodeKind::Output => "vout",
            NodeKind::Other(name) => name.as_str(),
        }
    }

    /// Layout column. Unrecognized kinds start at the column after `vout`;
    /// the parser gives each distinct one its own column from there.
    pub fn column(&self) -> usize {
        match self {
            NodeKind::Capture => 0,
            NodeKind::Process => 1,
            NodeKind::Encoder => 2,
            NodeKind::Decoder => 3,
            NodeKind::Output => 4,
            NodeKind::Other(_) => 5,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NodeKind::Other(_))
    }

    /// Map a type prefix to a kind. Unknown prefixes become `Other`; `None`
    /// if the prefix could not be written back as a title (empty, or holding
    /// whitespace, `:`, `{`, `}` or `@`).
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let kind = match prefix {
            "vcap" => NodeKind::Capture,
            "vproc" => NodeKind::Process,
            "venc" => NodeKind::Encoder,
            "vdec" => NodeKind::Decoder,
            "vout" => NodeKind::Output,
            other => {
                let printable = !other.is_empty()
                    && !other
                        .chars()
                        .any(|c| c.is_whitespace() || matches!(c, ':' | '{' | '}' | '@'));
                if !printable {
                    return None;
                }
                NodeKind::Other(OtherKind(other.to_string()))
            }
        };
        Some(kind)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The `type@index` identifier of a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeTitle {
    pub kind: NodeKind,
    pub index: usize,
}

impl NodeTitle {
    pub fn new(kind: NodeKind, index: usize) -> Self {
        Self { kind, index }
    }
}

impl fmt::Display for NodeTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.index)
    }
}

impl Serialize for NodeTitle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("title {0:?} has no '@' separator")]
    MissingSeparator(String),
    #[error("title {0:?} has an empty type")]
    EmptyType(String),
    #[error("title {title:?} has an unusable type {prefix:?}")]
    BadType { title: String, prefix: String },
    #[error("title {title:?} has a non-numeric index {index:?}")]
    BadIndex { title: String, index: String },
}

/// Parse "vproc@1" into NodeTitle { kind: Process, index: 1 }.
impl FromStr for NodeTitle {
    type Err = TitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (prefix, index) = s
            .split_once('@')
            .ok_or_else(|| TitleError::MissingSeparator(s.to_string()))?;
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(TitleError::EmptyType(s.to_string()));
        }
        let kind = NodeKind::from_prefix(prefix).ok_or_else(|| TitleError::BadType {
            title: s.to_string(),
            prefix: prefix.to_string(),
        })?;
        let index = index.trim();
        let bad_index = || TitleError::BadIndex {
            title: s.to_string(),
            index: index.to_string(),
        };
        // Plain ASCII digits only, so `+3` does not alias `3`.
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad_index());
        }
        let index = index.parse::<usize>().map_err(|_| bad_index())?;
        Ok(NodeTitle::new(kind, index))
    }
}

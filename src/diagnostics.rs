//! User-facing diagnostics: skipped-line reports and message helpers.

use crate::graph::TitleError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why the parser ignored a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("unrecognized line")]
    Unrecognized,
    #[error("bad node title: {0}")]
    BadTitle(#[from] TitleError),
    #[error(
        "port index is at or above the limit of {max} ports per side",
        max = crate::format::MAX_PORTS_PER_SIDE
    )]
    IndexTooLarge,
    #[error("connection outside of a node block")]
    InternalOutsideNode,
    #[error("bind connection outside of the bind block")]
    BindOutsideBind,
}

/// A line the parser stepped over. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub line: usize,
    pub text: String,
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({:?})", self.line, self.reason, self.text)
    }
}

impl Serialize for Skipped {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Skipped", 3)?;
        s.serialize_field("line", &self.line)?;
        s.serialize_field("text", &self.text)?;
        s.serialize_field("reason", &self.reason.to_string())?;
        s.end()
    }
}

/// Format a message for an error surfaced to the CLI user.
pub fn error_message(msg: impl fmt::Display) -> String {
    format!("pipegraph: {}", msg)
}

/// Report a condition the CLI user should see without failing the run.
pub fn warn(msg: impl fmt::Display) {
    tracing::warn!("{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn skipped_lines_render_with_position_and_reason() {
        let s = Skipped {
            line: 4,
            text: "vcap@x : {".into(),
            reason: SkipReason::BadTitle(TitleError::BadIndex {
                title: "vcap@x".into(),
                index: "x".into(),
            }),
        };
        assert_eq!(
            s.to_string(),
            r#"line 4: bad node title: title "vcap@x" has a non-numeric index "x" ("vcap@x : {")"#
        );
    }

    #[test]
    fn index_limit_message_matches_the_inclusive_check() {
        assert_eq!(
            SkipReason::IndexTooLarge.to_string(),
            "port index is at or above the limit of 4096 ports per side"
        );
    }

    #[test]
    fn error_messages_carry_the_tool_prefix() {
        assert_eq!(error_message("read x"), "pipegraph: read x");
    }
}

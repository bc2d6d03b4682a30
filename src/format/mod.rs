//! The pipeline text format: node blocks followed by one `bind` block.
//!
//! ```text
//! {
//! vcap@0 : {
//! },
//! vproc@0 : {
//!   0 -> 0
//! },
//! bind : {
//!   vcap@0:0 -> vproc@0:0
//! }
//! }
//! ```
//!
//! Bind lines and per-node port counts survive a round trip. Geometry is
//! never written, and internal lines only survive as far as the chosen
//! [`InternalLines`] mode allows.

pub mod parse;
pub mod record;
pub mod serialize;

pub use parse::{Parsed, parse, parse_with_report};
pub use serialize::{InternalLines, SerializeOptions, serialize, serialize_with};

/// Port indices at or above this are rejected by the parser.
pub const MAX_PORTS_PER_SIDE: usize = 4096;

//! The textual tool-call protocol: extraction and recovery.

pub mod parser;
pub mod recovery;
pub mod scanner;

pub use parser::{KnownTools, ParseStrategy, ToolCallParser, normalize, parse_unchecked};
pub use recovery::unknown_tool_observation;
pub use scanner::{BraceScanner, first_object};

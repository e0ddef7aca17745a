//! Intent module for spoken command parsing
//!
//! Keyword tables are matched by substring against the normalized
//! transcript. Keywords of every language are always active; only the
//! spoken response depends on the configured language.

mod language;
mod parser;
mod table;

pub use language::Language;
pub use parser::{normalize, CommandParser, Intent};
pub use table::{IntentEntry, KeywordTable};

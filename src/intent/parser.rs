//! Maps finalized transcripts to intents

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::language::Language;
use super::table::KeywordTable;

/// Parsed meaning of one command utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Matched intent name, `None` when nothing matched
    pub action: Option<String>,
    /// Localized text spoken back to the user
    pub response: String,
    /// Normalized transcript the intent was parsed from
    pub original_command: String,
}

impl Intent {
    pub fn is_understood(&self) -> bool {
        self.action.is_some()
    }
}

/// Lower-case and trim, the form every matcher works on
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// First-match-wins keyword parser
#[derive(Debug, Clone)]
pub struct CommandParser {
    table: KeywordTable,
    language: Language,
}

impl CommandParser {
    pub fn new(table: KeywordTable, language: Language) -> Self {
        Self { table, language }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Resolve a transcript against the table in insertion order
    pub fn parse(&self, transcript: &str) -> Intent {
        let command = normalize(transcript);

        let matched = self.table.entries().iter().find(|entry| entry.matches(&command));

        let intent = match matched {
            Some(entry) => Intent {
                action: Some(entry.name().to_string()),
                response: entry.response_for(self.language).to_string(),
                original_command: command,
            },
            None => Intent {
                action: None,
                response: self.language.not_understood().to_string(),
                original_command: command,
            },
        };

        debug!(action = ?intent.action, command = %intent.original_command, "command parsed");
        intent
    }
}

//! Supported languages and the controller's own spoken phrases

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Languages the controller can listen and answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Marathi];

    /// Short code, as used in keyword tables and config
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Marathi => "mr",
        }
    }

    /// BCP-47 tag handed to the recognizer and synthesizer
    pub fn tag(self) -> &'static str {
        match self {
            Language::English => "en-IN",
            Language::Hindi => "hi-IN",
            Language::Marathi => "mr-IN",
        }
    }

    /// Spoken right after a wake-word is accepted
    pub fn acknowledgement(self) -> &'static str {
        match self {
            Language::English => "Yes, I am listening. Please tell me.",
            Language::Hindi => "हाँ, मैं सुन रहा हूं। कृपया बताइए।",
            Language::Marathi => "हो, मी ऐकत आहे. कृपया सांगा.",
        }
    }

    /// Spoken when the command window closes empty
    pub fn no_command(self) -> &'static str {
        match self {
            Language::English => "No command received. Say Dharti to try again.",
            Language::Hindi => "कोई आदेश नहीं मिला। फिर से धरती बोलें।",
            Language::Marathi => "कोणतीही आज्ञा मिळाली नाही. पुन्हा धरती म्हणा.",
        }
    }

    /// Spoken when no intent matches
    pub fn not_understood(self) -> &'static str {
        match self {
            Language::English => "Sorry, I did not understand. Please try again.",
            Language::Hindi => "माफ़ कीजिए, मैं समझ नहीं पाया। कृपया फिर से कहें।",
            Language::Marathi => "माफ करा, मला समजले नाही. कृपया पुन्हा सांगा.",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    /// Accepts short codes and BCP-47 tags ("hi", "hi-IN", "en_US")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let primary = lower.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "en" | "english" => Ok(Language::English),
            "hi" | "hindi" => Ok(Language::Hindi),
            "mr" | "marathi" => Ok(Language::Marathi),
            _ => Err(ConfigError::UnknownLanguage(s.to_string())),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_and_tags() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("hi-IN".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!("MR_in".parse::<Language>().unwrap(), Language::Marathi);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_english_acknowledgement() {
        assert_eq!(
            Language::English.acknowledgement(),
            "Yes, I am listening. Please tell me."
        );
    }
}

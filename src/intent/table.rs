//! Ordered keyword table mapping intents to keywords and responses
//!
//! Order is priority: when a transcript matches several intents, the one
//! inserted first wins.

use std::collections::HashMap;

use super::language::Language;

/// Keywords and per-language responses for one intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentEntry {
    name: String,
    keywords: Vec<String>,
    responses: HashMap<Language, String>,
}

impl IntentEntry {
    /// Create an entry with no keywords or responses yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keywords: Vec::new(),
            responses: HashMap::new(),
        }
    }

    /// Add keywords; stored lower-cased and trimmed, empties dropped
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
        self
    }

    /// Set the response spoken in `language`
    pub fn response(mut self, language: Language, text: impl Into<String>) -> Self {
        self.responses.insert(language, text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the normalized transcript contains any keyword
    pub fn matches(&self, transcript: &str) -> bool {
        self.keywords.iter().any(|k| transcript.contains(k.as_str()))
    }

    /// Response in `language`, falling back to English, then the intent name
    pub fn response_for(&self, language: Language) -> &str {
        self.responses
            .get(&language)
            .or_else(|| self.responses.get(&Language::English))
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}

/// Immutable, insertion-ordered intent table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<IntentEntry>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an intent. Re-inserting a name replaces the entry in place,
    /// keeping its original priority.
    pub fn with_intent(mut self, entry: IntentEntry) -> Self {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    pub fn entries(&self) -> &[IntentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default farming assistant table
    pub fn agriculture() -> Self {
        use Language::{English, Hindi, Marathi};

        Self::new()
            .with_intent(
                IntentEntry::new("capture")
                    .keywords(["capture", "take photo", "take a photo", "picture", "photo", "camera", "click"])
                    .keywords(["फोटो", "तस्वीर", "कैप्चर", "खींचो"])
                    .keywords(["छायाचित्र", "फोटो काढ"])
                    .response(English, "Capturing photo.")
                    .response(Hindi, "फोटो ले रहा हूं।")
                    .response(Marathi, "फोटो घेत आहे."),
            )
            .with_intent(
                IntentEntry::new("detect_disease")
                    .keywords(["disease", "infection", "sick", "pest", "leaf spot"])
                    .keywords(["बीमारी", "रोग", "कीट"])
                    .keywords(["आजार", "कीड"])
                    .response(English, "Checking the plant for disease.")
                    .response(Hindi, "पौधे की बीमारी की जांच कर रहा हूं।")
                    .response(Marathi, "पिकाचा रोग तपासत आहे."),
            )
            .with_intent(
                IntentEntry::new("crop_recommendation")
                    .keywords(["crop", "recommend", "what to grow", "which crop", "sow"])
                    .keywords(["फसल", "सुझाव", "बुवाई"])
                    .keywords(["पीक", "शिफारस", "पेरणी"])
                    .response(English, "Finding the best crop for your field.")
                    .response(Hindi, "आपके खेत के लिए सबसे अच्छी फसल ढूंढ रहा हूं।")
                    .response(Marathi, "तुमच्या शेतासाठी योग्य पीक शोधत आहे."),
            )
            .with_intent(
                IntentEntry::new("fertilizer")
                    .keywords(["fertilizer", "fertiliser", "manure", "nutrient", "urea"])
                    .keywords(["खाद", "उर्वरक", "यूरिया"])
                    .keywords(["खत"])
                    .response(English, "Opening fertilizer advice.")
                    .response(Hindi, "खाद की सलाह खोल रहा हूं।")
                    .response(Marathi, "खताचा सल्ला उघडत आहे."),
            )
            .with_intent(
                IntentEntry::new("weather")
                    .keywords(["weather", "rain", "forecast", "temperature"])
                    .keywords(["मौसम", "बारिश", "तापमान"])
                    .keywords(["हवामान", "पाऊस"])
                    .response(English, "Showing the weather forecast.")
                    .response(Hindi, "मौसम का पूर्वानुमान दिखा रहा हूं।")
                    .response(Marathi, "हवामानाचा अंदाज दाखवत आहे."),
            )
            .with_intent(
                IntentEntry::new("market_price")
                    .keywords(["price", "market", "mandi", "rate"])
                    .keywords(["भाव", "कीमत", "मंडी", "दाम"])
                    .keywords(["बाजार", "किंमत"])
                    .response(English, "Showing today's market prices.")
                    .response(Hindi, "आज के मंडी भाव दिखा रहा हूं।")
                    .response(Marathi, "आजचे बाजारभाव दाखवत आहे."),
            )
            .with_intent(
                IntentEntry::new("navigate_home")
                    .keywords(["home", "go back", "main page"])
                    .keywords(["होम", "मुख्य पृष्ठ", "वापस"])
                    .keywords(["मुख्यपृष्ठ", "मागे"])
                    .response(English, "Going to the home page.")
                    .response(Hindi, "होम पेज पर जा रहा हूं।")
                    .response(Marathi, "मुख्यपृष्ठावर जात आहे."),
            )
            .with_intent(
                IntentEntry::new("help")
                    .keywords(["help", "what can you do"])
                    .keywords(["मदद", "सहायता"])
                    .keywords(["मदत"])
                    .response(
                        English,
                        "You can say capture photo, check disease, crop advice, fertilizer, weather or market price.",
                    )
                    .response(
                        Hindi,
                        "आप फोटो, बीमारी, फसल, खाद, मौसम या मंडी भाव बोल सकते हैं।",
                    )
                    .response(
                        Marathi,
                        "तुम्ही फोटो, रोग, पीक, खत, हवामान किंवा बाजारभाव म्हणू शकता.",
                    ),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_normalized() {
        let entry = IntentEntry::new("x").keywords(["  Capture ", "", "capture"]);
        assert_eq!(entry.keywords, ["capture"]);
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let table = KeywordTable::new()
            .with_intent(IntentEntry::new("a"))
            .with_intent(IntentEntry::new("b"))
            .with_intent(IntentEntry::new("a").keywords(["alpha"]));

        let names: Vec<_> = table.entries().iter().map(IntentEntry::name).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(table.entries()[0].matches("alpha"));
    }

    #[test]
    fn test_response_falls_back_to_english() {
        let entry = IntentEntry::new("x").response(Language::English, "Done.");
        assert_eq!(entry.response_for(Language::Marathi), "Done.");
        assert_eq!(IntentEntry::new("bare").response_for(Language::Hindi), "bare");
    }

    #[test]
    fn test_agriculture_table_has_every_language() {
        let table = KeywordTable::agriculture();
        assert_eq!(table.entries()[0].name(), "capture");
        for entry in table.entries() {
            for language in Language::ALL {
                assert_ne!(entry.response_for(language), entry.name());
            }
        }
    }
}

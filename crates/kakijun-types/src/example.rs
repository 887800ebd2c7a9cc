use serde::{Deserialize, Serialize};

/// Example word attached to a lookup result.
///
/// The backend contract has two revisions:
/// - revision 1 sends structured objects `{word, reading, meaning, jlpt_level}`
/// - revision 2 sends ready-to-display strings such as `水道 (すいどう): cañería`
///
/// Both are accepted on the wire (untagged) and render through
/// [`ExampleWord::display_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleWord {
    Formatted(String),
    Structured(StructuredExample),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredExample {
    pub word: String,
    #[serde(default)]
    pub reading: Option<String>,
    #[serde(default, alias = "meaning_es")]
    pub meaning: Option<String>,
    #[serde(default, alias = "jlpt_level_word")]
    pub jlpt_level: Option<u32>,
}

impl ExampleWord {
    /// Contract revision this value was produced under
    pub fn revision(&self) -> u8 {
        match self {
            ExampleWord::Structured(_) => 1,
            ExampleWord::Formatted(_) => 2,
        }
    }

    /// Single display line, `word (reading): meaning` for structured entries
    pub fn display_text(&self) -> String {
        match self {
            ExampleWord::Formatted(text) => text.clone(),
            ExampleWord::Structured(example) => {
                let mut text = example.word.clone();
                if let Some(reading) = example.reading.as_deref().filter(|r| !r.is_empty()) {
                    text.push_str(&format!(" ({reading})"));
                }
                if let Some(meaning) = example.meaning.as_deref().filter(|m| !m.is_empty()) {
                    text.push_str(&format!(": {meaning}"));
                }
                text
            }
        }
    }
}

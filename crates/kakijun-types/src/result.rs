use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::example::ExampleWord;

/// Character metadata as returned by the kanji API.
///
/// Every field is optional on the wire. An entry without a character is kept
/// here and filtered out by the renderer. A field of the wrong type is read
/// as absent instead of rejecting the whole entry, and numbers sent as
/// strings (`"grade": "1"`) are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupResult {
    #[serde(
        rename = "kanji_char",
        alias = "character",
        deserialize_with = "lenient::text"
    )]
    pub character: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub unicode: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub stroke_count: Option<u32>,
    #[serde(deserialize_with = "lenient::number")]
    pub grade: Option<u32>,
    #[serde(deserialize_with = "lenient::number")]
    pub jlpt_level: Option<u32>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub meanings: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub kun_readings: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub on_readings: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::text")]
    pub svg_filename: Option<String>,
    #[serde(deserialize_with = "lenient::examples")]
    pub example_words: Option<Vec<ExampleWord>>,
}

impl LookupResult {
    /// Character with surrounding whitespace removed, `None` when blank
    pub fn character(&self) -> Option<&str> {
        self.character
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn is_valid(&self) -> bool {
        self.character().is_some()
    }

    pub fn meanings(&self) -> &[String] {
        self.meanings.as_deref().unwrap_or(&[])
    }

    pub fn kun_readings(&self) -> &[String] {
        self.kun_readings.as_deref().unwrap_or(&[])
    }

    pub fn on_readings(&self) -> &[String] {
        self.on_readings.as_deref().unwrap_or(&[])
    }

    pub fn example_words(&self) -> &[ExampleWord] {
        self.example_words.as_deref().unwrap_or(&[])
    }

    /// Diagram asset filename, `None` when absent or blank
    pub fn svg_filename(&self) -> Option<&str> {
        self.svg_filename
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }
}

/// Response body normalized to a list of entries.
///
/// A single object becomes a one-element list. `null` and non-object entries
/// become `None` so the renderer can tell an empty response from a response
/// made only of unusable entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPayload {
    entries: Vec<Option<LookupResult>>,
}

impl ResultPayload {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(value: Value) -> Self {
        let entries = match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items.into_iter().map(entry_from_value).collect(),
            other => vec![entry_from_value(other)],
        };

        Self { entries }
    }

    pub fn entries(&self) -> &[Option<LookupResult>] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries that are present and carry a character
    pub fn valid(&self) -> impl Iterator<Item = &LookupResult> {
        self.entries
            .iter()
            .filter_map(Option::as_ref)
            .filter(|result| result.is_valid())
    }
}

/// Field readers that never fail: unusable values become `None` or are
/// dropped from their list.
mod lenient {
    use super::*;

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(as_text(Value::deserialize(deserializer)?))
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let number = match &value {
            Value::Null => return Ok(None),
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };

        let number = number.and_then(|n| u32::try_from(n).ok());
        if number.is_none() {
            tracing::warn!("Ignoring non-numeric value {}", value);
        }
        Ok(number)
    }

    pub fn text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = match Value::deserialize(deserializer)? {
            Value::Null => return Ok(None),
            Value::Array(items) => items.into_iter().filter_map(as_text).collect(),
            other => as_text(other).into_iter().collect(),
        };
        Ok(Some(items))
    }

    pub fn examples<'de, D>(deserializer: D) -> Result<Option<Vec<ExampleWord>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Array(items) = Value::deserialize(deserializer)? else {
            return Ok(None);
        };

        let words = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<ExampleWord>(item) {
                Ok(word) => Some(word),
                Err(e) => {
                    tracing::warn!("Skipping malformed example word: {}", e);
                    None
                }
            })
            .collect();
        Ok(Some(words))
    }

    fn as_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Null => None,
            other => {
                tracing::warn!("Ignoring non-text value {}", other);
                None
            }
        }
    }
}

fn entry_from_value(value: Value) -> Option<LookupResult> {
    match value {
        Value::Object(_) => match serde_json::from_value::<LookupResult>(value) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!("Skipping malformed result entry: {}", e);
                None
            }
        },
        Value::Null => None,
        other => {
            tracing::warn!("Skipping non-object result entry: {}", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn single_object_becomes_one_entry() {
        let payload = ResultPayload::from_json(json!({
            "kanji_id": 12,
            "kanji_char": "水",
            "unicode": "6c34",
            "stroke_count": 4,
            "grade": 1,
            "jlpt_level": 5,
            "meanings": ["agua"],
            "kun_readings": ["みず"],
            "on_readings": ["スイ"],
            "svg_filename": "06c34.svg",
            "example_words": ["水道 (すいどう): cañería"]
        }));

        assert_eq!(payload.len(), 1);
        let result = payload.valid().next().unwrap();
        assert_eq!(result.character(), Some("水"));
        assert_eq!(result.stroke_count, Some(4));
        assert_eq!(result.svg_filename(), Some("06c34.svg"));
        assert_eq!(result.example_words().len(), 1);
    }

    #[test]
    fn mistyped_fields_do_not_drop_the_entry() {
        let payload = ResultPayload::from_json(json!({
            "kanji_char": "水",
            "stroke_count": "4",
            "grade": "1",
            "jlpt_level": {"level": 5},
            "meanings": ["agua", 3, null, {"es": "x"}],
            "on_readings": "スイ",
            "example_words": ["水道 (すいどう): cañería", 7, {"word": "水曜日"}]
        }));

        let result = payload.valid().next().unwrap();
        assert_eq!(result.character(), Some("水"));
        assert_eq!(result.stroke_count, Some(4));
        assert_eq!(result.grade, Some(1));
        assert_eq!(result.jlpt_level, None);
        assert_eq!(result.meanings(), ["agua", "3"]);
        assert_eq!(result.on_readings(), ["スイ"]);
        let words: Vec<String> = result.example_words().iter().map(ExampleWord::display_text).collect();
        assert_eq!(words, ["水道 (すいどう): cañería", "水曜日"]);
    }

    #[test]
    fn character_alias_is_accepted() {
        let payload = ResultPayload::from_json(json!([{ "character": "火" }]));
        assert_eq!(payload.valid().next().unwrap().character(), Some("火"));
    }

    #[test]
    fn null_and_invalid_entries_are_kept_but_not_valid() {
        let payload = ResultPayload::from_json(json!([
            null,
            { "kanji_char": "木", "grade": null },
            { "meanings": ["sin carácter"] },
            { "kanji_char": "   " },
            42
        ]));

        assert_eq!(payload.len(), 5);
        let valid: Vec<_> = payload.valid().collect();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].character(), Some("木"));
        assert_eq!(valid[0].grade, None);
    }

    #[test]
    fn malformed_entry_does_not_poison_the_list() {
        let payload = ResultPayload::from_json(json!([
            { "kanji_char": "山", "stroke_count": "tres" },
            { "kanji_char": "川" }
        ]));

        assert_eq!(payload.entries()[0], None);
        assert_eq!(payload.valid().count(), 1);
    }

    #[test]
    fn top_level_null_is_empty() {
        assert!(ResultPayload::from_json(Value::Null).is_empty());
    }

    #[test]
    fn missing_lists_read_as_empty() {
        let result = LookupResult {
            character: Some("日".into()),
            meanings: None,
            ..Default::default()
        };

        assert!(result.meanings().is_empty());
        assert!(result.kun_readings().is_empty());
        assert!(result.example_words().is_empty());
    }
}

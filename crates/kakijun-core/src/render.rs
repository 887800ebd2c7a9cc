//! Result rendering.
//!
//! Turns a [`ResultPayload`] into a [`RenderedView`]: either a single status
//! message or one card per valid result. All user-facing text is Spanish.

use std::fmt;

use kakijun_types::{LookupResult, ResultPayload};

use crate::view::{Generation, MountId};

pub const NOT_AVAILABLE: &str = "No disponible";
pub const DIAGRAM_UNAVAILABLE: &str = "Diagrama de trazos no disponible.";

pub const LABEL_UNICODE: &str = "Unicode:";
pub const LABEL_STROKES: &str = "Trazos:";
pub const LABEL_GRADE: &str = "Grado:";
pub const LABEL_JLPT: &str = "JLPT:";
pub const LABEL_MEANINGS: &str = "Significados:";
pub const LABEL_KUN: &str = "Lecturas Kun'yomi:";
pub const LABEL_ON: &str = "Lecturas On'yomi:";
pub const LABEL_EXAMPLES: &str = "Palabras de ejemplo:";

/// Status line shown in place of result cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMessage {
    EmptyQuery,
    Searching,
    NoResults { query: String },
    NoValidResults { query: String },
    Error { message: String },
}

impl ViewMessage {
    pub fn is_error(&self) -> bool {
        matches!(self, ViewMessage::Error { .. })
    }
}

impl fmt::Display for ViewMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMessage::EmptyQuery => {
                f.write_str("Por favor, introduce un término de búsqueda.")
            }
            ViewMessage::Searching => f.write_str("Buscando..."),
            ViewMessage::NoResults { query } => {
                write!(f, "No se encontraron resultados para \"{query}\".")
            }
            ViewMessage::NoValidResults { query } => {
                write!(f, "No se encontraron resultados válidos para \"{query}\".")
            }
            ViewMessage::Error { message } => {
                write!(f, "Error al realizar la búsqueda: {message}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailLine {
    Field { label: &'static str, value: String },
    /// Non-empty list section
    List { label: &'static str, items: Vec<String> },
    /// List section with nothing to show
    Unavailable { label: &'static str },
}

/// Placeholder for a stroke diagram, filled once the asset is loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramMount {
    pub id: MountId,
    pub filename: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCard {
    pub character: String,
    pub diagram: Option<DiagramMount>,
    pub details: Vec<DetailLine>,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedView {
    /// Nothing searched yet
    Empty,
    Message(ViewMessage),
    Cards(Vec<ResultCard>),
}

impl RenderedView {
    /// Diagram mounts in card order
    pub fn mounts(&self) -> impl Iterator<Item = &DiagramMount> {
        let cards: &[ResultCard] = match self {
            RenderedView::Cards(cards) => cards,
            RenderedView::Empty | RenderedView::Message(_) => &[],
        };
        cards.iter().filter_map(|card| card.diagram.as_ref())
    }
}

/// Render a response for `query` into the view of `generation`
pub fn render_results(payload: &ResultPayload, query: &str, generation: Generation) -> RenderedView {
    if payload.is_empty() {
        return RenderedView::Message(ViewMessage::NoResults {
            query: query.to_string(),
        });
    }

    let cards: Vec<ResultCard> = payload
        .valid()
        .enumerate()
        .map(|(index, result)| render_card(result, MountId::new(generation, index)))
        .collect();

    if cards.is_empty() {
        tracing::debug!(
            "{} entries for '{}' but none carried a character",
            payload.len(),
            query
        );
        return RenderedView::Message(ViewMessage::NoValidResults {
            query: query.to_string(),
        });
    }

    RenderedView::Cards(cards)
}

fn render_card(result: &LookupResult, mount: MountId) -> ResultCard {
    // Callers only pass valid results
    let character = result.character().unwrap_or_default().to_string();

    let diagram = result.svg_filename().map(|filename| DiagramMount {
        id: mount,
        filename: filename.to_string(),
        alt: format!("Orden de trazos para {character}"),
    });

    let mut details = Vec::with_capacity(7);

    if let Some(unicode) = result.unicode.as_deref().filter(|u| !u.trim().is_empty()) {
        details.push(DetailLine::Field {
            label: LABEL_UNICODE,
            value: unicode.trim().to_string(),
        });
    }
    if let Some(strokes) = result.stroke_count {
        details.push(DetailLine::Field {
            label: LABEL_STROKES,
            value: strokes.to_string(),
        });
    }
    details.push(DetailLine::Field {
        label: LABEL_GRADE,
        value: result
            .grade
            .map(|grade| grade.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    });
    details.push(DetailLine::Field {
        label: LABEL_JLPT,
        value: result
            .jlpt_level
            .map(|level| format!("N{level}"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    });

    details.push(list_section(LABEL_MEANINGS, result.meanings()));
    details.push(list_section(LABEL_KUN, result.kun_readings()));
    details.push(list_section(LABEL_ON, result.on_readings()));

    let examples = result
        .example_words()
        .iter()
        .map(|word| word.display_text())
        .filter(|text| !text.trim().is_empty())
        .collect();

    ResultCard {
        character,
        diagram,
        details,
        examples,
    }
}

fn list_section(label: &'static str, items: &[String]) -> DetailLine {
    let items: Vec<String> = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        DetailLine::Unavailable { label }
    } else {
        DetailLine::List { label, items }
    }
}

/// One line of laid-out text, shared by the terminal UI and plain output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextLine {
    Heading(String),
    Labeled { label: &'static str, value: String },
    Section(&'static str),
    Item(String),
    Preformatted(String),
    Message(ViewMessage),
}

impl fmt::Display for TextLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextLine::Heading(text) => f.write_str(text),
            TextLine::Labeled { label, value } => write!(f, "{label} {value}"),
            TextLine::Section(label) => f.write_str(label),
            TextLine::Item(text) => write!(f, "  • {text}"),
            TextLine::Preformatted(text) => write!(f, "    {text}"),
            TextLine::Message(message) => write!(f, "{message}"),
        }
    }
}

impl ResultCard {
    /// Text layout of the card, diagram excluded
    pub fn text_lines(&self) -> Vec<TextLine> {
        let mut lines = vec![TextLine::Heading(self.character.clone())];

        for detail in &self.details {
            match detail {
                DetailLine::Field { label, value } => lines.push(TextLine::Labeled {
                    label: *label,
                    value: value.clone(),
                }),
                DetailLine::List { label, items } => {
                    lines.push(TextLine::Section(*label));
                    lines.extend(items.iter().cloned().map(TextLine::Item));
                }
                DetailLine::Unavailable { label } => lines.push(TextLine::Labeled {
                    label: *label,
                    value: NOT_AVAILABLE.to_string(),
                }),
            }
        }

        if !self.examples.is_empty() {
            lines.push(TextLine::Section(LABEL_EXAMPLES));
            lines.extend(self.examples.iter().cloned().map(TextLine::Preformatted));
        }

        lines
    }
}

impl RenderedView {
    pub fn text_lines(&self) -> Vec<TextLine> {
        match self {
            RenderedView::Empty => Vec::new(),
            RenderedView::Message(message) => vec![TextLine::Message(message.clone())],
            RenderedView::Cards(cards) => cards.iter().flat_map(ResultCard::text_lines).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn generation() -> Generation {
        Generation::new(7)
    }

    fn cards(view: RenderedView) -> Vec<ResultCard> {
        match view {
            RenderedView::Cards(cards) => cards,
            other => panic!("expected cards, got {other:?}"),
        }
    }

    fn field<'a>(card: &'a ResultCard, label: &str) -> Option<&'a DetailLine> {
        card.details.iter().find(|line| match line {
            DetailLine::Field { label: l, .. }
            | DetailLine::List { label: l, .. }
            | DetailLine::Unavailable { label: l } => *l == label,
        })
    }

    #[test]
    fn messages_are_spanish() {
        assert_eq!(
            ViewMessage::EmptyQuery.to_string(),
            "Por favor, introduce un término de búsqueda."
        );
        assert_eq!(ViewMessage::Searching.to_string(), "Buscando...");
        assert_eq!(
            ViewMessage::NoResults { query: "ocean".into() }.to_string(),
            "No se encontraron resultados para \"ocean\"."
        );
        assert_eq!(
            ViewMessage::NoValidResults { query: "x".into() }.to_string(),
            "No se encontraron resultados válidos para \"x\"."
        );
        assert_eq!(
            ViewMessage::Error { message: "Error: 500 Internal Server Error".into() }.to_string(),
            "Error al realizar la búsqueda: Error: 500 Internal Server Error"
        );
    }

    #[test]
    fn empty_payload_reports_no_results() {
        let view = render_results(&ResultPayload::empty(), "ocean", generation());
        assert_eq!(
            view,
            RenderedView::Message(ViewMessage::NoResults { query: "ocean".into() })
        );
    }

    #[test]
    fn payload_without_characters_reports_no_valid_results() {
        let payload = ResultPayload::from_json(json!([null, { "meanings": ["agua"] }]));
        let view = render_results(&payload, "agua", generation());
        assert_eq!(
            view,
            RenderedView::Message(ViewMessage::NoValidResults { query: "agua".into() })
        );
    }

    #[test]
    fn null_entries_are_skipped() {
        let payload = ResultPayload::from_json(json!([null, { "kanji_char": "水" }]));
        let cards = cards(render_results(&payload, "agua", generation()));

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].character, "水");
    }

    #[test]
    fn full_card_layout() {
        let payload = ResultPayload::from_json(json!({
            "kanji_char": "水",
            "unicode": "6c34",
            "stroke_count": 4,
            "grade": 1,
            "jlpt_level": 5,
            "meanings": ["agua"],
            "kun_readings": ["みず", "みず-"],
            "on_readings": ["スイ"],
            "svg_filename": "06c34.svg",
            "example_words": [
                "水道 (すいどう): cañería",
                { "word": "水曜日", "reading": "すいようび", "meaning": "miércoles" }
            ]
        }));
        let card = cards(render_results(&payload, "水", generation())).remove(0);

        assert_eq!(
            card.diagram,
            Some(DiagramMount {
                id: MountId::new(generation(), 0),
                filename: "06c34.svg".into(),
                alt: "Orden de trazos para 水".into(),
            })
        );

        let lines: Vec<String> = card.text_lines().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "水",
                "Unicode: 6c34",
                "Trazos: 4",
                "Grado: 1",
                "JLPT: N5",
                "Significados:",
                "  • agua",
                "Lecturas Kun'yomi:",
                "  • みず",
                "  • みず-",
                "Lecturas On'yomi:",
                "  • スイ",
                "Palabras de ejemplo:",
                "    水道 (すいどう): cañería",
                "    水曜日 (すいようび): miércoles",
            ]
        );
    }

    #[test]
    fn null_grade_shows_not_available() {
        let payload = ResultPayload::from_json(json!({ "kanji_char": "木", "grade": null }));
        let card = cards(render_results(&payload, "木", generation())).remove(0);

        assert_eq!(
            field(&card, LABEL_GRADE),
            Some(&DetailLine::Field {
                label: LABEL_GRADE,
                value: "No disponible".into()
            })
        );
        assert_eq!(
            field(&card, LABEL_JLPT),
            Some(&DetailLine::Field {
                label: LABEL_JLPT,
                value: "No disponible".into()
            })
        );
    }

    #[test]
    fn absent_optional_fields_are_omitted() {
        let payload = ResultPayload::from_json(json!({ "kanji_char": "木" }));
        let card = cards(render_results(&payload, "木", generation())).remove(0);

        assert!(field(&card, LABEL_UNICODE).is_none());
        assert!(field(&card, LABEL_STROKES).is_none());
        assert!(card.diagram.is_none());
        assert!(card.examples.is_empty());
        assert_eq!(
            field(&card, LABEL_MEANINGS),
            Some(&DetailLine::Unavailable { label: LABEL_MEANINGS })
        );

        let lines: Vec<String> = card.text_lines().iter().map(ToString::to_string).collect();
        assert!(lines.contains(&"Lecturas On'yomi: No disponible".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with(LABEL_EXAMPLES)));
    }

    #[test]
    fn mounts_follow_card_order() {
        let payload = ResultPayload::from_json(json!([
            { "kanji_char": "日", "svg_filename": "065e5.svg" },
            { "kanji_char": "月" },
            { "kanji_char": "火", "svg_filename": "0706b.svg" }
        ]));
        let view = render_results(&payload, "sol", generation());

        let mounts: Vec<_> = view.mounts().map(|m| (m.id.index, m.filename.as_str())).collect();
        assert_eq!(mounts, vec![(0, "065e5.svg"), (2, "0706b.svg")]);
    }
}

use std::fmt;

/// First code point of the CJK Unified Ideographs block
pub const CJK_IDEOGRAPHS_START: u32 = 0x4E00;

/// A trimmed, non-empty search query, otherwise exactly as typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Trim raw input and drop line breaks, `None` when nothing is left.
    ///
    /// No Unicode normalization: half-width and compatibility forms reach the
    /// API untouched.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '\n' | '\r'))
            .collect();

        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The query's only character, when it is one ideograph at or above U+4E00
    pub fn single_ideograph(&self) -> Option<char> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c as u32 >= CJK_IDEOGRAPHS_START => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_not_a_query() {
        assert_eq!(Query::parse(""), None);
        assert_eq!(Query::parse("  \n\t "), None);
    }

    #[test]
    fn input_is_trimmed_not_normalized() {
        assert_eq!(Query::parse("  ocean \n").unwrap().as_str(), "ocean");
        assert_eq!(Query::parse("wa\nter").unwrap().as_str(), "water");
        // Full-width latin stays full-width
        assert_eq!(Query::parse("ｏｃｅａｎ").unwrap().as_str(), "ｏｃｅａｎ");
    }

    #[test]
    fn single_ideograph_detection() {
        assert_eq!(Query::parse("水").unwrap().single_ideograph(), Some('水'));
        assert_eq!(Query::parse(" 一 ").unwrap().single_ideograph(), Some('一'));
        assert_eq!(Query::parse("水道").unwrap().single_ideograph(), None);
        assert_eq!(Query::parse("a").unwrap().single_ideograph(), None);
        // Hiragana sits below the ideograph block
        assert_eq!(Query::parse("み").unwrap().single_ideograph(), None);
        // Extension B is above the threshold and still one character
        assert_eq!(
            Query::parse("\u{20B9F}").unwrap().single_ideograph(),
            Some('\u{20B9F}')
        );
    }

    #[test]
    fn forms_above_the_ideograph_block_count_as_is() {
        // Half-width katakana ｱ and a compatibility ideograph
        assert_eq!(
            Query::parse("\u{FF71}").unwrap().single_ideograph(),
            Some('\u{FF71}')
        );
        assert_eq!(
            Query::parse("\u{F900}").unwrap().single_ideograph(),
            Some('\u{F900}')
        );
        // Squared CJK sits below U+4E00
        assert_eq!(Query::parse("\u{3300}").unwrap().single_ideograph(), None);
    }
}

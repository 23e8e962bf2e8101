use serde::Serialize;
use serde_json::Value;

use super::fields::coerce_text;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub text: String,
    pub author: Option<String>,
}

fn is_quote_mark(c: char) -> bool {
    matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}') || c.is_whitespace()
}

/// Trims whitespace and any straight or curly quotation marks wrapping `raw`.
pub fn clean_quote_text(raw: &str) -> String {
    raw.trim_matches(is_quote_mark).to_string()
}

/// Reads a quote that may arrive as plain text or as a JSON object string
/// such as `{"text": "...", "author": "..."}`. Text that only looks like
/// JSON is kept verbatim. `known_author` fills in when the value itself
/// names nobody.
pub fn parse_quote_field(raw: &str, known_author: Option<&str>) -> Quote {
    let known_author = known_author
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);

    let (text, author) = if raw.trim_start().starts_with('{') {
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(Value::Object(parsed)) => {
                let text = parsed.get("text").and_then(coerce_text).unwrap_or_default();
                let author = parsed
                    .get("author")
                    .and_then(coerce_text)
                    .or(known_author);
                (text, author)
            }
            _ => (raw.to_string(), known_author),
        }
    } else {
        (raw.to_string(), known_author)
    };

    Quote {
        text: clean_quote_text(&text),
        author,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_straight_and_curly_marks() {
        assert_eq!(clean_quote_text("\"Hello\""), "Hello");
        assert_eq!(clean_quote_text("  'Hi'  "), "Hi");
        assert_eq!(clean_quote_text("\u{201C}Time is a waste\u{201D}"), "Time is a waste");
        assert_eq!(clean_quote_text("\u{2018}ok\u{2019} "), "ok");
    }

    #[test]
    fn keeps_inner_apostrophes() {
        assert_eq!(clean_quote_text("\"you'll see\""), "you'll see");
    }

    #[test]
    fn parses_json_object_quotes() {
        assert_eq!(
            parse_quote_field(r#"{"text":"Go","author":"X"}"#, None),
            Quote {
                text: "Go".to_string(),
                author: Some("X".to_string()),
            }
        );
    }

    #[test]
    fn plain_text_has_no_author() {
        assert_eq!(
            parse_quote_field("Just text", None),
            Quote {
                text: "Just text".to_string(),
                author: None,
            }
        );
    }

    #[test]
    fn malformed_json_falls_back_to_raw_text() {
        assert_eq!(
            parse_quote_field("{bad json", None),
            Quote {
                text: "{bad json".to_string(),
                author: None,
            }
        );
    }

    #[test]
    fn known_author_used_when_json_names_nobody() {
        let quote = parse_quote_field(r#"{"text":"\"Stay hungry\""}"#, Some("Steve Jobs"));
        assert_eq!(quote.text, "Stay hungry");
        assert_eq!(quote.author.as_deref(), Some("Steve Jobs"));
    }
}

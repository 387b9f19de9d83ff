//! Line classifier for `.desc` sources.
//!
//! Each physical line falls into exactly one grammatical category. Patterns
//! are tried in precedence order; the first match wins. Note that
//! `RESOURCE foo {` carries an identifier and classifies as an entity open,
//! while `RESOURCES {` has none and falls through to block open. The
//! block-open tag class deliberately excludes `_`, so an id-less
//! `REQ_ITEM {` is unrecognized rather than silently opening a block.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENTITY_OPEN: Regex = Regex::new(r"^([A-Z_]+)\s+([a-zA-Z0-9_]+)\s*\{$").unwrap();
    static ref BLOCK_OPEN: Regex = Regex::new(r"^([A-Z]+)\s*\{$").unwrap();
    static ref PROPERTY: Regex = Regex::new(r"^([a-zA-Z0-9_]+):\s*(.+)$").unwrap();
}

/// Classification of one trimmed source line. Borrows from the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum LineToken<'a> {
    /// Blank line or `#`/`//` comment; no tree effect.
    Skip,
    /// `TYPE id {` — opens a named, addressable child.
    EntityOpen { tag: &'a str, id: &'a str },
    /// `TYPE {` — opens an anonymous structural child.
    BlockOpen { tag: &'a str },
    /// `}` alone.
    BlockClose,
    /// `key: raw value text`.
    Property { key: &'a str, raw: &'a str },
    /// Anything else; warned and skipped.
    Unrecognized,
}

pub(super) fn classify(line: &str) -> LineToken<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
        return LineToken::Skip;
    }
    if let Some(caps) = ENTITY_OPEN.captures(trimmed) {
        let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let id = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        return LineToken::EntityOpen { tag, id };
    }
    if let Some(caps) = BLOCK_OPEN.captures(trimmed) {
        let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        return LineToken::BlockOpen { tag };
    }
    if trimmed == "}" {
        return LineToken::BlockClose;
    }
    if let Some(caps) = PROPERTY.captures(trimmed) {
        let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let raw = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        return LineToken::Property { key, raw };
    }
    LineToken::Unrecognized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_skip() {
        assert_eq!(classify(""), LineToken::Skip);
        assert_eq!(classify("   \t"), LineToken::Skip);
        assert_eq!(classify("  # a comment"), LineToken::Skip);
        assert_eq!(classify("// another"), LineToken::Skip);
    }

    #[test]
    fn entity_open_takes_precedence_over_block_open() {
        assert_eq!(
            classify("RESOURCE herb {"),
            LineToken::EntityOpen {
                tag: "RESOURCE",
                id: "herb"
            }
        );
        assert_eq!(classify("RESOURCES {"), LineToken::BlockOpen { tag: "RESOURCES" });
    }

    #[test]
    fn entity_tag_allows_underscore_block_tag_does_not() {
        assert_eq!(
            classify("REQ_ITEM iron_key {"),
            LineToken::EntityOpen {
                tag: "REQ_ITEM",
                id: "iron_key"
            }
        );
        // No identifier and an underscore in the tag: nothing matches.
        assert_eq!(classify("REQ_ITEM {"), LineToken::Unrecognized);
    }

    #[test]
    fn close_brace_must_stand_alone() {
        assert_eq!(classify("  }  "), LineToken::BlockClose);
        assert_eq!(classify("} }"), LineToken::Unrecognized);
    }

    #[test]
    fn property_captures_key_and_raw_value() {
        assert_eq!(
            classify("danger_level: 1"),
            LineToken::Property {
                key: "danger_level",
                raw: "1"
            }
        );
        assert_eq!(
            classify("name: \"Лес\""),
            LineToken::Property {
                key: "name",
                raw: "\"Лес\""
            }
        );
        // A value is required after the colon.
        assert_eq!(classify("name:"), LineToken::Unrecognized);
    }

    #[test]
    fn garbage_is_unrecognized() {
        assert_eq!(classify("@@@not valid@@@"), LineToken::Unrecognized);
        assert_eq!(classify("LOCATION forest"), LineToken::Unrecognized);
    }
}

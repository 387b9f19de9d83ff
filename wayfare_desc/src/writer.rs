//! Reverse pretty-printer: value tree → `.desc` authoring text.
//!
//! The inverse of the parser's attachment rules. `connections`/`characters`
//! arrays become array blocks, `resources` becomes named entries,
//! `requires`/`improves` re-expand their per-id maps into `REQ_ITEM`/
//! `REQ_SKILL`/`IMPROVES_SKILL` entries, and other object-of-object values
//! become nested entity groups. Anything with no structural form falls back
//! to an inline JSON literal on a property line.
//!
//! Output is exact for trees produced by parsing well-formed `.desc` input
//! (re-parsing yields an equal tree). For arbitrary trees — keys that are
//! not valid identifiers, strings holding both quote characters or newlines —
//! the rendition is approximate.

use wayfare_data::{Map, Value};

const INDENT: &str = "    ";

/// Render a document tree as `.desc` text. Entity tags are not recorded in
/// the tree, so `entity_tag` supplies the tag for top-level entities.
pub fn write_document(root: &Value, entity_tag: &str) -> String {
    let mut out = String::new();
    let Some(map) = root.as_object() else {
        return out;
    };
    let mut first = true;
    for (key, value) in map {
        match value {
            Value::Object(body) if is_ident(key) => {
                if !first {
                    out.push('\n');
                }
                write_entity(&mut out, entity_tag, key, body, 0);
            },
            other => write_property(&mut out, key, other, 0),
        }
        first = false;
    }
    out
}

fn write_entity(out: &mut String, tag: &str, id: &str, body: &Map, depth: usize) {
    let ind = INDENT.repeat(depth);
    out.push_str(&format!("{ind}{tag} {id} {{\n"));
    write_body(out, body, depth + 1);
    out.push_str(&format!("{ind}}}\n"));
}

fn write_body(out: &mut String, body: &Map, depth: usize) {
    for (key, value) in body {
        match (key.as_str(), value) {
            ("connections", Value::Array(items)) if items.iter().all(|i| i.as_object().is_some()) => {
                write_array_block(out, "CONNECTIONS", "CONNECTION", items, depth);
            },
            ("characters", Value::Array(items)) if items.iter().all(|i| i.as_object().is_some()) => {
                write_array_block(out, "CHARACTERS", "CHARACTER", items, depth);
            },
            ("resources", Value::Object(entries)) if is_entity_group(entries) => {
                let ind = INDENT.repeat(depth);
                out.push_str(&format!("{ind}RESOURCES {{\n"));
                for (id, entry) in entries {
                    if let Some(entry_body) = entry.as_object() {
                        write_entity(out, "RESOURCE", id, entry_body, depth + 1);
                    }
                }
                out.push_str(&format!("{ind}}}\n"));
            },
            ("requires", Value::Object(entries)) => {
                write_requirement_block(
                    out,
                    "REQUIRES",
                    entries,
                    &[
                        ("player_has_items", "REQ_ITEM", "amount"),
                        ("player_has_skill_level", "REQ_SKILL", "level"),
                    ],
                    depth,
                );
            },
            ("improves", Value::Object(entries)) => {
                write_requirement_block(
                    out,
                    "IMPROVES",
                    entries,
                    &[("improves_skills", "IMPROVES_SKILL", "exp")],
                    depth,
                );
            },
            (_, Value::Object(entries)) if is_block_tag(key) && is_entity_group(entries) => {
                // Nested entity group: re-emit as sibling TYPE id { ... }
                // entities with the group key uppercased as the tag.
                let tag = key.to_uppercase();
                for (id, entry) in entries {
                    if let Some(entry_body) = entry.as_object() {
                        write_entity(out, &tag, id, entry_body, depth);
                    }
                }
            },
            _ => write_property(out, key, value, depth),
        }
    }
}

fn write_array_block(out: &mut String, block_tag: &str, child_tag: &str, items: &[Value], depth: usize) {
    let ind = INDENT.repeat(depth);
    let child_ind = INDENT.repeat(depth + 1);
    out.push_str(&format!("{ind}{block_tag} {{\n"));
    for item in items {
        if let Some(body) = item.as_object() {
            out.push_str(&format!("{child_ind}{child_tag} {{\n"));
            write_body(out, body, depth + 2);
            out.push_str(&format!("{child_ind}}}\n"));
        }
    }
    out.push_str(&format!("{ind}}}\n"));
}

/// Re-expand a `REQUIRES`/`IMPROVES` block: each `(map key, child tag,
/// property)` row turns `entries[map key]` back into per-id child entries.
fn write_requirement_block(
    out: &mut String,
    block_tag: &str,
    entries: &Map,
    rows: &[(&str, &str, &str)],
    depth: usize,
) {
    let ind = INDENT.repeat(depth);
    let child_ind = INDENT.repeat(depth + 1);
    let leaf_ind = INDENT.repeat(depth + 2);
    out.push_str(&format!("{ind}{block_tag} {{\n"));
    for (key, value) in entries {
        let row = rows.iter().find(|(map_key, _, _)| *map_key == key.as_str());
        match (row, value) {
            (Some((_, child_tag, property)), Value::Object(targets))
                if targets.keys().all(|id| is_ident(id)) =>
            {
                for (id, amount) in targets {
                    out.push_str(&format!("{child_ind}{child_tag} {id} {{\n"));
                    out.push_str(&format!("{leaf_ind}{property}: {}\n", format_inline(amount)));
                    out.push_str(&format!("{child_ind}}}\n"));
                }
            },
            _ => write_property(out, key, value, depth + 1),
        }
    }
    out.push_str(&format!("{ind}}}\n"));
}

fn write_property(out: &mut String, key: &str, value: &Value, depth: usize) {
    let ind = INDENT.repeat(depth);
    out.push_str(&format!("{ind}{key}: {}\n", format_inline(value)));
}

fn format_inline(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        // Debug keeps the decimal point ("5.0", not "5"), which the value
        // parser needs to read the number back as a float.
        Value::Float(f) => format!("{f:?}"),
        Value::String(s) => quote_string(s),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(format_inline).collect();
            format!("[{}]", parts.join(", "))
        },
        Value::Object(_) => serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string()),
    }
}

fn quote_string(s: &str) -> String {
    if !s.contains('"') {
        format!("\"{s}\"")
    } else if !s.contains('\'') {
        format!("'{s}'")
    } else {
        // No escape syntax exists; emit bare and accept the approximation.
        s.to_string()
    }
}

/// Key usable as an entity identifier or re-parsed property key.
fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Key whose uppercased form classifies as an entity-open tag (`[A-Z_]+`).
fn is_block_tag(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
}

/// Non-empty object whose members are all objects keyed by identifiers.
fn is_entity_group(entries: &Map) -> bool {
    !entries.is_empty()
        && entries
            .iter()
            .all(|(id, entry)| is_ident(id) && entry.as_object().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;

    #[test]
    fn scalars_format_for_reparse() {
        assert_eq!(format_inline(&Value::Null), "null");
        assert_eq!(format_inline(&Value::Bool(true)), "true");
        assert_eq!(format_inline(&Value::Integer(5)), "5");
        assert_eq!(format_inline(&Value::Float(5.0)), "5.0");
        assert_eq!(format_inline(&Value::Float(2.5)), "2.5");
        assert_eq!(format_inline(&Value::String("Лес".into())), "\"Лес\"");
        assert_eq!(format_inline(&Value::String("it\"s".into())), "'it\"s'");
    }

    #[test]
    fn arrays_format_inline() {
        let v = Value::Array(vec![Value::Integer(1), Value::String("a b".into())]);
        assert_eq!(format_inline(&v), "[1, \"a b\"]");
    }

    #[test]
    fn requirement_maps_reexpand_to_entries() {
        let src = "LOCATION a {\n    REQUIRES {\n        REQ_ITEM iron_key {\n            amount: 1\n        }\n    }\n}\n";
        let tree = parse_str(src).root;
        let text = write_document(&tree, "LOCATION");
        assert!(text.contains("REQUIRES {"));
        assert!(text.contains("REQ_ITEM iron_key {"));
        assert!(text.contains("amount: 1"));
        assert!(!text.contains("player_has_items"));
    }

    #[test]
    fn connections_reexpand_to_array_block() {
        let src = "LOCATION a {\n    CONNECTIONS {\n        CONNECTION {\n            id: b\n        }\n    }\n}\n";
        let tree = parse_str(src).root;
        let text = write_document(&tree, "LOCATION");
        assert!(text.contains("CONNECTIONS {"));
        assert!(text.contains("CONNECTION {"));
        assert!(text.contains("id: \"b\""));
    }

    #[test]
    fn unstructurable_object_falls_back_to_inline_json() {
        let tree = parse_str("LOCATION a {\n    tuning: {'mix': 0.25}\n}\n").root;
        let text = write_document(&tree, "LOCATION");
        assert!(text.contains("tuning: {\"mix\":0.25}"));
    }
}

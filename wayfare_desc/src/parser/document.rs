//! Document/stack parser: drives the line classifier and value parser over a
//! whole `.desc` source and assembles the output tree.
//!
//! The parser keeps a stack of frames, one per open entity or block. Each
//! frame owns the container it is populating; popping a frame attaches the
//! container into its parent according to the frame's attachment rule. The
//! root frame is never popped, so a stray `}` at document level is a warned
//! no-op and a truncated file simply drains whatever is still open.
//!
//! Five block tags have hard-coded shapes: `CONNECTIONS` and `CHARACTERS`
//! collect anonymous entries into an array, `RESOURCES` holds named entries,
//! and `REQUIRES`/`IMPROVES` redirect their children's `amount`/`level`/`exp`
//! properties into per-id maps on the block itself (the child objects
//! themselves never join the tree).

use log::warn;

use wayfare_data::{Map, Value};

use super::line::{self, LineToken};
use super::literal::parse_value;
use super::{ParseOutput, ParseWarning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockTag {
    Connections,
    Characters,
    Resources,
    Requires,
    Improves,
    Other,
}

impl BlockTag {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "CONNECTIONS" => BlockTag::Connections,
            "CHARACTERS" => BlockTag::Characters,
            "RESOURCES" => BlockTag::Resources,
            "REQUIRES" => BlockTag::Requires,
            "IMPROVES" => BlockTag::Improves,
            _ => BlockTag::Other,
        }
    }

    /// Array-shaped blocks hold anonymous positional entries.
    fn is_array(self) -> bool {
        matches!(self, BlockTag::Connections | BlockTag::Characters)
    }

    /// Child entity tag an array block expects.
    fn expected_child(self) -> Option<&'static str> {
        match self {
            BlockTag::Connections => Some("CONNECTION"),
            BlockTag::Characters => Some("CHARACTER"),
            _ => None,
        }
    }
}

/// Which requirement-style list item we are inside, and where its one
/// meaningful property gets redirected on the enclosing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequirementKind {
    ReqItem,
    ReqSkill,
    ImprovesSkill,
}

impl RequirementKind {
    fn redirect_property(self) -> &'static str {
        match self {
            RequirementKind::ReqItem => "amount",
            RequirementKind::ReqSkill => "level",
            RequirementKind::ImprovesSkill => "exp",
        }
    }

    fn target_map(self) -> &'static str {
        match self {
            RequirementKind::ReqItem => "player_has_items",
            RequirementKind::ReqSkill => "player_has_skill_level",
            RequirementKind::ImprovesSkill => "improves_skills",
        }
    }
}

#[derive(Debug)]
enum FrameKind {
    Root,
    /// Named entity body (`TYPE id {`), or a `RESOURCE` entry.
    Entity,
    /// Anonymous structural block (`TYPE {`).
    Block(BlockTag),
    /// Anonymous array entry inside `CONNECTIONS`/`CHARACTERS`.
    ListEntry,
    /// `REQ_ITEM`/`REQ_SKILL`/`IMPROVES_SKILL` entry. Carries the id from
    /// its opening line so the redirected property knows which key to set.
    Requirement { id: String, kind: RequirementKind },
}

/// How a frame's container joins its parent when the frame pops.
#[derive(Debug)]
enum Attach {
    Key(String),
    /// Insert under a lazily created group object (`container[group][id]`),
    /// keyed by the lowercased entity tag. Used for generic nested entities.
    Grouped { group: String, id: String },
    Push,
    /// Requirement scratch containers never join the tree.
    Discard,
}

#[derive(Debug)]
struct Frame {
    container: Value,
    kind: FrameKind,
    attach: Attach,
    opened_at: usize,
}

impl Frame {
    fn root() -> Self {
        Frame {
            container: Value::object(),
            kind: FrameKind::Root,
            attach: Attach::Discard,
            opened_at: 0,
        }
    }
}

pub(super) fn parse_document(source: &str) -> ParseOutput {
    let mut warnings = Vec::new();
    let mut stack = vec![Frame::root()];
    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        match line::classify(raw_line) {
            LineToken::Skip => {},
            LineToken::EntityOpen { tag, id } => {
                open_entity(&mut stack, tag, id, line_no, &mut warnings);
            },
            LineToken::BlockOpen { tag } => {
                open_block(&mut stack, tag, line_no, &mut warnings);
            },
            LineToken::BlockClose => {
                if stack.len() > 1 {
                    if let Some(frame) = stack.pop()
                        && let Some(parent) = stack.last_mut()
                    {
                        attach_frame(parent, frame);
                    }
                } else {
                    note(&mut warnings, line_no, "unmatched '}' ignored");
                }
            },
            LineToken::Property { key, raw } => {
                set_property(&mut stack, key, raw, line_no, &mut warnings);
            },
            LineToken::Unrecognized => {
                note(&mut warnings, line_no, format!("unrecognized line skipped: {}", raw_line.trim()));
            },
        }
    }
    // Truncated input: drain still-open frames, attaching each where it
    // would have landed on a normal close.
    while stack.len() > 1 {
        if let Some(frame) = stack.pop()
            && let Some(parent) = stack.last_mut()
        {
            note(
                &mut warnings,
                frame.opened_at,
                "block opened here is still open at end of input",
            );
            attach_frame(parent, frame);
        }
    }
    let root = stack.pop().map_or_else(Value::object, |frame| frame.container);
    ParseOutput { root, warnings }
}

fn note(warnings: &mut Vec<ParseWarning>, line: usize, message: impl Into<String>) {
    let warning = ParseWarning::new(line, message);
    warn!("{warning}");
    warnings.push(warning);
}

fn open_entity(stack: &mut Vec<Frame>, tag: &str, id: &str, line_no: usize, warnings: &mut Vec<ParseWarning>) {
    if stack.is_empty() {
        // Should not happen; recover with a fresh root rather than crash.
        stack.push(Frame::root());
    }
    if stack.len() == 1 {
        stack.push(Frame {
            container: Value::object(),
            kind: FrameKind::Entity,
            attach: Attach::Key(id.to_string()),
            opened_at: line_no,
        });
        return;
    }
    let Some(top) = stack.last() else { return };
    // Only the immediate parent frame decides the special context.
    let frame = match &top.kind {
        FrameKind::Block(block) if block.is_array() => {
            if block.expected_child() != Some(tag) {
                note(warnings, line_no, format!("unexpected {tag} entry in array block"));
            }
            let mut map = Map::new();
            map.insert("id".to_string(), Value::String(id.to_string()));
            Frame {
                container: Value::Object(map),
                kind: FrameKind::ListEntry,
                attach: Attach::Push,
                opened_at: line_no,
            }
        },
        FrameKind::Block(BlockTag::Requires) if tag == "REQ_ITEM" => {
            requirement_frame(id, RequirementKind::ReqItem, line_no)
        },
        FrameKind::Block(BlockTag::Requires) if tag == "REQ_SKILL" => {
            requirement_frame(id, RequirementKind::ReqSkill, line_no)
        },
        FrameKind::Block(BlockTag::Improves) if tag == "IMPROVES_SKILL" => {
            requirement_frame(id, RequirementKind::ImprovesSkill, line_no)
        },
        FrameKind::Block(BlockTag::Resources) if tag == "RESOURCE" => Frame {
            container: Value::object(),
            kind: FrameKind::Entity,
            attach: Attach::Key(id.to_string()),
            opened_at: line_no,
        },
        _ => match &top.container {
            Value::Array(_) => {
                note(warnings, line_no, format!("unexpected {tag} entry in array block"));
                let mut map = Map::new();
                map.insert("id".to_string(), Value::String(id.to_string()));
                Frame {
                    container: Value::Object(map),
                    kind: FrameKind::ListEntry,
                    attach: Attach::Push,
                    opened_at: line_no,
                }
            },
            _ => Frame {
                container: Value::object(),
                kind: FrameKind::Entity,
                attach: Attach::Grouped {
                    group: tag.to_lowercase(),
                    id: id.to_string(),
                },
                opened_at: line_no,
            },
        },
    };
    stack.push(frame);
}

fn requirement_frame(id: &str, kind: RequirementKind, line_no: usize) -> Frame {
    Frame {
        container: Value::object(),
        kind: FrameKind::Requirement {
            id: id.to_string(),
            kind,
        },
        attach: Attach::Discard,
        opened_at: line_no,
    }
}

fn open_block(stack: &mut Vec<Frame>, tag: &str, line_no: usize, warnings: &mut Vec<ParseWarning>) {
    if stack.is_empty() {
        stack.push(Frame::root());
    }
    let Some(top) = stack.last() else { return };
    if let FrameKind::Block(block) = &top.kind
        && block.is_array()
    {
        // Anonymous entry, e.g. `CONNECTION {` inside `CONNECTIONS {}`; the
        // `id:` property supplies its id.
        if block.expected_child() != Some(tag) {
            note(warnings, line_no, format!("unexpected {tag} entry in array block"));
        }
        stack.push(Frame {
            container: Value::object(),
            kind: FrameKind::ListEntry,
            attach: Attach::Push,
            opened_at: line_no,
        });
        return;
    }
    let block = BlockTag::from_tag(tag);
    let container = if block.is_array() { Value::array() } else { Value::object() };
    stack.push(Frame {
        container,
        kind: FrameKind::Block(block),
        attach: Attach::Key(tag.to_lowercase()),
        opened_at: line_no,
    });
}

fn set_property(stack: &mut [Frame], key: &str, raw: &str, line_no: usize, warnings: &mut Vec<ParseWarning>) {
    let len = stack.len();
    if len == 0 {
        return;
    }
    let value = parse_value(raw);
    let redirect = match &stack[len - 1].kind {
        FrameKind::Requirement { id, kind } => Some((id.clone(), *kind)),
        _ => None,
    };
    if let Some((id, kind)) = redirect {
        if key == kind.redirect_property() {
            // Redirect to the enclosing block's per-id map rather than the
            // entry's own (discarded) object.
            if len >= 2
                && let Some(block_map) = stack[len - 2].container.as_object_mut()
            {
                let slot = block_map.entry(kind.target_map().to_string()).or_insert_with(Value::object);
                if !matches!(slot, Value::Object(_)) {
                    *slot = Value::object();
                }
                if let Some(targets) = slot.as_object_mut() {
                    targets.insert(id, value);
                }
            } else {
                note(warnings, line_no, format!("no enclosing block to receive '{key}'"));
            }
            return;
        }
        note(warnings, line_no, format!("property '{key}' in {id} entry has no effect"));
        if let Some(scratch) = stack[len - 1].container.as_object_mut() {
            scratch.insert(key.to_string(), value);
        }
        return;
    }
    match &mut stack[len - 1].container {
        Value::Object(map) => {
            map.insert(key.to_string(), value);
        },
        Value::Array(_) => {
            note(warnings, line_no, format!("property '{key}' outside any entry; skipped"));
        },
        _ => {},
    }
}

fn attach_frame(parent: &mut Frame, frame: Frame) {
    match frame.attach {
        Attach::Discard => {},
        Attach::Key(key) => {
            if let Some(map) = parent.container.as_object_mut() {
                map.insert(key, frame.container);
            }
        },
        Attach::Grouped { group, id } => {
            if let Some(map) = parent.container.as_object_mut() {
                let slot = map.entry(group).or_insert_with(Value::object);
                if !matches!(slot, Value::Object(_)) {
                    *slot = Value::object();
                }
                if let Some(children) = slot.as_object_mut() {
                    children.insert(id, frame.container);
                }
            }
        },
        Attach::Push => {
            if let Some(items) = parent.container.as_array_mut() {
                items.push(frame.container);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;

    const FOREST: &str = r#"LOCATION forest {
    name: "Лес"
    description: "Густой лес..."
    type: wilderness
    danger_level: 1
    weather: [sunny, rainy, foggy]

    RESOURCES {
        RESOURCE herb {
            min_amount: 2
            max_amount: 4
        }
    }

    CONNECTIONS {
        CONNECTION {
            id: mountains
            name: "Горы"
            condition: null
        }
    }

    REQUIRES {
        REQ_ITEM iron_key {
            amount: 1
        }
        REQ_SKILL mining {
            level: 3
        }
    }

    IMPROVES {
        IMPROVES_SKILL herbalism {
            exp: 10
        }
    }
}
"#;

    #[test]
    fn full_example_builds_expected_tree() {
        let out = parse_str(FOREST);
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
        let forest = out.root.get("forest").expect("forest entity");
        assert_eq!(forest.get("name"), Some(&Value::String("Лес".into())));
        assert_eq!(forest.get("type"), Some(&Value::String("wilderness".into())));
        assert_eq!(forest.get("danger_level"), Some(&Value::Integer(1)));
        let weather = forest.get("weather").and_then(Value::as_array).expect("weather array");
        assert_eq!(weather.len(), 3);

        let herb = forest
            .get("resources")
            .and_then(|r| r.get("herb"))
            .expect("resource herb");
        assert_eq!(herb.get("min_amount"), Some(&Value::Integer(2)));

        let connections = forest
            .get("connections")
            .and_then(Value::as_array)
            .expect("connections array");
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].get("id"), Some(&Value::String("mountains".into())));
        assert_eq!(connections[0].get("condition"), Some(&Value::Null));

        let requires = forest.get("requires").expect("requires block");
        assert_eq!(
            requires.get("player_has_items").and_then(|m| m.get("iron_key")),
            Some(&Value::Integer(1))
        );
        assert_eq!(
            requires.get("player_has_skill_level").and_then(|m| m.get("mining")),
            Some(&Value::Integer(3))
        );
        assert_eq!(
            forest
                .get("improves")
                .and_then(|i| i.get("improves_skills"))
                .and_then(|m| m.get("herbalism")),
            Some(&Value::Integer(10))
        );
    }

    #[test]
    fn requirement_entries_never_join_the_tree() {
        let out = parse_str(
            "LOCATION cave {\n    REQUIRES {\n        REQ_ITEM iron_key {\n            amount: 3\n        }\n    }\n}\n",
        );
        let requires = out.root.get("cave").and_then(|c| c.get("requires")).expect("requires");
        assert_eq!(
            requires.get("player_has_items").and_then(|m| m.get("iron_key")),
            Some(&Value::Integer(3))
        );
        assert!(requires.get("req_item").is_none());
        assert!(requires.get("iron_key").is_none());
    }

    #[test]
    fn two_connections_make_a_two_element_array() {
        let src = "LOCATION a {\n    CONNECTIONS {\n        CONNECTION {\n            id: b\n        }\n        CONNECTION {\n            id: c\n        }\n    }\n}\n";
        let out = parse_str(src);
        let conns = out
            .root
            .get("a")
            .and_then(|a| a.get("connections"))
            .and_then(Value::as_array)
            .expect("connections");
        assert_eq!(conns.len(), 2);
        assert_eq!(conns[0].get("id"), Some(&Value::String("b".into())));
        assert_eq!(conns[1].get("id"), Some(&Value::String("c".into())));
    }

    #[test]
    fn named_connection_entries_seed_their_id() {
        let src = "LOCATION a {\n    CONNECTIONS {\n        CONNECTION mountains {\n            name: \"Горы\"\n        }\n    }\n}\n";
        let out = parse_str(src);
        let conns = out
            .root
            .get("a")
            .and_then(|a| a.get("connections"))
            .and_then(Value::as_array)
            .expect("connections");
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].get("id"), Some(&Value::String("mountains".into())));
        assert_eq!(conns[0].get("name"), Some(&Value::String("Горы".into())));
    }

    #[test]
    fn characters_block_collects_entries() {
        let src = "LOCATION inn {\n    CHARACTERS {\n        CHARACTER bartender {\n            mood: friendly\n        }\n    }\n}\n";
        let out = parse_str(src);
        let chars = out
            .root
            .get("inn")
            .and_then(|i| i.get("characters"))
            .and_then(Value::as_array)
            .expect("characters");
        assert_eq!(chars.len(), 1);
        assert_eq!(chars[0].get("id"), Some(&Value::String("bartender".into())));
        assert_eq!(chars[0].get("mood"), Some(&Value::String("friendly".into())));
    }

    #[test]
    fn garbage_line_warns_but_does_not_derail() {
        let src = "LOCATION a {\n    name: \"A\"\n@@@not valid@@@\n    danger_level: 2\n}\n";
        let out = parse_str(src);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].message.contains("unrecognized"));
        assert_eq!(out.warnings[0].line, 3);
        let a = out.root.get("a").expect("entity a");
        assert_eq!(a.get("name"), Some(&Value::String("A".into())));
        assert_eq!(a.get("danger_level"), Some(&Value::Integer(2)));
    }

    #[test]
    fn unmatched_close_brace_is_a_warned_noop() {
        let src = "}\nLOCATION a {\n    name: \"A\"\n}\n}\n";
        let out = parse_str(src);
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings.iter().all(|w| w.message.contains("unmatched")));
        assert!(out.root.get("a").is_some());
    }

    #[test]
    fn truncated_input_keeps_partial_tree() {
        let src = "LOCATION a {\n    name: \"A\"\n    RESOURCES {\n        RESOURCE herb {\n            min_amount: 1\n";
        let out = parse_str(src);
        assert_eq!(out.warnings.len(), 3);
        let a = out.root.get("a").expect("entity a");
        assert_eq!(a.get("name"), Some(&Value::String("A".into())));
        assert_eq!(
            a.get("resources").and_then(|r| r.get("herb")).and_then(|h| h.get("min_amount")),
            Some(&Value::Integer(1))
        );
    }

    #[test]
    fn generic_nested_entities_group_by_lowercased_tag() {
        let src = "LOCATION keep {\n    NPC guard {\n        name: \"Guard\"\n    }\n    NPC smith {\n        name: \"Smith\"\n    }\n}\n";
        let out = parse_str(src);
        let npcs = out
            .root
            .get("keep")
            .and_then(|k| k.get("npc"))
            .and_then(Value::as_object)
            .expect("npc group");
        assert_eq!(npcs.len(), 2);
        assert_eq!(npcs["guard"].get("name"), Some(&Value::String("Guard".into())));
        assert_eq!(npcs["smith"].get("name"), Some(&Value::String("Smith".into())));
    }

    #[test]
    fn generic_block_is_object_shaped() {
        let src = "LOCATION a {\n    STATS {\n        hp: 10\n        mp: 4\n    }\n}\n";
        let out = parse_str(src);
        let stats = out.root.get("a").and_then(|a| a.get("stats")).expect("stats block");
        assert_eq!(stats.get("hp"), Some(&Value::Integer(10)));
        assert_eq!(stats.get("mp"), Some(&Value::Integer(4)));
    }

    #[test]
    fn stray_property_in_requirement_entry_warns() {
        let src = "LOCATION a {\n    REQUIRES {\n        REQ_SKILL mining {\n            level: 3\n            color: blue\n        }\n    }\n}\n";
        let out = parse_str(src);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].message.contains("no effect"));
        let requires = out.root.get("a").and_then(|a| a.get("requires")).expect("requires");
        assert_eq!(
            requires.get("player_has_skill_level").and_then(|m| m.get("mining")),
            Some(&Value::Integer(3))
        );
        assert!(requires.get("color").is_none());
    }

    #[test]
    fn property_directly_inside_array_block_is_skipped() {
        let src = "LOCATION a {\n    CONNECTIONS {\n        id: stray\n    }\n}\n";
        let out = parse_str(src);
        assert_eq!(out.warnings.len(), 1);
        let conns = out
            .root
            .get("a")
            .and_then(|a| a.get("connections"))
            .and_then(Value::as_array)
            .expect("connections");
        assert!(conns.is_empty());
    }

    #[test]
    fn duplicate_entity_id_last_write_wins() {
        let src = "LOCATION a {\n    danger_level: 1\n}\nLOCATION a {\n    danger_level: 2\n}\n";
        let out = parse_str(src);
        let a = out.root.get("a").expect("entity a");
        assert_eq!(a.get("danger_level"), Some(&Value::Integer(2)));
        assert!(a.get("name").is_none());
    }

    #[test]
    fn top_level_properties_land_on_the_root() {
        let out = parse_str("version: 3\n");
        assert_eq!(out.root.get("version"), Some(&Value::Integer(3)));
    }
}

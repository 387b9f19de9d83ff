//! wayfare_desc: parser and compiler for the Wayfare `.desc` authoring format.
//!
//! `.desc` files describe game content (locations, items, characters) in a
//! brace-delimited, line-oriented syntax:
//!
//! - `LOCATION forest {` opens a named entity
//! - `RESOURCES {` opens an anonymous block
//! - `danger_level: 1` sets a property
//! - `}` closes the innermost open entity or block
//!
//! Parsing never fails on malformed content. Unrecognized lines, stray
//! closing braces, and truncated blocks degrade to [`ParseWarning`]s and the
//! parser keeps going; only I/O problems opening a path surface as errors.
//! The output is a generic [`wayfare_data::Value`] tree that serializes to
//! the JSON resource files the engine loads.

mod json;
mod loader;
mod parser;
mod writer;

pub use json::{from_json, to_json_string};
pub use loader::{DirOutcome, LoadError, load_dir, parse_file};
pub use parser::{ParseOutput, ParseWarning, parse_str};
pub use writer::write_document;

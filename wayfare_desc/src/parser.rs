//! Parser for the `.desc` authoring format.
//!
//! Three cooperating pieces: a line classifier ([`line`]), a value-literal
//! parser ([`literal`]), and the document/stack parser ([`document`]) that
//! drives both and assembles the output tree.

use std::fmt;

use wayfare_data::Value;

mod document;
mod line;
mod literal;

/// Result of parsing one `.desc` source: the root object plus every
/// non-fatal anomaly tolerated along the way.
#[derive(Debug)]
pub struct ParseOutput {
    /// Root of the document tree; always [`Value::Object`].
    pub root: Value,
    /// Anomalies absorbed during the parse, in source order.
    pub warnings: Vec<ParseWarning>,
}

/// A tolerated anomaly: the line it occurred on and what was wrong.
///
/// Warnings never abort a parse. They cover unrecognized line shapes,
/// unmatched closing braces, properties with no sensible target, and blocks
/// still open at end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based source line number.
    pub line: usize,
    pub message: String,
}

impl ParseWarning {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Parse one `.desc` source string into a document tree.
///
/// This function is total with respect to content: any input yields a root
/// object, with malformed constructs reported through
/// [`ParseOutput::warnings`] instead of errors.
pub fn parse_str(source: &str) -> ParseOutput {
    document::parse_document(source)
}

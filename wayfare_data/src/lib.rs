//! Shared data model for Wayfare content.

pub mod value;

pub use value::{Map, Value};

//! Attribute-driven message construction.
//!
//! A message is built from a type id and a list of named attribute pairs, the
//! same path the payload decoder uses for field-by-field assignment. The
//! original protocol terminated the pair list with a null-name sentinel; here
//! the end of the slice is the sentinel. Unknown attribute names are ignored,
//! never an error, so extra fields cannot break construction.

use callwatch_core::{CallInfo, CallerInfo};

use crate::error::ProtocolResult;
use crate::framing;
use crate::registry;
use crate::types::{Message, MsgType};

/// A value for one named attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Integer value (also used for `guid`, `stage`, `part`, ids, counts).
    Int(i64),
    /// Text value.
    Str(String),
    /// An embedded call record; appended for list-valued attributes.
    Call(CallInfo),
    /// An embedded caller entry; appended for list-valued attributes.
    Caller(CallerInfo),
    /// Explicit null: clears an optional field.
    None,
}

impl AttrValue {
    /// The text if this is a `Str` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<Option<&str>> for AttrValue {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(s) => AttrValue::Str(s.to_owned()),
            None => AttrValue::None,
        }
    }
}

/// Builds a message of the given type from named attribute pairs.
///
/// Pairs are applied in order through the registry's attribute dispatch;
/// `guid` is set on the base uniformly for every variant, later pairs
/// overwrite earlier ones, and unknown names are silently ignored.
pub fn message_new(msg_type: MsgType, attrs: &[(&str, AttrValue)]) -> Message {
    let mut msg = registry::alloc(msg_type);
    for (key, value) in attrs {
        registry::set_value(&mut msg, key, value);
    }
    msg
}

/// Builds a message from attribute pairs and encodes it as a wire frame in
/// one call.
///
/// # Errors
///
/// Fails if the payload cannot be encoded.
pub fn message_to_bytes(msg_type: MsgType, attrs: &[(&str, AttrValue)]) -> ProtocolResult<Vec<u8>> {
    framing::write_message(&message_new(msg_type, attrs))
}

//! Message type registry: allocation, payload dispatch and attribute-set
//! dispatch, exhaustive over [`MsgType`].
//!
//! The original protocol kept a table of per-type function pointers (size,
//! build, read, free, set_value). Here the table is the set of exhaustive
//! matches below: adding a variant fails compilation until every dispatch arm
//! covers it, which is what keeps call sites untouched when a type is added.
//! Teardown needs no dispatch; dropping a [`Message`] releases everything it
//! owns.

use serde_json::{Map, Value};

use callwatch_core::{CallField, MultipartStage};

use crate::construct::AttrValue;
use crate::error::{ProtocolError, ProtocolResult};
use crate::payload;
use crate::types::{
    DbCallList, DbCaller, DbGetCallerList, DbNumCalls, EventCall, EventRing, Message, MsgType,
    Version,
};

/// Allocates an empty instance of a registered type, with only the type id
/// set. Every other field starts at its zero default.
pub fn alloc(msg_type: MsgType) -> Message {
    match msg_type {
        MsgType::Version => Message::Version(Version::default()),
        MsgType::EventRing => Message::EventRing(EventRing::default()),
        MsgType::EventCall => Message::EventCall(EventCall::default()),
        MsgType::EventConnect => Message::EventConnect { guid: 0 },
        MsgType::EventDisconnect => Message::EventDisconnect { guid: 0 },
        MsgType::Leave => Message::Leave { guid: 0 },
        MsgType::Shutdown => Message::Shutdown { guid: 0 },
        MsgType::DbNumCalls => Message::DbNumCalls(DbNumCalls::default()),
        MsgType::DbCallList => Message::DbCallList(DbCallList::default()),
        MsgType::DbGetCaller => Message::DbGetCaller(DbCaller::default()),
        MsgType::DbAddCaller => Message::DbAddCaller(DbCaller::default()),
        MsgType::DbDelCaller => Message::DbDelCaller(DbCaller::default()),
        MsgType::DbGetCallerList => Message::DbGetCallerList(DbGetCallerList::default()),
    }
}

/// Allocates by raw wire id.
///
/// # Errors
///
/// Returns [`ProtocolError::AllocationRefused`] for unregistered ids, such as
/// the reserved sentinel.
pub fn alloc_id(id: u32) -> ProtocolResult<Message> {
    MsgType::from_wire(id)
        .map(alloc)
        .map_err(|_| ProtocolError::AllocationRefused(id))
}

/// Builds the payload value for a message.
///
/// Types without payload fields produce the empty object.
pub fn build(msg: &Message) -> Value {
    match msg {
        Message::Version(m) => payload::version_build(m),
        Message::EventRing(m) => payload::event_ring_build(m),
        Message::EventCall(m) => payload::event_call_build(m),
        Message::EventConnect { .. }
        | Message::EventDisconnect { .. }
        | Message::Leave { .. }
        | Message::Shutdown { .. } => Value::Object(Map::new()),
        Message::DbNumCalls(m) => payload::db_num_calls_build(m),
        Message::DbCallList(m) => payload::db_call_list_build(m),
        Message::DbGetCaller(m) => payload::db_caller_build(m),
        Message::DbAddCaller(m) => payload::db_caller_build(m),
        Message::DbDelCaller(m) => payload::db_caller_build(m),
        Message::DbGetCallerList(m) => payload::db_get_caller_list_build(m),
    }
}

/// Decodes a payload value into a message of the given type.
///
/// Types without payload fields decode to an empty instance regardless of the
/// payload contents.
///
/// # Errors
///
/// Fails with [`ProtocolError::PayloadNotObject`] if the type expects an
/// object-shaped payload and the root is something else.
pub fn read(msg_type: MsgType, root: &Value) -> ProtocolResult<Message> {
    match msg_type {
        MsgType::Version => payload::version_read(root),
        MsgType::EventRing => payload::event_ring_read(root),
        MsgType::EventCall => payload::event_call_read(root),
        MsgType::EventConnect
        | MsgType::EventDisconnect
        | MsgType::Leave
        | MsgType::Shutdown => Ok(alloc(msg_type)),
        MsgType::DbNumCalls => payload::db_num_calls_read(root),
        MsgType::DbCallList => payload::db_call_list_read(root),
        MsgType::DbGetCaller => payload::db_caller_read(msg_type, root),
        MsgType::DbAddCaller => payload::db_caller_read(msg_type, root),
        MsgType::DbDelCaller => payload::db_caller_read(msg_type, root),
        MsgType::DbGetCallerList => payload::db_get_caller_list_read(root),
    }
}

/// Applies one named attribute to a message.
///
/// `guid` is handled on the base so every variant supports it uniformly.
/// Names a variant does not know, and values of the wrong shape, are ignored.
/// This is the single assignment path shared by construction and payload
/// decoding.
pub fn set_value(msg: &mut Message, key: &str, value: &AttrValue) {
    if key == "guid" {
        if let AttrValue::Int(v) = value {
            msg.set_guid(*v as u32);
        }
        return;
    }

    match msg {
        Message::Version(m) => match (key, value) {
            ("major", AttrValue::Int(v)) => m.major = *v as i32,
            ("minor", AttrValue::Int(v)) => m.minor = *v as i32,
            ("patch", AttrValue::Int(v)) => m.patch = *v as i32,
            ("human_readable", AttrValue::Str(s)) => m.human_readable = Some(s.clone()),
            ("human_readable", AttrValue::None) => m.human_readable = None,
            _ => {}
        },
        Message::EventRing(m) => match (key, value) {
            ("stage", AttrValue::Int(v)) => m.multipart.stage = MultipartStage::from_wire(*v),
            ("part", AttrValue::Int(v)) => m.multipart.part = *v as i32,
            ("msgid", AttrValue::Str(s)) => m.multipart.set_msgid(s),
            ("id", AttrValue::Int(v)) => m.call.id = *v as i32,
            _ => set_call_field(&mut m.call, key, value),
        },
        Message::EventCall(m) => match (key, value) {
            ("id", AttrValue::Int(v)) => m.call.id = *v as i32,
            _ => set_call_field(&mut m.call, key, value),
        },
        Message::EventConnect { .. }
        | Message::EventDisconnect { .. }
        | Message::Leave { .. }
        | Message::Shutdown { .. } => {}
        Message::DbNumCalls(m) => {
            if let ("count", AttrValue::Int(v)) = (key, value) {
                m.count = *v as i32;
            }
        }
        Message::DbCallList(m) => match (key, value) {
            ("user", AttrValue::Int(v)) => m.user = *v as i32,
            ("offset", AttrValue::Int(v)) => m.offset = *v as i32,
            ("count", AttrValue::Int(v)) => m.count = *v as i32,
            ("call", AttrValue::Call(c)) => m.calls.push(c.clone()),
            _ => {}
        },
        Message::DbGetCaller(m) | Message::DbAddCaller(m) | Message::DbDelCaller(m) => {
            match (key, value) {
                ("user", AttrValue::Int(v)) => m.user = *v as i32,
                ("caller", AttrValue::Caller(c)) => m.caller = c.clone(),
                ("number", AttrValue::Str(s)) => m.caller.number = Some(s.clone()),
                ("number", AttrValue::None) => m.caller.number = None,
                ("name", AttrValue::Str(s)) => m.caller.name = Some(s.clone()),
                ("name", AttrValue::None) => m.caller.name = None,
                _ => {}
            }
        }
        Message::DbGetCallerList(m) => match (key, value) {
            ("user", AttrValue::Int(v)) => m.user = *v as i32,
            ("filter", AttrValue::Str(s)) => m.filter = Some(s.clone()),
            ("filter", AttrValue::None) => m.filter = None,
            ("caller", AttrValue::Caller(c)) => m.callers.push(c.clone()),
            _ => {}
        },
    }
}

fn set_call_field(call: &mut callwatch_core::CallInfo, key: &str, value: &AttrValue) {
    let Some(field) = CallField::from_wire_name(key) else {
        return;
    };
    match value {
        AttrValue::Str(s) => call.set(field, Some(s)),
        AttrValue::None => call.set(field, None),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_sets_only_the_type() {
        for msg_type in MsgType::ALL {
            let msg = alloc(msg_type);
            assert_eq!(msg.msg_type(), msg_type);
            assert_eq!(msg.guid(), 0);
        }
    }

    #[test]
    fn alloc_id_refuses_sentinel_and_unknown() {
        assert!(matches!(
            alloc_id(MsgType::INVALID_ID),
            Err(ProtocolError::AllocationRefused(id)) if id == MsgType::INVALID_ID
        ));
        assert!(matches!(
            alloc_id(MsgType::COUNT),
            Err(ProtocolError::AllocationRefused(_))
        ));
        assert!(alloc_id(0).is_ok());
    }

    #[test]
    fn payload_less_types_build_the_empty_object() {
        for msg_type in [
            MsgType::EventConnect,
            MsgType::EventDisconnect,
            MsgType::Leave,
            MsgType::Shutdown,
        ] {
            let value = build(&alloc(msg_type));
            assert_eq!(serde_json::to_string(&value).unwrap(), "{}");
        }
    }

    #[test]
    fn payload_less_types_read_to_empty_instances() {
        let root = serde_json::json!({"anything": "ignored"});
        let msg = read(MsgType::EventConnect, &root).unwrap();
        assert_eq!(msg, Message::EventConnect { guid: 0 });
    }

    #[test]
    fn set_value_ignores_wrong_shapes() {
        let mut msg = alloc(MsgType::Version);
        set_value(&mut msg, "major", &AttrValue::from("not a number"));
        match &msg {
            Message::Version(v) => assert_eq!(v.major, 0),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn caller_attributes_set_the_embedded_record() {
        let mut msg = alloc(MsgType::DbAddCaller);
        set_value(&mut msg, "user", &AttrValue::Int(1));
        set_value(&mut msg, "number", &AttrValue::from("03720980504"));
        set_value(&mut msg, "name", &AttrValue::from("Frank Langenau"));
        set_value(&mut msg, "name", &AttrValue::None);
        match msg {
            Message::DbAddCaller(m) => {
                assert_eq!(m.user, 1);
                assert_eq!(m.caller.number.as_deref(), Some("03720980504"));
                assert_eq!(m.caller.name, None);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}

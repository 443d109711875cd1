//! Per-type payload codecs between typed messages and the self-describing
//! JSON value carried in a frame.
//!
//! Build functions emit one object per message; `guid` comes first for every
//! type that puts it on the wire. Optional members are omitted entirely when
//! absent, with one exception: Version's `human_readable` emits `""` so the
//! handshake payload always has the same shape. Version also never emits
//! `guid`; its wire bytes are pinned by the original handshake.
//!
//! Read functions tolerate absent optional members and route every assignment
//! through [`registry::set_value`], the same path attribute-driven
//! construction uses, so decode and construction cannot diverge on
//! normalization. Embedded single records (ring/call events, caller queries)
//! are flattened into the parent object; list-valued fields carry one object
//! per record.

use serde_json::{Map, Value};

use callwatch_core::{CallField, CallInfo, CallerInfo};

use crate::construct::AttrValue;
use crate::error::{ProtocolError, ProtocolResult};
use crate::registry;
use crate::types::{
    DbCallList, DbCaller, DbGetCallerList, DbNumCalls, EventCall, EventRing, Message, MsgType,
    Version,
};

fn as_object(root: &Value) -> ProtocolResult<&Map<String, Value>> {
    root.as_object().ok_or(ProtocolError::PayloadNotObject)
}

fn set_int(msg: &mut Message, obj: &Map<String, Value>, key: &str) {
    if let Some(v) = obj.get(key).and_then(Value::as_i64) {
        registry::set_value(msg, key, &AttrValue::Int(v));
    }
}

fn set_str(msg: &mut Message, obj: &Map<String, Value>, key: &str) {
    if let Some(s) = obj.get(key).and_then(Value::as_str) {
        registry::set_value(msg, key, &AttrValue::Str(s.to_owned()));
    }
}

/// Writes a call record's members into `obj`: `id` always, optional fields
/// only when their presence bit is set.
fn call_info_write(obj: &mut Map<String, Value>, call: &CallInfo) {
    obj.insert("id".to_owned(), Value::from(call.id));
    for field in CallField::ALL {
        if let Some(text) = call.get(field) {
            obj.insert(field.wire_name().to_owned(), Value::from(text));
        }
    }
}

fn call_info_value(call: &CallInfo) -> Value {
    let mut obj = Map::new();
    call_info_write(&mut obj, call);
    Value::Object(obj)
}

/// Reads a call record from an object. Absent members stay unset; present
/// members go through the record setter, which owns the text and maintains
/// the presence mask.
fn call_info_read(obj: &Map<String, Value>) -> CallInfo {
    let mut call = CallInfo::new();
    if let Some(id) = obj.get("id").and_then(Value::as_i64) {
        call.id = id as i32;
    }
    for field in CallField::ALL {
        if let Some(text) = obj.get(field.wire_name()).and_then(Value::as_str) {
            call.set(field, Some(text));
        }
    }
    call
}

fn caller_info_write(obj: &mut Map<String, Value>, caller: &CallerInfo) {
    if let Some(number) = &caller.number {
        obj.insert("number".to_owned(), Value::from(number.as_str()));
    }
    if let Some(name) = &caller.name {
        obj.insert("name".to_owned(), Value::from(name.as_str()));
    }
}

fn caller_info_value(caller: &CallerInfo) -> Value {
    let mut obj = Map::new();
    caller_info_write(&mut obj, caller);
    Value::Object(obj)
}

fn caller_info_read(obj: &Map<String, Value>) -> CallerInfo {
    CallerInfo {
        number: obj.get("number").and_then(Value::as_str).map(str::to_owned),
        name: obj.get("name").and_then(Value::as_str).map(str::to_owned),
    }
}

pub fn version_build(m: &Version) -> Value {
    let mut obj = Map::new();
    obj.insert("major".to_owned(), Value::from(m.major));
    obj.insert("minor".to_owned(), Value::from(m.minor));
    obj.insert("patch".to_owned(), Value::from(m.patch));
    obj.insert(
        "human_readable".to_owned(),
        Value::from(m.human_readable.as_deref().unwrap_or("")),
    );
    Value::Object(obj)
}

pub fn version_read(root: &Value) -> ProtocolResult<Message> {
    let obj = as_object(root)?;
    let mut msg = registry::alloc(MsgType::Version);
    set_int(&mut msg, obj, "major");
    set_int(&mut msg, obj, "minor");
    set_int(&mut msg, obj, "patch");
    set_str(&mut msg, obj, "human_readable");
    Ok(msg)
}

pub fn event_ring_build(m: &EventRing) -> Value {
    let mut obj = Map::new();
    obj.insert("guid".to_owned(), Value::from(m.guid));
    obj.insert("stage".to_owned(), Value::from(m.multipart.stage.wire_id()));
    obj.insert("part".to_owned(), Value::from(m.multipart.part));
    obj.insert("msgid".to_owned(), Value::from(m.multipart.msgid()));
    call_info_write(&mut obj, &m.call);
    Value::Object(obj)
}

pub fn event_ring_read(root: &Value) -> ProtocolResult<Message> {
    let obj = as_object(root)?;
    let mut msg = registry::alloc(MsgType::EventRing);
    set_int(&mut msg, obj, "guid");
    set_int(&mut msg, obj, "stage");
    set_int(&mut msg, obj, "part");
    set_str(&mut msg, obj, "msgid");
    set_int(&mut msg, obj, "id");
    for field in CallField::ALL {
        set_str(&mut msg, obj, field.wire_name());
    }
    Ok(msg)
}

pub fn event_call_build(m: &EventCall) -> Value {
    let mut obj = Map::new();
    obj.insert("guid".to_owned(), Value::from(m.guid));
    call_info_write(&mut obj, &m.call);
    Value::Object(obj)
}

pub fn event_call_read(root: &Value) -> ProtocolResult<Message> {
    let obj = as_object(root)?;
    let mut msg = registry::alloc(MsgType::EventCall);
    set_int(&mut msg, obj, "guid");
    set_int(&mut msg, obj, "id");
    for field in CallField::ALL {
        set_str(&mut msg, obj, field.wire_name());
    }
    Ok(msg)
}

pub fn db_num_calls_build(m: &DbNumCalls) -> Value {
    let mut obj = Map::new();
    obj.insert("guid".to_owned(), Value::from(m.guid));
    obj.insert("count".to_owned(), Value::from(m.count));
    Value::Object(obj)
}

pub fn db_num_calls_read(root: &Value) -> ProtocolResult<Message> {
    let obj = as_object(root)?;
    let mut msg = registry::alloc(MsgType::DbNumCalls);
    set_int(&mut msg, obj, "guid");
    set_int(&mut msg, obj, "count");
    Ok(msg)
}

pub fn db_call_list_build(m: &DbCallList) -> Value {
    let mut obj = Map::new();
    obj.insert("guid".to_owned(), Value::from(m.guid));
    obj.insert("user".to_owned(), Value::from(m.user));
    obj.insert("offset".to_owned(), Value::from(m.offset));
    obj.insert("count".to_owned(), Value::from(m.count));
    obj.insert(
        "calls".to_owned(),
        Value::Array(m.calls.iter().map(call_info_value).collect()),
    );
    Value::Object(obj)
}

pub fn db_call_list_read(root: &Value) -> ProtocolResult<Message> {
    let obj = as_object(root)?;
    let mut msg = registry::alloc(MsgType::DbCallList);
    set_int(&mut msg, obj, "guid");
    set_int(&mut msg, obj, "user");
    set_int(&mut msg, obj, "offset");
    set_int(&mut msg, obj, "count");
    if let Some(calls) = obj.get("calls").and_then(Value::as_array) {
        for element in calls {
            let call = call_info_read(as_object(element)?);
            registry::set_value(&mut msg, "call", &AttrValue::Call(call));
        }
    }
    Ok(msg)
}

pub fn db_caller_build(m: &DbCaller) -> Value {
    let mut obj = Map::new();
    obj.insert("guid".to_owned(), Value::from(m.guid));
    obj.insert("user".to_owned(), Value::from(m.user));
    caller_info_write(&mut obj, &m.caller);
    Value::Object(obj)
}

/// Shared decode for DbGetCaller, DbAddCaller and DbDelCaller; `msg_type`
/// picks the variant.
pub fn db_caller_read(msg_type: MsgType, root: &Value) -> ProtocolResult<Message> {
    let obj = as_object(root)?;
    let mut msg = registry::alloc(msg_type);
    set_int(&mut msg, obj, "guid");
    set_int(&mut msg, obj, "user");
    set_str(&mut msg, obj, "number");
    set_str(&mut msg, obj, "name");
    Ok(msg)
}

pub fn db_get_caller_list_build(m: &DbGetCallerList) -> Value {
    let mut obj = Map::new();
    obj.insert("guid".to_owned(), Value::from(m.guid));
    obj.insert("user".to_owned(), Value::from(m.user));
    if let Some(filter) = &m.filter {
        obj.insert("filter".to_owned(), Value::from(filter.as_str()));
    }
    obj.insert(
        "callers".to_owned(),
        Value::Array(m.callers.iter().map(caller_info_value).collect()),
    );
    Value::Object(obj)
}

pub fn db_get_caller_list_read(root: &Value) -> ProtocolResult<Message> {
    let obj = as_object(root)?;
    let mut msg = registry::alloc(MsgType::DbGetCallerList);
    set_int(&mut msg, obj, "guid");
    set_int(&mut msg, obj, "user");
    set_str(&mut msg, obj, "filter");
    if let Some(callers) = obj.get("callers").and_then(Value::as_array) {
        for element in callers {
            let caller = caller_info_read(as_object(element)?);
            registry::set_value(&mut msg, "caller", &AttrValue::Caller(caller));
        }
    }
    Ok(msg)
}

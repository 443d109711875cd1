//! Message types exchanged between the callwatch daemon and its clients.
//!
//! [`Message`] is a closed set of variants discriminated by [`MsgType`]. The
//! base attribute shared by every variant is `guid`, an opaque caller-supplied
//! correlation id echoed verbatim in replies. Adding a message type means
//! adding a variant here and a registry id; the exhaustive matches in
//! [`crate::registry`] then force every dispatch arm to be extended.

use callwatch_core::{CallInfo, CallerInfo, Multipart};

use crate::error::{ProtocolError, ProtocolResult};

/// Message type identifiers as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgType {
    /// Protocol version handshake.
    Version,
    /// Incoming call (ring), staged as a multipart sequence.
    EventRing,
    /// Outgoing call.
    EventCall,
    /// A call was connected.
    EventConnect,
    /// A call was disconnected.
    EventDisconnect,
    /// Client announces it is leaving.
    Leave,
    /// Server announces shutdown to all clients.
    Shutdown,
    /// Number of call records in the database.
    DbNumCalls,
    /// Page of call records.
    DbCallList,
    /// Look a caller up in the directory.
    DbGetCaller,
    /// Add or update a directory entry.
    DbAddCaller,
    /// Delete a directory entry.
    DbDelCaller,
    /// List directory entries matching a filter.
    DbGetCallerList,
}

impl MsgType {
    /// Number of registered message types.
    pub const COUNT: u32 = 13;

    /// Reserved sentinel meaning "invalid/unassigned". Never registered and
    /// never valid on the wire.
    pub const INVALID_ID: u32 = 32767;

    /// All registered types, in wire id order.
    pub const ALL: [MsgType; 13] = [
        MsgType::Version,
        MsgType::EventRing,
        MsgType::EventCall,
        MsgType::EventConnect,
        MsgType::EventDisconnect,
        MsgType::Leave,
        MsgType::Shutdown,
        MsgType::DbNumCalls,
        MsgType::DbCallList,
        MsgType::DbGetCaller,
        MsgType::DbAddCaller,
        MsgType::DbDelCaller,
        MsgType::DbGetCallerList,
    ];

    /// The u32 id used in the frame header.
    pub fn wire_id(self) -> u32 {
        match self {
            MsgType::Version => 0,
            MsgType::EventRing => 1,
            MsgType::EventCall => 2,
            MsgType::EventConnect => 3,
            MsgType::EventDisconnect => 4,
            MsgType::Leave => 5,
            MsgType::Shutdown => 6,
            MsgType::DbNumCalls => 7,
            MsgType::DbCallList => 8,
            MsgType::DbGetCaller => 9,
            MsgType::DbAddCaller => 10,
            MsgType::DbDelCaller => 11,
            MsgType::DbGetCallerList => 12,
        }
    }

    /// Maps a wire id to a registered type.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownType`] for any id outside the
    /// registered range, including the reserved sentinel.
    pub fn from_wire(id: u32) -> ProtocolResult<MsgType> {
        MsgType::ALL
            .into_iter()
            .find(|t| t.wire_id() == id)
            .ok_or(ProtocolError::UnknownType(id))
    }
}

/// Protocol version handshake. Sent by the server on connect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    /// Correlation id, echoed in replies.
    pub guid: u32,
    /// Major version number.
    pub major: i32,
    /// Minor version number.
    pub minor: i32,
    /// Patch version number.
    pub patch: i32,
    /// Version string to print. Encodes as `""` when unset.
    pub human_readable: Option<String>,
}

/// Incoming call event, sent in stages while the call is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRing {
    /// Correlation id, echoed in replies.
    pub guid: u32,
    /// Stage/part/msgid sequencing metadata.
    pub multipart: Multipart,
    /// What is known about the call at this stage.
    pub call: CallInfo,
}

/// Outgoing call event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCall {
    /// Correlation id, echoed in replies.
    pub guid: u32,
    /// Information about the call.
    pub call: CallInfo,
}

/// Total number of call records in the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbNumCalls {
    /// Correlation id, echoed in replies.
    pub guid: u32,
    /// Number of entries.
    pub count: i32,
}

/// A page of call records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbCallList {
    /// Correlation id, echoed in replies.
    pub guid: u32,
    /// User id for per-user entries.
    pub user: i32,
    /// Offset of the query.
    pub offset: i32,
    /// Number of entries queried.
    pub count: i32,
    /// The records, in database order.
    pub calls: Vec<CallInfo>,
}

/// Directory entry query/update. Shared shape of DbGetCaller, DbAddCaller and
/// DbDelCaller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbCaller {
    /// Correlation id, echoed in replies.
    pub guid: u32,
    /// User id for per-user entries.
    pub user: i32,
    /// The directory entry, embedded in the message.
    pub caller: CallerInfo,
}

/// Directory listing matching a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbGetCallerList {
    /// Correlation id, echoed in replies.
    pub guid: u32,
    /// User id for per-user entries.
    pub user: i32,
    /// Only entries containing this string; absent means all.
    pub filter: Option<String>,
    /// Matching entries, in database order.
    pub callers: Vec<CallerInfo>,
}

/// A protocol message. The variant set is closed; dispatch is exhaustive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Protocol version handshake.
    Version(Version),
    /// Incoming call (multipart).
    EventRing(EventRing),
    /// Outgoing call.
    EventCall(EventCall),
    /// Call connected. No payload fields.
    EventConnect {
        /// Correlation id.
        guid: u32,
    },
    /// Call disconnected. No payload fields.
    EventDisconnect {
        /// Correlation id.
        guid: u32,
    },
    /// Client leaves. No payload fields.
    Leave {
        /// Correlation id.
        guid: u32,
    },
    /// Server shuts down. No payload fields.
    Shutdown {
        /// Correlation id.
        guid: u32,
    },
    /// Database entry count.
    DbNumCalls(DbNumCalls),
    /// Call record page.
    DbCallList(DbCallList),
    /// Directory lookup.
    DbGetCaller(DbCaller),
    /// Directory insert/update.
    DbAddCaller(DbCaller),
    /// Directory delete.
    DbDelCaller(DbCaller),
    /// Filtered directory listing.
    DbGetCallerList(DbGetCallerList),
}

impl Message {
    /// The type id of this message. Immutable after construction.
    pub fn msg_type(&self) -> MsgType {
        match self {
            Message::Version(_) => MsgType::Version,
            Message::EventRing(_) => MsgType::EventRing,
            Message::EventCall(_) => MsgType::EventCall,
            Message::EventConnect { .. } => MsgType::EventConnect,
            Message::EventDisconnect { .. } => MsgType::EventDisconnect,
            Message::Leave { .. } => MsgType::Leave,
            Message::Shutdown { .. } => MsgType::Shutdown,
            Message::DbNumCalls(_) => MsgType::DbNumCalls,
            Message::DbCallList(_) => MsgType::DbCallList,
            Message::DbGetCaller(_) => MsgType::DbGetCaller,
            Message::DbAddCaller(_) => MsgType::DbAddCaller,
            Message::DbDelCaller(_) => MsgType::DbDelCaller,
            Message::DbGetCallerList(_) => MsgType::DbGetCallerList,
        }
    }

    /// The base correlation id.
    pub fn guid(&self) -> u32 {
        match self {
            Message::Version(m) => m.guid,
            Message::EventRing(m) => m.guid,
            Message::EventCall(m) => m.guid,
            Message::EventConnect { guid }
            | Message::EventDisconnect { guid }
            | Message::Leave { guid }
            | Message::Shutdown { guid } => *guid,
            Message::DbNumCalls(m) => m.guid,
            Message::DbCallList(m) => m.guid,
            Message::DbGetCaller(m) => m.guid,
            Message::DbAddCaller(m) => m.guid,
            Message::DbDelCaller(m) => m.guid,
            Message::DbGetCallerList(m) => m.guid,
        }
    }

    /// Sets the base correlation id, uniformly for every variant.
    pub fn set_guid(&mut self, value: u32) {
        match self {
            Message::Version(m) => m.guid = value,
            Message::EventRing(m) => m.guid = value,
            Message::EventCall(m) => m.guid = value,
            Message::EventConnect { guid }
            | Message::EventDisconnect { guid }
            | Message::Leave { guid }
            | Message::Shutdown { guid } => *guid = value,
            Message::DbNumCalls(m) => m.guid = value,
            Message::DbCallList(m) => m.guid = value,
            Message::DbGetCaller(m) => m.guid = value,
            Message::DbAddCaller(m) => m.guid = value,
            Message::DbDelCaller(m) => m.guid = value,
            Message::DbGetCallerList(m) => m.guid = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_ids_are_dense_and_stable() {
        for (i, t) in MsgType::ALL.into_iter().enumerate() {
            assert_eq!(t.wire_id(), i as u32);
            assert_eq!(MsgType::from_wire(i as u32).unwrap(), t);
        }
        assert_eq!(MsgType::ALL.len() as u32, MsgType::COUNT);
    }

    #[test]
    fn sentinel_and_out_of_range_rejected() {
        assert!(matches!(
            MsgType::from_wire(MsgType::INVALID_ID),
            Err(ProtocolError::UnknownType(id)) if id == MsgType::INVALID_ID
        ));
        assert!(matches!(
            MsgType::from_wire(MsgType::COUNT),
            Err(ProtocolError::UnknownType(_))
        ));
    }

    #[test]
    fn guid_uniform_across_variants() {
        let mut msg = Message::Leave { guid: 0 };
        msg.set_guid(77);
        assert_eq!(msg.guid(), 77);

        let mut msg = Message::DbNumCalls(DbNumCalls::default());
        msg.set_guid(1234);
        assert_eq!(msg.guid(), 1234);
        assert_eq!(msg.msg_type(), MsgType::DbNumCalls);
    }
}

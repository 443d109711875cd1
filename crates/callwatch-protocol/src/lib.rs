//! Wire message protocol for the callwatch call-event notification service.
//!
//! The daemon emits call events and answers directory/database queries; one or
//! more clients receive events and issue requests. This crate is the message
//! protocol itself, not the transport.
//!
//! # Frame layout
//!
//! Every message is a fixed 14-byte header followed by a JSON payload:
//!
//! ```text
//! +---------+----------------+----------------+-----------------+
//! | "ci-msg"| length (4, LE) | type id (4, LE)|  JSON payload   |
//! +---------+----------------+----------------+-----------------+
//! ```
//!
//! Types without payload fields carry the literal two bytes `{}`.
//!
//! # Example
//!
//! ```rust
//! use callwatch_protocol::{construct::{message_new, AttrValue}, framing, MsgType};
//!
//! let msg = message_new(
//!     MsgType::Version,
//!     &[
//!         ("major", AttrValue::Int(3)),
//!         ("minor", AttrValue::Int(0)),
//!         ("patch", AttrValue::Int(0)),
//!         ("human_readable", AttrValue::from("3.0.0")),
//!     ],
//! );
//! let bytes = framing::write_message(&msg).unwrap();
//! let decoded = framing::read_message(&bytes).unwrap();
//! assert_eq!(decoded.msg_type(), MsgType::Version);
//! ```

pub mod construct;
pub mod error;
pub mod framing;
mod payload;
pub mod registry;
pub mod types;

pub use construct::{message_new, message_to_bytes, AttrValue};
pub use error::{ProtocolError, ProtocolResult};
pub use framing::{read_message, write_message, FrameReader, FrameWriter, MsgHeader};
pub use types::{
    DbCallList, DbCaller, DbGetCallerList, DbNumCalls, EventCall, EventRing, Message, MsgType,
    Version,
};

/// Maximum encoded payload size (1 MB).
pub const MAX_MESSAGE_SIZE: u32 = 1024 * 1024;

//! Binary frame codec.
//!
//! A frame is a fixed 14-byte header followed by the JSON payload:
//!
//! ```text
//! +-----------+------------------+-------------------+-----------------+
//! | "ci-msg"  | payload len (LE) | type id (4, LE)   |  JSON payload   |
//! |  6 bytes  |     4 bytes      |      4 bytes      |   len bytes     |
//! +-----------+------------------+-------------------+-----------------+
//! ```
//!
//! [`write_message`]/[`read_message`] work on byte buffers; [`FrameReader`]
//! and [`FrameWriter`] move whole frames over `Read`/`Write` streams.

use std::io::{Read, Write};

use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};
use crate::registry;
use crate::types::{Message, MsgType};
use crate::MAX_MESSAGE_SIZE;

/// The 6-byte magic tag opening every frame.
pub const MAGIC: &[u8; 6] = b"ci-msg";

/// Total header size in bytes.
pub const HEADER_LENGTH: usize = 14;

const LEN_OFFSET: usize = 6;
const TYPE_OFFSET: usize = 10;

/// Decoded frame header. Exists only on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgHeader {
    /// Raw type id. Validated against the registry at dispatch time.
    pub msg_type: u32,
    /// Payload length in bytes.
    pub msg_len: u32,
}

/// Writes a frame header into `buf`.
///
/// Returns the number of bytes written ([`HEADER_LENGTH`]).
///
/// # Errors
///
/// Fails with [`ProtocolError::IncompleteMessage`] if `buf` is shorter than
/// [`HEADER_LENGTH`]; nothing is written in that case.
pub fn write_header(buf: &mut [u8], header: &MsgHeader) -> ProtocolResult<usize> {
    if buf.len() < HEADER_LENGTH {
        return Err(ProtocolError::IncompleteMessage {
            expected: HEADER_LENGTH,
            received: buf.len(),
        });
    }
    buf[..LEN_OFFSET].copy_from_slice(MAGIC);
    buf[LEN_OFFSET..TYPE_OFFSET].copy_from_slice(&header.msg_len.to_le_bytes());
    buf[TYPE_OFFSET..HEADER_LENGTH].copy_from_slice(&header.msg_type.to_le_bytes());
    Ok(HEADER_LENGTH)
}

/// Reads a frame header from the start of `buf`.
///
/// # Errors
///
/// Fails with [`ProtocolError::MalformedHeader`] if `buf` holds fewer than
/// [`HEADER_LENGTH`] bytes or does not open with the magic tag.
pub fn read_header(buf: &[u8]) -> ProtocolResult<MsgHeader> {
    if buf.len() < HEADER_LENGTH || &buf[..LEN_OFFSET] != MAGIC {
        return Err(ProtocolError::MalformedHeader);
    }
    let msg_len = u32::from_le_bytes(buf[LEN_OFFSET..TYPE_OFFSET].try_into().unwrap());
    let msg_type = u32::from_le_bytes(buf[TYPE_OFFSET..HEADER_LENGTH].try_into().unwrap());
    Ok(MsgHeader { msg_type, msg_len })
}

/// Encodes a message into a complete frame.
///
/// Types without payload fields carry the literal bytes `{}`.
///
/// # Errors
///
/// Fails if the payload cannot be serialized or exceeds
/// [`MAX_MESSAGE_SIZE`](crate::MAX_MESSAGE_SIZE).
pub fn write_message(msg: &Message) -> ProtocolResult<Vec<u8>> {
    let payload = serde_json::to_vec(&registry::build(msg))?;
    if payload.len() > MAX_MESSAGE_SIZE as usize {
        return Err(ProtocolError::MessageTooLarge {
            size: payload.len() as u32,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let header = MsgHeader {
        msg_type: msg.msg_type().wire_id(),
        msg_len: payload.len() as u32,
    };
    let mut buf = vec![0u8; HEADER_LENGTH + payload.len()];
    write_header(&mut buf, &header)?;
    buf[HEADER_LENGTH..].copy_from_slice(&payload);
    Ok(buf)
}

/// Decodes one complete frame from the start of `buf`.
///
/// # Errors
///
/// Fails with [`ProtocolError::MalformedHeader`] on a bad header,
/// [`ProtocolError::UnknownType`] for an unregistered type id,
/// [`ProtocolError::IncompleteMessage`] if the buffer ends before the
/// declared payload does, and [`ProtocolError::PayloadParse`] /
/// [`ProtocolError::PayloadNotObject`] on a bad payload. No partially decoded
/// message escapes any of these.
pub fn read_message(buf: &[u8]) -> ProtocolResult<Message> {
    let header = read_header(buf)?;
    let msg_type = MsgType::from_wire(header.msg_type)?;

    let end = HEADER_LENGTH + header.msg_len as usize;
    if buf.len() < end {
        return Err(ProtocolError::IncompleteMessage {
            expected: end,
            received: buf.len(),
        });
    }

    let root: Value = serde_json::from_slice(&buf[HEADER_LENGTH..end])?;
    registry::read(msg_type, &root)
}

/// Reads whole frames from a byte stream.
pub struct FrameReader<R> {
    reader: R,
}

impl<R: Read> FrameReader<R> {
    /// Creates a new reader wrapping `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads and decodes a single frame.
    ///
    /// Returns `Ok(None)` on a clean EOF before any header byte.
    ///
    /// # Errors
    ///
    /// Fails on IO errors, header/type/payload errors, and payloads whose
    /// declared length exceeds [`MAX_MESSAGE_SIZE`](crate::MAX_MESSAGE_SIZE).
    pub fn read_message(&mut self) -> ProtocolResult<Option<Message>> {
        let mut header_buf = [0u8; HEADER_LENGTH];
        match self.reader.read_exact(&mut header_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let header = read_header(&header_buf)?;
        let msg_type = MsgType::from_wire(header.msg_type)?;
        if header.msg_len > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: header.msg_len,
                max: MAX_MESSAGE_SIZE,
            });
        }

        let mut payload = vec![0u8; header.msg_len as usize];
        self.reader.read_exact(&mut payload)?;

        let root: Value = serde_json::from_slice(&payload)?;
        registry::read(msg_type, &root).map(Some)
    }

    /// Unwraps this reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Writes whole frames to a byte stream.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: Write> FrameWriter<W> {
    /// Creates a new writer wrapping `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encodes and writes a single frame.
    pub fn write_message(&mut self, msg: &Message) -> ProtocolResult<()> {
        let data = write_message(msg)?;
        self.writer.write_all(&data)?;
        Ok(())
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> ProtocolResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Unwraps this writer, returning the underlying stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{message_new, AttrValue};
    use callwatch_core::{CallField, CallerInfo, MultipartStage};
    use std::io::Cursor;

    #[test]
    fn header_roundtrip_is_exact() {
        for (msg_type, msg_len) in [(0u32, 0u32), (12, 2), (3, u32::MAX), (7, 0xdead_beef)] {
            let header = MsgHeader { msg_type, msg_len };
            let mut buf = [0u8; HEADER_LENGTH];
            assert_eq!(write_header(&mut buf, &header).unwrap(), HEADER_LENGTH);
            assert_eq!(read_header(&buf).unwrap(), header);
        }
    }

    #[test]
    fn header_fields_sit_at_fixed_offsets() {
        let header = MsgHeader {
            msg_type: 8,
            msg_len: 0x0102_0304,
        };
        let mut buf = [0u8; HEADER_LENGTH];
        write_header(&mut buf, &header).unwrap();
        assert_eq!(&buf[..6], b"ci-msg");
        assert_eq!(&buf[6..10], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&buf[10..14], &[8, 0, 0, 0]);
    }

    #[test]
    fn write_header_refuses_short_buffer() {
        let header = MsgHeader {
            msg_type: 0,
            msg_len: 0,
        };
        let mut buf = [0u8; HEADER_LENGTH - 1];
        assert!(matches!(
            write_header(&mut buf, &header),
            Err(ProtocolError::IncompleteMessage { .. })
        ));
    }

    #[test]
    fn bad_magic_is_malformed() {
        let mut buf = [0u8; HEADER_LENGTH];
        write_header(
            &mut buf,
            &MsgHeader {
                msg_type: 0,
                msg_len: 0,
            },
        )
        .unwrap();
        buf[0] = b'x';
        assert!(matches!(
            read_header(&buf),
            Err(ProtocolError::MalformedHeader)
        ));
        assert!(matches!(
            read_header(&buf[..4]),
            Err(ProtocolError::MalformedHeader)
        ));
    }

    #[test]
    fn unknown_type_rejected_before_payload() {
        for id in [MsgType::INVALID_ID, MsgType::COUNT, MsgType::COUNT + 100] {
            let mut frame = vec![0u8; HEADER_LENGTH + 2];
            write_header(
                &mut frame,
                &MsgHeader {
                    msg_type: id,
                    msg_len: 2,
                },
            )
            .unwrap();
            frame[HEADER_LENGTH..].copy_from_slice(b"{}");
            assert!(matches!(
                read_message(&frame),
                Err(ProtocolError::UnknownType(got)) if got == id
            ));
        }
    }

    #[test]
    fn truncated_payload_is_incomplete() {
        let mut frame = vec![0u8; HEADER_LENGTH + 2];
        write_header(
            &mut frame,
            &MsgHeader {
                msg_type: 0,
                msg_len: 100,
            },
        )
        .unwrap();
        assert!(matches!(
            read_message(&frame),
            Err(ProtocolError::IncompleteMessage { expected, .. }) if expected == HEADER_LENGTH + 100
        ));
    }

    #[test]
    fn garbage_payload_is_a_parse_failure() {
        let mut frame = vec![0u8; HEADER_LENGTH + 3];
        write_header(
            &mut frame,
            &MsgHeader {
                msg_type: 0,
                msg_len: 3,
            },
        )
        .unwrap();
        frame[HEADER_LENGTH..].copy_from_slice(b"{{{");
        assert!(matches!(
            read_message(&frame),
            Err(ProtocolError::PayloadParse(_))
        ));
    }

    #[test]
    fn version_frame_roundtrip_with_exact_length() {
        let msg = message_new(
            MsgType::Version,
            &[
                ("major", AttrValue::Int(3)),
                ("minor", AttrValue::Int(0)),
                ("patch", AttrValue::Int(0)),
                ("human_readable", AttrValue::from("3.0.0 (branch master)")),
            ],
        );
        let bytes = write_message(&msg).unwrap();

        let expected_payload =
            r#"{"major":3,"minor":0,"patch":0,"human_readable":"3.0.0 (branch master)"}"#;
        let header = read_header(&bytes).unwrap();
        assert_eq!(header.msg_len as usize, expected_payload.len());
        assert_eq!(&bytes[HEADER_LENGTH..], expected_payload.as_bytes());

        let decoded = read_message(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn payload_less_frame_is_exactly_empty_object() {
        for msg_type in [
            MsgType::EventConnect,
            MsgType::EventDisconnect,
            MsgType::Leave,
            MsgType::Shutdown,
        ] {
            let bytes = write_message(&registry::alloc(msg_type)).unwrap();
            assert_eq!(bytes.len(), HEADER_LENGTH + 2);
            assert_eq!(&bytes[HEADER_LENGTH..], b"{}");
            let decoded = read_message(&bytes).unwrap();
            assert_eq!(decoded.msg_type(), msg_type);
        }
    }

    #[test]
    fn ring_roundtrip_keeps_presence_and_multipart() {
        let msg = message_new(
            MsgType::EventRing,
            &[
                ("guid", AttrValue::Int(11)),
                ("stage", AttrValue::Int(1)),
                ("part", AttrValue::Int(2)),
                ("msgid", AttrValue::from("20130301193137R")),
                ("completenumber", AttrValue::from("03720980504")),
                ("name", AttrValue::from("Frank Langenau")),
                ("name", AttrValue::None),
            ],
        );
        let decoded = read_message(&write_message(&msg).unwrap()).unwrap();
        match decoded {
            Message::EventRing(ring) => {
                assert_eq!(ring.guid, 11);
                assert_eq!(ring.multipart.stage, MultipartStage::Update);
                assert_eq!(ring.multipart.part, 2);
                assert_eq!(ring.multipart.msgid(), "20130301193137R");
                assert!(ring.call.fields().contains(CallField::CompleteNumber));
                assert!(!ring.call.fields().contains(CallField::Name));
                assert_eq!(
                    ring.call.get(CallField::CompleteNumber),
                    Some("03720980504")
                );
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn call_list_roundtrip_preserves_order_and_values() {
        let mut list = crate::types::DbCallList {
            guid: 5,
            user: 1,
            offset: 0,
            count: 2,
            calls: Vec::new(),
        };
        let mut first = callwatch_core::CallInfo::new();
        first.id = 10;
        first.set(CallField::CompleteNumber, Some("03720980504"));
        first.set(CallField::Name, Some("Frank Langenau"));
        let mut second = callwatch_core::CallInfo::new();
        second.id = 11;
        second.set(CallField::CompleteNumber, Some("01234567890"));
        list.calls.push(first.clone());
        list.calls.push(second.clone());

        let msg = Message::DbCallList(list);
        let decoded = read_message(&write_message(&msg).unwrap()).unwrap();
        match decoded {
            Message::DbCallList(m) => {
                assert_eq!(m.guid, 5);
                assert_eq!(m.calls, vec![first, second]);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn every_registered_type_roundtrips() {
        for msg_type in MsgType::ALL {
            let msg = registry::alloc(msg_type);
            let decoded = read_message(&write_message(&msg).unwrap()).unwrap();
            assert_eq!(decoded.msg_type(), msg_type);
        }
    }

    #[test]
    fn frame_reader_streams_multiple_messages() {
        let first = message_new(MsgType::DbNumCalls, &[("count", AttrValue::Int(3))]);
        let mut second = crate::types::DbGetCallerList::default();
        second.filter = Some("Frank".to_owned());
        second.callers.push(CallerInfo::with("03720980504", "Frank Langenau"));
        let second = Message::DbGetCallerList(second);

        let mut buffer = Vec::new();
        {
            let mut writer = FrameWriter::new(&mut buffer);
            writer.write_message(&first).unwrap();
            writer.write_message(&second).unwrap();
            writer.flush().unwrap();
        }

        let mut reader = FrameReader::new(Cursor::new(buffer));
        assert_eq!(reader.read_message().unwrap(), Some(first));
        assert_eq!(reader.read_message().unwrap(), Some(second));
        assert_eq!(reader.read_message().unwrap(), None);
    }

    #[test]
    fn frame_reader_empty_stream_is_eof() {
        let mut reader = FrameReader::new(Cursor::new(Vec::new()));
        assert!(reader.read_message().unwrap().is_none());
    }

    #[test]
    fn frame_reader_rejects_oversized_declared_length() {
        let mut frame = vec![0u8; HEADER_LENGTH];
        write_header(
            &mut frame,
            &MsgHeader {
                msg_type: 0,
                msg_len: MAX_MESSAGE_SIZE + 1,
            },
        )
        .unwrap();
        let mut reader = FrameReader::new(Cursor::new(frame));
        assert!(matches!(
            reader.read_message(),
            Err(ProtocolError::MessageTooLarge { .. })
        ));
    }
}

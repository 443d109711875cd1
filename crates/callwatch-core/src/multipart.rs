//! Multipart (staged) event metadata.
//!
//! A ring event evolves while the call is still in progress: the producer
//! first announces it (`Init`), refines it as lookups complete (`Update`) and
//! finally seals it (`Complete`). All stages of one logical event carry the
//! same `msgid`, which is the key a receiver correlates them by. The codec
//! itself keeps no cross-message state; it only round-trips these fields.

/// Maximum number of characters stored in a message id.
///
/// Longer input is silently truncated on write.
pub const MSGID_MAX_LEN: usize = 15;

/// Stage of a multipart message sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MultipartStage {
    /// First message of the sequence.
    #[default]
    Init,
    /// Intermediate refinement.
    Update,
    /// Final message of the sequence.
    Complete,
}

impl MultipartStage {
    /// The integer value used on the wire.
    pub fn wire_id(self) -> i64 {
        match self {
            MultipartStage::Init => 0,
            MultipartStage::Update => 1,
            MultipartStage::Complete => 2,
        }
    }

    /// Maps a wire integer back to a stage.
    ///
    /// Out-of-range values fall back to `Init`, the zero default.
    pub fn from_wire(value: i64) -> Self {
        match value {
            1 => MultipartStage::Update,
            2 => MultipartStage::Complete,
            _ => MultipartStage::Init,
        }
    }
}

/// Sequencing metadata embedded in staged event messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multipart {
    /// Stage this particular message belongs to.
    pub stage: MultipartStage,
    /// Consecutive part number. Round-tripped, not interpreted.
    pub part: i32,
    msgid: String,
}

impl Multipart {
    /// Creates metadata for the first stage of a new sequence.
    pub fn init(msgid: &str) -> Self {
        let mut mp = Multipart::default();
        mp.set_msgid(msgid);
        mp
    }

    /// The application-defined message id correlating all stages.
    pub fn msgid(&self) -> &str {
        &self.msgid
    }

    /// Stores a message id, truncated to [`MSGID_MAX_LEN`] characters.
    pub fn set_msgid(&mut self, msgid: &str) {
        self.msgid = msgid.chars().take(MSGID_MAX_LEN).collect();
    }
}

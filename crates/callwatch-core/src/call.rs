//! Call detail and caller directory records.
//!
//! [`CallInfo`] carries everything the monitor knows about a single call:
//! a database id plus nine optional text fields. Which optional fields
//! currently hold a value is tracked in a [`CallFields`] presence mask, kept
//! in sync by the only mutation path, [`CallInfo::set`]. [`CallerInfo`] is the
//! simpler directory entry (number and name), where absence is just `None`.

use std::fmt;

/// Key for one of the nine optional text fields of a [`CallInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallField {
    /// Complete number including the area code.
    CompleteNumber,
    /// Area code obtained from the number.
    AreaCode,
    /// Number without the area code.
    Number,
    /// Date of the call.
    Date,
    /// Time of the call.
    Time,
    /// Multiple subscriber number the call came in on.
    Msn,
    /// Alias configured for the msn.
    Alias,
    /// Area the number belongs to.
    Area,
    /// Name of the caller.
    Name,
}

impl CallField {
    /// All fields, in wire/flag-bit order.
    pub const ALL: [CallField; 9] = [
        CallField::CompleteNumber,
        CallField::AreaCode,
        CallField::Number,
        CallField::Date,
        CallField::Time,
        CallField::Msn,
        CallField::Alias,
        CallField::Area,
        CallField::Name,
    ];

    /// The member name used on the wire and in attribute lists.
    pub fn wire_name(self) -> &'static str {
        match self {
            CallField::CompleteNumber => "completenumber",
            CallField::AreaCode => "areacode",
            CallField::Number => "number",
            CallField::Date => "date",
            CallField::Time => "time",
            CallField::Msn => "msn",
            CallField::Alias => "alias",
            CallField::Area => "area",
            CallField::Name => "name",
        }
    }

    /// Looks a field up by its wire name.
    pub fn from_wire_name(name: &str) -> Option<CallField> {
        CallField::ALL
            .into_iter()
            .find(|f| f.wire_name() == name)
    }

    /// The presence flag bit for this field.
    pub fn flag(self) -> CallFields {
        CallFields(1 << self as u32)
    }
}

/// Presence mask recording which optional [`CallInfo`] fields hold a value.
///
/// Bit layout matches the field order in [`CallField::ALL`]: bit 0 is
/// `completenumber`, bit 8 is `name`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallFields(u32);

impl CallFields {
    /// The empty mask.
    pub const fn empty() -> Self {
        CallFields(0)
    }

    /// Returns true if no field is marked present.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if `field`'s bit is set.
    pub fn contains(self, field: CallField) -> bool {
        self.0 & field.flag().0 != 0
    }

    /// Sets `field`'s bit.
    pub fn insert(&mut self, field: CallField) {
        self.0 |= field.flag().0;
    }

    /// Clears `field`'s bit.
    pub fn remove(&mut self, field: CallField) {
        self.0 &= !field.flag().0;
    }

    /// The raw bit pattern.
    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Detailed information about a single call.
///
/// The optional text fields are only reachable through [`set`](Self::set) and
/// [`get`](Self::get) so the presence mask can never drift from the stored
/// text: a bit is set exactly when the field holds a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallInfo {
    /// Index of this call in the database, when known.
    pub id: i32,
    completenumber: Option<String>,
    areacode: Option<String>,
    number: Option<String>,
    date: Option<String>,
    time: Option<String>,
    msn: Option<String>,
    alias: Option<String>,
    area: Option<String>,
    name: Option<String>,
    fields: CallFields,
}

impl CallInfo {
    /// Creates an empty record: id 0, no fields present.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, field: CallField) -> &mut Option<String> {
        match field {
            CallField::CompleteNumber => &mut self.completenumber,
            CallField::AreaCode => &mut self.areacode,
            CallField::Number => &mut self.number,
            CallField::Date => &mut self.date,
            CallField::Time => &mut self.time,
            CallField::Msn => &mut self.msn,
            CallField::Alias => &mut self.alias,
            CallField::Area => &mut self.area,
            CallField::Name => &mut self.name,
        }
    }

    /// Sets or clears an optional field.
    ///
    /// A `Some` value is copied into owned storage and the field's presence
    /// bit is set; `None` drops any held text and clears the bit.
    pub fn set(&mut self, field: CallField, value: Option<&str>) {
        match value {
            Some(text) => {
                *self.slot(field) = Some(text.to_owned());
                self.fields.insert(field);
            }
            None => {
                *self.slot(field) = None;
                self.fields.remove(field);
            }
        }
    }

    /// Returns the field's text if present.
    pub fn get(&self, field: CallField) -> Option<&str> {
        let slot = match field {
            CallField::CompleteNumber => &self.completenumber,
            CallField::AreaCode => &self.areacode,
            CallField::Number => &self.number,
            CallField::Date => &self.date,
            CallField::Time => &self.time,
            CallField::Msn => &self.msn,
            CallField::Alias => &self.alias,
            CallField::Area => &self.area,
            CallField::Name => &self.name,
        };
        slot.as_deref()
    }

    /// The current presence mask.
    pub fn fields(&self) -> CallFields {
        self.fields
    }
}

impl fmt::Display for CallInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = self
            .get(CallField::CompleteNumber)
            .unwrap_or("<unknown number>");
        match self.get(CallField::Name) {
            Some(name) => write!(f, "{name} ({number})"),
            None => write!(f, "{number}"),
        }
    }
}

/// Directory entry for a known caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerInfo {
    /// Number including the area code.
    pub number: Option<String>,
    /// Display name of the caller.
    pub name: Option<String>,
}

impl CallerInfo {
    /// Creates an empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entry with both fields set.
    pub fn with(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            number: Some(number.into()),
            name: Some(name.into()),
        }
    }
}

// Licensed under the Apache-2.0 license

//! Typed row schema for the register table.
//!
//! The concrete tabular source (worksheet, CSV, ...) is owned by the caller;
//! it converts each raw row into a [`RegisterRow`] at the ingestion boundary
//! so the model builder never sees positional cells.

/// One data row of the register table.
///
/// A row with a populated `offset` starts a new register; a row with only
/// the bit-range columns populated appends a field to the current register.
/// Empty cells are `None`.
#[derive(Clone, Debug, Default)]
pub struct RegisterRow {
    /// Offset-expression column (`0x004` or `0x010 + idx*0x4`).
    pub offset: Option<String>,
    /// Register-name column.
    pub name: Option<String>,
    /// Bit-range column (`3` or `7:4`).
    pub bits: Option<String>,
    /// Field-name column.
    pub field: Option<String>,
    /// Access-kind column (`RW`, `W1P`, `W1C`, `RO`).
    pub access: Option<String>,
    /// Default-value column, kept verbatim.
    pub default: Option<String>,
}

impl RegisterRow {
    /// True when every cell is empty. Such rows are ignored by the builder,
    /// so trailing blank rows after the last register are harmless.
    pub fn is_blank(&self) -> bool {
        self.offset.is_none()
            && self.name.is_none()
            && self.bits.is_none()
            && self.field.is_none()
            && self.access.is_none()
            && self.default.is_none()
    }

    /// True for the literal `offset` marker row that separates the header
    /// rows from the data rows.
    pub fn is_marker(&self) -> bool {
        self.offset.as_deref() == Some("offset")
    }
}

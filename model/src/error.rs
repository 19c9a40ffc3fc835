// Licensed under the Apache-2.0 license

//! Error taxonomy for register-map construction.
//!
//! A [`FormatError`] means a cell did not match its grammar; a
//! [`ValidationError`] means the cells parsed but the map is inconsistent.
//! Both abort the run: a malformed register map cannot safely yield a usable
//! hardware description, so no partial artifact is ever produced. The only
//! recoverable condition is an out-of-range offset, which is logged and
//! drops the offending register (see [`crate::builder`]).

use thiserror::Error;

/// A cell that does not match the fixed grammar for its column.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// Offset expression does not match `BASE_HEX ( '+' VAR '*' STEP_HEX )?`.
    #[error("invalid offset expression: {0}")]
    Offset(String),

    /// Bit range is neither a bare bit index nor `msb:lsb`.
    #[error("format bits error: {0}")]
    BitRange(String),

    /// Variable range is not of the form `low~high`.
    #[error("invalid variable range: {0}")]
    VarRange(String),

    /// Module size is neither `<n>KB`, `<n>B`, nor a bare hex value.
    #[error("invalid module size: {0}")]
    Size(String),
}

/// A structurally parsed map that violates a model invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate offset found: 0x{0:x}")]
    DuplicateOffset(u64),

    #[error("duplicate register name found: {0}")]
    DuplicateRegister(String),

    #[error("duplicate field name found: {0}")]
    DuplicateField(String),

    #[error("register name not found for offset 0x{0:x}")]
    MissingRegisterName(u64),

    /// A field row with one of bits/name/access/default left empty.
    #[error("required column `{0}` is missing in a field row")]
    MissingColumn(&'static str),

    #[error("invalid sw_access value: {0}")]
    UnknownAccess(String),

    #[error("variable `{0}` not found in variable ranges")]
    UnresolvedVariable(String),

    #[error("module header field `{0}` is missing")]
    MissingHeader(&'static str),

    /// The register table did not start with the literal `offset` marker row.
    #[error("invalid register description format: `offset` marker row not found")]
    MissingMarker,

    /// A field row appeared before any register row.
    #[error("field row `{0}` appeared before the first register")]
    FieldBeforeRegister(String),
}

/// Any fatal condition raised while building a register map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

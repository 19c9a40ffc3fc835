// Licensed under the Apache-2.0 license

//! Core data types for the register-map model.
//!
//! A [`RegisterMap`] is built once by [`crate::builder::MapBuilder`], frozen,
//! and only read by the expansion and emission stages.
//!
//! ```text
//! RegisterMap
//! ├── info: ModuleInfo            # module identity and bus parameters
//! └── registers: Vec<Register>    # in declaration order
//!     ├── var: Option<VarSpan>    # present for indexed register arrays
//!     └── fields: Vec<Field>      # in declaration order
//! ```

use crate::error::{FormatError, ModelError, ValidationError};
use std::fmt;

/// Module identity and bus parameters, built once from the header rows.
#[derive(Clone, Debug)]
pub struct ModuleInfo {
    /// Module (and generated Verilog module) name.
    pub name: String,
    /// Owner recorded in the generated header comment.
    pub owner: String,
    /// Module window size in bytes.
    pub size_bytes: u64,
    /// Base address, kept verbatim for the header comment (e.g. `32'h0000`).
    pub base_addr: String,
    /// Width of the register address bus in bits.
    pub addr_width: u32,
    /// Data bus width in bits. The bus contract is 32-bit; this is recorded
    /// for the header comment only.
    pub data_width: u32,
    /// Bus-interface kind recorded in the header comment.
    pub interface: String,
}

impl ModuleInfo {
    /// Build module info from `key,value` header rows.
    ///
    /// `module` is required; every other key carries the same default the
    /// original register descriptions relied on.
    pub fn from_rows(rows: &[(String, String)]) -> Result<ModuleInfo, ModelError> {
        let get = |key: &str| {
            rows.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.trim().to_string())
        };
        let name = get("module").ok_or(ValidationError::MissingHeader("module"))?;
        let size = get("size").unwrap_or_else(|| "0".to_string());
        let size_bytes = parse_size(&size)?;
        Ok(ModuleInfo {
            name,
            owner: get("owner").unwrap_or_else(|| "unknown".to_string()),
            size_bytes,
            base_addr: get("base_addr").unwrap_or_else(|| "32'h0000".to_string()),
            addr_width: get("addr_width")
                .and_then(|s| s.parse().ok())
                .unwrap_or(12),
            data_width: get("data_width")
                .and_then(|s| s.parse().ok())
                .unwrap_or(32),
            interface: get("cfg_interface").unwrap_or_else(|| "regbus".to_string()),
        })
    }
}

/// Normalize a byte-size cell: `4KB` is decimal kilobytes, `256B` is decimal
/// bytes, and a bare value is hexadecimal.
pub fn parse_size(s: &str) -> Result<u64, FormatError> {
    let s = s.trim();
    let err = || FormatError::Size(s.to_string());
    if let Some(kb) = s.strip_suffix("KB") {
        kb.trim().parse::<u64>().map(|n| n * 1024).map_err(|_| err())
    } else if let Some(b) = s.strip_suffix('B') {
        b.trim().parse::<u64>().map_err(|_| err())
    } else {
        u64::from_str_radix(s, 16).map_err(|_| err())
    }
}

/// Parse an inclusive variable index range of the form `low~high`.
pub fn parse_var_range(s: &str) -> Result<(u32, u32), FormatError> {
    let err = || FormatError::VarRange(s.to_string());
    let (low, high) = s.trim().split_once('~').ok_or_else(err)?;
    let low = low.trim().parse::<u32>().map_err(|_| err())?;
    let high = high.trim().parse::<u32>().map_err(|_| err())?;
    Ok((low, high))
}

/// Software access discipline of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    /// Read-write with byte-lane merge on write.
    Rw,
    /// Write-one-pulse: transient, reads back as zero.
    W1p,
    /// Write-one-clear: software clears bits written as 1, hardware can
    /// override via the `_hw_en`/`_hw_val` port pair.
    W1c,
    /// Read-only: a pure input signal.
    Ro,
}

impl AccessKind {
    /// Parse an access-kind token, case-insensitively.
    pub fn parse(token: &str) -> Result<AccessKind, ValidationError> {
        match token.trim().to_ascii_uppercase().as_str() {
            "RW" => Ok(AccessKind::Rw),
            "W1P" => Ok(AccessKind::W1p),
            "W1C" => Ok(AccessKind::W1c),
            "RO" => Ok(AccessKind::Ro),
            _ => Err(ValidationError::UnknownAccess(token.to_string())),
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessKind::Rw => "RW",
            AccessKind::W1p => "W1P",
            AccessKind::W1c => "W1C",
            AccessKind::Ro => "RO",
        })
    }
}

/// A bit position or range within the 32-bit register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitRange {
    /// A single bit, e.g. `3`.
    Single(u32),
    /// A range `msb:lsb`, e.g. `7:4`.
    Range { msb: u32, lsb: u32 },
}

impl BitRange {
    /// Parse a bit-range cell: either a bare bit index or `msb:lsb`.
    pub fn parse(s: &str) -> Result<BitRange, FormatError> {
        let err = || FormatError::BitRange(s.to_string());
        let s = s.trim();
        match s.split_once(':') {
            None => Ok(BitRange::Single(s.parse().map_err(|_| err())?)),
            Some((msb, lsb)) => Ok(BitRange::Range {
                msb: msb.trim().parse().map_err(|_| err())?,
                lsb: lsb.trim().parse().map_err(|_| err())?,
            }),
        }
    }

    /// Derived width in bits; always >= 1.
    pub fn width(&self) -> u32 {
        match *self {
            BitRange::Single(_) => 1,
            BitRange::Range { msb, lsb } => msb.abs_diff(lsb) + 1,
        }
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BitRange::Single(bit) => write!(f, "{bit}"),
            BitRange::Range { msb, lsb } => write!(f, "{msb}:{lsb}"),
        }
    }
}

/// A named, bit-addressed subrange of a register.
#[derive(Clone, Debug)]
pub struct Field {
    pub bits: BitRange,
    pub name: String,
    pub access: AccessKind,
    /// Default value cell, kept verbatim (e.g. `4'h0`).
    pub default: String,
}

impl Field {
    pub fn width(&self) -> u32 {
        self.bits.width()
    }
}

/// Index parameterization of a variable register.
#[derive(Clone, Debug)]
pub struct VarSpan {
    /// Declared variable name (e.g. `idx`).
    pub name: String,
    /// Byte step between consecutive indices.
    pub step: u64,
    /// Inclusive maximum index.
    pub max_index: u32,
}

/// Derived access class of a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Every field is RO; no write-enable decode is generated.
    ReadOnly,
    Writable,
}

/// An addressable 32-bit storage location on the bus.
#[derive(Clone, Debug)]
pub struct Register {
    /// Canonical byte offset within the module window.
    pub offset: u64,
    /// Present only for index-parameterized register arrays.
    pub var: Option<VarSpan>,
    pub name: String,
    pub fields: Vec<Field>,
    pub access: RegisterAccess,
}

impl Register {
    pub fn is_writable(&self) -> bool {
        self.access == RegisterAccess::Writable
    }
}

/// The finalized, immutable register-map model.
#[derive(Clone, Debug)]
pub struct RegisterMap {
    pub info: ModuleInfo,
    pub registers: Vec<Register>,
    /// Number of registers dropped by the soft size-bound check.
    pub dropped: usize,
}

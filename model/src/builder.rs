// Licensed under the Apache-2.0 license

//! Register-map construction from typed rows.
//!
//! [`MapBuilder`] consumes the register table row by row and produces a
//! frozen [`RegisterMap`]. The scan is an explicit state machine instead of
//! a mutated cursor:
//!
//! ```text
//! AwaitingMarker --"offset" row--> Idle
//! Idle/Building/Discarding --offset row--> Building   (finalizes pending)
//! Idle/Building/Discarding --offset row out of range--> Discarding
//! Building --field row--> Building                    (appends field)
//! Discarding --field row--> Discarding                (row dropped)
//! finish()                                            (finalizes pending)
//! ```
//!
//! Validation order is fixed so diagnostics are reproducible: offset
//! grammar, size bound (soft), duplicate offset, variable resolution,
//! register-name presence and uniqueness, required columns, bit-range
//! grammar, field-name uniqueness, access kind.

use crate::error::{ModelError, ValidationError};
use crate::expr::parse_offset_expr;
use crate::model::{
    parse_var_range, AccessKind, BitRange, Field, ModuleInfo, Register, RegisterAccess,
    RegisterMap, VarSpan,
};
use crate::schema::RegisterRow;
use log::warn;
use std::collections::{HashMap, HashSet};

/// Build the variable-range table from `name,low~high` rows.
pub fn var_ranges_from_rows(
    rows: &[(String, String)],
) -> Result<HashMap<String, u32>, ModelError> {
    let mut ranges = HashMap::new();
    for (name, range) in rows {
        let (_, max) = parse_var_range(range)?;
        ranges.insert(name.trim().to_string(), max);
    }
    Ok(ranges)
}

/// Uniqueness sets and accumulated diagnostics for one building pass.
#[derive(Default)]
struct ValidationContext {
    offsets: HashSet<u64>,
    reg_names: HashSet<String>,
    field_names: HashSet<String>,
    dropped: usize,
}

/// A register currently being assembled.
struct PendingRegister {
    offset: u64,
    var: Option<VarSpan>,
    name: String,
    fields: Vec<Field>,
}

enum ScanState {
    /// Before the literal `offset` marker row.
    AwaitingMarker,
    /// Marker seen, no register opened yet.
    Idle,
    Building(PendingRegister),
    /// The last offset row was dropped by the size-bound check; its field
    /// rows are dropped with it.
    Discarding,
}

/// Builds a validated [`RegisterMap`] from ordered register-table rows.
pub struct MapBuilder {
    info: ModuleInfo,
    var_ranges: HashMap<String, u32>,
    state: ScanState,
    ctx: ValidationContext,
    registers: Vec<Register>,
}

impl MapBuilder {
    pub fn new(info: ModuleInfo, var_ranges: HashMap<String, u32>) -> MapBuilder {
        MapBuilder {
            info,
            var_ranges,
            state: ScanState::AwaitingMarker,
            ctx: ValidationContext::default(),
            registers: Vec::new(),
        }
    }

    /// Consume one row. The first row must be the `offset` marker.
    pub fn push_row(&mut self, row: &RegisterRow) -> Result<(), ModelError> {
        if matches!(self.state, ScanState::AwaitingMarker) {
            if row.is_marker() {
                self.state = ScanState::Idle;
                return Ok(());
            }
            return Err(ValidationError::MissingMarker.into());
        }
        if row.is_blank() {
            return Ok(());
        }
        if row.offset.is_some() {
            self.open_register(row)
        } else if row.bits.is_some() {
            self.append_field(row)
        } else {
            // A row with neither an offset nor a bit range carries nothing.
            Ok(())
        }
    }

    /// Finalize the pass and freeze the model.
    pub fn finish(mut self) -> RegisterMap {
        self.finalize_pending();
        RegisterMap {
            info: self.info,
            registers: self.registers,
            dropped: self.ctx.dropped,
        }
    }

    fn finalize_pending(&mut self) {
        if let ScanState::Building(pending) =
            std::mem::replace(&mut self.state, ScanState::Idle)
        {
            let all_ro = pending.fields.iter().all(|f| f.access == AccessKind::Ro);
            self.registers.push(Register {
                offset: pending.offset,
                var: pending.var,
                name: pending.name,
                fields: pending.fields,
                access: if all_ro {
                    RegisterAccess::ReadOnly
                } else {
                    RegisterAccess::Writable
                },
            });
        }
    }

    fn open_register(&mut self, row: &RegisterRow) -> Result<(), ModelError> {
        let expr = parse_offset_expr(row.offset.as_deref().unwrap_or_default())?;

        if expr.base > self.info.size_bytes {
            warn!(
                "offset 0x{:x} is greater than module size {}B, skipping register",
                expr.base, self.info.size_bytes
            );
            self.finalize_pending();
            self.ctx.dropped += 1;
            self.state = ScanState::Discarding;
            return Ok(());
        }

        if !self.ctx.offsets.insert(expr.base) {
            return Err(ValidationError::DuplicateOffset(expr.base).into());
        }

        let var = match expr.var {
            None => None,
            Some((name, step)) => {
                let max_index = *self
                    .var_ranges
                    .get(&name)
                    .ok_or_else(|| ValidationError::UnresolvedVariable(name.clone()))?;
                Some(VarSpan {
                    name,
                    step,
                    max_index,
                })
            }
        };

        let name = row
            .name
            .clone()
            .ok_or(ValidationError::MissingRegisterName(expr.base))?;
        if !self.ctx.reg_names.insert(name.clone()) {
            return Err(ValidationError::DuplicateRegister(name).into());
        }

        self.finalize_pending();
        self.state = ScanState::Building(PendingRegister {
            offset: expr.base,
            var,
            name,
            fields: Vec::new(),
        });

        // An offset row may carry the register's first field as well.
        if row.bits.is_some() {
            self.append_field(row)?;
        }
        Ok(())
    }

    fn append_field(&mut self, row: &RegisterRow) -> Result<(), ModelError> {
        let pending = match &mut self.state {
            ScanState::Building(pending) => pending,
            ScanState::Discarding => return Ok(()),
            _ => {
                let what = row.field.clone().or_else(|| row.bits.clone());
                return Err(
                    ValidationError::FieldBeforeRegister(what.unwrap_or_default()).into(),
                );
            }
        };

        let bits_cell = row.bits.as_deref().unwrap_or_default();
        let field_name = row
            .field
            .as_deref()
            .ok_or(ValidationError::MissingColumn("field_name"))?;
        let access_cell = row
            .access
            .as_deref()
            .ok_or(ValidationError::MissingColumn("sw_access"))?;
        let default = row
            .default
            .as_deref()
            .ok_or(ValidationError::MissingColumn("default"))?;

        let bits = BitRange::parse(bits_cell)?;
        if !self.ctx.field_names.insert(field_name.to_string()) {
            return Err(ValidationError::DuplicateField(field_name.to_string()).into());
        }
        let access = AccessKind::parse(access_cell)?;

        pending.fields.push(Field {
            bits,
            name: field_name.to_string(),
            access,
            default: default.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    fn info(size: u64) -> ModuleInfo {
        ModuleInfo {
            name: "tst_reg".to_string(),
            owner: "nobody".to_string(),
            size_bytes: size,
            base_addr: "32'h0000".to_string(),
            addr_width: 12,
            data_width: 32,
            interface: "regbus".to_string(),
        }
    }

    fn reg_row(offset: &str, name: &str) -> RegisterRow {
        RegisterRow {
            offset: Some(offset.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn field_row(bits: &str, name: &str, access: &str, default: &str) -> RegisterRow {
        RegisterRow {
            bits: Some(bits.to_string()),
            field: Some(name.to_string()),
            access: Some(access.to_string()),
            default: Some(default.to_string()),
            ..Default::default()
        }
    }

    fn marker() -> RegisterRow {
        RegisterRow {
            offset: Some("offset".to_string()),
            ..Default::default()
        }
    }

    fn build(rows: &[RegisterRow]) -> Result<RegisterMap, ModelError> {
        build_with_vars(rows, HashMap::new())
    }

    fn build_with_vars(
        rows: &[RegisterRow],
        vars: HashMap<String, u32>,
    ) -> Result<RegisterMap, ModelError> {
        let mut builder = MapBuilder::new(info(0x1000), vars);
        for row in rows {
            builder.push_row(row)?;
        }
        Ok(builder.finish())
    }

    #[test]
    fn builds_two_registers() {
        let map = build(&[
            marker(),
            reg_row("0x000", "ctrl"),
            field_row("0", "enable", "RW", "1'b0"),
            field_row("7:4", "mode", "RW", "4'h0"),
            reg_row("0x004", "status"),
            field_row("3:0", "state", "RO", "4'h0"),
        ])
        .unwrap();

        assert_eq!(map.registers.len(), 2);
        assert_eq!(map.registers[0].name, "ctrl");
        assert_eq!(map.registers[0].fields.len(), 2);
        assert_eq!(map.registers[0].access, RegisterAccess::Writable);
        assert_eq!(map.registers[1].offset, 4);
        assert_eq!(map.registers[1].access, RegisterAccess::ReadOnly);
        assert_eq!(map.dropped, 0);
    }

    #[test]
    fn offset_row_may_carry_first_field() {
        let mut row = reg_row("0x000", "ctrl");
        row.bits = Some("0".to_string());
        row.field = Some("enable".to_string());
        row.access = Some("RW".to_string());
        row.default = Some("1'b0".to_string());

        let map = build(&[marker(), row]).unwrap();
        assert_eq!(map.registers[0].fields.len(), 1);
        assert_eq!(map.registers[0].fields[0].name, "enable");
    }

    #[test]
    fn marker_row_is_required_first() {
        let mut builder = MapBuilder::new(info(0x1000), HashMap::new());
        let err = builder.push_row(&reg_row("0x000", "ctrl")).unwrap_err();
        assert_eq!(
            err,
            ModelError::Validation(ValidationError::MissingMarker)
        );
    }

    #[test]
    fn out_of_range_register_dropped_with_its_fields() {
        let map = build(&[
            marker(),
            reg_row("0x000", "ctrl"),
            field_row("0", "enable", "RW", "1'b0"),
            reg_row("0x2000", "ghost"),
            field_row("0", "ghost_bit", "RW", "1'b0"),
            reg_row("0x004", "status"),
            field_row("0", "ready", "RO", "1'b0"),
        ])
        .unwrap();

        assert_eq!(map.dropped, 1);
        assert_eq!(map.registers.len(), 2);
        assert_eq!(map.registers[0].fields.len(), 1);
        assert!(map.registers.iter().all(|r| r.name != "ghost"));
        // The dropped register's field row must not leak into `ctrl`.
        assert_eq!(map.registers[0].fields[0].name, "enable");
    }

    #[test]
    fn duplicate_offset_rejected() {
        let err = build(&[
            marker(),
            reg_row("0x000", "a"),
            field_row("0", "a0", "RW", "1'b0"),
            reg_row("0x000", "b"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::Validation(ValidationError::DuplicateOffset(0))
        );
    }

    #[test]
    fn duplicate_register_name_rejected() {
        let err = build(&[marker(), reg_row("0x000", "a"), reg_row("0x004", "a")])
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::Validation(ValidationError::DuplicateRegister("a".to_string()))
        );
    }

    #[test]
    fn duplicate_field_name_rejected() {
        let err = build(&[
            marker(),
            reg_row("0x000", "a"),
            field_row("0", "bit", "RW", "1'b0"),
            field_row("1", "bit", "RW", "1'b0"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::Validation(ValidationError::DuplicateField("bit".to_string()))
        );
    }

    #[test]
    fn unknown_access_rejected() {
        let err = build(&[
            marker(),
            reg_row("0x000", "a"),
            field_row("0", "bit", "WO", "1'b0"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::Validation(ValidationError::UnknownAccess("WO".to_string()))
        );
    }

    #[test]
    fn missing_required_column_rejected() {
        let row = RegisterRow {
            bits: Some("0".to_string()),
            field: Some("bit".to_string()),
            access: Some("RW".to_string()),
            default: None,
            ..Default::default()
        };
        let err = build(&[marker(), reg_row("0x000", "a"), row]).unwrap_err();
        assert_eq!(
            err,
            ModelError::Validation(ValidationError::MissingColumn("default"))
        );
    }

    #[test]
    fn bad_bit_range_rejected() {
        let err = build(&[
            marker(),
            reg_row("0x000", "a"),
            field_row("7:4:0", "bit", "RW", "1'b0"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::Format(FormatError::BitRange("7:4:0".to_string()))
        );
    }

    #[test]
    fn unresolved_variable_rejected() {
        let err = build(&[marker(), reg_row("0x010 + idx*0x4", "arr")]).unwrap_err();
        assert_eq!(
            err,
            ModelError::Validation(ValidationError::UnresolvedVariable("idx".to_string()))
        );
    }

    #[test]
    fn variable_register_resolves_range() {
        let vars = HashMap::from([("idx".to_string(), 3)]);
        let map = build_with_vars(
            &[
                marker(),
                reg_row("0x010 + idx*0x4", "arr"),
                field_row("0", "go", "RW", "1'b0"),
            ],
            vars,
        )
        .unwrap();
        let span = map.registers[0].var.as_ref().unwrap();
        assert_eq!(span.name, "idx");
        assert_eq!(span.step, 4);
        assert_eq!(span.max_index, 3);
    }

    #[test]
    fn field_before_register_rejected() {
        let err = build(&[marker(), field_row("0", "stray", "RW", "1'b0")]).unwrap_err();
        assert_eq!(
            err,
            ModelError::Validation(ValidationError::FieldBeforeRegister(
                "stray".to_string()
            ))
        );
    }

    #[test]
    fn trailing_blank_rows_ignored() {
        let map = build(&[
            marker(),
            reg_row("0x000", "ctrl"),
            field_row("0", "enable", "RW", "1'b0"),
            RegisterRow::default(),
            RegisterRow::default(),
        ])
        .unwrap();
        assert_eq!(map.registers.len(), 1);
    }

    #[test]
    fn var_range_rows() {
        let rows = vec![
            ("idx".to_string(), "0~3".to_string()),
            ("ch".to_string(), "0~7".to_string()),
        ];
        let ranges = var_ranges_from_rows(&rows).unwrap();
        assert_eq!(ranges["idx"], 3);
        assert_eq!(ranges["ch"], 7);
        assert!(var_ranges_from_rows(&[("x".to_string(), "bad".to_string())]).is_err());
    }
}

// Licensed under the Apache-2.0 license

//! Parallel expansion of variable registers.
//!
//! In array mode the emitter keeps variable registers as index-parameterized
//! hardware loops. In parallel mode this pass flattens each of them into
//! concrete per-index registers first, so the emitter only ever sees scalar
//! registers. The transform is pure: the input map is untouched and a new
//! one is returned.

use crate::model::{Field, Register, RegisterMap};

/// Flatten every variable register into `max_index + 1` concrete registers.
///
/// Index `i` lands at `base + i * step` and both the register and each of
/// its fields are renamed `"<var><i>_<name>"`; access kinds and defaults are
/// copied unchanged. The resulting list is re-sorted by offset ascending.
pub fn expand_parallel(map: &RegisterMap) -> RegisterMap {
    let mut registers = Vec::with_capacity(map.registers.len());
    for reg in &map.registers {
        match &reg.var {
            None => registers.push(reg.clone()),
            Some(span) => {
                for i in 0..=span.max_index {
                    let prefix = format!("{}{}_", span.name, i);
                    registers.push(Register {
                        offset: reg.offset + u64::from(i) * span.step,
                        var: None,
                        name: format!("{prefix}{}", reg.name),
                        fields: reg
                            .fields
                            .iter()
                            .map(|f| Field {
                                bits: f.bits,
                                name: format!("{prefix}{}", f.name),
                                access: f.access,
                                default: f.default.clone(),
                            })
                            .collect(),
                        access: reg.access,
                    });
                }
            }
        }
    }
    registers.sort_by_key(|r| r.offset);
    RegisterMap {
        info: map.info.clone(),
        registers,
        dropped: map.dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccessKind, BitRange, ModuleInfo, RegisterAccess, VarSpan};

    fn map_with_var() -> RegisterMap {
        RegisterMap {
            info: ModuleInfo {
                name: "tst_reg".to_string(),
                owner: "nobody".to_string(),
                size_bytes: 0x1000,
                base_addr: "32'h0000".to_string(),
                addr_width: 12,
                data_width: 32,
                interface: "regbus".to_string(),
            },
            registers: vec![
                Register {
                    offset: 0x000,
                    var: None,
                    name: "ctrl".to_string(),
                    fields: vec![Field {
                        bits: BitRange::Single(0),
                        name: "enable".to_string(),
                        access: AccessKind::Rw,
                        default: "1'b0".to_string(),
                    }],
                    access: RegisterAccess::Writable,
                },
                Register {
                    offset: 0x010,
                    var: Some(VarSpan {
                        name: "idx".to_string(),
                        step: 4,
                        max_index: 3,
                    }),
                    name: "ch_cfg".to_string(),
                    fields: vec![Field {
                        bits: BitRange::Range { msb: 7, lsb: 4 },
                        name: "mode".to_string(),
                        access: AccessKind::Rw,
                        default: "4'h0".to_string(),
                    }],
                    access: RegisterAccess::Writable,
                },
            ],
            dropped: 0,
        }
    }

    #[test]
    fn expands_to_n_plus_one_registers() {
        let map = map_with_var();
        let expanded = expand_parallel(&map);

        assert_eq!(expanded.registers.len(), 5);
        let offsets: Vec<u64> = expanded.registers.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0x000, 0x010, 0x014, 0x018, 0x01c]);

        let names: Vec<&str> = expanded.registers[1..]
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["idx0_ch_cfg", "idx1_ch_cfg", "idx2_ch_cfg", "idx3_ch_cfg"]
        );
        assert_eq!(expanded.registers[1].fields[0].name, "idx0_mode");
        assert_eq!(expanded.registers[1].fields[0].access, AccessKind::Rw);
        assert_eq!(expanded.registers[1].fields[0].default, "4'h0");
        assert!(expanded.registers.iter().all(|r| r.var.is_none()));
    }

    #[test]
    fn result_is_sorted_by_offset() {
        let mut map = map_with_var();
        map.registers.swap(0, 1);
        let expanded = expand_parallel(&map);
        let offsets: Vec<u64> = expanded.registers.iter().map(|r| r.offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }

    #[test]
    fn expansion_is_pure() {
        let map = map_with_var();
        let _ = expand_parallel(&map);
        assert_eq!(map.registers.len(), 2);
        assert!(map.registers[1].var.is_some());
        assert_eq!(map.registers[1].name, "ch_cfg");
    }
}

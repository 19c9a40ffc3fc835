// Licensed under the Apache-2.0 license

//! Verilog emission for a validated register map.
//!
//! One deterministic pass over the (possibly expanded) model produces the
//! register-file module section by section: header comment, port list,
//! declarations, byte-lane mask, write-enable decode, per-field sequential
//! write logic, read-data multiplexing, and the final read-data stage.
//! Variable registers that were not flattened by parallel expansion come out
//! as `generate` loops indexed over their declared range.
//!
//! The pass cannot fail: every cell that could be malformed was parsed into
//! typed model values before this crate ever sees it.

use regmap_model::{AccessKind, Field, Register, RegisterMap};
use std::fmt::Write;

/// Generate the register-file module, stamping the current local time into
/// the header comment.
pub fn generate_module(map: &RegisterMap, filename: &str) -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    generate_module_at(map, filename, &now)
}

/// Generate the register-file module with a caller-supplied timestamp.
///
/// Output is byte-identical for identical input, mode, and timestamp.
pub fn generate_module_at(map: &RegisterMap, filename: &str, timestamp: &str) -> String {
    let mut out = String::new();
    emit_header(&mut out, map, filename, timestamp);
    emit_ports(&mut out, map);
    emit_declarations(&mut out, map);
    emit_mask(&mut out);
    emit_write_enables(&mut out, map);
    emit_register_logic(&mut out, map);
    emit_read_mux(&mut out, map);
    emit_read_stage(&mut out);
    writeln!(out, "endmodule").unwrap();
    out
}

const BANNER: &str =
    "//============================================================================";

fn emit_header(out: &mut String, map: &RegisterMap, filename: &str, timestamp: &str) {
    let info = &map.info;
    writeln!(out, "// Filename          : {filename}").unwrap();
    writeln!(out, "// Author            : {}", info.owner).unwrap();
    writeln!(out, "// Created           : {timestamp}").unwrap();
    writeln!(
        out,
        "// Description       : This file is auto generated by reggen. Do not edit by hand"
    )
    .unwrap();
    writeln!(out, "//                   : addr_width = {}", info.addr_width).unwrap();
    writeln!(out, "//                   : bus_type   = {}", info.interface).unwrap();
    writeln!(out, "//                   : base_addr  = {}", info.base_addr).unwrap();
    writeln!(out).unwrap();
}

/// `[NN:0]` with the two-digit msb padding the fixed port columns rely on.
fn packed(width: u32) -> String {
    format!("[{:02}:0]", width - 1)
}

fn field_ports(ports: &mut Vec<String>, field: &Field, dims: &str) {
    let name = &field.name;
    let w = field.width();
    match field.access {
        AccessKind::Rw | AccessKind::W1p => {
            if w == 1 {
                ports.push(format!("output reg          {name}{dims},"));
            } else {
                ports.push(format!("output reg  {}  {name}{dims},", packed(w)));
            }
        }
        AccessKind::W1c => {
            ports.push(format!("input               {name}_hw_en{dims},"));
            if w == 1 {
                ports.push(format!("input               {name}_hw_val{dims},"));
                ports.push(format!("output reg          {name}{dims},"));
            } else {
                ports.push(format!("input       {}  {name}_hw_val{dims},", packed(w)));
                ports.push(format!("output reg  {}  {name}{dims},", packed(w)));
            }
        }
        AccessKind::Ro => {
            if w == 1 {
                ports.push(format!("input               {name}{dims},"));
            } else {
                ports.push(format!("input       {}  {name}{dims},", packed(w)));
            }
        }
    }
}

fn emit_ports(out: &mut String, map: &RegisterMap) {
    let aw = map.info.addr_width;
    writeln!(out, "module {} (", map.info.name).unwrap();

    let mut ports = vec![
        "input               clk,".to_string(),
        "input               rst_n,".to_string(),
        format!("input       [{}:0]  reg_addr,", aw - 1),
        "input               wr_en,".to_string(),
        "input               rd_en,".to_string(),
        "input       [3 :0]  wr_msk,".to_string(),
        "input       [31:0]  wr_data,".to_string(),
        "output reg  [31:0]  rd_data,".to_string(),
    ];
    for reg in &map.registers {
        let dims = match &reg.var {
            Some(span) => format!("[{}:0]", span.max_index),
            None => String::new(),
        };
        for field in &reg.fields {
            field_ports(&mut ports, field, &dims);
        }
    }
    if let Some(last) = ports.last_mut() {
        *last = last.trim_end_matches(',').to_string();
    }
    for port in &ports {
        writeln!(out, "{port}").unwrap();
    }
    writeln!(out, ");").unwrap();
    writeln!(out).unwrap();
}

fn emit_declarations(out: &mut String, map: &RegisterMap) {
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "// reg and wire declaration").unwrap();
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "reg  [31:0]    rd_data_nxt;").unwrap();
    writeln!(out, "wire [31:0]    msk;").unwrap();

    for reg in &map.registers {
        match &reg.var {
            Some(span) => {
                writeln!(out, "reg  [31:0]    rd_data_nxt_{};", reg.name).unwrap();
                if reg.is_writable() {
                    writeln!(out, "wire           wr_en_{}[{}:0];", reg.name, span.max_index)
                        .unwrap();
                }
            }
            None => {
                if reg.is_writable() {
                    writeln!(out, "wire           wr_en_{};", reg.name).unwrap();
                }
            }
        }
    }
}

fn emit_mask(out: &mut String) {
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "//main code").unwrap();
    writeln!(out, "{BANNER}").unwrap();
    writeln!(
        out,
        "assign msk = {{{{8{{wr_msk[3]}}}},{{8{{wr_msk[2]}}}},{{8{{wr_msk[1]}}}},{{8{{wr_msk[0]}}}}}};"
    )
    .unwrap();
    writeln!(out).unwrap();
}

fn emit_write_enables(out: &mut String, map: &RegisterMap) {
    let aw = map.info.addr_width;
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "// reg wr_en/rd_en assignment").unwrap();
    writeln!(out, "{BANNER}").unwrap();

    // Align the scalar assigns on the widest left-hand side.
    let max_lhs = map
        .registers
        .iter()
        .filter(|r| r.is_writable())
        .map(|r| match &r.var {
            Some(span) => format!("wr_en_{}[{}]", r.name, span.max_index).len(),
            None => format!("wr_en_{}", r.name).len(),
        })
        .max()
        .unwrap_or(0);

    let mut genvar_declared = false;
    for reg in map.registers.iter().filter(|r| r.is_writable()) {
        match &reg.var {
            Some(span) => {
                if !genvar_declared {
                    writeln!(out).unwrap();
                    writeln!(out, "genvar i;").unwrap();
                    genvar_declared = true;
                }
                writeln!(out, "generate").unwrap();
                writeln!(
                    out,
                    "    for(i = 0; i <= {}; i = i + 1) begin: wr_{}",
                    span.max_index, reg.name
                )
                .unwrap();
                writeln!(
                    out,
                    "        assign wr_en_{}[i]= wr_en & (reg_addr[{}:0] == {}'h{:x} + {}'h{:x} * i );",
                    reg.name,
                    aw - 1,
                    aw,
                    reg.offset,
                    aw,
                    span.step
                )
                .unwrap();
                writeln!(out, "    end").unwrap();
                writeln!(out, "endgenerate").unwrap();
            }
            None => {
                let lhs = format!("wr_en_{}", reg.name);
                writeln!(
                    out,
                    "assign {lhs:<max_lhs$} = wr_en & (reg_addr[{}:0] == {}'h{:x});",
                    aw - 1,
                    aw,
                    reg.offset
                )
                .unwrap();
            }
        }
    }
}

fn field_banner(out: &mut String, map: &RegisterMap, reg: &Register, field: &Field) {
    let aw = map.info.addr_width;
    writeln!(out, "{BANNER}").unwrap();
    writeln!(
        out,
        "// {} addr:{}'h{:x} type:{} bits:[{}] default:{}",
        field.name, aw, reg.offset, field.access, field.bits, field.default
    )
    .unwrap();
    writeln!(out, "{BANNER}").unwrap();
}

fn emit_register_logic(out: &mut String, map: &RegisterMap) {
    writeln!(out).unwrap();
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "// reg write").unwrap();
    writeln!(out, "{BANNER}").unwrap();

    let mut integer_j_declared = false;
    for reg in &map.registers {
        match &reg.var {
            Some(span) => {
                if reg.is_writable() {
                    for field in reg.fields.iter().filter(|f| f.access != AccessKind::Ro) {
                        field_banner(out, map, reg, field);
                        emit_indexed_field_write(out, reg, field, span.max_index);
                    }
                }
                emit_indexed_read(out, map, reg, span, &mut integer_j_declared);
            }
            None => {
                for field in reg.fields.iter().filter(|f| f.access != AccessKind::Ro) {
                    field_banner(out, map, reg, field);
                    emit_scalar_field_write(out, reg, field);
                }
            }
        }
    }
}

fn emit_indexed_field_write(out: &mut String, reg: &Register, field: &Field, max: u32) {
    let f = &field.name;
    let bits = field.bits;
    let w = field.width();
    writeln!(out, "generate").unwrap();
    writeln!(out, "    for(i = 0; i <= {max}; i = i + 1) begin: wr_{f}").unwrap();
    writeln!(out, "        always @(posedge clk or negedge rst_n) begin").unwrap();
    writeln!(out, "            if (!rst_n)").unwrap();
    writeln!(out, "                {f}[i] <= {};", field.default).unwrap();
    writeln!(out, "            else begin").unwrap();
    match field.access {
        AccessKind::Rw => {
            writeln!(out, "                if (wr_en_{}[i] == 1'b1)", reg.name).unwrap();
            if w == 1 {
                writeln!(
                    out,
                    "                    {f}[i] <= ({f}[i] & ~msk[{bits}]) | (wr_data[{bits}] & msk[{bits}]);"
                )
                .unwrap();
            } else {
                writeln!(
                    out,
                    "                    {f}[i][{}:0] <= ({f}[i][{}:0] & ~msk[{bits}]) | (wr_data[{bits}] & msk[{bits}]);",
                    w - 1,
                    w - 1
                )
                .unwrap();
            }
        }
        AccessKind::W1p => {
            writeln!(out, "                if (wr_en_{}[i] == 1'b1)", reg.name).unwrap();
            writeln!(
                out,
                "                    {f}[i] <= wr_data[{bits}] & msk[{bits}];"
            )
            .unwrap();
        }
        AccessKind::W1c => {
            writeln!(out, "                if ({f}_hw_en[i] == 1'b1)").unwrap();
            writeln!(out, "                    {f}[i] <= {f}_hw_val[i];").unwrap();
            writeln!(out, "                else if (wr_en_{}[i] == 1'b1)", reg.name).unwrap();
            writeln!(
                out,
                "                    {f}[i] <= (~wr_data[{bits}] | ~msk[{bits}]) & {f}[i];"
            )
            .unwrap();
        }
        AccessKind::Ro => unreachable!("RO fields have no write logic"),
    }
    writeln!(out, "            end").unwrap();
    writeln!(out, "        end").unwrap();
    writeln!(out, "    end").unwrap();
    writeln!(out, "endgenerate").unwrap();
}

fn emit_scalar_field_write(out: &mut String, reg: &Register, field: &Field) {
    let f = &field.name;
    let bits = field.bits;
    let w = field.width();
    writeln!(out, "always @(posedge clk or negedge rst_n) begin").unwrap();
    writeln!(out, "    if (!rst_n)").unwrap();
    if w == 1 {
        writeln!(out, "        {f} <= {};", field.default).unwrap();
    } else {
        writeln!(out, "        {f}[{}:0] <= {};", w - 1, field.default).unwrap();
    }
    writeln!(out, "    else begin").unwrap();
    match field.access {
        AccessKind::Rw => {
            writeln!(out, "        if (wr_en_{} == 1'b1)", reg.name).unwrap();
            if w == 1 {
                writeln!(
                    out,
                    "            {f} <= ({f} & ~msk[{bits}]) | (wr_data[{bits}] & msk[{bits}]);"
                )
                .unwrap();
            } else {
                writeln!(
                    out,
                    "            {f}[{}:0] <= ({f}[{}:0] & ~msk[{bits}]) | (wr_data[{bits}] & msk[{bits}]);",
                    w - 1,
                    w - 1
                )
                .unwrap();
            }
        }
        AccessKind::W1p => {
            writeln!(out, "        if (wr_en_{} == 1'b1)", reg.name).unwrap();
            writeln!(out, "            {f} <= wr_data[{bits}] & msk[{bits}];").unwrap();
            writeln!(out, "        else").unwrap();
            writeln!(out, "            {f} <= 1'b0;").unwrap();
        }
        AccessKind::W1c => {
            writeln!(out, "        if ({f}_hw_en == 1'b1)").unwrap();
            writeln!(out, "            {f} <= {f}_hw_val;").unwrap();
            writeln!(out, "        else if (wr_en_{} == 1'b1)", reg.name).unwrap();
            writeln!(
                out,
                "            {f} <= (~wr_data[{bits}] | ~msk[{bits}]) & {f};"
            )
            .unwrap();
        }
        AccessKind::Ro => unreachable!("RO fields have no write logic"),
    }
    writeln!(out, "    end").unwrap();
    writeln!(out, "end").unwrap();
    writeln!(out).unwrap();
}

fn emit_indexed_read(
    out: &mut String,
    map: &RegisterMap,
    reg: &Register,
    span: &regmap_model::VarSpan,
    integer_j_declared: &mut bool,
) {
    let aw = map.info.addr_width;
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "// rd_data_nxt_{}", reg.name).unwrap();
    writeln!(out, "{BANNER}").unwrap();
    if !*integer_j_declared {
        writeln!(out, "integer j;").unwrap();
        *integer_j_declared = true;
    }
    writeln!(out, "always @(*) begin").unwrap();
    writeln!(out, "    rd_data_nxt_{}[31:0]  = 32'h0;", reg.name).unwrap();
    writeln!(
        out,
        "    for(j = 0; j <= {}; j = j + 1) begin:rdata_loop_{}",
        span.max_index, reg.name
    )
    .unwrap();
    writeln!(
        out,
        "        if (reg_addr[{}:0] == {}'h{:x} + {}'h{:x} * j) begin",
        aw - 1,
        aw,
        reg.offset,
        aw,
        span.step
    )
    .unwrap();
    for field in &reg.fields {
        writeln!(
            out,
            "            rd_data_nxt_{}[{}] = {}[j][{}:0];",
            reg.name,
            field.bits,
            field.name,
            field.width() - 1
        )
        .unwrap();
    }
    writeln!(out, "        end").unwrap();
    writeln!(out, "    end").unwrap();
    writeln!(out, "end").unwrap();
    writeln!(out).unwrap();
}

fn emit_read_mux(out: &mut String, map: &RegisterMap) {
    let aw = map.info.addr_width;
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "// next read data").unwrap();
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "always @(*) begin").unwrap();
    writeln!(out, "    rd_data_nxt[31:0] = 32'h0;").unwrap();
    writeln!(out, "    case(reg_addr[{}:0])", aw - 1).unwrap();

    for reg in map.registers.iter().filter(|r| r.var.is_none()) {
        writeln!(out, "    {}'h{:x}: begin", aw, reg.offset).unwrap();
        for field in &reg.fields {
            if field.access == AccessKind::W1p {
                // Pulse fields always read back as zero.
                writeln!(
                    out,
                    "        rd_data_nxt[{}] = {}'h0;",
                    field.bits,
                    field.width()
                )
                .unwrap();
            } else if field.width() == 1 {
                writeln!(out, "        rd_data_nxt[{}] = {};", field.bits, field.name)
                    .unwrap();
            } else {
                writeln!(
                    out,
                    "        rd_data_nxt[{}] = {}[{}:0];",
                    field.bits,
                    field.name,
                    field.width() - 1
                )
                .unwrap();
            }
        }
        writeln!(out, "    end").unwrap();
    }

    let var_buses: Vec<String> = map
        .registers
        .iter()
        .filter(|r| r.var.is_some())
        .map(|r| format!("rd_data_nxt_{}", r.name))
        .collect();
    if var_buses.is_empty() {
        writeln!(out, "    default:").unwrap();
        writeln!(out, "        rd_data_nxt = 32'h0;").unwrap();
    } else {
        writeln!(out, "    default:").unwrap();
        writeln!(out, "        rd_data_nxt = {};", var_buses.join(" | ")).unwrap();
    }
    writeln!(out, "    endcase").unwrap();
    writeln!(out, "end").unwrap();
    writeln!(out).unwrap();
}

fn emit_read_stage(out: &mut String) {
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "// read data").unwrap();
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "always @(posedge clk or negedge rst_n) begin").unwrap();
    writeln!(out, "    if (!rst_n)").unwrap();
    writeln!(out, "        rd_data[31:0] <= 32'h0;").unwrap();
    writeln!(out, "    else if(rd_en)").unwrap();
    writeln!(out, "        rd_data[31:0] <= rd_data_nxt[31:0];").unwrap();
    writeln!(out, "end").unwrap();
    writeln!(out).unwrap();
}

// Licensed under the Apache-2.0 license

//! Register-map to Verilog register-file generator.
//!
//! This crate walks a validated [`regmap_model::RegisterMap`] once and emits
//! the synthesizable register-file module for the fixed synchronous bus
//! contract: byte-masked writes, a single read/write port, 32-bit data.
//!
//! ## Usage
//!
//! ```no_run
//! use regmap_generator::generate_module;
//! # fn demo(map: &regmap_model::RegisterMap) {
//! let verilog = generate_module(map, "sys_reg.v");
//! std::fs::write("sys_reg.v", verilog).unwrap();
//! # }
//! ```
//!
//! For byte-stable output (e.g. in tests), use
//! [`generate_module_at`] with a fixed timestamp.

mod verilog;

// Re-export main public API
pub use verilog::{generate_module, generate_module_at};

// Licensed under the Apache-2.0 license

//! Validated register-map model for the register-file generator.
//!
//! This crate turns loosely structured tabular rows into an immutable
//! [`RegisterMap`]: module metadata plus an ordered list of registers and
//! bit-fields, with every invariant checked up front. The concrete tabular
//! source (worksheet, CSV, ...) stays outside; callers convert raw rows into
//! the typed [`schema::RegisterRow`] at the ingestion boundary.
//!
//! ## Usage
//!
//! ```no_run
//! use regmap_model::{expand_parallel, MapBuilder, ModuleInfo, RegisterRow};
//! use std::collections::HashMap;
//!
//! # fn demo(header_rows: Vec<(String, String)>, data_rows: Vec<RegisterRow>)
//! #     -> Result<(), regmap_model::ModelError> {
//! let info = ModuleInfo::from_rows(&header_rows)?;
//! let mut builder = MapBuilder::new(info, HashMap::new());
//! for row in &data_rows {
//!     builder.push_row(row)?;
//! }
//! let map = builder.finish();
//!
//! // Parallel mode flattens variable registers before emission.
//! let flat = expand_parallel(&map);
//! # let _ = flat;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`expr`]: offset-expression grammar (`BASE_HEX ( '+' VAR '*' STEP_HEX )?`)
//! - [`schema`]: typed row schema consumed by the builder
//! - [`model`]: the frozen model types ([`RegisterMap`], [`Register`], [`Field`])
//! - [`builder`]: the validating build pass
//! - [`expand`]: parallel-mode flattening of variable registers
//! - [`error`]: the [`FormatError`]/[`ValidationError`] taxonomy

pub mod builder;
pub mod error;
pub mod expand;
pub mod expr;
pub mod model;
pub mod schema;

// Re-export main public API
pub use builder::{var_ranges_from_rows, MapBuilder};
pub use error::{FormatError, ModelError, ValidationError};
pub use expand::expand_parallel;
pub use expr::{parse_offset_expr, OffsetExpr};
pub use model::{
    AccessKind, BitRange, Field, ModuleInfo, Register, RegisterAccess, RegisterMap, VarSpan,
};
pub use schema::RegisterRow;

// Licensed under the Apache-2.0 license

//! CSV workbook reader.
//!
//! The input file carries the same two logical tables the register maps are
//! maintained in:
//!
//! ```text
//! idx,0~3                      <- Table A: variable ranges
//! ,                            <- terminated by an empty first cell
//! module,sys_reg               <- Table B: module header rows
//! size,4KB
//! offset                       <- literal marker row
//! 0x000,ctrl,0,enable,RW,,1'b0 <- data rows
//! ,,7:4,mode,RW,,4'h0
//! ```
//!
//! Cells are comma-separated and trimmed; cell values themselves contain no
//! commas. Everything here is shape-only: grammar and invariant checks live
//! in `regmap-model`, behind the typed row schema.

use regmap_model::RegisterRow;

/// Module-header keys recognized in Table B, in no particular order.
const HEADER_KEYS: [&str; 7] = [
    "module",
    "owner",
    "size",
    "base_addr",
    "addr_width",
    "data_width",
    "cfg_interface",
];

/// The raw tables of one input file, split but not yet validated.
#[derive(Debug, Default)]
pub struct Workbook {
    /// Table A rows: variable name, range string.
    pub var_rows: Vec<(String, String)>,
    /// Module header rows: key, value.
    pub header_rows: Vec<(String, String)>,
    /// Register-table rows, starting with the marker row.
    pub data_rows: Vec<RegisterRow>,
}

fn cell(cells: &[&str], idx: usize) -> Option<String> {
    cells
        .get(idx)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Split an input file into its tables.
pub fn parse_workbook(text: &str) -> Workbook {
    let mut workbook = Workbook::default();
    let mut lines = text.lines();

    // Table A runs until the first row with an empty first cell.
    for line in lines.by_ref() {
        let cells: Vec<&str> = line.split(',').collect();
        let Some(name) = cell(&cells, 0) else {
            break;
        };
        workbook
            .var_rows
            .push((name, cell(&cells, 1).unwrap_or_default()));
    }

    // Header rows run until the first non-header first cell (the marker).
    let mut pending: Option<Vec<String>> = None;
    for line in lines.by_ref() {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        match cells.first() {
            Some(key) if HEADER_KEYS.contains(key) => {
                workbook.header_rows.push((
                    key.to_string(),
                    cells.get(1).unwrap_or(&"").to_string(),
                ));
            }
            _ => {
                pending = Some(cells.iter().map(|c| c.to_string()).collect());
                break;
            }
        }
    }

    // Everything from the marker row on is register-table data.
    let mut push_data = |cells: &[&str]| {
        workbook.data_rows.push(RegisterRow {
            offset: cell(cells, 0),
            name: cell(cells, 1),
            bits: cell(cells, 2),
            field: cell(cells, 3),
            access: cell(cells, 4),
            // Column 5 is unused in the source tables.
            default: cell(cells, 6),
        });
    };
    if let Some(cells) = pending {
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        push_data(&cells);
    }
    for line in lines {
        let cells: Vec<&str> = line.split(',').collect();
        push_data(&cells);
    }
    workbook
}

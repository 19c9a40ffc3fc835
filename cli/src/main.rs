// Licensed under the Apache-2.0 license

//! `reggen`: generate a Verilog register file from a register-map CSV.

mod reader;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use regmap_generator::generate_module;
use regmap_model::{expand_parallel, var_ranges_from_rows, MapBuilder, ModuleInfo};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Generate a Verilog register file from a register-map description")]
struct Args {
    /// Input register-map description (CSV).
    input: PathBuf,

    /// Output Verilog file name. Defaults to <module>.v.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Flatten variable registers into per-index registers instead of
    /// generate loops.
    #[arg(short, long)]
    parallel: bool,
}

fn main() -> Result<()> {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init();
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let workbook = reader::parse_workbook(&text);

    let mut info = ModuleInfo::from_rows(&workbook.header_rows)?;

    // The module name is expected to match the file it is maintained in.
    let file_name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !file_name.contains(&info.name) {
        let stem = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| info.name.clone());
        warn!(
            "module name `{}` does not match input file `{file_name}`, using `{stem}`",
            info.name
        );
        info.name = stem;
    }

    let var_ranges = var_ranges_from_rows(&workbook.var_rows)?;
    let mut builder = MapBuilder::new(info, var_ranges);
    for row in &workbook.data_rows {
        builder.push_row(row)?;
    }
    let map = builder.finish();
    let map = if args.parallel {
        expand_parallel(&map)
    } else {
        map
    };

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.v", map.info.name)));
    let output_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| output.display().to_string());

    let code = generate_module(&map, &output_name);
    std::fs::write(&output, code)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Successfully generated {}", output.display());
    Ok(())
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use lef_summary::export::{write_layers_csv, write_macros_csv};
use lef_summary::{GrammarOptions, Lef, LefReader};

#[derive(Parser, Debug)]
#[command(name = "lef-summary")]
#[command(about = "Summarize version, units, layers and macros of a LEF file", long_about = None)]
struct Cli {
    /// LEF file to read
    lef: PathBuf,

    /// Write the macro table to this CSV file
    #[arg(long, value_name = "FILE")]
    macros_csv: Option<PathBuf>,

    /// Write the layer table to this CSV file
    #[arg(long, value_name = "FILE")]
    layers_csv: Option<PathBuf>,

    /// Skip unknown top-level statements instead of failing
    #[arg(long)]
    allow_unknown: bool,
}

fn print_summary(lef: &Lef) {
    let or_dash = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());

    println!("VERSION            {}", or_dash(lef.version));
    println!("MANUFACTURINGGRID  {}", or_dash(lef.manufacturing_grid));

    println!("UNITS ({})", lef.units.len());
    for (kind, value) in &lef.units {
        println!("  {kind:<12} {value}");
    }

    println!("LAYERS ({})", lef.layers.len());
    for (name, layer) in &lef.layers {
        let direction = layer
            .direction
            .as_ref()
            .map_or("-", |d| d.as_str());
        println!("  {name:<12} width {:<8} {direction}", or_dash(layer.width));
    }

    println!("MACROS ({})", lef.macros.len());
    for (name, macro_def) in &lef.macros {
        match macro_def.size {
            Some(size) => println!("  {name:<24} {:.3} x {:.3}", size.width, size.height),
            None => println!("  {name:<24} -"),
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = GrammarOptions::default().with_allow_unknown_statements(cli.allow_unknown);
    let lef = LefReader::with_options(options).read(&cli.lef)?;

    print_summary(&lef);

    if let Some(path) = &cli.macros_csv {
        write_macros_csv(&lef, std::fs::File::create(path)?)?;
    }
    if let Some(path) = &cli.layers_csv {
        write_layers_csv(&lef, std::fs::File::create(path)?)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("lef-summary: {e}");
            ExitCode::FAILURE
        }
    }
}

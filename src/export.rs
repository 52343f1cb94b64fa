// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::lef::{Lef, LefLayer, LefMacro};

const MACRO_HEADERS: [&str; 4] = ["Macro", "Width", "Height", "Area"];
const LAYER_HEADERS: [&str; 3] = ["Layer", "Width", "Direction"];

#[derive(Debug, Serialize)]
pub struct MacroCsvRecord<'a> {
    #[serde(rename = "Macro")]
    pub macro_name: &'a str,
    #[serde(rename = "Width")]
    pub width: Option<f64>,
    #[serde(rename = "Height")]
    pub height: Option<f64>,
    #[serde(rename = "Area")]
    pub area: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LayerCsvRecord<'a> {
    #[serde(rename = "Layer")]
    pub layer_name: &'a str,
    #[serde(rename = "Width")]
    pub width: Option<f64>,
    #[serde(rename = "Direction")]
    pub direction: Option<&'a str>,
}

fn macro_to_csv_record<'a>(name: &'a str, macro_def: &LefMacro) -> MacroCsvRecord<'a> {
    MacroCsvRecord {
        macro_name: name,
        width: macro_def.width(),
        height: macro_def.height(),
        area: macro_def.area(),
    }
}

fn layer_to_csv_record<'a>(name: &'a str, layer: &'a LefLayer) -> LayerCsvRecord<'a> {
    LayerCsvRecord {
        layer_name: name,
        width: layer.width,
        direction: layer.direction.as_ref().map(|d| d.as_str()),
    }
}

/// Write one row per macro, in name order. Macros without SIZE get empty cells.
/// The header row is written even when there are no macros.
pub fn write_macros_csv<W: Write>(lef: &Lef, writer: W) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(MACRO_HEADERS)?;
    for (name, macro_def) in &lef.macros {
        writer.serialize(macro_to_csv_record(name, macro_def))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one row per layer, in name order, after the header row.
pub fn write_layers_csv<W: Write>(lef: &Lef, writer: W) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(LAYER_HEADERS)?;
    for (name, layer) in &lef.layers {
        writer.serialize(layer_to_csv_record(name, layer))?;
    }
    writer.flush()?;
    Ok(())
}

/// Export the macro and layer tables to two CSV files
pub fn export_lef_to_csv<P: AsRef<Path>, Q: AsRef<Path>>(
    lef: &Lef,
    macros_path: P,
    layers_path: Q,
) -> Result<(), Box<dyn std::error::Error>> {
    write_macros_csv(lef, File::create(macros_path)?)?;
    write_layers_csv(lef, File::create(layers_path)?)?;
    Ok(())
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! LEF summary data model
//!
//! [`Lef`] is the snapshot built from one parse. It is filled in by the
//! `apply_*` accumulator methods as construct events arrive and handed to the
//! caller once the parse succeeds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod event;
pub mod lef_parser;
pub mod preprocessor;
pub mod reader;
pub mod session;

pub use error::{LefError, LefErrorKind};
pub use event::{LayerEvent, LefEvent, LefUnits, MacroEvent};

/// The eight conversion factors a UNITS block may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Database,
    Capacitance,
    Resistance,
    Time,
    Power,
    Current,
    Voltage,
    Frequency,
}

impl UnitKind {
    pub const ALL: [UnitKind; 8] = [
        UnitKind::Database,
        UnitKind::Capacitance,
        UnitKind::Resistance,
        UnitKind::Time,
        UnitKind::Power,
        UnitKind::Current,
        UnitKind::Voltage,
        UnitKind::Frequency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Database => "database",
            UnitKind::Capacitance => "capacitance",
            UnitKind::Resistance => "resistance",
            UnitKind::Time => "time",
            UnitKind::Power => "power",
            UnitKind::Current => "current",
            UnitKind::Voltage => "voltage",
            UnitKind::Frequency => "frequency",
        }
    }

    /// Map a UNITS statement keyword (`DATABASE`, `TIME`, ...) to its kind.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "DATABASE" => Some(UnitKind::Database),
            "CAPACITANCE" => Some(UnitKind::Capacitance),
            "RESISTANCE" => Some(UnitKind::Resistance),
            "TIME" => Some(UnitKind::Time),
            "POWER" => Some(UnitKind::Power),
            "CURRENT" => Some(UnitKind::Current),
            "VOLTAGE" => Some(UnitKind::Voltage),
            "FREQUENCY" => Some(UnitKind::Frequency),
            _ => None,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Preferred routing direction of a layer.
///
/// Keywords outside the four standard directions are kept verbatim in
/// [`LayerDirection::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayerDirection {
    Horizontal,
    Vertical,
    Diag45,
    Diag135,
    Other(String),
}

impl LayerDirection {
    pub fn as_str(&self) -> &str {
        match self {
            LayerDirection::Horizontal => "HORIZONTAL",
            LayerDirection::Vertical => "VERTICAL",
            LayerDirection::Diag45 => "DIAG45",
            LayerDirection::Diag135 => "DIAG135",
            LayerDirection::Other(keyword) => keyword,
        }
    }
}

impl From<&str> for LayerDirection {
    fn from(keyword: &str) -> Self {
        match keyword {
            "HORIZONTAL" => LayerDirection::Horizontal,
            "VERTICAL" => LayerDirection::Vertical,
            "DIAG45" => LayerDirection::Diag45,
            "DIAG135" => LayerDirection::Diag135,
            other => LayerDirection::Other(other.to_string()),
        }
    }
}

impl From<String> for LayerDirection {
    fn from(keyword: String) -> Self {
        LayerDirection::from(keyword.as_str())
    }
}

impl From<LayerDirection> for String {
    fn from(direction: LayerDirection) -> Self {
        direction.as_str().to_string()
    }
}

impl fmt::Display for LayerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LefLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<LayerDirection>,
}

/// Macro footprint from a `SIZE w BY h` statement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LefSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LefMacro {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<LefSize>,
}

impl LefMacro {
    pub fn width(&self) -> Option<f64> {
        self.size.map(|s| s.width)
    }

    pub fn height(&self) -> Option<f64> {
        self.size.map(|s| s.height)
    }

    pub fn area(&self) -> Option<f64> {
        self.size.map(|s| s.width * s.height)
    }
}

/// Scalar header fields. Unlike layers and macros these are last-write-wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Version,
    ManufacturingGrid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturing_grid: Option<f64>,
    #[serde(default)]
    pub units: BTreeMap<UnitKind, f64>,
    #[serde(default)]
    pub layers: BTreeMap<String, LefLayer>,
    #[serde(default)]
    pub macros: BTreeMap<String, LefMacro>,
}

impl Lef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_scalar(&mut self, kind: ScalarKind, value: f64) {
        match kind {
            ScalarKind::Version => self.version = Some(value),
            ScalarKind::ManufacturingGrid => self.manufacturing_grid = Some(value),
        }
    }

    /// Merge the declared unit factors; undeclared kinds keep their value.
    pub fn apply_units(&mut self, units: &LefUnits) {
        for (kind, value) in units.iter() {
            self.units.insert(kind, value);
        }
    }

    /// Insert a layer unless one with the same name already exists.
    ///
    /// The first definition of a name is kept whole. Returns `false` when the
    /// layer was discarded as a duplicate.
    pub fn apply_layer(
        &mut self,
        name: &str,
        width: Option<f64>,
        direction: Option<LayerDirection>,
    ) -> bool {
        if self.layers.contains_key(name) {
            return false;
        }
        self.layers
            .insert(name.to_string(), LefLayer { width, direction });
        true
    }

    /// Insert a macro unless one with the same name already exists.
    ///
    /// Macros and layers are separate namespaces.
    pub fn apply_macro(&mut self, name: &str, size: Option<LefSize>) -> bool {
        if self.macros.contains_key(name) {
            return false;
        }
        self.macros.insert(name.to_string(), LefMacro { size });
        true
    }

    pub fn layer(&self, name: &str) -> Option<&LefLayer> {
        self.layers.get(name)
    }

    pub fn get_macro(&self, name: &str) -> Option<&LefMacro> {
        self.macros.get(name)
    }

    pub fn unit(&self, kind: UnitKind) -> Option<f64> {
        self.units.get(&kind).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.version.is_none()
            && self.manufacturing_grid.is_none()
            && self.units.is_empty()
            && self.layers.is_empty()
            && self.macros.is_empty()
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Construct events emitted by a grammar engine.
//!
//! Each event carries only the fields its construct declared in the source.

use super::{LayerDirection, LefSize, UnitKind};

/// Factors declared by one UNITS block. `None` means the block did not
/// mention that unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LefUnits {
    pub database: Option<f64>,
    pub capacitance: Option<f64>,
    pub resistance: Option<f64>,
    pub time: Option<f64>,
    pub power: Option<f64>,
    pub current: Option<f64>,
    pub voltage: Option<f64>,
    pub frequency: Option<f64>,
}

impl LefUnits {
    pub fn get(&self, kind: UnitKind) -> Option<f64> {
        match kind {
            UnitKind::Database => self.database,
            UnitKind::Capacitance => self.capacitance,
            UnitKind::Resistance => self.resistance,
            UnitKind::Time => self.time,
            UnitKind::Power => self.power,
            UnitKind::Current => self.current,
            UnitKind::Voltage => self.voltage,
            UnitKind::Frequency => self.frequency,
        }
    }

    pub fn set(&mut self, kind: UnitKind, value: f64) {
        let slot = match kind {
            UnitKind::Database => &mut self.database,
            UnitKind::Capacitance => &mut self.capacitance,
            UnitKind::Resistance => &mut self.resistance,
            UnitKind::Time => &mut self.time,
            UnitKind::Power => &mut self.power,
            UnitKind::Current => &mut self.current,
            UnitKind::Voltage => &mut self.voltage,
            UnitKind::Frequency => &mut self.frequency,
        };
        *slot = Some(value);
    }

    /// Declared factors in [`UnitKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitKind, f64)> + '_ {
        UnitKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|value| (kind, value)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerEvent {
    pub name: String,
    pub width: Option<f64>,
    pub direction: Option<LayerDirection>,
}

impl LayerEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: None,
            direction: None,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_direction(mut self, direction: impl Into<LayerDirection>) -> Self {
        self.direction = Some(direction.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroEvent {
    pub name: String,
    pub size: Option<LefSize>,
}

impl MacroEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(LefSize { width, height });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LefEvent {
    Version(f64),
    ManufacturingGrid(f64),
    Units(LefUnits),
    Layer(LayerEvent),
    Macro(MacroEvent),
    /// A construct this crate does not aggregate, named by its keyword.
    Other(String),
}

impl LefEvent {
    /// Construct keyword, for logging.
    pub fn kind(&self) -> &str {
        match self {
            LefEvent::Version(_) => "VERSION",
            LefEvent::ManufacturingGrid(_) => "MANUFACTURINGGRID",
            LefEvent::Units(_) => "UNITS",
            LefEvent::Layer(_) => "LAYER",
            LefEvent::Macro(_) => "MACRO",
            LefEvent::Other(kind) => kind,
        }
    }
}

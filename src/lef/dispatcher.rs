// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use log::{trace, warn};

use super::engine::EventSink;
use super::event::LefEvent;
use super::{Lef, ScalarKind};

/// Routes construct events into the [`Lef`] being built for one parse.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    lef: Lef,
    dispatched: usize,
    duplicates: usize,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, event: LefEvent) {
        self.dispatched += 1;
        trace!("Dispatching {} event", event.kind());
        match event {
            LefEvent::Version(value) => self.lef.apply_scalar(ScalarKind::Version, value),
            LefEvent::ManufacturingGrid(value) => {
                self.lef.apply_scalar(ScalarKind::ManufacturingGrid, value)
            }
            LefEvent::Units(units) => self.lef.apply_units(&units),
            LefEvent::Layer(layer) => {
                if !self
                    .lef
                    .apply_layer(&layer.name, layer.width, layer.direction)
                {
                    warn!("Duplicate LAYER {} ignored, keeping first definition", layer.name);
                    self.duplicates += 1;
                }
            }
            LefEvent::Macro(macro_def) => {
                if !self.lef.apply_macro(&macro_def.name, macro_def.size) {
                    warn!(
                        "Duplicate MACRO {} ignored, keeping first definition",
                        macro_def.name
                    );
                    self.duplicates += 1;
                }
            }
            LefEvent::Other(_) => {}
        }
    }

    /// Events seen so far, including ignored ones.
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Layer and macro definitions discarded because the name was taken.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn document(&self) -> &Lef {
        &self.lef
    }

    pub fn finish(self) -> Lef {
        self.lef
    }
}

impl EventSink for EventDispatcher {
    fn event(&mut self, event: LefEvent) {
        self.dispatch(event);
    }
}

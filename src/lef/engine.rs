// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Boundary between a parse session and the grammar engine that reads LEF
//! text and reports constructs.

use std::io::Read;

use super::event::LefEvent;

/// Receives construct events, one call per construct, in source order.
pub trait EventSink {
    fn event(&mut self, event: LefEvent);
}

impl EventSink for Vec<LefEvent> {
    fn event(&mut self, event: LefEvent) {
        self.push(event);
    }
}

/// Terminal status of one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Ok,
    Error(String),
}

/// A LEF grammar engine.
///
/// `init` is called once per session before `run`. `run` delivers every
/// event synchronously to `sink` and returns only when the source is
/// exhausted or an error stops it; no events follow the returned status.
pub trait GrammarEngine {
    fn init(&mut self) -> Result<(), String>;

    fn run(&mut self, source: &mut dyn Read, name: &str, sink: &mut dyn EventSink)
        -> EngineStatus;
}

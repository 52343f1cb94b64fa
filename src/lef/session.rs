// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! One end-to-end aggregation: open the source, drive the grammar engine
//! into an [`EventDispatcher`], then hand back the finished [`Lef`] or a
//! single [`LefError`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, error};

use super::dispatcher::EventDispatcher;
use super::engine::{EngineStatus, GrammarEngine};
use super::{Lef, LefError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Opening,
    Aggregating,
    Finalized,
    Failed,
}

pub struct ParseSession<E: GrammarEngine> {
    engine: E,
    state: SessionState,
}

impl<E: GrammarEngine> ParseSession<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: SessionState::Idle,
        }
    }

    /// State after the last transition. `Finalized` or `Failed` once a parse
    /// has returned.
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Parse session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Open `path` and aggregate it.
    pub fn parse_path<P: AsRef<Path>>(&mut self, path: P) -> Result<Lef, LefError> {
        let path = path.as_ref();
        self.state = SessionState::Idle;
        self.transition(SessionState::Opening);

        let file = match File::open(path) {
            Ok(file) => file,
            Err(source) => {
                error!("Couldn't open file '{}': {source}", path.display());
                self.transition(SessionState::Failed);
                return Err(LefError::SourceUnavailable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        self.aggregate(&path.display().to_string(), BufReader::new(file))
    }

    /// Aggregate an already open source. `source` is dropped before this
    /// returns, whatever the outcome.
    pub fn parse_reader<R: Read>(&mut self, name: &str, source: R) -> Result<Lef, LefError> {
        self.state = SessionState::Idle;
        self.transition(SessionState::Opening);
        self.aggregate(name, source)
    }

    fn aggregate<R: Read>(&mut self, name: &str, mut source: R) -> Result<Lef, LefError> {
        if let Err(msg) = self.engine.init() {
            error!("LEF grammar engine failed to start: {msg}");
            self.transition(SessionState::Failed);
            drop(source);
            return Err(LefError::EngineInitFailed(msg));
        }

        self.transition(SessionState::Aggregating);
        let mut dispatcher = EventDispatcher::new();
        let status = self.engine.run(&mut source, name, &mut dispatcher);
        drop(source);

        match status {
            EngineStatus::Ok => {
                debug!(
                    "{name}: {} events dispatched, {} duplicate definitions ignored",
                    dispatcher.dispatched(),
                    dispatcher.duplicates()
                );
                self.transition(SessionState::Finalized);
                Ok(dispatcher.finish())
            }
            EngineStatus::Error(msg) => {
                error!("LEF parser returns an error: {msg}");
                self.transition(SessionState::Failed);
                Err(LefError::Grammar(msg))
            }
        }
    }
}

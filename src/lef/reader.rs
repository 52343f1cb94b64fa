// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::path::Path;

use log::info;

use super::lef_parser::{GrammarOptions, NomLefEngine};
use super::session::ParseSession;
use super::{Lef, LefError};

pub struct LefReader {
    options: GrammarOptions,
}

impl LefReader {
    pub fn new() -> Self {
        Self::with_options(GrammarOptions::default())
    }

    pub fn with_options(options: GrammarOptions) -> Self {
        Self { options }
    }

    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<Lef, LefError> {
        let path = path.as_ref();
        info!("[LOAD] Loading LEF file: {}", path.display());

        let mut session = ParseSession::new(NomLefEngine::new(self.options.clone()));
        let lef = session.parse_path(path)?;

        info!("[PASS] LEF parsed successfully!");
        info!(
            "[INFO] version: {}, manufacturing grid: {}",
            lef.version
                .map_or_else(|| "-".to_string(), |v| v.to_string()),
            lef.manufacturing_grid
                .map_or_else(|| "-".to_string(), |g| g.to_string()),
        );
        info!(
            "[INFO] Statistics: {} units, {} layers, {} macros",
            lef.units.len(),
            lef.layers.len(),
            lef.macros.len()
        );

        Ok(lef)
    }
}

impl Default for LefReader {
    fn default() -> Self {
        Self::new()
    }
}

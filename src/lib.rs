//! LEF Summary Library
//!
//! This library aggregates version, manufacturing grid, units, layer and
//! macro metadata out of LEF files used in Electronic Design Automation (EDA)
//! workflows.

pub mod export;
pub mod lef;

// Re-export commonly used types
pub use lef::lef_parser::{parse_lef, GrammarOptions, NomLefEngine};
pub use lef::reader::LefReader;
pub use lef::session::{ParseSession, SessionState};
pub use lef::{
    LayerDirection, Lef, LefError, LefErrorKind, LefLayer, LefMacro, LefSize, LefUnits, UnitKind,
};

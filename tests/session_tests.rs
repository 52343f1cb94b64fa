//! Parse session tests with scripted grammar engines
//!
//! Tests cover:
//! - Aggregation scenarios (last-write-wins scalars, incremental units,
//!   first-definition-wins layers and macros)
//! - Failure in each session phase, with no partial document
//! - Source release on every exit path

use std::cell::Cell;
use std::io::{self, Read};
use std::rc::Rc;

use lef_summary::lef::engine::{EngineStatus, EventSink, GrammarEngine};
use lef_summary::lef::event::{LayerEvent, LefEvent, LefUnits, MacroEvent};
use lef_summary::{LayerDirection, LefErrorKind, ParseSession, SessionState, UnitKind};

/// Replays a fixed event list, then reports `status`.
struct ScriptedEngine {
    events: Vec<LefEvent>,
    status: EngineStatus,
    init_error: Option<String>,
    init_calls: usize,
    run_calls: usize,
}

impl ScriptedEngine {
    fn ok(events: Vec<LefEvent>) -> Self {
        Self {
            events,
            status: EngineStatus::Ok,
            init_error: None,
            init_calls: 0,
            run_calls: 0,
        }
    }

    fn failing(events: Vec<LefEvent>, msg: &str) -> Self {
        Self {
            status: EngineStatus::Error(msg.to_string()),
            ..Self::ok(events)
        }
    }

    fn broken(msg: &str) -> Self {
        Self {
            init_error: Some(msg.to_string()),
            ..Self::ok(Vec::new())
        }
    }
}

impl GrammarEngine for ScriptedEngine {
    fn init(&mut self) -> Result<(), String> {
        self.init_calls += 1;
        match &self.init_error {
            Some(msg) => Err(msg.clone()),
            None => Ok(()),
        }
    }

    fn run(&mut self, _source: &mut dyn Read, _name: &str, sink: &mut dyn EventSink) -> EngineStatus {
        self.run_calls += 1;
        for event in &self.events {
            sink.event(event.clone());
        }
        self.status.clone()
    }
}

/// Empty source that records when it is dropped.
struct TrackedSource {
    released: Rc<Cell<bool>>,
}

impl Read for TrackedSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl Drop for TrackedSource {
    fn drop(&mut self) {
        self.released.set(true);
    }
}

fn tracked() -> (TrackedSource, Rc<Cell<bool>>) {
    let released = Rc::new(Cell::new(false));
    (
        TrackedSource {
            released: released.clone(),
        },
        released,
    )
}

fn run_events(events: Vec<LefEvent>) -> lef_summary::Lef {
    ParseSession::new(ScriptedEngine::ok(events))
        .parse_reader("scripted", io::empty())
        .expect("scripted session should finalize")
}

#[test]
fn test_scenario_a_version_last_write_wins() {
    let lef = run_events(vec![LefEvent::Version(5.8), LefEvent::Version(5.7)]);
    assert_eq!(lef.version, Some(5.7));
    assert_eq!(lef.manufacturing_grid, None);
}

#[test]
fn test_scenario_b_units_accumulate() {
    let lef = run_events(vec![
        LefEvent::Units(LefUnits {
            capacitance: Some(1.0),
            ..Default::default()
        }),
        LefEvent::Units(LefUnits {
            resistance: Some(2.0),
            ..Default::default()
        }),
    ]);
    assert_eq!(lef.units.len(), 2);
    assert_eq!(lef.unit(UnitKind::Capacitance), Some(1.0));
    assert_eq!(lef.unit(UnitKind::Resistance), Some(2.0));
}

#[test]
fn test_scenario_c_second_layer_discarded() {
    let lef = run_events(vec![
        LefEvent::Layer(LayerEvent::new("M1").with_width(0.2)),
        LefEvent::Layer(LayerEvent::new("M1").with_direction("HORIZONTAL")),
    ]);
    let m1 = lef.layer("M1").unwrap();
    assert_eq!(m1.width, Some(0.2));
    assert_eq!(m1.direction, None);
}

#[test]
fn test_second_macro_discarded() {
    let lef = run_events(vec![
        LefEvent::Macro(MacroEvent::new("INV")),
        LefEvent::Macro(MacroEvent::new("INV").with_size(1.0, 2.0)),
        LefEvent::Layer(LayerEvent::new("INV").with_width(0.1)),
    ]);
    assert_eq!(lef.get_macro("INV").unwrap().size, None);
    assert_eq!(lef.layer("INV").unwrap().width, Some(0.1));
}

#[test]
fn test_other_events_ignored() {
    let lef = run_events(vec![
        LefEvent::Other("BUSBITCHARS".to_string()),
        LefEvent::ManufacturingGrid(0.005),
        LefEvent::Other("SOMETHING_NEW".to_string()),
    ]);
    assert_eq!(lef.manufacturing_grid, Some(0.005));
    assert!(lef.layers.is_empty());
    assert!(lef.macros.is_empty());
}

#[test]
fn test_scenario_d_grammar_error_without_events() {
    let mut session = ParseSession::new(ScriptedEngine::failing(Vec::new(), "syntax error"));
    let (source, released) = tracked();

    let err = session.parse_reader("broken", source).unwrap_err();
    assert_eq!(err.kind(), LefErrorKind::Grammar);
    assert_eq!(session.state(), SessionState::Failed);
    assert!(released.get());
}

#[test]
fn test_grammar_error_discards_partial_document() {
    let mut session = ParseSession::new(ScriptedEngine::failing(
        vec![
            LefEvent::Version(5.8),
            LefEvent::Layer(LayerEvent::new("M1").with_width(0.2)),
        ],
        "unexpected token",
    ));

    let err = session.parse_reader("partial", io::empty()).unwrap_err();
    assert_eq!(err.kind(), LefErrorKind::Grammar);
    assert!(err.to_string().contains("unexpected token"));
}

#[test]
fn test_scenario_e_source_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.lef");

    let mut session = ParseSession::new(ScriptedEngine::ok(vec![LefEvent::Version(5.8)]));
    let err = session.parse_path(&missing).unwrap_err();

    assert_eq!(err.kind(), LefErrorKind::SourceUnavailable);
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.engine().init_calls, 0);
    assert_eq!(session.engine().run_calls, 0);
}

#[test]
fn test_engine_init_failure_releases_source() {
    let mut session = ParseSession::new(ScriptedEngine::broken("no grammar tables"));
    let (source, released) = tracked();

    let err = session.parse_reader("init", source).unwrap_err();
    assert_eq!(err.kind(), LefErrorKind::EngineInitFailed);
    assert!(err.to_string().contains("no grammar tables"));
    assert!(released.get());
    assert_eq!(session.state(), SessionState::Failed);

    let engine = session.into_engine();
    assert_eq!(engine.init_calls, 1);
    assert_eq!(engine.run_calls, 0);
}

#[test]
fn test_success_releases_source() {
    let mut session = ParseSession::new(ScriptedEngine::ok(vec![LefEvent::Version(5.8)]));
    assert_eq!(session.state(), SessionState::Idle);
    let (source, released) = tracked();

    let lef = session.parse_reader("ok", source).unwrap();
    assert_eq!(lef.version, Some(5.8));
    assert!(released.get());
    assert_eq!(session.state(), SessionState::Finalized);
}

#[test]
fn test_each_parse_starts_empty() {
    let mut session = ParseSession::new(ScriptedEngine::ok(vec![LefEvent::Layer(
        LayerEvent::new("M1").with_direction(LayerDirection::Vertical),
    )]));

    let first = session.parse_reader("first", io::empty()).unwrap();
    let second = session.parse_reader("second", io::empty()).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.layers.len(), 1);
}

#[test]
fn test_parse_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.lef");
    std::fs::write(&path, "").unwrap();

    let mut session = ParseSession::new(ScriptedEngine::ok(vec![LefEvent::ManufacturingGrid(0.01)]));
    let lef = session.parse_path(&path).unwrap();
    assert_eq!(lef.manufacturing_grid, Some(0.01));
    assert_eq!(session.engine().init_calls, 1);
}

mod properties {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn units_event() -> impl Strategy<Value = LefUnits> {
        proptest::collection::vec(proptest::option::of(0.0f64..1.0e6), 8).prop_map(|values| {
            let mut units = LefUnits::default();
            for (kind, value) in UnitKind::ALL.iter().zip(values) {
                if let Some(value) = value {
                    units.set(*kind, value);
                }
            }
            units
        })
    }

    fn layer_event() -> impl Strategy<Value = LayerEvent> {
        (
            prop::sample::select(vec!["M1", "M2", "V1"]),
            proptest::option::of(0.01f64..10.0),
            proptest::option::of(prop::sample::select(vec!["HORIZONTAL", "VERTICAL"])),
        )
            .prop_map(|(name, width, direction)| LayerEvent {
                name: name.to_string(),
                width,
                direction: direction.map(LayerDirection::from),
            })
    }

    fn macro_event() -> impl Strategy<Value = MacroEvent> {
        (
            prop::sample::select(vec!["INV", "BUF", "NAND2"]),
            proptest::option::of((0.1f64..10.0, 0.1f64..10.0)),
        )
            .prop_map(|(name, size)| {
                let event = MacroEvent::new(name);
                match size {
                    Some((w, h)) => event.with_size(w, h),
                    None => event,
                }
            })
    }

    proptest! {
        #[test]
        fn units_hold_last_flagged_value(events in proptest::collection::vec(units_event(), 0..12)) {
            let mut expected = BTreeMap::new();
            for units in &events {
                for (kind, value) in units.iter() {
                    expected.insert(kind, value);
                }
            }

            let lef = run_events(events.into_iter().map(LefEvent::Units).collect());
            prop_assert_eq!(lef.units, expected);
        }

        #[test]
        fn layers_keep_first_definition(events in proptest::collection::vec(layer_event(), 0..12)) {
            let mut expected: BTreeMap<String, LayerEvent> = BTreeMap::new();
            for event in &events {
                expected.entry(event.name.clone()).or_insert_with(|| event.clone());
            }

            let lef = run_events(events.into_iter().map(LefEvent::Layer).collect());
            prop_assert_eq!(lef.layers.len(), expected.len());
            for (name, first) in &expected {
                let layer = lef.layer(name).unwrap();
                prop_assert_eq!(layer.width, first.width);
                prop_assert_eq!(&layer.direction, &first.direction);
            }
        }

        #[test]
        fn macros_keep_first_definition(events in proptest::collection::vec(macro_event(), 0..12)) {
            let mut expected: BTreeMap<String, MacroEvent> = BTreeMap::new();
            for event in &events {
                expected.entry(event.name.clone()).or_insert_with(|| event.clone());
            }

            let lef = run_events(events.into_iter().map(LefEvent::Macro).collect());
            prop_assert_eq!(lef.macros.len(), expected.len());
            for (name, first) in &expected {
                prop_assert_eq!(lef.get_macro(name).unwrap().size, first.size);
            }
        }

        #[test]
        fn scalars_absent_iff_never_dispatched(
            versions in proptest::collection::vec(1.0f64..6.0, 0..4),
            grids in proptest::collection::vec(0.001f64..0.1, 0..4),
        ) {
            let mut events: Vec<LefEvent> = versions.iter().copied().map(LefEvent::Version).collect();
            events.extend(grids.iter().copied().map(LefEvent::ManufacturingGrid));

            let lef = run_events(events);
            prop_assert_eq!(lef.version, versions.last().copied());
            prop_assert_eq!(lef.manufacturing_grid, grids.last().copied());
        }

        #[test]
        fn failed_session_never_returns_document(events in proptest::collection::vec(layer_event(), 0..8)) {
            let engine = ScriptedEngine::failing(events.into_iter().map(LefEvent::Layer).collect(), "late error");
            let result = ParseSession::new(engine).parse_reader("prop", io::empty());
            prop_assert_eq!(result.unwrap_err().kind(), LefErrorKind::Grammar);
        }
    }
}

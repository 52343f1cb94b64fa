// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! nom-based LEF grammar engine.
//!
//! Recognizes the LEF statements and blocks found in technology and cell
//! library files, reports VERSION, MANUFACTURINGGRID, UNITS, LAYER and MACRO
//! constructs as events and skips everything else.

use std::fmt;
use std::io::Read;

use log::{debug, trace};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, recognize},
    number::complete::double,
    sequence::{delimited, preceded},
    IResult, Parser,
};

use super::engine::{EngineStatus, EventSink, GrammarEngine};
use super::event::{LayerEvent, LefEvent, LefUnits, MacroEvent};
use super::preprocessor::{preprocess, PreprocessedLef};
use super::session::ParseSession;
use super::{Lef, LefError, UnitKind};

/// Top-level statements that end at `;` and carry nothing we aggregate.
const SIMPLE_STATEMENTS: &[&str] = &[
    "BUSBITCHARS",
    "DIVIDERCHAR",
    "NAMESCASESENSITIVE",
    "NOWIREEXTENSIONATPIN",
    "USEMINSPACING",
    "CLEARANCEMEASURE",
    "FIXEDMASK",
    "MAXVIASTACK",
    "MINFEATURE",
    "DIELECTRIC",
    "INPUTPINANTENNASIZE",
    "OUTPUTPINANTENNASIZE",
    "INOUTPINANTENNASIZE",
    "ANTENNAINPUTGATEAREA",
    "ANTENNAINOUTDIFFAREA",
    "ANTENNAOUTPUTDIFFAREA",
];

/// Blocks closed by `END <keyword>`.
const KEYWORD_BLOCKS: &[&str] = &[
    "PROPERTYDEFINITIONS",
    "SPACING",
    "NOISETABLE",
    "CORRECTIONTABLE",
    "IRDROP",
];

/// Blocks closed by `END <name>`.
const NAMED_BLOCKS: &[&str] = &["VIA", "VIARULE", "SITE", "NONDEFAULTRULE", "ARRAY"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarOptions {
    /// Skip unknown top-level statements instead of failing on them.
    pub allow_unknown_statements: bool,
    /// Reject sources larger than this many bytes.
    pub max_source_bytes: Option<u64>,
}

impl GrammarOptions {
    pub fn with_allow_unknown_statements(mut self, allow: bool) -> Self {
        self.allow_unknown_statements = allow;
        self
    }

    pub fn with_max_source_bytes(mut self, limit: u64) -> Self {
        self.max_source_bytes = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}

fn quoted(input: &str) -> IResult<&str, &str> {
    recognize(delimited(char('"'), take_until("\""), char('"'))).parse(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ';').parse(input)
}

fn token(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, alt((quoted, tag(";"), word))).parse(input)
}

fn parse_number(word: &str) -> Option<f64> {
    all_consuming(double::<&str, nom::error::Error<&str>>)
        .parse(word)
        .ok()
        .map(|(_, value)| value)
        .filter(|value| value.is_finite())
}

/// Token stream over preprocessed text, remembering where the last token
/// started for error lines.
struct Tokens<'a> {
    text: &'a str,
    rest: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            rest: text,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        token(self.rest).ok().map(|(_, tok)| tok)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let (rest, tok) = token(self.rest).ok()?;
        self.pos = self.text.len() - rest.len() - tok.len();
        self.rest = rest;
        Some(tok)
    }
}

struct Grammar<'a> {
    tokens: Tokens<'a>,
    source: &'a PreprocessedLef,
    options: &'a GrammarOptions,
}

impl<'a> Grammar<'a> {
    fn new(source: &'a PreprocessedLef, options: &'a GrammarOptions) -> Self {
        Self {
            tokens: Tokens::new(&source.text),
            source,
            options,
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.source.line_of(self.tokens.pos),
            message: message.into(),
        }
    }

    fn expect_token(&mut self, expected: &str) -> Result<&'a str, SyntaxError> {
        self.tokens
            .next()
            .ok_or_else(|| self.error(format!("unexpected end of file, expected {expected}")))
    }

    fn expect_number(&mut self, context: &str) -> Result<f64, SyntaxError> {
        let tok = self.expect_token(&format!("{context} value"))?;
        parse_number(tok).ok_or_else(|| self.error(format!("invalid {context} value '{tok}'")))
    }

    fn expect_semicolon(&mut self, context: &str) -> Result<(), SyntaxError> {
        match self.expect_token(&format!("';' after {context}"))? {
            ";" => Ok(()),
            other => Err(self.error(format!("expected ';' after {context}, found '{other}'"))),
        }
    }

    /// Words of the statement starting with `first`, up to its `;`.
    fn rest_of_statement(&mut self, first: &'a str) -> Result<Vec<&'a str>, SyntaxError> {
        let mut words = Vec::new();
        if first == ";" {
            return Ok(words);
        }
        words.push(first);
        loop {
            match self.tokens.next() {
                Some(";") => return Ok(words),
                Some(tok) => words.push(tok),
                None => return Err(self.error(format!("missing ';' after {first}"))),
            }
        }
    }

    /// Skip tokens through `END <name>`.
    fn skip_until_end(&mut self, construct: &str, name: &str) -> Result<(), SyntaxError> {
        loop {
            match self.tokens.next() {
                Some("END") if self.tokens.peek() == Some(name) => {
                    self.tokens.next();
                    return Ok(());
                }
                Some(_) => {}
                None => {
                    return Err(self.error(format!("missing END {name} to close {construct}")))
                }
            }
        }
    }

    /// Skip tokens through the next bare `terminator`.
    fn skip_until(&mut self, construct: &str, terminator: &str) -> Result<(), SyntaxError> {
        loop {
            match self.tokens.next() {
                Some(tok) if tok == terminator => return Ok(()),
                Some(_) => {}
                None => {
                    return Err(
                        self.error(format!("{construct} is not terminated by {terminator}"))
                    )
                }
            }
        }
    }

    fn run(&mut self, sink: &mut dyn EventSink) -> Result<(), SyntaxError> {
        while let Some(keyword) = self.tokens.next() {
            match keyword {
                "VERSION" => {
                    let version = self.expect_number("VERSION")?;
                    self.expect_semicolon("VERSION")?;
                    debug!("VERSION {version}");
                    sink.event(LefEvent::Version(version));
                }
                "MANUFACTURINGGRID" => {
                    let grid = self.expect_number("MANUFACTURINGGRID")?;
                    self.expect_semicolon("MANUFACTURINGGRID")?;
                    debug!("MANUFACTURINGGRID {grid}");
                    sink.event(LefEvent::ManufacturingGrid(grid));
                }
                "UNITS" => {
                    let units = self.parse_units()?;
                    sink.event(LefEvent::Units(units));
                }
                "LAYER" => {
                    let name = self.expect_token("layer name")?;
                    let layer = self.parse_layer(name)?;
                    sink.event(LefEvent::Layer(layer));
                }
                "MACRO" => {
                    let name = self.expect_token("macro name")?;
                    let macro_def = self.parse_macro(name)?;
                    sink.event(LefEvent::Macro(macro_def));
                }
                "END" => match self.expect_token("LIBRARY")? {
                    "LIBRARY" => {
                        trace!("END LIBRARY");
                        return Ok(());
                    }
                    other => return Err(self.error(format!("unexpected END {other}"))),
                },
                "BEGINEXT" => {
                    self.skip_until("BEGINEXT", "ENDEXT")?;
                    sink.event(LefEvent::Other(keyword.to_string()));
                }
                ";" => return Err(self.error("unexpected ';'")),
                kw if SIMPLE_STATEMENTS.contains(&kw) => {
                    self.rest_of_statement(kw)?;
                    sink.event(LefEvent::Other(kw.to_string()));
                }
                kw if KEYWORD_BLOCKS.contains(&kw) => {
                    self.skip_until_end(kw, kw)?;
                    sink.event(LefEvent::Other(kw.to_string()));
                }
                kw if NAMED_BLOCKS.contains(&kw) => {
                    let name = self.expect_token(&format!("{kw} name"))?;
                    trace!("Skipping {kw} {name}");
                    self.skip_until_end(kw, name)?;
                    sink.event(LefEvent::Other(kw.to_string()));
                }
                kw if self.options.allow_unknown_statements => {
                    debug!("Skipping unknown statement {kw}");
                    self.rest_of_statement(kw)?;
                    sink.event(LefEvent::Other(kw.to_string()));
                }
                kw => return Err(self.error(format!("unknown statement '{kw}'"))),
            }
        }
        Ok(())
    }

    fn parse_units(&mut self) -> Result<LefUnits, SyntaxError> {
        let mut units = LefUnits::default();
        loop {
            let tok = self.expect_token("END UNITS")?;
            if tok == "END" {
                return match self.expect_token("UNITS")? {
                    "UNITS" => {
                        debug!("UNITS: {} factors", units.iter().count());
                        Ok(units)
                    }
                    other => Err(self.error(format!("expected END UNITS, found END {other}"))),
                };
            }
            let kind = UnitKind::from_keyword(tok)
                .ok_or_else(|| self.error(format!("unknown UNITS statement '{tok}'")))?;
            let words = self.rest_of_statement(tok)?;
            let value = words
                .last()
                .and_then(|w| parse_number(w))
                .filter(|_| words.len() > 1)
                .ok_or_else(|| self.error(format!("invalid {tok} value")))?;
            units.set(kind, value);
        }
    }

    fn parse_layer(&mut self, name: &'a str) -> Result<LayerEvent, SyntaxError> {
        debug!("Parsing LAYER: {name}");
        let mut layer = LayerEvent::new(name);
        // Inside an ACCURRENTDENSITY/DCCURRENTDENSITY table up to TABLEENTRIES.
        let mut in_density_table = false;

        loop {
            let tok = self.expect_token(&format!("END {name}"))?;
            if tok == "END" {
                return match self.expect_token(name)? {
                    end if end == name => Ok(layer),
                    other => Err(self.error(format!(
                        "expected END {name} to close LAYER, found END {other}"
                    ))),
                };
            }

            let words = self.rest_of_statement(tok)?;
            if in_density_table {
                if tok == "TABLEENTRIES" {
                    in_density_table = false;
                }
                continue;
            }

            match tok {
                "WIDTH" => {
                    let width = words
                        .get(1)
                        .and_then(|w| parse_number(w))
                        .ok_or_else(|| self.error(format!("invalid WIDTH in LAYER {name}")))?;
                    layer.width = Some(width);
                }
                "DIRECTION" => {
                    let direction = words.get(1).ok_or_else(|| {
                        self.error(format!("missing DIRECTION value in LAYER {name}"))
                    })?;
                    layer.direction = Some((*direction).into());
                }
                "ACCURRENTDENSITY" | "DCCURRENTDENSITY" => {
                    // `KW TYPE value ;` is the single-value form.
                    in_density_table = words.len() > 3;
                }
                _ => {}
            }
        }
    }

    fn parse_macro(&mut self, name: &'a str) -> Result<MacroEvent, SyntaxError> {
        debug!("Parsing MACRO: {name}");
        let mut macro_def = MacroEvent::new(name);

        loop {
            let tok = self.expect_token(&format!("END {name}"))?;
            match tok {
                "END" => {
                    return match self.expect_token(name)? {
                        end if end == name => {
                            debug!("Found macro: {name} (size: {:?})", macro_def.size);
                            Ok(macro_def)
                        }
                        other => Err(self.error(format!(
                            "expected END {name} to close MACRO, found END {other}"
                        ))),
                    };
                }
                "PIN" => {
                    let pin = self.expect_token("pin name")?;
                    trace!("  Skipping PIN {pin}");
                    self.skip_until_end("PIN", pin)?;
                }
                "OBS" | "DENSITY" => self.skip_until(tok, "END")?,
                "SIZE" => {
                    let words = self.rest_of_statement(tok)?;
                    match words.as_slice() {
                        [_, w, "BY", h] => match (parse_number(w), parse_number(h)) {
                            (Some(w), Some(h)) => macro_def = macro_def.with_size(w, h),
                            _ => {
                                return Err(
                                    self.error(format!("invalid SIZE values in MACRO {name}"))
                                )
                            }
                        },
                        _ => {
                            return Err(self.error(format!(
                                "expected SIZE <width> BY <height> in MACRO {name}"
                            )))
                        }
                    }
                }
                _ => {
                    self.rest_of_statement(tok)?;
                }
            }
        }
    }
}

/// LEF grammar engine over any [`Read`] source.
#[derive(Debug, Clone, Default)]
pub struct NomLefEngine {
    options: GrammarOptions,
}

impl NomLefEngine {
    pub fn new(options: GrammarOptions) -> Self {
        Self { options }
    }

    fn read_source(&self, source: &mut dyn Read) -> Result<String, String> {
        let mut bytes = Vec::new();
        match self.options.max_source_bytes {
            Some(limit) => {
                source
                    .take(limit.saturating_add(1))
                    .read_to_end(&mut bytes)
                    .map_err(|e| format!("read failed: {e}"))?;
                if bytes.len() as u64 > limit {
                    return Err(format!("source exceeds {limit} bytes"));
                }
            }
            None => {
                source
                    .read_to_end(&mut bytes)
                    .map_err(|e| format!("read failed: {e}"))?;
            }
        }
        String::from_utf8(bytes).map_err(|e| format!("source is not valid UTF-8: {e}"))
    }
}

impl GrammarEngine for NomLefEngine {
    fn init(&mut self) -> Result<(), String> {
        if self.options.max_source_bytes == Some(0) {
            return Err("max_source_bytes must be greater than zero".to_string());
        }
        Ok(())
    }

    fn run(&mut self, source: &mut dyn Read, name: &str, sink: &mut dyn EventSink) -> EngineStatus {
        let content = match self.read_source(source) {
            Ok(content) => content,
            Err(msg) => return EngineStatus::Error(format!("{name}: {msg}")),
        };
        debug!("{name}: {} bytes", content.len());

        let preprocessed = preprocess(&content);
        trace!("{preprocessed}");

        match Grammar::new(&preprocessed, &self.options).run(sink) {
            Ok(()) => EngineStatus::Ok,
            Err(e) => EngineStatus::Error(format!("{name}: {e}")),
        }
    }
}

/// Parse LEF text held in memory with default options.
pub fn parse_lef(input: &str) -> Result<Lef, LefError> {
    ParseSession::new(NomLefEngine::default()).parse_reader("<memory>", input.as_bytes())
}

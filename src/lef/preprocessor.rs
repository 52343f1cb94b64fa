// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! LEF Preprocessor
//!
//! Runs before tokenizing:
//! - Blanks comments (`#` at line start or preceded by whitespace, outside
//!   quoted strings) so the tokenizer never sees them
//! - Tracks quoted strings across lines, so a multi-line LEF58 property
//!   string hides its `#` and its closing quote is not misread
//! - Keeps every newline in place, so byte offsets into the cleaned text map
//!   back to original line numbers for error reporting

use std::fmt;

/// Comment-free LEF text plus the start offset of every line.
#[derive(Debug)]
pub struct PreprocessedLef {
    pub text: String,
    line_starts: Vec<usize>,
}

impl PreprocessedLef {
    /// 1-based line number containing byte `offset` of [`Self::text`].
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

impl fmt::Display for PreprocessedLef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Preprocessed LEF:")?;
        writeln!(f, "  Lines: {}", self.line_count())?;
        writeln!(f, "  Bytes: {}", self.text.len())?;
        Ok(())
    }
}

/// Strip comments from raw LEF content, preserving line structure.
pub fn preprocess(content: &str) -> PreprocessedLef {
    let mut text = String::with_capacity(content.len());
    let mut line_starts = Vec::new();
    let mut in_quote = false;

    for raw in content.split_inclusive('\n') {
        line_starts.push(text.len());
        let (body, newline) = match raw.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (raw, ""),
        };
        text.push_str(remove_comment(body, &mut in_quote));
        text.push_str(newline);
    }

    if line_starts.is_empty() {
        line_starts.push(0);
    }

    PreprocessedLef { text, line_starts }
}

/// Remove comment from a line
fn remove_comment<'a>(line: &'a str, in_quote: &mut bool) -> &'a str {
    match find_comment_start(line, in_quote) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Position of the `#` that starts a comment, if any.
///
/// `#` inside a quoted string or glued to a preceding identifier
/// (`net#123`) does not start a comment. `in_quote` carries an open string
/// over from the previous line and is left as the line ends.
fn find_comment_start(line: &str, in_quote: &mut bool) -> Option<usize> {
    let bytes = line.as_bytes();
    for i in 0..bytes.len() {
        match bytes[i] {
            b'"' => *in_quote = !*in_quote,
            b'#' if !*in_quote => {
                if i == 0 || bytes[i - 1] == b' ' || bytes[i - 1] == b'\t' {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

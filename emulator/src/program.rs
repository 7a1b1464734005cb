//! Instruction lines, as typed at the prompt or read from a program file.

use std::ops::Range;

use miette::Diagnostic;
use parse_display::Display;
use thiserror::Error;

use crate::constants::{EXIT_SENTINEL, LINE_LENGTH};
use crate::decoder::{decode_line, DecodedLine};

#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("expected 6 hexadecimal characters, got {length}")]
    #[diagnostic(
        code(pep8::invalid_length),
        help("Example of input for instruction and address: 51001A")
    )]
    InvalidLength { length: usize },
}

/// A line of exactly six characters, ready to be decoded
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{0}")]
pub struct InstructionLine(String);

impl InstructionLine {
    /// Check the length of a line, ignoring surrounding whitespace
    ///
    /// # Errors
    ///
    /// Fails if the line is not exactly six characters long.
    pub fn parse(line: &str) -> Result<Self, LineError> {
        let line = line.trim();
        let length = line.chars().count();
        if length == LINE_LENGTH {
            Ok(Self(line.to_owned()))
        } else {
            Err(LineError::InvalidLength { length })
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn decode(&self) -> DecodedLine {
        decode_line(&self.0)
    }
}

/// Whether an interactive line asks to end the session
#[must_use]
pub fn is_exit(line: &str) -> bool {
    line.trim() == EXIT_SENTINEL
}

/// A value with the place it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub inner: T,

    /// 1-based line number
    pub line: usize,

    /// Byte range of the line content in the source, without surrounding
    /// whitespace
    pub span: Range<usize>,
}

/// Split a program source into instruction lines.
///
/// Blank lines are skipped, every other line yields either an instruction
/// line or the reason it was rejected.
#[must_use]
pub fn parse(source: &str) -> Vec<Result<Located<InstructionLine>, Located<LineError>>> {
    let mut offset = 0;
    let mut lines = Vec::new();

    for (index, raw) in source.split_inclusive('\n').enumerate() {
        let start = offset + (raw.len() - raw.trim_start().len());
        let content = raw.trim();
        offset += raw.len();

        if content.is_empty() {
            continue;
        }

        let line = index + 1;
        let span = start..start + content.len();
        lines.push(match InstructionLine::parse(content) {
            Ok(inner) => Ok(Located { inner, line, span }),
            Err(inner) => Err(Located { inner, line, span }),
        });
    }

    lines
}

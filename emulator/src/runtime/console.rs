//! Console capability used by the I/O instructions.
//!
//! The engine never touches stdin or stdout itself: DECI, CHARI, AND and OR
//! read through [`Console::read_line`], DECO and CHARO write through
//! [`Console::write`].

use std::collections::VecDeque;

use nom::bytes::complete::take_while1;
use nom::combinator::all_consuming;
use nom::IResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("console input was closed")]
    Closed,

    #[error("console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Console {
    /// Show a prompt and block until a line of input is available
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Closed`] once no more input can be read.
    fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError>;

    /// Write program output
    ///
    /// # Errors
    ///
    /// Fails if the underlying output fails.
    fn write(&mut self, text: &str) -> Result<(), ConsoleError>;
}

/// A console fed from a queue of input lines, capturing everything written
/// to it
#[derive(Debug, Default, Clone)]
pub struct BufferedConsole {
    input: VecDeque<String>,
    prompts: Vec<String>,
    output: String,
}

impl BufferedConsole {
    pub fn new<I, S>(input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: input.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Queue one more line of input
    pub fn push_input(&mut self, line: impl Into<String>) {
        self.input.push_back(line.into());
    }

    /// Everything written so far
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Prompts shown so far, in order
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Console for BufferedConsole {
    fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError> {
        self.prompts.push(prompt.to_owned());
        self.input.pop_front().ok_or(ConsoleError::Closed)
    }

    fn write(&mut self, text: &str) -> Result<(), ConsoleError> {
        self.output.push_str(text);
        Ok(())
    }
}

/// Read the first whitespace-separated token, prompting again on blank lines
pub(crate) fn read_token(console: &mut dyn Console, prompt: &str) -> Result<String, ConsoleError> {
    loop {
        let line = console.read_line(prompt)?;
        if let Some(token) = line.split_whitespace().next() {
            return Ok(token.to_owned());
        }
    }
}

pub(crate) fn parse_decimal(input: &str) -> IResult<&str, i32> {
    all_consuming(nom::character::complete::i32)(input)
}

pub(crate) fn parse_bits(input: &str) -> IResult<&str, &str> {
    all_consuming(take_while1(|c: char| c == '0' || c == '1'))(input)
}

use std::io::{IsTerminal, Write};

use pep8_emulator::runtime::{Console, ConsoleError};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Behavior, CompletionType, Config, EditMode, Editor};

use crate::interactive::helper::RunHelper;

/// Console backed by the terminal: input through rustyline, output on stdout
pub(crate) struct TerminalConsole {
    editor: Editor<RunHelper, DefaultHistory>,

    /// Rustyline does not show prompts when stdin is not a terminal
    echo_prompts: bool,
}

impl TerminalConsole {
    pub fn new() -> anyhow::Result<Self> {
        let piped = !std::io::stdin().is_terminal();
        let behavior = if piped {
            Behavior::Stdio
        } else {
            Behavior::PreferTerm
        };

        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .behavior(behavior)
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(RunHelper));
        Ok(Self {
            editor,
            echo_prompts: piped,
        })
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError> {
        if self.echo_prompts {
            write_flushed(&mut std::io::stdout().lock(), prompt)?;
        }

        match self.editor.readline(prompt) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Err(ConsoleError::Closed),
            Err(ReadlineError::Io(e)) => Err(ConsoleError::Io(e)),
            Err(e) => Err(ConsoleError::Io(std::io::Error::other(e.to_string()))),
        }
    }

    fn write(&mut self, text: &str) -> Result<(), ConsoleError> {
        write_flushed(&mut std::io::stdout().lock(), text)?;
        Ok(())
    }
}

fn write_flushed(out: &mut impl Write, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn write_flushed_test() {
        let mut out = std::io::BufWriter::new(Vec::new());
        write_flushed(&mut out, "Enter an integer value: ").unwrap();
        // Nothing is left in the buffer once the prompt is written
        assert_eq!(out.buffer(), b"");
        assert_eq!(out.get_ref().as_slice(), b"Enter an integer value: ");
    }
}

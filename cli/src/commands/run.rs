use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, ValueHint};
use miette::LabeledSpan;
use pep8_emulator::parse;
use pep8_emulator::program::InstructionLine;
use pep8_emulator::runtime::{Computer, Console, Step};
use tracing::{debug, error, info, warn};

use crate::console::TerminalConsole;
use crate::interactive::run_interactive;

#[derive(Parser, Debug)]
pub struct RunOpt {
    /// Program file, one instruction per line. Without it, instructions are
    /// read from an interactive prompt.
    #[clap(value_parser, value_hint = ValueHint::FilePath)]
    input: Option<Utf8PathBuf>,

    /// Keep reading instructions after a STOP instruction
    #[clap(short, long, action = ArgAction::SetTrue)]
    keep_going: bool,
}

/// Whether the run should go on after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// Execute one instruction line and print the registers
pub(crate) fn execute_line(
    computer: &mut Computer,
    line: &InstructionLine,
    console: &mut dyn Console,
    keep_going: bool,
) -> Flow {
    let flow = match computer.execute(&line.decode(), console) {
        Ok(Step::Continue) => Flow::Continue,
        Ok(Step::Stopped) if keep_going => Flow::Continue,
        Ok(Step::Stopped) => {
            info!("STOP instruction reached");
            Flow::Stop
        }
        Err(e) if e.is_console_closed() => {
            warn!("Console input closed, stopping");
            return Flow::Stop;
        }
        Err(e) => {
            warn!(line = %line, error = &e as &dyn std::error::Error, "Instruction failed");
            Flow::Continue
        }
    };

    println!("\n{}\n", computer.registers);
    flow
}

impl RunOpt {
    pub fn exec(self) -> anyhow::Result<()> {
        let mut computer = Computer::default();
        let mut console = TerminalConsole::new()?;

        if let Some(input) = self.input.as_deref() {
            self.run_file(input, &mut computer, &mut console);
        } else {
            run_interactive(&mut computer, &mut console, self.keep_going);
        }

        info!(registers = ?computer.registers, "End of program");
        println!("\nExiting...");
        Ok(())
    }

    /// Run every line of a program file. A file that cannot be read is
    /// reported and nothing is executed.
    fn run_file(&self, input: &Utf8Path, computer: &mut Computer, console: &mut dyn Console) {
        match read_program(input) {
            Ok(source) => self.run_source(&source, computer, console),
            Err(e) => error!("{:#}", e),
        }
    }

    fn run_source(&self, source: &str, computer: &mut Computer, console: &mut dyn Console) {
        for line in parse(&source) {
            match line {
                Ok(located) => {
                    debug!(line = located.line, instruction = %located.inner, "Running line");
                    if execute_line(computer, &located.inner, console, self.keep_going)
                        == Flow::Stop
                    {
                        break;
                    }
                }
                Err(located) => {
                    let labels = vec![LabeledSpan::at(
                        located.span.clone(),
                        located.inner.to_string(),
                    )];
                    let report = miette::miette!(
                        labels = labels,
                        help = "Example of input for instruction and address: 51001A",
                        "Skipping invalid instruction line {}",
                        located.line
                    )
                    .with_source_code(source.to_owned());
                    eprintln!("{report:?}");
                }
            }
        }
    }
}

fn read_program(input: &Utf8Path) -> anyhow::Result<String> {
    info!(path = %input, "Reading program");
    std::fs::read_to_string(input)
        .with_context(|| format!("The file specified could not be opened: {input}"))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pep8_emulator::runtime::{BufferedConsole, Phase};
    use pretty_assertions::assert_eq;

    use super::*;

    fn opt(keep_going: bool) -> RunOpt {
        RunOpt {
            input: None,
            keep_going,
        }
    }

    #[test]
    fn unreadable_file_test() {
        let path = Utf8Path::new("/nonexistent/pep8/program.txt");
        let err = read_program(path).unwrap_err();
        assert_eq!(
            format!("{err}"),
            "The file specified could not be opened: /nonexistent/pep8/program.txt"
        );

        let mut computer = Computer::default();
        let mut console = BufferedConsole::default();
        opt(false).run_file(path, &mut computer, &mut console);
        assert_eq!(computer.phase(), Phase::Uninitialized);
        assert!(console.prompts().is_empty());
    }

    #[test]
    fn run_source_test() {
        let source = indoc! {"
            30FFFE
            38FFFE
            51001
            000000
            38FFFE
        "};

        let mut computer = Computer::default();
        let mut console = BufferedConsole::new(["42"]);
        opt(false).run_source(source, &mut computer, &mut console);

        // The bad line is skipped and nothing runs after STOP
        assert_eq!(console.output(), "42");
        assert_eq!(computer.registers.pc, 3);
    }

    #[test]
    fn run_source_keep_going_test() {
        let source = indoc! {"
            30FFFE
            000000
            38FFFE
        "};

        let mut computer = Computer::default();
        let mut console = BufferedConsole::new(["7"]);
        opt(true).run_source(source, &mut computer, &mut console);

        assert_eq!(console.output(), "7");
        assert_eq!(computer.registers.pc, 3);
    }
}

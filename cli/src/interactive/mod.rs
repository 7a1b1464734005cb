//! This module implements the TTY interactive interface.
//!
//! Instructions are typed one line at a time at a rustyline prompt, which also
//! serves the input instructions (DECI, CHARI, AND, OR).

use pep8_emulator::program::{is_exit, InstructionLine};
use pep8_emulator::runtime::{Computer, Console, ConsoleError};
use tracing::{error, info};

use crate::commands::{execute_line, Flow};
use crate::console::TerminalConsole;

pub(crate) mod helper;

static PROMPT: &str = "Enter an instruction and address of 6 Hex characters (-1 to exit): ";

pub(crate) fn run_interactive(
    computer: &mut Computer,
    console: &mut TerminalConsole,
    keep_going: bool,
) {
    info!("Running in interactive mode. Type \"-1\" to exit.");

    loop {
        let readline = match console.read_line(PROMPT) {
            Ok(line) => line,
            Err(ConsoleError::Closed) => {
                info!("EOF, exiting");
                return;
            }
            Err(e) => {
                error!(error = &e as &dyn std::error::Error, "Could not read input");
                return;
            }
        };

        if is_exit(&readline) {
            break;
        }

        let line = match InstructionLine::parse(&readline) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                continue;
            }
        };

        if execute_line(computer, &line, console, keep_going) == Flow::Stop {
            break;
        }
    }
}

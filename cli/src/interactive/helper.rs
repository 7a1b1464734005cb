use std::borrow::Cow;

use anstyle::Style;
use pep8_emulator::program::InstructionLine;
use pep8_emulator::runtime::Instruction;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::Context;
use rustyline_derive::{Completer, Helper, Validator};

/// Rustyline helper, that styles the prompt and hints the decoded instruction.
#[derive(Helper, Completer, Validator, Debug)]
pub(crate) struct RunHelper;

/// Mnemonic of a complete instruction line, if it decodes to one
fn hint_for(line: &str) -> Option<String> {
    // Only hint well-formed lines, the decoder warns about the others
    if !line.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let line = InstructionLine::parse(line).ok()?;
    let decoded = line.decode();
    let instruction = decoded.opcode_byte().and_then(Instruction::decode)?;
    let address = decoded.address_value().ok()?;
    Some(format!("  ; {}", instruction.listing(address)))
}

impl Highlighter for RunHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        let style = Style::new().dimmed();
        Cow::Owned(format!("{}{hint}{}", style.render(), style.render_reset()))
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        let style = Style::new().bold();
        Cow::Owned(format!("{}{prompt}{}", style.render(), style.render_reset()))
    }
}

impl Hinter for RunHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        // Only hint when the cursor is at the end of the line
        if pos < line.len() {
            return None;
        }

        hint_for(line)
    }
}

use clap::Parser;
use pep8_emulator::program::InstructionLine;
use pep8_emulator::runtime::Instruction;
use tracing::warn;

#[derive(Parser, Debug)]
pub struct DecodeOpt {
    /// Instruction lines, six hexadecimal characters each
    #[clap(required = true)]
    lines: Vec<String>,
}

/// One line of the listing: the input, its binary fields and its mnemonic
fn describe(line: &InstructionLine) -> String {
    let decoded = line.decode();
    let mnemonic = match decoded.opcode_byte().and_then(Instruction::decode) {
        Some(instruction) => match decoded.address_value() {
            Ok(address) => instruction.listing(address),
            Err(e) => format!("{instruction} <{e}>"),
        },
        None => "<invalid opcode>".to_owned(),
    };

    format!("{line}  {decoded}  {mnemonic}")
}

impl DecodeOpt {
    pub fn exec(&self) -> anyhow::Result<()> {
        for line in &self.lines {
            match InstructionLine::parse(line) {
                Ok(line) => println!("{}", describe(&line)),
                Err(e) => warn!(line = %line, "{}", e),
            }
        }

        Ok(())
    }
}

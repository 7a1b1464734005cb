use thiserror::Error;
use tracing::{debug, info};

use crate::constants::{Address, Word};
use crate::convert::{binary_to_int, ConversionError};
use crate::decoder::{decode_line, DecodedLine};

mod console;
mod exception;
mod instructions;
mod memory;
mod registers;

pub use self::console::{BufferedConsole, Console, ConsoleError};
pub use self::exception::Exception;
pub use self::instructions::{Instruction, OpcodeBits};
pub use self::memory::{Memory, MemoryError};
pub use self::registers::{Reg, Registers};

use self::instructions::register_digits;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("CPU exception: {0}")]
    Exception(#[from] Exception),

    #[error("console error: {0}")]
    Console(#[from] ConsoleError),

    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("invalid input {input:?}, expected {expected}")]
    InvalidInput {
        input: String,
        expected: &'static str,
    },
}

// Implement a MemoryError -> ProcessorError conversion to simplify code
impl From<MemoryError> for ProcessorError {
    fn from(e: MemoryError) -> Self {
        Self::Exception(Exception::InvalidMemoryAccess(e))
    }
}

impl ProcessorError {
    /// Whether the console can no longer provide input
    #[must_use]
    pub fn is_console_closed(&self) -> bool {
        matches!(self, Self::Console(ConsoleError::Closed))
    }
}

type Result<T> = std::result::Result<T, ProcessorError>;

/// Lifecycle of a [`Computer`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No instruction was executed yet
    #[default]
    Uninitialized,

    /// Registers were initialized by the first instruction
    Running,
}

/// What happened after executing an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Stopped,
}

#[derive(Default)]
pub struct Computer {
    pub registers: Registers,
    pub memory: Memory,
    phase: Phase,
}

impl std::fmt::Debug for Computer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Computer {{ registers: {:?}, phase: {:?}, memory: [...] }}",
            self.registers, self.phase
        )
    }
}

impl Computer {
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn read(&self, address: Address) -> Result<Word> {
        Ok(self.memory.get(address)?)
    }

    pub(crate) fn write(&mut self, address: Address, value: Word) -> Result<()> {
        let cell = self.memory.get_mut(address)?;
        *cell = value;
        Ok(())
    }

    /// Take the binary digits of a register, leaving it cleared
    pub(crate) fn take_digits(&mut self, reg: Reg) -> String {
        let digits = register_digits(self.registers.get(reg));
        self.registers.set(reg, 0);
        digits
    }

    /// Set a register from binary digits, keeping the low 16 bits
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn set_from_digits(&mut self, reg: Reg, digits: &str) -> Result<()> {
        let value = binary_to_int(digits)?;
        self.registers.set(reg, value as u16);
        Ok(())
    }

    /// Initialize the registers on the first call, load the instruction
    /// register on the next ones, then move the program counter.
    fn fetch(&mut self) -> Result<()> {
        match self.phase {
            Phase::Uninitialized => {
                debug!("Initializing registers");
                self.registers.reset();
                self.phase = Phase::Running;
            }
            Phase::Running => {
                let word = self.read(self.registers.pc.into())?;
                self.registers.load_instruction(word);
            }
        }

        self.registers.pc = self.registers.pc.wrapping_add(1);
        Ok(())
    }

    /// Execute a decoded instruction line
    ///
    /// # Errors
    ///
    /// Fails on opcodes outside of the instruction set, on out of range
    /// addresses and on console failures or malformed console input. The
    /// program counter is moved in every case.
    #[tracing::instrument(skip(self, console), level = "debug")]
    pub fn execute(&mut self, decoded: &DecodedLine, console: &mut dyn Console) -> Result<Step> {
        self.fetch()?;

        let instruction = decoded
            .opcode_byte()
            .and_then(Instruction::decode)
            .ok_or_else(|| Exception::InvalidInstruction {
                opcode: decoded.opcode.clone(),
            })?;
        let address = decoded.address_value()?;

        info!("Executing instruction \"{}\"", instruction.listing(address));

        let step = instruction.execute(self, address, console)?;
        debug!("Register state {:?}", self.registers);
        Ok(step)
    }

    /// Decode a hexadecimal instruction line and execute it
    ///
    /// # Errors
    ///
    /// See [`Computer::execute`].
    pub fn step(&mut self, line: &str, console: &mut dyn Console) -> Result<Step> {
        let decoded = decode_line(line);
        self.execute(&decoded, console)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn running(a: i16, x: u16) -> Computer {
        let mut computer = Computer::default();
        computer.step("000000", &mut BufferedConsole::default()).unwrap();
        computer.registers.a = a;
        computer.registers.x = x;
        computer
    }

    fn run(computer: &mut Computer, line: &str) -> Step {
        computer.step(line, &mut BufferedConsole::default()).unwrap()
    }

    #[test]
    fn first_step_resets_registers_test() {
        let mut computer = Computer::default();
        computer.registers = Registers {
            a: 12,
            x: 34,
            pc: 56,
            sp: 78,
            ir: 90,
        };
        *computer.memory.get_mut(56).unwrap() = 0xAB;
        assert_eq!(computer.phase(), Phase::Uninitialized);

        assert_eq!(run(&mut computer, "000000"), Step::Stopped);
        assert_eq!(computer.phase(), Phase::Running);
        assert_eq!(
            computer.registers,
            Registers {
                pc: 1,
                ..Registers::default()
            }
        );
    }

    #[test]
    fn fetch_loads_instruction_register_test() {
        let mut computer = running(0, 0);
        *computer.memory.get_mut(1).unwrap() = 0x0123_4567;
        run(&mut computer, "000000");
        assert_eq!(computer.registers.ir, 0x23_4567);
        assert_eq!(computer.registers.pc, 2);
    }

    #[test]
    fn stop_test() {
        let mut computer = running(-7, 9);
        computer.registers.sp = 3;
        let before = computer.registers.clone();

        assert_eq!(run(&mut computer, "000000"), Step::Stopped);
        assert_eq!(
            computer.registers,
            Registers {
                pc: before.pc + 1,
                ..before
            }
        );
    }

    #[test]
    fn invalid_opcode_test() {
        let mut computer = running(5, 6);
        let before = computer.registers.clone();
        let err = computer
            .step("600010", &mut BufferedConsole::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::Exception(Exception::InvalidInstruction { .. })
        ));
        assert_eq!(computer.registers.a, before.a);
        assert_eq!(computer.registers.x, before.x);
        assert_eq!(computer.registers.pc, before.pc + 1);
    }

    #[test]
    fn invalid_hex_opcode_test() {
        let mut computer = running(0, 0);
        let err = computer
            .step("Z00010", &mut BufferedConsole::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::Exception(Exception::InvalidInstruction { .. })
        ));
    }

    #[test]
    fn out_of_range_address_test() {
        let mut computer = running(0, 0);
        let decoded = decode_line("C0123456");
        assert_eq!(decoded.address_value(), Ok(0x12345));
        let err = computer
            .execute(&decoded, &mut BufferedConsole::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::Exception(Exception::InvalidMemoryAccess(
                MemoryError::InvalidAddress(0x12345)
            ))
        ));
    }

    #[test]
    fn deci_deco_test() {
        let mut computer = Computer::default();
        let mut console = BufferedConsole::new(["42"]);

        computer.step("30FFFE", &mut console).unwrap();
        assert_eq!(computer.memory.get(0xFFFE), Ok(42));
        computer.step("38FFFE", &mut console).unwrap();

        assert_eq!(console.output(), "42");
        assert_eq!(console.prompts(), ["Enter an integer value: "]);
        assert_eq!(computer.registers.pc, 2);
    }

    #[test]
    fn deci_negative_is_not_masked_test() {
        let mut computer = Computer::default();
        let mut console = BufferedConsole::new(["-1"]);
        computer.step("300010", &mut console).unwrap();
        assert_eq!(computer.memory.get(0x10), Ok(0xFFFF_FFFF));
    }

    #[test]
    fn deci_invalid_input_test() {
        let mut computer = Computer::default();
        let mut console = BufferedConsole::new(["forty-two"]);
        let err = computer.step("300010", &mut console).unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidInput { .. }));
        assert_eq!(computer.memory.get(0x10), Ok(0));
    }

    #[test]
    fn console_closed_test() {
        let mut computer = Computer::default();
        let err = computer
            .step("490010", &mut BufferedConsole::default())
            .unwrap_err();
        assert!(err.is_console_closed());
    }

    #[test]
    fn chari_charo_test() {
        let mut computer = Computer::default();
        let mut console = BufferedConsole::new(["  hello"]);

        computer.step("480020", &mut console).unwrap();
        assert_eq!(computer.memory.get(0x20), Ok(u32::from('h')));
        computer.step("510020", &mut console).unwrap();

        assert_eq!(console.output(), "h");
        assert_eq!(console.prompts(), ["Enter a character: "]);
    }

    #[test]
    fn charo_outside_character_range_test() {
        let mut computer = Computer::default();
        let mut console = BufferedConsole::default();
        console.push_input("-1");

        computer.step("300010", &mut console).unwrap();
        computer.step("500010", &mut console).unwrap();
        assert_eq!(console.output(), "4294967295");

        *computer.memory.get_mut(0x20).unwrap() = 0xD800;
        computer.step("500020", &mut console).unwrap();
        assert_eq!(console.output(), "429496729555296");
    }

    #[test]
    fn add_test() {
        let mut computer = running(5, 11);
        *computer.memory.get_mut(0x0100).unwrap() = 3;

        run(&mut computer, "700100");
        assert_eq!(computer.registers.a, 8);
        assert_eq!(computer.registers.x, 11);

        run(&mut computer, "780100");
        assert_eq!(computer.registers.a, 8);
        assert_eq!(computer.registers.x, 14);
    }

    #[test]
    fn add_wraps_test() {
        let mut computer = running(i16::MAX, u16::MAX);
        *computer.memory.get_mut(0x0100).unwrap() = 1;

        run(&mut computer, "710100");
        assert_eq!(computer.registers.a, i16::MIN);

        run(&mut computer, "790100");
        assert_eq!(computer.registers.x, 0);
    }

    #[test]
    fn sub_test() {
        let mut computer = running(5, 2);
        *computer.memory.get_mut(0x0100).unwrap() = 7;

        run(&mut computer, "800100");
        assert_eq!(computer.registers.a, -2);

        run(&mut computer, "880100");
        assert_eq!(computer.registers.x, u16::MAX - 4);
    }

    #[test]
    fn not_test() {
        let mut computer = running(0b101, 0b1100);

        run(&mut computer, "180000");
        assert_eq!(computer.registers.a, 0b010);

        run(&mut computer, "190000");
        assert_eq!(computer.registers.x, 0b0011);

        // Zero has no digits to flip
        let mut computer = running(0, 0);
        run(&mut computer, "180000");
        assert_eq!(computer.registers.a, 0);
    }

    #[test]
    fn shift_test() {
        let mut computer = running(-6, 100);

        run(&mut computer, "1C0000");
        assert_eq!(computer.registers.a, -12);

        run(&mut computer, "1E0000");
        assert_eq!(computer.registers.a, -6);

        // The index variants write the shifted accumulator
        run(&mut computer, "1D0000");
        assert_eq!(computer.registers.x, (-12_i16) as u16);
        assert_eq!(computer.registers.a, -6);

        run(&mut computer, "1F0000");
        assert_eq!(computer.registers.x, (-3_i16) as u16);
    }

    #[test]
    fn rotate_test() {
        let mut computer = running(0b110, 0b1011);

        run(&mut computer, "200000");
        assert_eq!(computer.registers.a, 0b101);
        run(&mut computer, "220000");
        assert_eq!(computer.registers.a, 0b110);

        run(&mut computer, "230000");
        assert_eq!(computer.registers.x, 0b1101);
        run(&mut computer, "210000");
        assert_eq!(computer.registers.x, 0b1011);
    }

    #[test]
    fn rotate_inverse_test() {
        for value in [1_u16, 0b11, 0b110, 0b1101_0111, 0xFFFF, 0xC001] {
            let mut computer = running(0, value);
            run(&mut computer, "210000");
            run(&mut computer, "230000");
            assert_eq!(computer.registers.x, value, "{value:#b}");
        }
    }

    #[test]
    fn and_test() {
        let mut computer = Computer::default();
        let mut console = BufferedConsole::new(["11110000"]);
        computer.step("000000", &mut console).unwrap();
        computer.registers.a = 0b1010_1010;

        computer.step("900000", &mut console).unwrap();
        assert_eq!(computer.registers.a, 0b1010_0000);
        assert_eq!(
            console.prompts(),
            ["Enter binary string of 1 byte to compare with (bitwise AND): "]
        );
    }

    #[test]
    fn and_short_mask_test() {
        let mut computer = running(0, 0b1111);
        let mut console = BufferedConsole::new(["11"]);
        computer.step("980000", &mut console).unwrap();
        assert_eq!(computer.registers.x, 0b1100);
    }

    #[test]
    fn or_reduces_like_and_test() {
        let mut computer = running(0b1010_1010, 0);
        let mut console = BufferedConsole::new(["11110000"]);

        computer.step("A00000", &mut console).unwrap();
        assert_eq!(computer.registers.a, 0b1010_0000);
        assert_eq!(
            console.prompts(),
            ["Enter binary string of 1 byte to compare with (bitwise OR): "]
        );
    }

    #[test]
    fn and_invalid_input_clears_register_test() {
        let mut computer = running(0b111, 0);
        let mut console = BufferedConsole::new(["12"]);
        let err = computer.step("900000", &mut console).unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidInput { .. }));
        assert_eq!(computer.registers.a, 0);
    }

    #[test]
    fn load_store_test() {
        let mut computer = running(-2, 513);

        run(&mut computer, "E00200");
        run(&mut computer, "E80201");
        assert_eq!(computer.memory.get(0x0200), Ok(0xFFFF_FFFE));
        assert_eq!(computer.memory.get(0x0201), Ok(513));

        run(&mut computer, "C80200");
        assert_eq!(computer.registers.x, 0xFFFE);
        run(&mut computer, "C00201");
        assert_eq!(computer.registers.a, 513);
    }

    #[test]
    fn byte_load_store_test() {
        let mut computer = running(300, 7);

        // Neither form masks the value to a byte
        run(&mut computer, "F80300");
        assert_eq!(computer.memory.get(0x0300), Ok(300));

        computer.registers.a = 0;
        run(&mut computer, "D90300");
        assert_eq!(computer.registers.a, 300);
        assert_eq!(computer.registers.x, 7);
    }

    #[test]
    fn program_counter_wraps_test() {
        let mut computer = running(0, 0);
        computer.registers.pc = u16::MAX;
        run(&mut computer, "000000");
        assert_eq!(computer.registers.pc, 0);
    }
}

use bitflags::bitflags;
use parse_display::Display;
use tracing::debug;

use crate::constants::{Address, Word};
use crate::convert::int_to_binary;

use super::console::{parse_bits, parse_decimal, read_token, Console};
use super::registers::Reg;
use super::{Computer, ProcessorError, Step};

bitflags! {
    /// Modifier bits of an opcode byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpcodeBits: u8 {
        /// Register select of the unary group (last binary digit)
        const UNARY_INDEX  = 0b0000_0001;
        /// Must be clear in the binary group
        const RESERVED     = 0b0000_0110;
        /// Register select of the binary group (fifth binary digit)
        const BINARY_INDEX = 0b0000_1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Instruction {
    /// Stop execution
    #[display("STOP")]
    Stop,

    /// Bitwise inversion of the register's binary digits
    #[display("NOT{0}")]
    Not(Reg),

    /// Arithmetic shift left
    #[display("SHL{0}")]
    Shl(Reg),

    /// Arithmetic shift right
    #[display("SHR{0}")]
    Shr(Reg),

    /// Rotate the register's binary digits to the left
    #[display("ROL{0}")]
    Rol(Reg),

    /// Rotate the register's binary digits to the right
    #[display("ROR{0}")]
    Ror(Reg),

    /// Read a decimal number into memory
    #[display("DECI")]
    Deci,

    /// Write a memory cell as a decimal number
    #[display("DECO")]
    Deco,

    /// Read a character into memory
    #[display("CHARI")]
    Chari,

    /// Write a memory cell as a character
    #[display("CHARO")]
    Charo,

    /// Add a memory cell to a register
    #[display("ADD{0}")]
    Add(Reg),

    /// Substract a memory cell from a register
    #[display("SUB{0}")]
    Sub(Reg),

    /// Mask the register's binary digits with a byte read from the console
    #[display("AND{0}")]
    And(Reg),

    /// Same reduction as `AND`, with its own prompt
    #[display("OR{0}")]
    Or(Reg),

    /// Load a register from memory
    #[display("LDR{0}")]
    Ld(Reg),

    /// Load the accumulator from memory
    #[display("LDBYTE")]
    LdByte,

    /// Store a register to memory
    #[display("STR{0}")]
    St(Reg),

    /// Store the accumulator to memory
    #[display("STBYTE")]
    StByte,
}

impl Instruction {
    /// Decode an opcode byte
    ///
    /// Returns `None` for opcodes outside of the instruction set.
    #[must_use]
    pub fn decode(opcode: u8) -> Option<Self> {
        use Instruction::*;

        let bits = OpcodeBits::from_bits_retain(opcode);
        let unary_reg = Reg::from_selector(bits.contains(OpcodeBits::UNARY_INDEX));
        let binary_reg = Reg::from_selector(bits.contains(OpcodeBits::BINARY_INDEX));

        if opcode == 0 {
            return Some(Stop);
        }

        let unary = match opcode >> 1 {
            0x0C => Some(Not(unary_reg)),
            0x0E => Some(Shl(unary_reg)),
            0x0F => Some(Shr(unary_reg)),
            0x10 => Some(Rol(unary_reg)),
            0x11 => Some(Ror(unary_reg)),
            0x18 => Some(Deci),
            0x1C => Some(Deco),
            0x24 => Some(Chari),
            0x28 => Some(Charo),
            _ => None,
        };

        if unary.is_some() || bits.intersects(OpcodeBits::RESERVED) {
            return unary;
        }

        match opcode >> 4 {
            0x7 => Some(Add(binary_reg)),
            0x8 => Some(Sub(binary_reg)),
            0x9 => Some(And(binary_reg)),
            0xA => Some(Or(binary_reg)),
            0xC => Some(Ld(binary_reg)),
            0xD => Some(LdByte),
            0xE => Some(St(binary_reg)),
            0xF => Some(StByte),
            _ => None,
        }
    }

    /// Whether the instruction reads or writes the addressed memory cell
    #[must_use]
    pub const fn uses_address(&self) -> bool {
        use Instruction::*;

        matches!(
            self,
            Deci | Deco | Chari | Charo | Add(_) | Sub(_) | Ld(_) | LdByte | St(_) | StByte
        )
    }

    /// Mnemonic followed by the address for instructions that use one
    #[must_use]
    pub fn listing(&self, address: Address) -> String {
        if self.uses_address() {
            format!("{self} {address:#06x}")
        } else {
            self.to_string()
        }
    }

    /// Execute the instruction
    #[tracing::instrument(skip(computer, console))]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn execute(
        &self,
        computer: &mut Computer,
        address: Address,
        console: &mut dyn Console,
    ) -> Result<Step, ProcessorError> {
        use Instruction::*;

        match *self {
            Stop => return Ok(Step::Stopped),

            Not(reg) => {
                let digits = computer.take_digits(reg);
                let flipped: String = digits
                    .chars()
                    .map(|c| if c == '1' { '0' } else { '1' })
                    .collect();
                debug!("!{} = {}", digits, flipped);
                computer.set_from_digits(reg, &flipped)?;
            }

            // Both variants shift the accumulator
            Shl(reg) => {
                let res = computer.registers.a.wrapping_shl(1);
                debug!("{} << 1 = {}", computer.registers.a, res);
                computer.registers.set(reg, res as u16);
            }

            Shr(reg) => {
                let res = computer.registers.a >> 1;
                debug!("{} >> 1 = {}", computer.registers.a, res);
                computer.registers.set(reg, res as u16);
            }

            Rol(reg) => {
                let mut digits: Vec<char> = computer.take_digits(reg).chars().collect();
                if !digits.is_empty() {
                    digits.rotate_left(1);
                }
                let digits: String = digits.into_iter().collect();
                computer.set_from_digits(reg, &digits)?;
            }

            Ror(reg) => {
                let mut digits: Vec<char> = computer.take_digits(reg).chars().collect();
                if !digits.is_empty() {
                    digits.rotate_right(1);
                }
                let digits: String = digits.into_iter().collect();
                computer.set_from_digits(reg, &digits)?;
            }

            Deci => {
                let token = read_token(console, "Enter an integer value: ")?;
                let (_, value) =
                    parse_decimal(&token).map_err(|_| ProcessorError::InvalidInput {
                        input: token.clone(),
                        expected: "a decimal integer",
                    })?;
                debug!(address, value, "Storing decimal input");
                computer.write(address, value as Word)?;
            }

            Deco => {
                let value = computer.read(address)?;
                console.write(&value.to_string())?;
            }

            Chari => {
                let token = read_token(console, "Enter a character: ")?;
                let value = token.chars().next().map_or(0, Word::from);
                debug!(address, value, "Storing character input");
                computer.write(address, value)?;
            }

            Charo => {
                let value = computer.read(address)?;
                // Cells outside the character range are written as numbers
                let text = char::from_u32(value).map_or_else(|| value.to_string(), String::from);
                console.write(&text)?;
            }

            Add(reg) => {
                let a = computer.read(address)? as u16;
                let b = computer.registers.get(reg);
                let res = b.wrapping_add(a);
                debug!("{} + {} = {}", b, a, res);
                computer.registers.set(reg, res);
            }

            Sub(reg) => {
                let a = computer.read(address)? as u16;
                let b = computer.registers.get(reg);
                let res = b.wrapping_sub(a);
                debug!("{} - {} = {}", b, a, res);
                computer.registers.set(reg, res);
            }

            And(reg) => {
                let prompt = "Enter binary string of 1 byte to compare with (bitwise AND): ";
                mask_with_input(computer, reg, console, prompt)?;
            }

            Or(reg) => {
                let prompt = "Enter binary string of 1 byte to compare with (bitwise OR): ";
                mask_with_input(computer, reg, console, prompt)?;
            }

            Ld(reg) => {
                let value = computer.read(address)?;
                computer.registers.set(reg, value as u16);
            }

            LdByte => {
                let value = computer.read(address)?;
                computer.registers.set(Reg::A, value as u16);
            }

            St(reg) => {
                let value = match reg {
                    Reg::A => i32::from(computer.registers.a) as Word,
                    Reg::X => Word::from(computer.registers.x),
                };
                computer.write(address, value)?;
            }

            StByte => {
                let value = i32::from(computer.registers.a) as Word;
                computer.write(address, value)?;
            }
        };

        Ok(Step::Continue)
    }
}

/// Keep the register digits that are `1` in both the register and the
/// binary string read from the console, compared from the left.
///
/// The register is cleared before reading.
fn mask_with_input(
    computer: &mut Computer,
    reg: Reg,
    console: &mut dyn Console,
    prompt: &str,
) -> Result<(), ProcessorError> {
    let digits = computer.take_digits(reg);
    let token = read_token(console, prompt)?;
    let (_, mask) = parse_bits(&token).map_err(|_| ProcessorError::InvalidInput {
        input: token.clone(),
        expected: "a binary string",
    })?;

    let masked: String = digits
        .chars()
        .zip(mask.chars().chain(std::iter::repeat('0')))
        .map(|(d, m)| if d == '1' && m == '1' { '1' } else { '0' })
        .collect();
    debug!("{} & {} = {}", digits, mask, masked);
    computer.set_from_digits(reg, &masked)
}

/// Binary digits of a register, as used by the digit-wise instructions
pub(crate) fn register_digits(bits: u16) -> String {
    int_to_binary(u64::from(bits))
}

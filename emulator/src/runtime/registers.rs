use parse_display::Display;

use crate::constants::{Word, INSTRUCTION_REGISTER_MASK};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    /// Accumulator
    pub a: i16,

    /// Index register
    pub x: u16,

    /// Program counter
    pub pc: u16,

    /// Stack pointer, never written by any instruction
    pub sp: u16,

    /// Instruction register, 24 bits wide
    pub ir: u32,
}

impl Registers {
    /// Set every register to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Raw 16-bit pattern of an operand register
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn get(&self, reg: Reg) -> u16 {
        match reg {
            Reg::A => self.a as u16,
            Reg::X => self.x,
        }
    }

    /// Set an operand register from its 16-bit pattern
    #[allow(clippy::cast_possible_wrap)]
    pub fn set(&mut self, reg: Reg, bits: u16) {
        match reg {
            Reg::A => self.a = bits as i16,
            Reg::X => self.x = bits,
        }
    }

    pub(crate) fn load_instruction(&mut self, word: Word) {
        self.ir = word & INSTRUCTION_REGISTER_MASK;
    }
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Registers:")?;
        writeln!(f, "  {:<22}{}", "Accumulator:", self.a)?;
        writeln!(f, "  {:<22}{}", "Index Register:", self.x)?;
        writeln!(f, "  {:<22}{}", "Program Counter:", self.pc)?;
        writeln!(f, "  {:<22}{}", "Stack Pointer:", self.sp)?;
        write!(f, "  {:<22}{}", "Instruction Register:", self.ir)
    }
}

/// Operand register picked by the register-select bit of an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(style = "UPPERCASE")]
pub enum Reg {
    /// Accumulator
    A,

    /// Index register
    X,
}

impl Reg {
    /// Register chosen by a selector bit, the accumulator when it is clear
    pub(crate) const fn from_selector(index: bool) -> Self {
        if index {
            Reg::X
        } else {
            Reg::A
        }
    }
}

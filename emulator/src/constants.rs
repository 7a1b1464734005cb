/// Memory address, wide enough for the 5-digit address field
pub type Address = u32;

/// Content of a memory cell
pub type Word = u32;

/// Total number of memory cells
pub const MEMORY_SIZE: Address = 0x1_0000;

/// Number of hexadecimal characters in an instruction line
pub const LINE_LENGTH: usize = 6;

/// Number of hexadecimal characters holding the opcode
pub(crate) const OPCODE_DIGITS: usize = 2;

/// Maximum number of hexadecimal characters taken for the address field
pub(crate) const ADDRESS_DIGITS: usize = 5;

/// Width of the opcode, in binary digits
pub(crate) const OPCODE_BITS: usize = 8;

/// Mask applied when loading the 24-bit instruction register
pub(crate) const INSTRUCTION_REGISTER_MASK: u32 = 0x00FF_FFFF;

/// Line that ends an interactive session
pub const EXIT_SENTINEL: &str = "-1";

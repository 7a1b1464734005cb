//! Fetch-decode-execute simulator for a small PEP/8-style instruction set.
//!
//! Instruction lines are six hexadecimal characters: a two-character opcode
//! followed by an address. [`decoder::decode_line`] splits them into binary
//! digits, and [`runtime::Computer`] executes them one at a time against its
//! registers and its 65536 memory cells.

pub mod constants;
pub mod convert;
pub mod decoder;
pub mod program;
pub mod runtime;

pub use self::{decoder::decode_line, program::parse};

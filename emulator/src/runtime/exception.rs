use thiserror::Error;

use super::memory::MemoryError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Exception {
    #[error("invalid opcode {opcode:?}")]
    InvalidInstruction { opcode: String },

    #[error("invalid memory access ({0})")]
    InvalidMemoryAccess(#[from] MemoryError),
}

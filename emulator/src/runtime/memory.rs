use thiserror::Error;

use crate::constants::{Address, Word, MEMORY_SIZE};

/// Represents errors related to memory manipulations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// The given address was invalid
    #[error("invalid address {0:#x}")]
    InvalidAddress(Address),
}

/// Holds the memory cells of the computer.
///
/// It has 65536 cells, all set to zero on creation. Each cell is meant to
/// hold a byte but nothing masks what gets stored in it.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    inner: Box<[Word]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            inner: vec![0; MEMORY_SIZE as usize].into_boxed_slice(),
        }
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.inner.iter().filter(|&&cell| cell != 0).count();
        write!(f, "Memory {{ cells: {}, non_zero: {used} }}", self.inner.len())
    }
}

impl Memory {
    /// Get the value of a cell
    ///
    /// # Errors
    ///
    /// It fails if the address is out of bounds.
    pub fn get(&self, address: Address) -> Result<Word, MemoryError> {
        let addr: usize = address
            .try_into()
            .map_err(|_e| MemoryError::InvalidAddress(address))?;

        self.inner
            .get(addr)
            .copied()
            .ok_or(MemoryError::InvalidAddress(address))
    }

    /// Get a mutable reference to a cell
    ///
    /// # Errors
    ///
    /// It fails if the address is out of bounds.
    pub fn get_mut(&mut self, address: Address) -> Result<&mut Word, MemoryError> {
        let addr: usize = address
            .try_into()
            .map_err(|_e| MemoryError::InvalidAddress(address))?;

        self.inner
            .get_mut(addr)
            .ok_or(MemoryError::InvalidAddress(address))
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

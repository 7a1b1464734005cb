use tracing::warn;

use crate::constants::{Address, ADDRESS_DIGITS, OPCODE_BITS, OPCODE_DIGITS};
use crate::convert::{binary_to_int, hex_to_binary_lossy, ConversionError, InvalidDigit};

/// An instruction line split into its opcode and address fields, both as
/// binary digits
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedLine {
    /// Binary digits of the opcode field, 8 of them for a well-formed line
    pub opcode: String,

    /// Binary digits of the address field
    pub address: String,

    /// Characters of the line that were not hexadecimal digits
    pub invalid: Vec<InvalidDigit>,
}

impl DecodedLine {
    /// The opcode as a byte, if the field holds exactly 8 binary digits
    #[must_use]
    pub fn opcode_byte(&self) -> Option<u8> {
        if self.opcode.len() != OPCODE_BITS {
            return None;
        }

        binary_to_int(&self.opcode)
            .ok()
            .and_then(|value| u8::try_from(value).ok())
    }

    /// The numeric value of the address field
    ///
    /// # Errors
    ///
    /// Fails if the field holds something else than binary digits or does not
    /// fit in an address.
    pub fn address_value(&self) -> Result<Address, ConversionError> {
        let value = binary_to_int(&self.address)?;
        Address::try_from(value).map_err(|_| ConversionError::Overflow {
            bits: self.address.clone(),
        })
    }
}

impl std::fmt::Display for DecodedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "opcode {} address {}", self.opcode, self.address)
    }
}

/// Split a hexadecimal line into its opcode and address fields.
///
/// The opcode is the first two characters, the address is up to five
/// characters starting right after it. Invalid characters are reported and
/// skipped; the length of the line is not checked here.
#[tracing::instrument(level = "debug")]
pub fn decode_line(line: &str) -> DecodedLine {
    let opcode: String = line.chars().take(OPCODE_DIGITS).collect();
    let address: String = line
        .chars()
        .skip(OPCODE_DIGITS)
        .take(ADDRESS_DIGITS)
        .collect();

    let (opcode, mut invalid) = hex_to_binary_lossy(&opcode);
    let (address, invalid_address) = hex_to_binary_lossy(&address);
    invalid.extend(invalid_address.into_iter().map(|d| InvalidDigit {
        position: d.position + OPCODE_DIGITS,
        ..d
    }));

    for digit in &invalid {
        warn!(
            digit = %digit.digit,
            position = digit.position,
            "Invalid opcode or address character"
        );
    }

    DecodedLine {
        opcode,
        address,
        invalid,
    }
}

//! Conversions between hexadecimal text, binary-digit text and integers.
//!
//! Binary-digit strings are big-endian (most significant digit first) and only
//! ever contain `0` and `1`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("invalid hexadecimal digit {digit:?} at position {position}")]
    InvalidHexDigit { digit: char, position: usize },

    #[error("invalid binary digit {digit:?} at position {position}")]
    InvalidBinaryDigit { digit: char, position: usize },

    #[error("binary number {bits} does not fit in 64 bits")]
    Overflow { bits: String },
}

/// A character rejected while decoding hexadecimal text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDigit {
    pub digit: char,
    pub position: usize,
}

impl From<InvalidDigit> for ConversionError {
    fn from(InvalidDigit { digit, position }: InvalidDigit) -> Self {
        Self::InvalidHexDigit { digit, position }
    }
}

fn nibble(digit: char) -> Option<&'static str> {
    const NIBBLES: [&str; 16] = [
        "0000", "0001", "0010", "0011", "0100", "0101", "0110", "0111", "1000", "1001", "1010",
        "1011", "1100", "1101", "1110", "1111",
    ];

    digit
        .to_digit(16)
        .and_then(|value| NIBBLES.get(value as usize).copied())
}

/// Expand each hexadecimal character into its four binary digits.
///
/// # Errors
///
/// Fails on the first character outside `[0-9A-Fa-f]`.
pub fn hex_to_binary(hex: &str) -> Result<String, ConversionError> {
    let (bits, invalid) = hex_to_binary_lossy(hex);
    match invalid.first() {
        Some(&digit) => Err(digit.into()),
        None => Ok(bits),
    }
}

/// Expand hexadecimal text, skipping invalid characters.
///
/// The digits of every valid character are kept in input order; the rejected
/// characters are returned alongside so the caller can report them.
#[must_use]
pub fn hex_to_binary_lossy(hex: &str) -> (String, Vec<InvalidDigit>) {
    let mut bits = String::with_capacity(hex.len() * 4);
    let mut invalid = Vec::new();

    for (position, digit) in hex.chars().enumerate() {
        match nibble(digit) {
            Some(expansion) => bits.push_str(expansion),
            None => invalid.push(InvalidDigit { digit, position }),
        }
    }

    (bits, invalid)
}

/// Interpret a big-endian string of binary digits. The empty string is 0.
///
/// # Errors
///
/// Fails on characters other than `0` and `1`, or if the value needs more
/// than 64 bits.
pub fn binary_to_int(bits: &str) -> Result<u64, ConversionError> {
    bits.chars()
        .enumerate()
        .try_fold(0_u64, |acc, (position, digit)| {
            let bit = match digit {
                '0' => 0,
                '1' => 1,
                digit => return Err(ConversionError::InvalidBinaryDigit { digit, position }),
            };

            acc.checked_mul(2)
                .map(|acc| acc | bit)
                .ok_or_else(|| ConversionError::Overflow {
                    bits: bits.to_owned(),
                })
        })
}

/// Minimal big-endian binary representation, without leading zeros.
///
/// Zero has no significant digit and maps to the empty string.
#[must_use]
pub fn int_to_binary(value: u64) -> String {
    if value == 0 {
        String::new()
    } else {
        format!("{value:b}")
    }
}

use thiserror::Error;

use crate::core::text::TextError;
use crate::features::compression::CompressionError;

/// Errors that can occur during decoding.
///
/// Any decode error means the whole input is rejected; no partial output is
/// ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A window of the input is not a symbol of the alphabet
    #[error("unknown symbol '{token}' at token {position}")]
    UnknownSymbol { token: String, position: usize },

    /// The input does not split into whole tokens, or whole groups of tokens
    #[error("invalid length: input holds {actual} characters, expected a multiple of {multiple}")]
    InvalidLength { actual: usize, multiple: usize },

    /// A digit pair decodes to a value that no bit group can produce
    #[error("digit pair at token {position} decodes to {value}, above the maximum of {max}")]
    InvalidDigitPair {
        value: usize,
        max: usize,
        position: usize,
    },

    /// The digits after the padding token are missing or out of range
    #[error("malformed padding count '{found}' (expected 1..{bit_length})")]
    MalformedPaddingCount { found: String, bit_length: u32 },

    /// The decoded bytes are not valid in the requested text encoding
    #[error(transparent)]
    InvalidText(#[from] TextError),
}

impl DecodeError {
    pub fn unknown_symbol(token: &str, position: usize) -> Self {
        DecodeError::UnknownSymbol {
            token: token.to_string(),
            position,
        }
    }

    pub fn malformed_padding_count(found: &str, bit_length: u32) -> Self {
        // Keep the message readable when the trailer is long garbage
        let found = if found.chars().count() > 16 {
            format!("{}...", found.chars().take(16).collect::<String>())
        } else {
            found.to_string()
        };
        DecodeError::MalformedPaddingCount { found, bit_length }
    }
}

/// Errors from the option-driven codec entry points, which may compress or
/// decompress around the radix step.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Compression(#[from] CompressionError),
}

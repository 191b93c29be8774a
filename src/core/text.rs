use serde::Deserialize;
use thiserror::Error;

/// Errors converting between bytes and text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("decoded bytes are not valid UTF-8 (invalid sequence at byte {offset})")]
    InvalidUtf8 { offset: usize },

    #[error("character '{ch}' at position {position} has no Latin-1 representation")]
    Unrepresentable { ch: char, position: usize },
}

/// Text encoding used to turn caller-supplied text into bytes and back.
///
/// `Latin1` maps every byte to the codepoint of the same value, so any byte
/// sequence survives a bytes → text → bytes trip unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl TextEncoding {
    pub fn encode(self, text: &str) -> Result<Vec<u8>, TextError> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Latin1 => text
                .chars()
                .enumerate()
                .map(|(position, ch)| {
                    u8::try_from(u32::from(ch))
                        .map_err(|_| TextError::Unrepresentable { ch, position })
                })
                .collect(),
        }
    }

    pub fn decode(self, bytes: Vec<u8>) -> Result<String, TextError> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes).map_err(|e| TextError::InvalidUtf8 {
                offset: e.utf8_error().valid_up_to(),
            }),
            TextEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

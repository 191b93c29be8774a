use crate::core::text::{TextEncoding, TextError};

/// Data flowing between pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Bytes(Vec<u8>),
    Text(String),
}

impl Payload {
    pub fn is_text(&self) -> bool {
        matches!(self, Payload::Text(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::Bytes(bytes) => bytes.len(),
            Payload::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the bytes, encoding text with `encoding` if needed.
    pub fn into_bytes(self, encoding: TextEncoding) -> Result<Vec<u8>, TextError> {
        match self {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::Text(text) => encoding.encode(&text),
        }
    }

    /// Returns the text, decoding bytes with `encoding` if needed.
    pub fn into_text(self, encoding: TextEncoding) -> Result<String, TextError> {
        match self {
            Payload::Bytes(bytes) => encoding.decode(bytes),
            Payload::Text(text) => Ok(text),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

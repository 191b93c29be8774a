//! Base-N text encoding over arbitrary alphabets.
//!
//! Bytes are cut into groups of `ceil(log2(N))` bits. Power-of-two
//! alphabets write one symbol per group; any other size writes each group as
//! two base-N digits. A trailing padding marker records how many zero bits
//! completed the last group, so decoding restores the exact byte length.
//!
//! ```
//! use base_n::{Alphabet, decode, encode};
//!
//! let alphabet = Alphabet::from_chars("abcdefgh", '=').unwrap();
//! let encoded = encode(b"A", &alphabet);
//! assert_eq!(encoded, "cac=1");
//! assert_eq!(decode(&encoded, &alphabet).unwrap(), b"A");
//! ```

mod core;
mod encoders;
mod features;
mod pipeline;
pub mod prelude;

pub use crate::core::alphabet::{Alphabet, AlphabetError, Collision};
pub use crate::core::builder::{AlphabetBuilder, CONFUSABLES};
pub use crate::core::config::{
    AlphabetConfig, AlphabetRegistry, EncodingMode, PaddingPolicy, RegistryError,
};
pub use crate::core::text::{TextEncoding, TextError};
pub use encoders::algorithms::{CodecError, DecodeError, DecodeOptions, EncodeOptions, RadixCodec};
pub use encoders::streaming::{StreamCodec, StreamError, StreamingDecoder, StreamingEncoder};
pub use features::{
    CompressionAlgorithm, CompressionError, EncryptionError, EncryptionKey, compress, decompress,
    decrypt, encrypt,
};
pub use pipeline::{
    ByteTransform, Payload, Pipeline, PipelineError, Stage, StageError, TextTransform,
};

/// Encodes `data` with a codec in the mode `alphabet` implies.
pub fn encode(data: &[u8], alphabet: &Alphabet) -> String {
    RadixCodec::new(alphabet.clone()).encode(data)
}

/// Decodes `encoded` with a codec in the mode `alphabet` implies.
pub fn decode(encoded: &str, alphabet: &Alphabet) -> Result<Vec<u8>, DecodeError> {
    RadixCodec::new(alphabet.clone()).decode_to_bytes(encoded)
}

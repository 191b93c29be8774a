//! Convenient re-exports for common usage.
//!
//! # Example
//!
//! ```
//! use base_n::prelude::*;
//!
//! let registry = AlphabetRegistry::load_default().unwrap();
//! let codec = registry.codec("base58").unwrap();
//! let sealed = Pipeline::new().compress(6).encode(codec).process_bytes(b"Hello").unwrap();
//! assert!(!sealed.is_empty());
//! ```

pub use crate::{
    // Core types
    Alphabet,
    AlphabetRegistry,
    CompressionAlgorithm,
    DecodeError,
    EncodingMode,
    EncryptionKey,
    Pipeline,
    RadixCodec,
    StreamCodec,
    // Core encoding/decoding
    decode,
    encode,
};

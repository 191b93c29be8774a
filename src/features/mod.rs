//! Byte-to-byte transforms that the pipeline treats as opaque stages.
//!
//! These are kept apart from the radix algorithm itself; the codec only
//! reaches for compression through its option-driven entry points.

pub mod compression;
pub mod encryption;

pub use compression::{CompressionAlgorithm, CompressionError, compress, decompress};
pub use encryption::{EncryptionError, EncryptionKey, decrypt, encrypt};

mod codec;
mod decoder;
mod encoder;

pub use codec::StreamCodec;
pub use decoder::StreamingDecoder;
pub use encoder::StreamingEncoder;

use thiserror::Error;

use crate::encoders::algorithms::DecodeError;
use crate::features::compression::CompressionError;

const CHUNK_SIZE: usize = 4096; // 4KB chunks

/// Errors from the `Read`/`Write` streaming adapters.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error("encoded input is not valid UTF-8 (at byte {offset})")]
    InvalidUtf8 { offset: usize },
}

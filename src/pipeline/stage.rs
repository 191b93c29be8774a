use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::text::{TextEncoding, TextError};
use crate::encoders::algorithms::{DecodeError, RadixCodec};
use crate::features::compression::{self, CompressionAlgorithm, CompressionError};
use crate::features::encryption::{self, EncryptionError, EncryptionKey};

use super::payload::Payload;

/// Caller-supplied byte transform.
pub type ByteTransform = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// Caller-supplied text transform.
pub type TextTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Failure inside a single stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("cannot convert stage input: {0}")]
    Text(#[from] TextError),
}

/// One step of a [`Pipeline`](super::Pipeline).
///
/// Stage payloads are shared, not copied, when a stage is cloned; codecs,
/// keys and closures are immutable so sharing is unobservable.
#[derive(Clone)]
pub enum Stage {
    Compress {
        algorithm: CompressionAlgorithm,
        level: u32,
    },
    Decompress {
        algorithm: CompressionAlgorithm,
    },
    Encrypt(EncryptionKey),
    Decrypt(EncryptionKey),
    Encode(Arc<RadixCodec>),
    Decode(Arc<RadixCodec>),
    Transform(ByteTransform),
    TransformText(TextTransform),
}

impl Stage {
    /// Short label used in logs and errors.
    pub fn name(&self) -> String {
        match self {
            Stage::Compress { algorithm, .. } => format!("compress({})", algorithm),
            Stage::Decompress { algorithm } => format!("decompress({})", algorithm),
            Stage::Encrypt(_) => "encrypt".to_string(),
            Stage::Decrypt(_) => "decrypt".to_string(),
            Stage::Encode(codec) => format!("encode(base{})", codec.alphabet().size()),
            Stage::Decode(codec) => format!("decode(base{})", codec.alphabet().size()),
            Stage::Transform(_) => "transform".to_string(),
            Stage::TransformText(_) => "transform_text".to_string(),
        }
    }

    /// The stage that undoes this one.
    ///
    /// Transforms are returned unchanged; the caller pairs them up.
    /// Inverting a `Decompress` compresses at the algorithm's default level.
    pub fn inverse(&self) -> Stage {
        match self {
            Stage::Compress { algorithm, .. } => Stage::Decompress {
                algorithm: *algorithm,
            },
            Stage::Decompress { algorithm } => Stage::Compress {
                algorithm: *algorithm,
                level: algorithm.default_level(),
            },
            Stage::Encrypt(key) => Stage::Decrypt(key.clone()),
            Stage::Decrypt(key) => Stage::Encrypt(key.clone()),
            Stage::Encode(codec) => Stage::Decode(Arc::clone(codec)),
            Stage::Decode(codec) => Stage::Encode(Arc::clone(codec)),
            Stage::Transform(_) | Stage::TransformText(_) => self.clone(),
        }
    }

    /// Whether the stage reads text rather than bytes.
    pub fn consumes_text(&self) -> bool {
        matches!(self, Stage::Decode(_) | Stage::TransformText(_))
    }

    pub(crate) fn apply(&self, input: Payload, encoding: TextEncoding) -> Result<Payload, StageError> {
        let output = match self {
            Stage::Compress { algorithm, level } => {
                let bytes = input.into_bytes(encoding)?;
                Payload::Bytes(compression::compress(&bytes, *algorithm, *level)?)
            }
            Stage::Decompress { algorithm } => {
                let bytes = input.into_bytes(encoding)?;
                Payload::Bytes(compression::decompress(&bytes, *algorithm)?)
            }
            Stage::Encrypt(key) => {
                Payload::Bytes(encryption::encrypt(&input.into_bytes(encoding)?, key)?)
            }
            Stage::Decrypt(key) => {
                Payload::Bytes(encryption::decrypt(&input.into_bytes(encoding)?, key)?)
            }
            Stage::Encode(codec) => Payload::Text(codec.encode(&input.into_bytes(encoding)?)),
            Stage::Decode(codec) => {
                Payload::Bytes(codec.decode_to_bytes(&input.into_text(encoding)?)?)
            }
            Stage::Transform(f) => Payload::Bytes(f(&input.into_bytes(encoding)?)),
            Stage::TransformText(f) => Payload::Text(f(&input.into_text(encoding)?)),
        };
        Ok(output)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Compress { algorithm, level } => f
                .debug_struct("Compress")
                .field("algorithm", algorithm)
                .field("level", level)
                .finish(),
            Stage::Decompress { algorithm } => f
                .debug_struct("Decompress")
                .field("algorithm", algorithm)
                .finish(),
            Stage::Encrypt(key) => f.debug_tuple("Encrypt").field(key).finish(),
            Stage::Decrypt(key) => f.debug_tuple("Decrypt").field(key).finish(),
            Stage::Encode(codec) => f.debug_tuple("Encode").field(codec).finish(),
            Stage::Decode(codec) => f.debug_tuple("Decode").field(codec).finish(),
            Stage::Transform(_) => f.write_str("Transform(..)"),
            Stage::TransformText(_) => f.write_str("TransformText(..)"),
        }
    }
}

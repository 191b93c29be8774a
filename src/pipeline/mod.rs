//! Composable, invertible processing stacks.
//!
//! A [`Pipeline`] runs its stages strictly in the order they were appended.
//! Each stage receives the previous stage's output converted to the kind of
//! input it reads: codec decoding and text transforms read text, every other
//! stage reads bytes. Conversions only ever happen where the caller's input
//! enters and where the result leaves, because codec stages already pin the
//! bytes/text boundary inside the stack.
//!
//! ```
//! use base_n::{Alphabet, Pipeline, RadixCodec};
//!
//! let codec = RadixCodec::new(Alphabet::from_chars("0123456789", '=').unwrap());
//! let forward = Pipeline::new().compress(6).encrypt("secret").encode(codec);
//!
//! let sealed = forward.process_bytes(b"hello hello hello").unwrap();
//! let opened = forward.reverse().process_bytes(&sealed).unwrap();
//! assert_eq!(opened, b"hello hello hello");
//! ```

mod payload;
mod stage;

pub use payload::Payload;
pub use stage::{ByteTransform, Stage, StageError, TextTransform};

use std::sync::Arc;

use thiserror::Error;

use crate::core::text::{TextEncoding, TextError};
use crate::encoders::algorithms::RadixCodec;
use crate::features::compression::CompressionAlgorithm;
use crate::features::encryption::EncryptionKey;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline failed at stage {index} ({stage}): {source}")]
    Stage {
        index: usize,
        stage: String,
        #[source]
        source: StageError,
    },

    #[error("pipeline output cannot be converted: {0}")]
    Output(#[source] TextError),
}

/// An ordered stack of [`Stage`]s.
///
/// Builder calls consume the pipeline and return it with one more stage.
/// Cloning copies the stage list while sharing the stage payloads.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
    text_encoding: TextEncoding,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the encoding used to convert between bytes and text at the edges.
    pub fn with_text_encoding(mut self, encoding: TextEncoding) -> Self {
        self.text_encoding = encoding;
        self
    }

    pub fn text_encoding(&self) -> TextEncoding {
        self.text_encoding
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Appends an arbitrary stage.
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Gzip compression at `level`.
    pub fn compress(self, level: u32) -> Self {
        self.compress_with(CompressionAlgorithm::default(), level)
    }

    pub fn compress_with(self, algorithm: CompressionAlgorithm, level: u32) -> Self {
        self.stage(Stage::Compress { algorithm, level })
    }

    /// Gzip decompression.
    pub fn decompress(self) -> Self {
        self.decompress_with(CompressionAlgorithm::default())
    }

    pub fn decompress_with(self, algorithm: CompressionAlgorithm) -> Self {
        self.stage(Stage::Decompress { algorithm })
    }

    pub fn encrypt(self, key: impl Into<EncryptionKey>) -> Self {
        self.stage(Stage::Encrypt(key.into()))
    }

    pub fn decrypt(self, key: impl Into<EncryptionKey>) -> Self {
        self.stage(Stage::Decrypt(key.into()))
    }

    pub fn encode(self, codec: impl Into<Arc<RadixCodec>>) -> Self {
        self.stage(Stage::Encode(codec.into()))
    }

    pub fn decode(self, codec: impl Into<Arc<RadixCodec>>) -> Self {
        self.stage(Stage::Decode(codec.into()))
    }

    pub fn transform<F>(self, f: F) -> Self
    where
        F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
    {
        self.stage(Stage::Transform(Arc::new(f)))
    }

    pub fn transform_text<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.stage(Stage::TransformText(Arc::new(f)))
    }

    /// The inverse stack: stages in reverse order, each mapped through
    /// [`Stage::inverse`]. The receiver is left untouched.
    pub fn reverse(&self) -> Pipeline {
        Pipeline {
            stages: self.stages.iter().rev().map(Stage::inverse).collect(),
            text_encoding: self.text_encoding,
        }
    }

    /// Runs every stage in order.
    ///
    /// # Errors
    ///
    /// The first failing stage aborts the run; the error names its index.
    pub fn process(&self, input: impl Into<Payload>) -> Result<Payload, PipelineError> {
        let mut payload = input.into();

        for (index, stage) in self.stages.iter().enumerate() {
            let input_len = payload.len();
            payload = stage
                .apply(payload, self.text_encoding)
                .map_err(|source| PipelineError::Stage {
                    index,
                    stage: stage.name(),
                    source,
                })?;
            log::debug!(
                "stage {} ({}): {} -> {} bytes",
                index,
                stage.name(),
                input_len,
                payload.len()
            );
        }

        Ok(payload)
    }

    pub fn process_bytes(&self, data: &[u8]) -> Result<Vec<u8>, PipelineError> {
        self.process(data)?
            .into_bytes(self.text_encoding)
            .map_err(PipelineError::Output)
    }

    pub fn process_text(&self, text: &str) -> Result<String, PipelineError> {
        self.process(text)?
            .into_text(self.text_encoding)
            .map_err(PipelineError::Output)
    }
}

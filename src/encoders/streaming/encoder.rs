use std::io::{Read, Write};

use crate::encoders::algorithms::RadixCodec;
use crate::features::compression::{self, CompressionAlgorithm};

use super::{CHUNK_SIZE, StreamCodec, StreamError};

/// Streaming encoder for processing large amounts of data efficiently.
///
/// Reads the input in fixed-size chunks and writes symbols as soon as whole
/// bit groups are available, so memory stays bounded regardless of input
/// size. The output is identical to a single [`RadixCodec::encode`] call.
pub struct StreamingEncoder<'a, W: Write> {
    codec: &'a RadixCodec,
    writer: W,
    compression: Option<(CompressionAlgorithm, u32)>,
}

impl<'a, W: Write> StreamingEncoder<'a, W> {
    /// Creates a new streaming encoder.
    ///
    /// # Arguments
    ///
    /// * `codec` - The codec to encode with
    /// * `writer` - The destination for encoded output
    pub fn new(codec: &'a RadixCodec, writer: W) -> Self {
        StreamingEncoder {
            codec,
            writer,
            compression: None,
        }
    }

    /// Sets compression algorithm and level.
    ///
    /// Compression needs the whole input, so a compressing encoder buffers
    /// the payload before encoding the compressed bytes in chunks.
    pub fn with_compression(mut self, algo: CompressionAlgorithm, level: u32) -> Self {
        self.compression = Some((algo, level));
        self
    }

    /// Encodes everything `reader` yields and returns the number of input
    /// bytes consumed.
    pub fn encode<R: Read>(&mut self, reader: &mut R) -> Result<u64, StreamError> {
        match self.compression {
            Some((algo, level)) => {
                let mut buffer = Vec::new();
                reader.read_to_end(&mut buffer)?;
                let compressed = compression::compress(&buffer, algo, level)?;
                self.encode_chunks(&mut compressed.as_slice())?;
                Ok(buffer.len() as u64)
            }
            None => self.encode_chunks(reader),
        }
    }

    fn encode_chunks<R: Read>(&mut self, reader: &mut R) -> Result<u64, StreamError> {
        let mut stream = StreamCodec::new(self.codec);
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;

        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            total += bytes_read as u64;

            let encoded = stream.encode_chunk(&buffer[..bytes_read]);
            self.writer.write_all(encoded.as_bytes())?;
        }

        self.writer.write_all(stream.finish_encode().as_bytes())?;
        self.writer.flush()?;
        Ok(total)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

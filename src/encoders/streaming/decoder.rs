use std::io::{Read, Write};

use crate::encoders::algorithms::RadixCodec;
use crate::features::compression::{self, CompressionAlgorithm};

use super::{CHUNK_SIZE, StreamCodec, StreamError};

/// Streaming decoder for processing large amounts of encoded data efficiently.
///
/// Text is read in fixed-size chunks. A UTF-8 sequence cut by a chunk
/// boundary is carried into the next read, and whitespace such as line
/// wrapping is ignored.
pub struct StreamingDecoder<'a, W: Write> {
    codec: &'a RadixCodec,
    writer: W,
    decompress_algo: Option<CompressionAlgorithm>,
}

impl<'a, W: Write> StreamingDecoder<'a, W> {
    /// Creates a new streaming decoder.
    ///
    /// # Arguments
    ///
    /// * `codec` - The codec the input was encoded with
    /// * `writer` - The destination for decoded output
    pub fn new(codec: &'a RadixCodec, writer: W) -> Self {
        StreamingDecoder {
            codec,
            writer,
            decompress_algo: None,
        }
    }

    /// Sets decompression algorithm.
    pub fn with_decompression(mut self, algo: CompressionAlgorithm) -> Self {
        self.decompress_algo = Some(algo);
        self
    }

    /// Decodes everything `reader` yields and returns the number of bytes
    /// written.
    ///
    /// Bytes are written as they are decoded, so on error the writer may
    /// already hold a prefix of the output; treat it as garbage.
    pub fn decode<R: Read>(&mut self, reader: &mut R) -> Result<u64, StreamError> {
        match self.decompress_algo {
            Some(algo) => {
                let mut compressed = Vec::new();
                decode_chunks(self.codec, reader, &mut compressed)?;
                let decompressed = compression::decompress(&compressed, algo)?;
                self.writer.write_all(&decompressed)?;
                self.writer.flush()?;
                Ok(decompressed.len() as u64)
            }
            None => {
                let total = decode_chunks(self.codec, reader, &mut self.writer)?;
                self.writer.flush()?;
                Ok(total)
            }
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn decode_chunks<R: Read, W: Write>(
    codec: &RadixCodec,
    reader: &mut R,
    writer: &mut W,
) -> Result<u64, StreamError> {
    let mut stream = StreamCodec::new(codec);
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut carry = 0usize;
    let mut offset = 0usize;
    let mut total = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer[carry..])?;
        if bytes_read == 0 {
            break;
        }
        let filled = carry + bytes_read;

        let valid = match std::str::from_utf8(&buffer[..filled]) {
            Ok(text) => text,
            // Incomplete sequence at the end; finish it on the next read
            Err(e) if e.error_len().is_none() => {
                // Only ever a prefix of valid UTF-8, so this cannot fail
                std::str::from_utf8(&buffer[..e.valid_up_to()]).map_err(|_| {
                    StreamError::InvalidUtf8 {
                        offset: offset + e.valid_up_to(),
                    }
                })?
            }
            Err(e) => {
                return Err(StreamError::InvalidUtf8 {
                    offset: offset + e.valid_up_to(),
                });
            }
        };

        let consumed = valid.len();
        let decoded = stream.decode_chunk(valid)?;
        writer.write_all(&decoded)?;
        total += decoded.len() as u64;

        buffer.copy_within(consumed..filled, 0);
        carry = filled - consumed;
        offset += consumed;
    }

    if carry > 0 {
        return Err(StreamError::InvalidUtf8 { offset });
    }

    let decoded = stream.finish_decode()?;
    writer.write_all(&decoded)?;
    total += decoded.len() as u64;
    Ok(total)
}

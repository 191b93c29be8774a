use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

use thiserror::Error;

/// Supported compression algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CompressionAlgorithm {
    #[default]
    Gzip,
    Zstd,
    Brotli,
    Lz4,
    Snappy,
    Lzma,
}

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("{algorithm} failed: {source}")]
    Io {
        algorithm: CompressionAlgorithm,
        #[source]
        source: io::Error,
    },

    #[error("unknown compression algorithm '{0}' (expected gzip, zstd, brotli, lz4, snappy or lzma)")]
    UnknownAlgorithm(String),

    #[error("{algorithm} header declares {size} bytes, above the {limit} byte limit")]
    TooLarge {
        algorithm: CompressionAlgorithm,
        size: u64,
        limit: u64,
    },
}

/// Largest output the block formats (lz4, snappy) may declare in their
/// size header. Both allocate the declared size up front.
pub const MAX_BLOCK_SIZE: usize = 100 * 1024 * 1024;

impl CompressionAlgorithm {
    pub fn all() -> [CompressionAlgorithm; 6] {
        [
            CompressionAlgorithm::Gzip,
            CompressionAlgorithm::Zstd,
            CompressionAlgorithm::Brotli,
            CompressionAlgorithm::Lz4,
            CompressionAlgorithm::Snappy,
            CompressionAlgorithm::Lzma,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionAlgorithm::Gzip => "gzip",
            CompressionAlgorithm::Zstd => "zstd",
            CompressionAlgorithm::Brotli => "brotli",
            CompressionAlgorithm::Lz4 => "lz4",
            CompressionAlgorithm::Snappy => "snappy",
            CompressionAlgorithm::Lzma => "lzma",
        }
    }

    /// Level used when the caller does not pick one. Lz4 and Snappy ignore it.
    pub fn default_level(&self) -> u32 {
        match self {
            CompressionAlgorithm::Gzip => 6,
            CompressionAlgorithm::Zstd => 3,
            CompressionAlgorithm::Brotli => 6,
            CompressionAlgorithm::Lz4 => 0,
            CompressionAlgorithm::Snappy => 0,
            CompressionAlgorithm::Lzma => 6,
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gzip" | "gz" => Ok(CompressionAlgorithm::Gzip),
            "zstd" | "zst" => Ok(CompressionAlgorithm::Zstd),
            "brotli" | "br" => Ok(CompressionAlgorithm::Brotli),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "snappy" | "snap" => Ok(CompressionAlgorithm::Snappy),
            "lzma" | "xz" => Ok(CompressionAlgorithm::Lzma),
            _ => Err(CompressionError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Compress data using the specified algorithm and level.
pub fn compress(
    data: &[u8],
    algorithm: CompressionAlgorithm,
    level: u32,
) -> Result<Vec<u8>, CompressionError> {
    let result = match algorithm {
        CompressionAlgorithm::Gzip => compress_gzip(data, level),
        CompressionAlgorithm::Zstd => zstd::encode_all(data, level as i32),
        CompressionAlgorithm::Brotli => compress_brotli(data, level),
        // Size-prefixed so decompression needs no out-of-band length
        CompressionAlgorithm::Lz4 => lz4::block::compress(data, None, true),
        CompressionAlgorithm::Snappy => snap::raw::Encoder::new()
            .compress_vec(data)
            .map_err(io::Error::other),
        CompressionAlgorithm::Lzma => compress_lzma(data, level),
    };

    let compressed = result.map_err(|source| CompressionError::Io { algorithm, source })?;
    log::debug!(
        "{} compressed {} bytes to {}",
        algorithm,
        data.len(),
        compressed.len()
    );
    Ok(compressed)
}

/// Decompress data using the specified algorithm.
pub fn decompress(data: &[u8], algorithm: CompressionAlgorithm) -> Result<Vec<u8>, CompressionError> {
    let io_error = |source: io::Error| CompressionError::Io { algorithm, source };
    let declared = match algorithm {
        CompressionAlgorithm::Lz4 => Some(lz4_size(data).map_err(io_error)?),
        CompressionAlgorithm::Snappy => Some(
            snap::raw::decompress_len(data)
                .map_err(io::Error::other)
                .map_err(io_error)?,
        ),
        _ => None,
    };
    if let Some(size) = declared
        && size > MAX_BLOCK_SIZE
    {
        return Err(CompressionError::TooLarge {
            algorithm,
            size: size as u64,
            limit: MAX_BLOCK_SIZE as u64,
        });
    }

    let result = match algorithm {
        CompressionAlgorithm::Gzip => read_all(flate2::read::GzDecoder::new(data)),
        CompressionAlgorithm::Zstd => zstd::decode_all(data),
        CompressionAlgorithm::Brotli => read_all(brotli::Decompressor::new(data, 4096)),
        // The prefix was validated above; hand lz4 the checked size
        CompressionAlgorithm::Lz4 => {
            lz4::block::decompress(&data[LZ4_PREFIX..], declared.map(|size| size as i32))
        }
        CompressionAlgorithm::Snappy => snap::raw::Decoder::new()
            .decompress_vec(data)
            .map_err(io::Error::other),
        CompressionAlgorithm::Lzma => read_all(xz2::read::XzDecoder::new(data)),
    };

    result.map_err(io_error)
}

const LZ4_PREFIX: usize = 4;

/// Reads the little-endian length that `lz4::block::compress` prepends.
fn lz4_size(data: &[u8]) -> io::Result<usize> {
    let prefix: [u8; LZ4_PREFIX] = data
        .get(..LZ4_PREFIX)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing lz4 size prefix"))?;
    Ok(u32::from_le_bytes(prefix) as usize)
}

fn compress_gzip(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data)?;
    encoder.finish()
}

fn compress_brotli(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    read_all(brotli::CompressorReader::new(data, 4096, level, 22))
}

fn compress_lzma(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    use xz2::write::XzEncoder;

    let mut encoder = XzEncoder::new(Vec::new(), level);
    encoder.write_all(data)?;
    encoder.finish()
}

fn read_all(mut reader: impl Read) -> io::Result<Vec<u8>> {
    let mut result = Vec::new();
    reader.read_to_end(&mut result)?;
    Ok(result)
}

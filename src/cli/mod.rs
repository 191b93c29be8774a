mod commands;

use base_n::{AlphabetRegistry, CompressionAlgorithm, Pipeline};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "base-n")]
#[command(version)]
#[command(about = "Encode and decode binary data with any alphabet, power of two or not", long_about = None)]
struct Cli {
    /// Encode using this alphabet
    #[arg(short = 'e', long)]
    encode: Option<String>,

    /// Decode from this alphabet
    #[arg(short = 'd', long)]
    decode: Option<String>,

    /// Compress data before encoding (gzip, zstd, brotli, lz4, snappy, lzma)
    /// If no algorithm specified, uses gzip
    #[arg(short = 'c', long, value_name = "ALGORITHM")]
    compress: Option<Option<String>>,

    /// Decompress data after decoding
    #[arg(long, value_name = "ALGORITHM")]
    decompress: Option<String>,

    /// Compression level (algorithm-specific, typically 1-9)
    #[arg(long)]
    level: Option<u32>,

    /// Passphrase: decrypts after --decode, otherwise encrypts before --encode
    #[arg(short = 'k', long, value_name = "PASSPHRASE")]
    key: Option<String>,

    /// File to process (if not provided, reads from stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// List available alphabets
    #[arg(short, long)]
    list: bool,

    /// Use streaming mode for large files (memory efficient)
    #[arg(short, long)]
    stream: bool,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load alphabets configuration with user overrides
    let registry = AlphabetRegistry::load_with_overrides()?;

    if cli.list {
        commands::list_alphabets(&registry);
        return Ok(());
    }

    let compress_algo = match &cli.compress {
        Some(Some(algo)) => Some(algo.parse::<CompressionAlgorithm>()?),
        Some(None) => Some(CompressionAlgorithm::default()),
        None => None,
    };

    let decompress_algo = cli
        .decompress
        .as_deref()
        .map(str::parse::<CompressionAlgorithm>)
        .transpose()?;

    if cli.stream {
        if cli.key.is_some() {
            return Err("--key cannot be combined with --stream".into());
        }
        return match (&cli.decode, &cli.encode) {
            (Some(decode_name), None) => {
                commands::streaming_decode(&registry, decode_name, cli.file.as_ref(), decompress_algo)
            }
            (None, Some(encode_name)) => {
                let compression = compress_algo
                    .map(|algo| (algo, cli.level.unwrap_or_else(|| algo.default_level())));
                commands::streaming_encode(&registry, encode_name, cli.file.as_ref(), compression)
            }
            _ => Err("Streaming mode requires exactly one of --encode or --decode".into()),
        };
    }

    // Build the processing stack: decode side first, then encode side
    let mut pipeline = Pipeline::new();

    if let Some(decode_name) = &cli.decode {
        let codec = registry.codec(decode_name)?;
        let alphabet = codec.alphabet().clone();
        pipeline = pipeline
            .transform_text(move |text: &str| -> String {
                text.chars().filter(|&c| !alphabet.is_separator(c)).collect()
            })
            .decode(codec);
        if let Some(key) = &cli.key {
            pipeline = pipeline.decrypt(key.as_str());
        }
        if let Some(algo) = decompress_algo {
            pipeline = pipeline.decompress_with(algo);
        }
    }

    let encode_name = match (&cli.encode, &cli.decode) {
        (Some(name), _) => Some(name.as_str()),
        (None, Some(_)) => None,
        (None, None) => Some("base64"),
    };

    if let Some(encode_name) = encode_name {
        if let Some(algo) = compress_algo {
            let level = cli.level.unwrap_or_else(|| algo.default_level());
            pipeline = pipeline.compress_with(algo, level);
        }
        // When transcoding the key already went to the decrypt stage
        if let Some(key) = &cli.key
            && cli.decode.is_none()
        {
            pipeline = pipeline.encrypt(key.as_str());
        }
        pipeline = pipeline.encode(registry.codec(encode_name)?);
    }

    let input = commands::read_input(cli.file.as_ref())?;
    let output = pipeline.process_bytes(&input)?;

    let mut stdout = io::stdout();
    stdout.write_all(&output)?;
    if encode_name.is_some() {
        writeln!(stdout)?;
    }

    Ok(())
}

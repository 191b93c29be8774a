use base_n::{AlphabetRegistry, CompressionAlgorithm, StreamingDecoder, StreamingEncoder};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

pub fn read_input(file: Option<&PathBuf>) -> io::Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

pub fn list_alphabets(registry: &AlphabetRegistry) {
    println!("Available alphabets:\n");

    for name in registry.names() {
        match registry.codec(name) {
            Ok(codec) => {
                let alphabet = codec.alphabet();
                let preview: String = alphabet.tokens().take(20).collect();
                let suffix = if alphabet.size() > 20 { "..." } else { "" };
                let mode = match codec.mode() {
                    base_n::EncodingMode::Direct => "direct",
                    base_n::EncodingMode::DigitPair => "pair",
                };
                println!(
                    "  {:<15} base-{:<4} {:>6}  {}{}",
                    name,
                    alphabet.size(),
                    mode,
                    preview,
                    suffix
                );
            }
            Err(e) => println!("  {:<15} (invalid: {})", name, e),
        }
    }
}

pub fn streaming_encode(
    registry: &AlphabetRegistry,
    encode_name: &str,
    file: Option<&PathBuf>,
    compression: Option<(CompressionAlgorithm, u32)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = registry.codec(encode_name)?;
    let mut encoder = StreamingEncoder::new(&codec, io::stdout().lock());

    if let Some((algo, level)) = compression {
        encoder = encoder.with_compression(algo, level);
    }

    let consumed = if let Some(file_path) = file {
        let mut file_handle = fs::File::open(file_path)?;
        encoder.encode(&mut file_handle)?
    } else {
        encoder.encode(&mut io::stdin().lock())?
    };

    log::debug!("streamed {} input bytes", consumed);
    Ok(())
}

pub fn streaming_decode(
    registry: &AlphabetRegistry,
    decode_name: &str,
    file: Option<&PathBuf>,
    decompress: Option<CompressionAlgorithm>,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = registry.codec(decode_name)?;
    let mut decoder = StreamingDecoder::new(&codec, io::stdout().lock());

    if let Some(algo) = decompress {
        decoder = decoder.with_decompression(algo);
    }

    let written = if let Some(file_path) = file {
        let mut file_handle = fs::File::open(file_path)?;
        decoder.decode(&mut file_handle)?
    } else {
        decoder.decode(&mut io::stdin().lock())?
    };

    log::debug!("streamed {} output bytes", written);
    Ok(())
}

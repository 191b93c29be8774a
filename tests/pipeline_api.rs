//! Public API tests for compressed and encrypted payloads
//!
//! Compressor and cipher output is dense binary full of nul bytes and
//! high bytes. Every preset alphabet must carry it through unchanged, and
//! the encoded text must never contain a nul itself.

use std::io::Cursor;

use base_n::prelude::*;
use base_n::{
    AlphabetError, PipelineError, StageError, StreamingDecoder, StreamingEncoder, compress,
    decompress,
};

const MESSAGES: [&str; 3] = [
    "add radix command - digit pairs for alphabets that are not a power of two",
    "Session wrap: streaming decode, padding markers, 109 regression cases",
    "\0\0\0 leading nuls \0 and trailing nuls \0\0",
];

fn registry() -> AlphabetRegistry {
    AlphabetRegistry::load_default().unwrap()
}

#[test]
fn test_compressed_payloads_through_every_preset() {
    let registry = registry();

    for msg in MESSAGES {
        for algo in CompressionAlgorithm::all() {
            let compressed = compress(msg.as_bytes(), algo, algo.default_level()).unwrap();

            for name in registry.names() {
                let codec = registry.codec(name).unwrap();
                let encoded = codec.encode(&compressed);
                assert!(!encoded.contains('\0'), "{} / {:?} produced a nul", name, algo);

                let decoded = codec.decode_to_bytes(&encoded).unwrap();
                assert_eq!(decoded, compressed, "{} / {:?}", name, algo);
                assert_eq!(decompress(&decoded, algo).unwrap(), msg.as_bytes());
            }
        }
    }
}

#[test]
fn test_gzip_output_contains_nuls() {
    // The gzip header alone carries zero bytes, so the test above is exercised
    let compressed = compress(MESSAGES[0].as_bytes(), CompressionAlgorithm::Gzip, 6).unwrap();
    assert!(compressed.contains(&0));
}

#[test]
fn test_compress_encrypt_encode_and_back() {
    let registry = registry();
    let data: Vec<u8> = (0..1000u32).map(|i| (i * 7 % 251) as u8).collect();

    let forward = Pipeline::new()
        .compress(6)
        .encrypt("key")
        .encode(registry.codec("base58").unwrap());
    let sealed = forward.process_bytes(&data).unwrap();

    assert!(sealed.is_ascii());

    let backward = forward.reverse();
    assert_eq!(backward.process_bytes(&sealed).unwrap(), data);

    let names: Vec<String> = backward.stages().iter().map(|s| s.name()).collect();
    assert_eq!(names, ["decode(base58)", "decrypt", "decompress(gzip)"]);
}

#[test]
fn test_wrong_key_fails_at_decrypt_stage() {
    let codec = registry().codec("base32").unwrap();
    let sealed = Pipeline::new()
        .encrypt("right")
        .encode(codec.clone())
        .process_bytes(b"payload")
        .unwrap();

    let err = Pipeline::new()
        .decode(codec)
        .decrypt("wrong")
        .process_bytes(&sealed)
        .unwrap_err();

    match err {
        PipelineError::Stage { index, source, .. } => {
            assert_eq!(index, 1);
            assert!(matches!(source, StageError::Encryption(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_streaming_with_compression() {
    let registry = registry();
    let data = MESSAGES.concat().repeat(300);

    for name in ["base64", "base58", "syllables"] {
        let codec = registry.codec(name).unwrap();

        let mut encoder = StreamingEncoder::new(&codec, Vec::new())
            .with_compression(CompressionAlgorithm::Zstd, 3);
        encoder.encode(&mut Cursor::new(data.as_bytes())).unwrap();
        let encoded = encoder.into_inner();

        let mut decoder =
            StreamingDecoder::new(&codec, Vec::new()).with_decompression(CompressionAlgorithm::Zstd);
        decoder.decode(&mut Cursor::new(encoded)).unwrap();
        assert_eq!(decoder.into_inner(), data.as_bytes(), "{}", name);
    }
}

#[test]
fn test_padding_token_inside_content_is_rejected() {
    // "ab" + "ca" reads "bc" across the boundary
    let err = Alphabet::new(["ab", "ca", "dd", "ee"], "bc").unwrap_err();
    assert!(matches!(err, AlphabetError::PaddingNotSelfDelimiting { .. }));
}

#[test]
fn test_builder_alphabet_roundtrips() {
    let alphabet = Alphabet::builder()
        .chars("ABCDEFGHJKLMNPQRSTUVWXYZ0123456789abcdefghijklmnopqrstuvwxyz")
        .exclude_confusables()
        .shuffle(42)
        .padding("=")
        .require_collision_safe()
        .build()
        .unwrap();

    let codec = RadixCodec::new(alphabet);
    for msg in MESSAGES {
        let encoded = codec.encode(msg.as_bytes());
        assert_eq!(codec.decode_to_bytes(&encoded).unwrap(), msg.as_bytes());
    }
}

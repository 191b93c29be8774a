use num_integer::lcm;

use crate::encoders::algorithms::{DecodeError, RadixCodec};

/// Incremental wrapper around a [`RadixCodec`].
///
/// Feeding a payload through `encode_chunk` in any split and then calling
/// `finish_encode` yields exactly what one `encode` call on the whole
/// payload would; the same holds for `decode_chunk` / `finish_decode`.
/// Input is only flushed on boundaries where a byte boundary and a bit-group
/// boundary coincide, so interior output never carries a padding marker.
///
/// A `StreamCodec` buffers state and is meant for one stream and one owner
/// at a time. `finish_*` resets the respective side for reuse.
#[derive(Debug)]
pub struct StreamCodec<'a> {
    codec: &'a RadixCodec,
    group_bytes: usize,
    unit_chars: usize,
    pending_bytes: Vec<u8>,
    pending_text: String,
    tokens_decoded: usize,
}

impl<'a> StreamCodec<'a> {
    pub fn new(codec: &'a RadixCodec) -> Self {
        let bits = codec.bit_length() as usize;
        let unit_bits = lcm(8, bits);
        let unit_tokens = unit_bits / bits * codec.tokens_per_group();

        StreamCodec {
            codec,
            group_bytes: unit_bits / 8,
            unit_chars: unit_tokens * codec.alphabet().token_length(),
            pending_bytes: Vec::new(),
            pending_text: String::new(),
            tokens_decoded: 0,
        }
    }

    /// Smallest byte count whose bit length is a whole number of groups.
    pub fn group_bytes(&self) -> usize {
        self.group_bytes
    }

    /// Buffers `chunk` and returns the symbols for every complete unit.
    pub fn encode_chunk(&mut self, chunk: &[u8]) -> String {
        self.pending_bytes.extend_from_slice(chunk);

        let flushable = self.pending_bytes.len() / self.group_bytes * self.group_bytes;
        if flushable == 0 {
            return String::new();
        }

        let mut encoded = String::new();
        let padding_bits = self
            .codec
            .encode_groups(&self.pending_bytes[..flushable], &mut encoded);
        debug_assert_eq!(padding_bits, 0);
        self.pending_bytes.drain(..flushable);

        log::debug!(
            "stream encode flushed {} bytes, {} held back",
            flushable,
            self.pending_bytes.len()
        );
        encoded
    }

    /// Encodes whatever is still buffered, padding marker included.
    pub fn finish_encode(&mut self) -> String {
        let encoded = self.codec.encode(&self.pending_bytes);
        self.pending_bytes.clear();
        encoded
    }

    /// Buffers `chunk` and decodes every complete unit that lies before the
    /// padding marker. Whitespace is dropped unless the alphabet uses it
    /// (see [`Alphabet::is_separator`](crate::Alphabet::is_separator)).
    ///
    /// Errors surface when the offending unit is flushed, which can be later
    /// than the chunk that carried it. After an error the stream should be
    /// abandoned.
    pub fn decode_chunk(&mut self, chunk: &str) -> Result<Vec<u8>, DecodeError> {
        let codec = self.codec;
        let alphabet = codec.alphabet();
        self.pending_text
            .extend(chunk.chars().filter(|&c| !alphabet.is_separator(c)));

        let token_length = self.codec.alphabet().token_length();
        let available = match self.pending_text.find(self.codec.alphabet().padding()) {
            Some(marker) => self.pending_text[..marker].chars().count(),
            // The tail may be the start of a padding token still in transit
            None => self
                .pending_text
                .chars()
                .count()
                .saturating_sub(token_length - 1),
        };

        let flush_chars = available / self.unit_chars * self.unit_chars;
        if flush_chars == 0 {
            return Ok(Vec::new());
        }

        let split = self
            .pending_text
            .char_indices()
            .nth(flush_chars)
            .map_or(self.pending_text.len(), |(i, _)| i);

        let decoded =
            self.codec
                .decode_groups(&self.pending_text[..split], 0, self.tokens_decoded)?;
        self.tokens_decoded += flush_chars / token_length;
        self.pending_text.drain(..split);

        log::debug!(
            "stream decode flushed {} characters into {} bytes",
            flush_chars,
            decoded.len()
        );
        Ok(decoded)
    }

    /// Decodes the remaining text, the only place a padding marker is read.
    pub fn finish_decode(&mut self) -> Result<Vec<u8>, DecodeError> {
        let text = std::mem::take(&mut self.pending_text);
        let first_token = std::mem::take(&mut self.tokens_decoded);

        let (body, padding_bits) = self.codec.split_padding_marker(&text)?;
        self.codec.decode_groups(body, padding_bits, first_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alphabet::Alphabet;
    use crate::core::config::EncodingMode;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn codecs() -> Vec<RadixCodec> {
        let syllables: Vec<String> = "bdfgklmnprstvz"
            .chars()
            .flat_map(|c| "aeiou".chars().map(move |v| format!("{}{}", c, v)))
            .collect();
        vec![
            RadixCodec::new(Alphabet::from_chars("01", '=').unwrap()),
            RadixCodec::new(Alphabet::from_chars("abcdefgh", '=').unwrap()),
            RadixCodec::new(
                Alphabet::from_chars("ABCDEFGHIJKLMNOPQRSTUVWXYZ234567", '=').unwrap(),
            ),
            RadixCodec::new(
                Alphabet::from_chars("123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz", '=')
                    .unwrap(),
            ),
            RadixCodec::new(Alphabet::new(syllables, "xq").unwrap()),
            RadixCodec::with_mode(
                Alphabet::from_chars("0123456789abcdef", '=').unwrap(),
                EncodingMode::DigitPair,
            )
            .unwrap(),
        ]
    }

    fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
        let mut data = vec![0u8; len];
        StdRng::seed_from_u64(seed).fill(&mut data[..]);
        data
    }

    fn split_at_random<T>(items: &[T], seed: u64) -> Vec<&[T]> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pieces = Vec::new();
        let mut rest = items;
        while !rest.is_empty() {
            let take = rng.random_range(0..=rest.len().min(23));
            let (head, tail) = rest.split_at(take);
            pieces.push(head);
            rest = tail;
        }
        pieces
    }

    #[test]
    fn test_group_bytes() {
        let codecs = codecs();
        let expected = [1, 3, 5, 3, 7, 1];
        for (codec, bytes) in codecs.iter().zip(expected) {
            assert_eq!(StreamCodec::new(codec).group_bytes(), bytes);
        }
    }

    #[test]
    fn test_streaming_encode_matches_one_shot() {
        for (n, codec) in codecs().iter().enumerate() {
            for len in [0, 1, 2, 7, 64, 1000] {
                let data = random_bytes(len, len as u64);
                let expected = codec.encode(&data);

                for seed in 0..5 {
                    let mut stream = StreamCodec::new(codec);
                    let mut encoded = String::new();
                    for piece in split_at_random(&data, seed + n as u64) {
                        encoded.push_str(&stream.encode_chunk(piece));
                    }
                    encoded.push_str(&stream.finish_encode());
                    assert_eq!(encoded, expected, "codec {} len {}", n, len);
                }
            }
        }
    }

    #[test]
    fn test_streaming_decode_matches_one_shot() {
        for (n, codec) in codecs().iter().enumerate() {
            for len in [0, 1, 3, 10, 500] {
                let data = random_bytes(len, 42 + len as u64);
                let encoded = codec.encode(&data);
                let chars: Vec<char> = encoded.chars().collect();

                for seed in 0..5 {
                    let mut stream = StreamCodec::new(codec);
                    let mut decoded = Vec::new();
                    for piece in split_at_random(&chars, seed * 7 + n as u64) {
                        let text: String = piece.iter().collect();
                        decoded.extend(stream.decode_chunk(&text).unwrap());
                    }
                    decoded.extend(stream.finish_decode().unwrap());
                    assert_eq!(decoded, data, "codec {} len {}", n, len);
                }
            }
        }
    }

    #[test]
    fn test_padding_token_split_across_chunks() {
        let tokens = ["ka", "ki", "ku", "ke", "ko", "ga", "gi", "gu"];
        let codec = RadixCodec::new(Alphabet::new(tokens, "zz").unwrap());
        let data = b"\x41";
        let encoded = codec.encode(data);
        assert!(encoded.contains("zz"));

        let marker = encoded.find("zz").unwrap();
        let mut stream = StreamCodec::new(&codec);
        let mut decoded = stream.decode_chunk(&encoded[..marker + 1]).unwrap();
        decoded.extend(stream.decode_chunk(&encoded[marker + 1..]).unwrap());
        decoded.extend(stream.finish_decode().unwrap());
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_decode_strips_whitespace() {
        let codec = &codecs()[2];
        let data = b"line wrapped payload";
        let encoded = codec.encode(data);
        let wrapped: String = encoded
            .chars()
            .enumerate()
            .flat_map(|(i, c)| {
                if i > 0 && i % 8 == 0 {
                    vec!['\n', c]
                } else {
                    vec![c]
                }
            })
            .collect();

        let mut stream = StreamCodec::new(codec);
        let mut decoded = stream.decode_chunk(&wrapped).unwrap();
        decoded.extend(stream.finish_decode().unwrap());
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_decode_keeps_whitespace_symbols() {
        let codec = RadixCodec::new(Alphabet::from_chars(" abcdefg", '=').unwrap());
        let data = [0u8, 0, 0];
        let encoded = codec.encode(&data);
        assert_eq!(encoded, " ".repeat(8));

        let mut stream = StreamCodec::new(&codec);
        let mut decoded = Vec::new();
        for piece in ["   ", "\n", "     "] {
            decoded.extend(stream.decode_chunk(piece).unwrap());
        }
        decoded.extend(stream.finish_decode().unwrap());
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_interior_chunks_never_carry_marker() {
        let codec = &codecs()[1];
        let mut stream = StreamCodec::new(codec);
        for piece in [&b"a"[..], b"bc", b"defg", b"h"] {
            assert!(!stream.encode_chunk(piece).contains('='));
        }
        assert!(stream.finish_encode().contains('='));
    }

    #[test]
    fn test_error_positions_are_stream_global() {
        let codec = &codecs()[2];
        let mut stream = StreamCodec::new(codec);
        // one full unit of 8 tokens, then a bad token
        assert_eq!(stream.decode_chunk("AAAAAAAA").unwrap(), vec![0; 5]);
        stream.decode_chunk("AA!AAAAA").unwrap_err();

        let mut stream = StreamCodec::new(codec);
        stream.decode_chunk("AAAAAAAA").unwrap();
        let err = stream.decode_chunk("AA!AAAAAA").unwrap_err();
        assert_eq!(err, DecodeError::unknown_symbol("!", 10));
    }

    #[test]
    fn test_finish_resets_state() {
        let codec = &codecs()[3];
        let mut stream = StreamCodec::new(codec);
        let first = {
            let mut out = stream.encode_chunk(b"first");
            out.push_str(&stream.finish_encode());
            out
        };
        assert_eq!(first, codec.encode(b"first"));

        let second = {
            let mut out = stream.encode_chunk(b"second");
            out.push_str(&stream.finish_encode());
            out
        };
        assert_eq!(second, codec.encode(b"second"));
    }
}

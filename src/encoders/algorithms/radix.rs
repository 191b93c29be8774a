use crate::core::alphabet::{Alphabet, AlphabetError};
use crate::core::config::{EncodingMode, PaddingPolicy};
use crate::core::text::TextEncoding;
use crate::features::compression::{self, CompressionAlgorithm};

use super::errors::{CodecError, DecodeError};

/// Options for [`RadixCodec::encode_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Compress the payload before encoding it
    pub compression: Option<(CompressionAlgorithm, u32)>,
}

impl EncodeOptions {
    pub fn compress(algorithm: CompressionAlgorithm, level: u32) -> Self {
        EncodeOptions {
            compression: Some((algorithm, level)),
        }
    }
}

/// Options for [`RadixCodec::decode_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Decompress the payload after decoding it
    pub decompression: Option<CompressionAlgorithm>,
}

impl DecodeOptions {
    pub fn decompress(algorithm: CompressionAlgorithm) -> Self {
        DecodeOptions {
            decompression: Some(algorithm),
        }
    }
}

/// Lossless conversion between bytes and symbol text over any alphabet.
///
/// The input is read as one bit string and cut into groups of
/// `bit_length` bits. In [`EncodingMode::Direct`] each group is one symbol;
/// in [`EncodingMode::DigitPair`] it is written as two base-N digits. When
/// the last group had to be filled with zero bits, the output ends with the
/// padding token followed by that count in decimal.
///
/// A codec is immutable once built and can be shared across threads.
///
/// # Example
///
/// ```
/// use base_n::{Alphabet, RadixCodec};
///
/// let codec = RadixCodec::new(Alphabet::from_chars("0123456789", '=').unwrap());
/// let encoded = codec.encode(b"hi");
/// assert_eq!(codec.decode_to_bytes(&encoded).unwrap(), b"hi");
/// ```
#[derive(Debug, Clone)]
pub struct RadixCodec {
    alphabet: Alphabet,
    mode: EncodingMode,
    padding_policy: PaddingPolicy,
    text_encoding: TextEncoding,
}

impl RadixCodec {
    /// Creates a codec in the mode the alphabet size implies.
    pub fn new(alphabet: Alphabet) -> Self {
        let mode = EncodingMode::for_alphabet(&alphabet);
        RadixCodec {
            alphabet,
            mode,
            padding_policy: PaddingPolicy::default(),
            text_encoding: TextEncoding::default(),
        }
    }

    /// Creates a codec with an explicit mode.
    ///
    /// # Errors
    ///
    /// `Direct` needs a power-of-two alphabet; `DigitPair` accepts any.
    pub fn with_mode(alphabet: Alphabet, mode: EncodingMode) -> Result<Self, AlphabetError> {
        if mode == EncodingMode::Direct && !alphabet.is_power_of_two() {
            return Err(AlphabetError::DirectModeRequiresPowerOfTwo(alphabet.size()));
        }
        Ok(RadixCodec {
            mode,
            ..Self::new(alphabet)
        })
    }

    pub fn with_padding_policy(mut self, policy: PaddingPolicy) -> Self {
        self.padding_policy = policy;
        self
    }

    /// Sets the encoding [`RadixCodec::decode`] uses to turn bytes into text.
    pub fn with_text_encoding(mut self, encoding: TextEncoding) -> Self {
        self.text_encoding = encoding;
        self
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    pub fn padding_policy(&self) -> PaddingPolicy {
        self.padding_policy
    }

    pub fn text_encoding(&self) -> TextEncoding {
        self.text_encoding
    }

    pub fn bit_length(&self) -> u32 {
        self.alphabet.bit_length()
    }

    /// Symbol tokens written per bit group.
    pub fn tokens_per_group(&self) -> usize {
        self.mode.tokens_per_group()
    }

    /// Encodes `data`. Empty input gives empty output.
    pub fn encode(&self, data: &[u8]) -> String {
        let mut result = String::with_capacity(self.encoded_capacity(data.len()));
        let padding_bits = self.encode_groups(data, &mut result);

        if padding_bits > 0 {
            result.push_str(self.alphabet.padding());
            result.push_str(&padding_bits.to_string());
        }

        result
    }

    /// Encodes `data`, compressing it first if the options ask for it.
    pub fn encode_with(&self, data: &[u8], options: &EncodeOptions) -> Result<String, CodecError> {
        match options.compression {
            Some((algorithm, level)) => {
                let compressed = compression::compress(data, algorithm, level)?;
                Ok(self.encode(&compressed))
            }
            None => Ok(self.encode(data)),
        }
    }

    /// Decodes `encoded` and reads the bytes as text in the codec's
    /// [`TextEncoding`].
    ///
    /// Use [`RadixCodec::decode_to_bytes`] for payloads that are not
    /// guaranteed to be text.
    pub fn decode(&self, encoded: &str) -> Result<String, DecodeError> {
        let bytes = self.decode_to_bytes(encoded)?;
        Ok(self.text_encoding.decode(bytes)?)
    }

    /// Decodes `encoded` to the original bytes.
    pub fn decode_to_bytes(&self, encoded: &str) -> Result<Vec<u8>, DecodeError> {
        let (body, padding_bits) = self.split_padding_marker(encoded)?;
        self.decode_groups(body, padding_bits, 0)
    }

    /// Decodes `encoded`, decompressing the result if the options ask for it.
    pub fn decode_with(&self, encoded: &str, options: &DecodeOptions) -> Result<Vec<u8>, CodecError> {
        let decoded = self.decode_to_bytes(encoded)?;
        match options.decompression {
            Some(algorithm) => Ok(compression::decompress(&decoded, algorithm)?),
            None => Ok(decoded),
        }
    }

    fn encoded_capacity(&self, input_len: usize) -> usize {
        let bits = self.bit_length() as usize;
        let groups = (input_len * 8).div_ceil(bits);
        // Tokens can be multi-byte; this is only a starting size
        (groups * self.tokens_per_group() + 1) * self.alphabet.token_length() + 2
    }

    /// Appends the symbols for `data` to `out` and returns how many zero
    /// bits were added to complete the final group. No marker is written.
    pub(crate) fn encode_groups(&self, data: &[u8], out: &mut String) -> u32 {
        let bits = self.bit_length();
        let mask = (1u64 << bits) - 1;

        let mut bit_buffer = 0u64;
        let mut bits_in_buffer = 0u32;

        for &byte in data {
            bit_buffer = (bit_buffer << 8) | u64::from(byte);
            bits_in_buffer += 8;

            while bits_in_buffer >= bits {
                bits_in_buffer -= bits;
                let value = ((bit_buffer >> bits_in_buffer) & mask) as usize;
                self.push_group(value, out);
            }
            bit_buffer &= (1u64 << bits_in_buffer) - 1;
        }

        if bits_in_buffer == 0 {
            return 0;
        }

        let padding_bits = bits - bits_in_buffer;
        let value = ((bit_buffer << padding_bits) & mask) as usize;
        self.push_group(value, out);
        padding_bits
    }

    fn push_group(&self, value: usize, out: &mut String) {
        match self.mode {
            EncodingMode::Direct => out.push_str(self.alphabet.symbol(value)),
            EncodingMode::DigitPair => {
                let base = self.alphabet.size();
                out.push_str(self.alphabet.symbol(value / base));
                out.push_str(self.alphabet.symbol(value % base));
            }
        }
    }

    /// Splits off the padding marker, returning the symbol body and the
    /// number of padding bits it records.
    ///
    /// The marker is found with a plain forward search. That is sound
    /// because `Alphabet::new` rejects alphabets in which the padding token
    /// can occur across a token boundary.
    pub(crate) fn split_padding_marker<'s>(
        &self,
        encoded: &'s str,
    ) -> Result<(&'s str, u32), DecodeError> {
        let padding = self.alphabet.padding();
        let Some(start) = encoded.find(padding) else {
            return Ok((encoded, 0));
        };

        let trailer = &encoded[start + padding.len()..];
        let digits_end = trailer
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trailer.len());
        let parsed = trailer[..digits_end].parse::<u32>().ok();
        let bits = self.bit_length();

        let padding_bits = match self.padding_policy {
            PaddingPolicy::Strict => match parsed {
                Some(n) if (1..bits).contains(&n) && digits_end == trailer.len() => n,
                _ => return Err(DecodeError::malformed_padding_count(trailer, bits)),
            },
            PaddingPolicy::Lenient => match parsed {
                Some(n) if n < bits => n,
                // Padding only ever completes the final group, so a larger
                // count may not eat into the groups before it
                Some(n) => {
                    log::warn!("padding count {} out of range, clamping to {}", n, bits - 1);
                    bits - 1
                }
                None => {
                    log::warn!(
                        "unparsable padding count {:?}, assuming no padding bits",
                        trailer
                    );
                    0
                }
            },
        };

        Ok((&encoded[..start], padding_bits))
    }

    /// Decodes a marker-free symbol body. `first_token` offsets the token
    /// positions reported in errors.
    pub(crate) fn decode_groups(
        &self,
        body: &str,
        padding_bits: u32,
        first_token: usize,
    ) -> Result<Vec<u8>, DecodeError> {
        let tokens = self.split_tokens(body)?;
        let per_group = self.tokens_per_group();
        if tokens.len() % per_group != 0 {
            return Err(DecodeError::InvalidLength {
                actual: body.chars().count(),
                multiple: per_group * self.alphabet.token_length(),
            });
        }

        let bits = self.bit_length();
        let groups = tokens.len() / per_group;
        let total_bits = (groups * bits as usize).saturating_sub(padding_bits as usize);
        let output_len = total_bits / 8;
        let mut result = Vec::with_capacity(output_len);

        let mut bit_buffer = 0u64;
        let mut bits_in_buffer = 0u32;

        for (group, window) in tokens.chunks(per_group).enumerate() {
            let position = first_token + group * per_group;
            let value = self.group_value(window, position)?;

            bit_buffer = (bit_buffer << bits) | value as u64;
            bits_in_buffer += bits;

            while bits_in_buffer >= 8 {
                bits_in_buffer -= 8;
                if result.len() < output_len {
                    result.push((bit_buffer >> bits_in_buffer) as u8);
                }
            }
            bit_buffer &= (1u64 << bits_in_buffer) - 1;
        }

        Ok(result)
    }

    fn group_value(&self, window: &[&str], position: usize) -> Result<usize, DecodeError> {
        let index = |offset: usize| {
            self.alphabet
                .index_of(window[offset])
                .ok_or_else(|| DecodeError::unknown_symbol(window[offset], position + offset))
        };

        match self.mode {
            EncodingMode::Direct => index(0),
            EncodingMode::DigitPair => {
                let value = index(0)? * self.alphabet.size() + index(1)?;
                let max = (1usize << self.bit_length()) - 1;
                if value > max {
                    return Err(DecodeError::InvalidDigitPair {
                        value,
                        max,
                        position,
                    });
                }
                Ok(value)
            }
        }
    }

    fn split_tokens<'s>(&self, body: &'s str) -> Result<Vec<&'s str>, DecodeError> {
        let token_length = self.alphabet.token_length();
        let mut tokens = Vec::with_capacity(body.len() / token_length);

        let mut start = 0;
        let mut chars_in_token = 0;
        for (i, _) in body.char_indices() {
            if chars_in_token == token_length {
                tokens.push(&body[start..i]);
                start = i;
                chars_in_token = 0;
            }
            chars_in_token += 1;
        }

        if chars_in_token == token_length {
            tokens.push(&body[start..]);
        } else if chars_in_token > 0 {
            return Err(DecodeError::InvalidLength {
                actual: body.chars().count(),
                multiple: token_length,
            });
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn codec(symbols: &str) -> RadixCodec {
        RadixCodec::new(Alphabet::from_chars(symbols, '=').unwrap())
    }

    fn sized(size: usize) -> RadixCodec {
        let tokens: Vec<String> = (0..size).map(|i| format!("{:04x}", i)).collect();
        RadixCodec::new(Alphabet::new(tokens, "====").unwrap())
    }

    fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
        let mut data = vec![0u8; len];
        StdRng::seed_from_u64(seed).fill(&mut data[..]);
        data
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(codec("01234567").mode(), EncodingMode::Direct);
        assert_eq!(codec("0123456789").mode(), EncodingMode::DigitPair);
        assert_eq!(codec("0123456789").tokens_per_group(), 2);
    }

    #[test]
    fn test_forcing_direct_on_non_power_of_two_fails() {
        let alphabet = Alphabet::from_chars("0123456789", '=').unwrap();
        let err = RadixCodec::with_mode(alphabet, EncodingMode::Direct).unwrap_err();
        assert_eq!(err, AlphabetError::DirectModeRequiresPowerOfTwo(10));
    }

    #[test]
    fn test_direct_exact_indices_16_symbols() {
        // 0x41 = 0100 0001 -> groups 4, 1
        let codec = codec("0123456789ABCDEF");
        assert_eq!(codec.encode(&[0x41]), "41");
    }

    #[test]
    fn test_direct_exact_indices_8_symbols() {
        // 0x41 = 010 000 01(0) -> groups 2, 0, 2 with one padding bit
        let codec = codec("abcdefgh");
        assert_eq!(codec.encode(&[0x41]), "cac=1");
        assert_eq!(codec.decode_to_bytes("cac=1").unwrap(), vec![0x41]);
    }

    #[test]
    fn test_digit_pair_size_100_single_byte() {
        let codec = sized(100);
        assert_eq!(codec.bit_length(), 7);

        let encoded = codec.encode(&[0xC3]);
        // two groups of 7 bits -> four tokens, then "====" and the count 6
        let (body, marker) = encoded.split_at(16);
        assert_eq!(body.len(), 16);
        assert_eq!(marker, "====6");

        // 1100001 -> 97 -> (0, 97); 1(000000) -> 64 -> (0, 64)
        assert_eq!(body, "0000006100000040");
        assert_eq!(codec.decode_to_bytes(&encoded).unwrap(), vec![0xC3]);
    }

    #[test]
    fn test_empty_input() {
        let codec = codec("0123456789");
        assert_eq!(codec.encode(b""), "");
        assert_eq!(codec.decode_to_bytes("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_zeros_round_trip_both_modes() {
        let data = vec![0u8; 10_000];
        for codec in [codec("0123456789abcdef"), sized(100), sized(1000)] {
            let encoded = codec.encode(&data);
            assert_eq!(codec.decode_to_bytes(&encoded).unwrap(), data);
        }
    }

    #[test]
    fn test_boundary_lengths() {
        for bits in [1u32, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12] {
            for size in [(1usize << bits) - 1, 1 << bits] {
                if size < 2 {
                    continue;
                }
                let codec = sized(size);
                let group_bytes = (bits as usize / 8).max(1);
                for len in [0, 1, group_bytes.saturating_sub(1), group_bytes, group_bytes + 1, 17] {
                    let data = random_bytes(len, len as u64 + size as u64);
                    let encoded = codec.encode(&data);
                    assert_eq!(
                        codec.decode_to_bytes(&encoded).unwrap(),
                        data,
                        "size {} len {}",
                        size,
                        len
                    );
                }
            }
        }
    }

    #[test]
    fn test_padding_marker_omitted_when_aligned() {
        // 3 bytes = 24 bits = 4 groups of 6
        let codec = codec("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/");
        let encoded = codec.encode(b"Man");
        assert_eq!(encoded, "TWFu");
        assert_eq!(codec.decode_to_bytes(&encoded).unwrap(), b"Man");

        let encoded = codec.encode(b"Ma");
        assert_eq!(encoded, "TWE=2");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let codec = sized(58);
        let data = random_bytes(300, 1);
        assert_eq!(codec.encode(&data), codec.encode(&data));
    }

    #[test]
    fn test_forced_digit_pair_round_trips_and_differs() {
        let alphabet = Alphabet::from_chars("0123456789abcdef", '=').unwrap();
        let direct = RadixCodec::new(alphabet.clone());
        let pairs = RadixCodec::with_mode(alphabet, EncodingMode::DigitPair).unwrap();
        let data = b"forced digit pairs";

        let a = direct.encode(data);
        let b = pairs.encode(data);
        assert_ne!(a, b);
        assert_eq!(b.len(), a.len() * 2);
        assert_eq!(pairs.decode_to_bytes(&b).unwrap(), data);
    }

    #[test]
    fn test_multi_codepoint_tokens() {
        let tokens = ["가나", "다라", "마바", "사아", "자차", "카타", "파하", "거너"];
        let codec = RadixCodec::new(Alphabet::new(tokens, "__").unwrap());
        let data = b"\x00\xffhangul";
        let encoded = codec.encode(data);
        assert_eq!(codec.decode_to_bytes(&encoded).unwrap(), data);
    }

    #[test]
    fn test_unknown_symbol() {
        let codec = codec("abcdefgh");
        let err = codec.decode_to_bytes("abz").unwrap_err();
        assert_eq!(err, DecodeError::unknown_symbol("z", 2));
    }

    #[test]
    fn test_partial_token_is_invalid_length() {
        let codec = RadixCodec::new(Alphabet::new(["ka", "ki", "ku", "ke"], "zz").unwrap());
        let err = codec.decode_to_bytes("kakik").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidLength {
                actual: 5,
                multiple: 2
            }
        );
    }

    #[test]
    fn test_odd_digit_pair_is_invalid_length() {
        let codec = codec("0123456789");
        let err = codec.decode_to_bytes("123").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidLength { multiple: 2, .. }));
    }

    #[test]
    fn test_digit_pair_out_of_range() {
        // base 10, 4 bits: "99" = 99 > 15
        let codec = codec("0123456789");
        let err = codec.decode_to_bytes("99").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidDigitPair {
                value: 99,
                max: 15,
                position: 0
            }
        );
    }

    #[test]
    fn test_lenient_padding_count_defaults_to_zero() {
        let codec = codec("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/");
        // "TWFu" is aligned; a bare or garbled marker adds nothing
        assert_eq!(codec.decode_to_bytes("TWFu=").unwrap(), b"Man");
        assert_eq!(codec.decode_to_bytes("TWFu=x").unwrap(), b"Man");
    }

    #[test]
    fn test_lenient_padding_count_is_clamped() {
        let codec = codec("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/");
        // 18 bits less the clamped 5 leaves a single byte
        assert_eq!(codec.decode_to_bytes("TWE=9").unwrap(), b"M");
    }

    #[test]
    fn test_strict_padding_count() {
        let codec = codec("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/")
            .with_padding_policy(PaddingPolicy::Strict);
        assert_eq!(codec.decode_to_bytes("TWE=2").unwrap(), b"Ma");

        for bad in ["TWE=", "TWE=x", "TWE=2x", "TWE=0", "TWE=6"] {
            let err = codec.decode_to_bytes(bad).unwrap_err();
            assert!(
                matches!(err, DecodeError::MalformedPaddingCount { bit_length: 6, .. }),
                "{} gave {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_digit_padding_token() {
        // A digit-valued padding token sits right before the digit count
        let codec = RadixCodec::new(Alphabet::from_chars("abcdefgh", '1').unwrap());
        for len in 0..12 {
            let data = random_bytes(len, 99);
            let encoded = codec.encode(&data);
            assert_eq!(codec.decode_to_bytes(&encoded).unwrap(), data);
        }
        assert_eq!(codec.encode(&[0x41]), "cac11");
    }

    #[test]
    fn test_decode_as_text() {
        let codec = codec("0123456789");
        let encoded = codec.encode("héllo".as_bytes());
        assert_eq!(codec.decode(&encoded).unwrap(), "héllo");

        let encoded = codec.encode(&[0xff, 0xfe]);
        assert!(matches!(
            codec.decode(&encoded).unwrap_err(),
            DecodeError::InvalidText(_)
        ));

        let latin1 = codec.clone().with_text_encoding(TextEncoding::Latin1);
        assert_eq!(latin1.decode(&encoded).unwrap(), "\u{ff}\u{fe}");
    }

    #[test]
    fn test_encode_with_compression() {
        let codec = codec("0123456789abcdefghijklmnopqrstuvwxyz");
        let data = b"abcabcabc".repeat(100);
        let encoded = codec
            .encode_with(&data, &EncodeOptions::compress(CompressionAlgorithm::Gzip, 6))
            .unwrap();
        assert!(encoded.len() < codec.encode(&data).len());

        let decoded = codec
            .decode_with(&encoded, &DecodeOptions::decompress(CompressionAlgorithm::Gzip))
            .unwrap();
        assert_eq!(decoded, data);

        let plain = codec.encode_with(&data, &EncodeOptions::default()).unwrap();
        assert_eq!(codec.decode_with(&plain, &DecodeOptions::default()).unwrap(), data);
    }
}

use std::collections::HashMap;
use std::iter;

use thiserror::Error;

/// Errors raised while validating an alphabet.
///
/// All of these are configuration errors: they surface when an [`Alphabet`]
/// is built and never during encoding or decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphabetError {
    #[error("alphabet needs at least 2 symbols, got {count}")]
    TooFewSymbols { count: usize },

    #[error("symbol tokens must be at least one character long")]
    EmptyToken,

    #[error("token '{token}' is {actual} characters long, expected {expected}")]
    InconsistentTokenLength {
        token: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate symbol in alphabet: '{0}'")]
    DuplicateSymbol(String),

    #[error("padding token '{0}' is also an alphabet symbol")]
    PaddingCollidesWithAlphabet(String),

    #[error("padding token '{padding}' occurs across the boundary of '{left}' and '{right}'")]
    PaddingNotSelfDelimiting {
        padding: String,
        left: String,
        right: String,
    },

    #[error("alphabet is not collision safe: '{left}{right}' contains '{found}' off the token boundary")]
    NotCollisionSafe {
        left: String,
        right: String,
        found: String,
    },

    #[error("no padding token configured")]
    MissingPadding,

    #[error("direct mode requires a power-of-two alphabet size, got {0}")]
    DirectModeRequiresPowerOfTwo(usize),
}

/// A token found straddling the boundary between two adjacent tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub left: String,
    pub right: String,
    pub found: String,
}

/// A validated, immutable symbol table plus its padding token.
///
/// Every token (the padding token included) has the same length in
/// characters, so encoded text can be split into fixed windows. Lookups in
/// both directions are built once here and never change afterwards, which
/// makes an `Alphabet` safe to share between threads without locking.
///
/// # Example
///
/// ```
/// use base_n::Alphabet;
///
/// let alphabet = Alphabet::new(["ka", "ki", "ku", "ke"], "zz").unwrap();
/// assert_eq!(alphabet.size(), 4);
/// assert_eq!(alphabet.bit_length(), 2);
/// assert_eq!(alphabet.index_of("ku"), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Alphabet {
    tokens: Vec<String>,
    token_to_index: HashMap<String, usize>,
    padding: String,
    token_length: usize,
    bit_length: u32,
    // Whitespace that appears inside some token, padding included
    token_whitespace: Vec<char>,
}

impl Alphabet {
    /// Validates `tokens` and `padding` and builds the lookup tables.
    ///
    /// Checks run in this order and stop at the first failure:
    /// symbol count, token lengths, duplicates, padding membership, and
    /// finally that the padding token cannot be found straddling two
    /// adjacent tokens (decoding locates the marker with a plain substring
    /// search, so a straddling match would truncate real content).
    ///
    /// # Errors
    ///
    /// Returns the [`AlphabetError`] describing the first failed check.
    pub fn new<I, S>(tokens: I, padding: impl Into<String>) -> Result<Self, AlphabetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let padding = padding.into();

        if tokens.len() < 2 {
            return Err(AlphabetError::TooFewSymbols {
                count: tokens.len(),
            });
        }

        let token_length = tokens[0].chars().count();
        if token_length == 0 {
            return Err(AlphabetError::EmptyToken);
        }
        for token in tokens.iter().chain(iter::once(&padding)) {
            let actual = token.chars().count();
            if actual != token_length {
                return Err(AlphabetError::InconsistentTokenLength {
                    token: token.clone(),
                    expected: token_length,
                    actual,
                });
            }
        }

        let mut token_to_index = HashMap::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            if token_to_index.insert(token.clone(), i).is_some() {
                return Err(AlphabetError::DuplicateSymbol(token.clone()));
            }
        }

        if token_to_index.contains_key(&padding) {
            return Err(AlphabetError::PaddingCollidesWithAlphabet(padding));
        }

        let size = tokens.len();
        let bit_length = usize::BITS - (size - 1).leading_zeros();

        let mut token_whitespace: Vec<char> = tokens
            .iter()
            .chain(iter::once(&padding))
            .flat_map(|token| token.chars())
            .filter(|c| c.is_whitespace())
            .collect();
        token_whitespace.sort_unstable();
        token_whitespace.dedup();

        let alphabet = Alphabet {
            tokens,
            token_to_index,
            padding,
            token_length,
            bit_length,
            token_whitespace,
        };

        if let Some(collision) = alphabet.padding_straddle() {
            return Err(AlphabetError::PaddingNotSelfDelimiting {
                padding: collision.found,
                left: collision.left,
                right: collision.right,
            });
        }

        Ok(alphabet)
    }

    /// Builds a single-character alphabet from a string of symbols.
    pub fn from_chars(symbols: &str, padding: char) -> Result<Self, AlphabetError> {
        Self::new(symbols.chars().map(String::from), padding)
    }

    /// Number of symbols (the padding token is not counted).
    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    /// Bits consumed per encoding step: `ceil(log2(size))`.
    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }

    pub fn is_power_of_two(&self) -> bool {
        self.size().is_power_of_two()
    }

    /// Length in characters shared by every token.
    pub fn token_length(&self) -> usize {
        self.token_length
    }

    pub fn padding(&self) -> &str {
        &self.padding
    }

    /// Returns the token at `index`, or `None` if out of range.
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Returns the index of `token`, or `None` if it is not a symbol.
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.token_to_index.get(token).copied()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Whether `c` is whitespace that no token uses, and so can only be
    /// line wrapping or other layout around the encoded text.
    pub fn is_separator(&self, c: char) -> bool {
        c.is_whitespace() && !self.token_whitespace.contains(&c)
    }

    // Callers only pass indices below `size()`.
    pub(crate) fn symbol(&self, index: usize) -> &str {
        &self.tokens[index]
    }

    /// Whether no concatenation of two tokens (padding included) contains a
    /// token at a position other than the original boundary.
    ///
    /// Single-character alphabets are always collision safe.
    pub fn is_collision_safe(&self) -> bool {
        self.collision().is_none()
    }

    /// Returns the first boundary collision found, if any.
    pub fn collision(&self) -> Option<Collision> {
        let all: Vec<&str> = self.all_tokens().collect();
        find_straddle(self.token_length, &all, &all, &all)
    }

    fn padding_straddle(&self) -> Option<Collision> {
        let lefts: Vec<&str> = self.tokens().collect();
        let rights: Vec<&str> = self.all_tokens().collect();
        find_straddle(self.token_length, &lefts, &rights, &[self.padding.as_str()])
    }

    fn all_tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens().chain(iter::once(self.padding.as_str()))
    }
}

/// Looks for a target equal to the window at char offset `k` (0 < k < len)
/// of some `left ‖ right`. The window is `left[k..] ‖ right[..k]`, so a
/// target matches when its head is a known left suffix and its tail a known
/// right prefix.
fn find_straddle(
    token_length: usize,
    lefts: &[&str],
    rights: &[&str],
    targets: &[&str],
) -> Option<Collision> {
    for k in 1..token_length {
        let mut suffixes: HashMap<&str, &str> = HashMap::new();
        for &left in lefts {
            suffixes.entry(split_chars(left, k).1).or_insert(left);
        }
        let mut prefixes: HashMap<&str, &str> = HashMap::new();
        for &right in rights {
            prefixes.entry(split_chars(right, k).0).or_insert(right);
        }

        for &target in targets {
            let (head, tail) = split_chars(target, token_length - k);
            if let (Some(left), Some(right)) = (suffixes.get(head), prefixes.get(tail)) {
                return Some(Collision {
                    left: (*left).to_string(),
                    right: (*right).to_string(),
                    found: target.to_string(),
                });
            }
        }
    }
    None
}

fn split_chars(s: &str, at: usize) -> (&str, &str) {
    let index = s.char_indices().nth(at).map_or(s.len(), |(i, _)| i);
    s.split_at(index)
}

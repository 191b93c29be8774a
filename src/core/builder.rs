use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::alphabet::{Alphabet, AlphabetError, Collision};

/// Characters that are easy to misread for one another in most fonts.
pub const CONFUSABLES: &str = "0O1lI|";

impl Alphabet {
    /// Creates an [`AlphabetBuilder`] for constructing an alphabet step by step.
    pub fn builder() -> AlphabetBuilder {
        AlphabetBuilder::new()
    }
}

/// Builder for synthesizing an [`Alphabet`] programmatically.
///
/// Every method transforms the owned token list and hands the builder back;
/// nothing is validated until [`AlphabetBuilder::build`].
///
/// # Example
///
/// ```
/// use base_n::Alphabet;
///
/// let alphabet = Alphabet::builder()
///     .range('!', 94)
///     .exclude_confusables()
///     .exclude("=")
///     .shuffle(7)
///     .padding("=")
///     .build()
///     .unwrap();
///
/// assert_eq!(alphabet.size(), 94 - 6 - 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AlphabetBuilder {
    tokens: Vec<String>,
    padding: Option<String>,
    require_collision_safe: bool,
}

impl AlphabetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends tokens.
    pub fn tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Appends every character of `symbols` as a one-character token.
    pub fn chars(mut self, symbols: &str) -> Self {
        self.tokens.extend(symbols.chars().map(String::from));
        self
    }

    /// Appends `count` consecutive codepoints starting at `start`.
    ///
    /// Surrogate codepoints are not characters and are skipped without
    /// counting towards `count`.
    pub fn range(mut self, start: char, count: usize) -> Self {
        self.tokens.extend(
            (u32::from(start)..=char::MAX as u32)
                .filter_map(char::from_u32)
                .take(count)
                .map(String::from),
        );
        self
    }

    /// Drops every token containing any character of `chars`.
    pub fn exclude(mut self, chars: &str) -> Self {
        self.tokens.retain(|token| !token.chars().any(|c| chars.contains(c)));
        self
    }

    /// Drops tokens containing any of [`CONFUSABLES`].
    pub fn exclude_confusables(self) -> Self {
        self.exclude(CONFUSABLES)
    }

    /// Reorders the tokens with a generator seeded from `seed`, so the same
    /// seed always yields the same order.
    pub fn shuffle(mut self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        self.tokens.shuffle(&mut rng);
        self
    }

    pub fn padding(mut self, padding: impl Into<String>) -> Self {
        self.padding = Some(padding.into());
        self
    }

    /// Makes [`Alphabet::is_collision_safe`] a hard requirement of `build`.
    pub fn require_collision_safe(mut self) -> Self {
        self.require_collision_safe = true;
        self
    }

    /// Validates the accumulated tokens into an [`Alphabet`].
    ///
    /// # Errors
    ///
    /// [`AlphabetError::MissingPadding`] if no padding was set, any error
    /// from [`Alphabet::new`], and [`AlphabetError::NotCollisionSafe`] when
    /// collision safety was required but does not hold.
    pub fn build(self) -> Result<Alphabet, AlphabetError> {
        let padding = self.padding.ok_or(AlphabetError::MissingPadding)?;
        let alphabet = Alphabet::new(self.tokens, padding)?;

        if self.require_collision_safe
            && let Some(Collision { left, right, found }) = alphabet.collision()
        {
            return Err(AlphabetError::NotCollisionSafe { left, right, found });
        }

        Ok(alphabet)
    }
}

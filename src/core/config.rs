use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::core::alphabet::{Alphabet, AlphabetError};
use crate::encoders::algorithms::RadixCodec;

/// How each bit group is rendered as symbols.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    /// One symbol per group. Only valid when the alphabet size is a power
    /// of two.
    Direct,
    /// Two symbols per group: the group value written as two base-N digits.
    /// Valid for any alphabet size, since `2^bits < N²` for `N >= 2`.
    DigitPair,
}

impl EncodingMode {
    /// The mode an alphabet selects when none is forced.
    pub fn for_alphabet(alphabet: &Alphabet) -> Self {
        if alphabet.is_power_of_two() {
            EncodingMode::Direct
        } else {
            EncodingMode::DigitPair
        }
    }

    /// Symbol tokens emitted per bit group.
    pub fn tokens_per_group(self) -> usize {
        match self {
            EncodingMode::Direct => 1,
            EncodingMode::DigitPair => 2,
        }
    }
}

/// What decoding does with a padding marker whose digit count is unusable.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaddingPolicy {
    /// Missing or unparsable counts are read as zero padding bits.
    #[default]
    Lenient,
    /// Anything but a count in `1..bit_length` right after the padding
    /// token is a decode error.
    Strict,
}

/// Errors resolving a named alphabet from the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("alphabet '{name}' not found{}", suggestion_hint(.suggestion))]
    NotFound {
        name: String,
        suggestion: Option<String>,
    },

    #[error("alphabet '{name}' is invalid: {source}")]
    InvalidAlphabet {
        name: String,
        #[source]
        source: AlphabetError,
    },

    #[error("failed to parse alphabet configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read alphabet configuration: {0}")]
    Io(#[from] std::io::Error),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}

/// Configuration for a single alphabet loaded from TOML.
#[derive(Debug, Deserialize, Clone)]
pub struct AlphabetConfig {
    /// Symbols written as one string, split every `token_length` characters
    #[serde(default)]
    pub symbols: String,
    /// Symbols listed explicitly; takes priority over `symbols`
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Characters per token when splitting `symbols`
    #[serde(default = "default_token_length")]
    pub token_length: usize,
    /// Padding token, same length as the symbols
    pub padding: String,
    /// Forced encoding mode (auto-detected if not specified)
    #[serde(default)]
    pub mode: Option<EncodingMode>,
    #[serde(default)]
    pub padding_policy: PaddingPolicy,
}

fn default_token_length() -> usize {
    1
}

impl AlphabetConfig {
    /// Returns the symbol tokens, splitting `symbols` if no explicit list
    /// was given.
    pub fn effective_tokens(&self) -> Vec<String> {
        if !self.tokens.is_empty() {
            return self.tokens.clone();
        }

        let chars: Vec<char> = self.symbols.chars().collect();
        chars
            .chunks(self.token_length.max(1))
            .map(|chunk| chunk.iter().collect())
            .collect()
    }

    pub fn build_alphabet(&self) -> Result<Alphabet, AlphabetError> {
        Alphabet::new(self.effective_tokens(), self.padding.clone())
    }

    pub fn build_codec(&self) -> Result<RadixCodec, AlphabetError> {
        let alphabet = self.build_alphabet()?;
        let codec = match self.mode {
            Some(mode) => RadixCodec::with_mode(alphabet, mode)?,
            None => RadixCodec::new(alphabet),
        };
        Ok(codec.with_padding_policy(self.padding_policy))
    }
}

/// Collection of alphabet presets loaded from TOML files.
#[derive(Debug, Deserialize)]
pub struct AlphabetRegistry {
    pub alphabets: HashMap<String, AlphabetConfig>,
}

impl AlphabetRegistry {
    pub fn from_toml(content: &str) -> Result<Self, RegistryError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the presets bundled with the library.
    pub fn load_default() -> Result<Self, RegistryError> {
        let content = include_str!("../../alphabets.toml");
        Self::from_toml(content)
    }

    pub fn load_from_file(path: &std::path::Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Loads presets with user overrides from standard locations.
    ///
    /// Searches in priority order:
    /// 1. Built-in alphabets (from library)
    /// 2. `~/.config/base-n/alphabets.toml` (user overrides)
    /// 3. `./alphabets.toml` (project-local overrides)
    ///
    /// Later configurations override earlier ones for matching names. An
    /// override file that fails to load is skipped with a warning.
    pub fn load_with_overrides() -> Result<Self, RegistryError> {
        let mut config = Self::load_default()?;

        if let Some(config_dir) = dirs::config_dir() {
            let user_config_path = config_dir.join("base-n").join("alphabets.toml");
            config.merge_file(&user_config_path);
        }

        config.merge_file(std::path::Path::new("alphabets.toml"));

        Ok(config)
    }

    fn merge_file(&mut self, path: &std::path::Path) {
        if !path.exists() {
            return;
        }
        match Self::load_from_file(path) {
            Ok(overrides) => {
                log::debug!(
                    "loaded {} alphabet(s) from {:?}",
                    overrides.alphabets.len(),
                    path
                );
                self.merge(overrides);
            }
            Err(e) => log::warn!("failed to load alphabet config from {:?}: {}", path, e),
        }
    }

    /// Merges another registry into this one.
    ///
    /// Alphabets from `other` override alphabets with the same name in `self`.
    pub fn merge(&mut self, other: AlphabetRegistry) {
        for (name, alphabet) in other.alphabets {
            self.alphabets.insert(name, alphabet);
        }
    }

    pub fn get_alphabet(&self, name: &str) -> Option<&AlphabetConfig> {
        self.alphabets.get(name)
    }

    /// Preset names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.alphabets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolves `name` into a validated [`Alphabet`].
    pub fn alphabet(&self, name: &str) -> Result<Alphabet, RegistryError> {
        self.lookup(name)?
            .build_alphabet()
            .map_err(|source| RegistryError::InvalidAlphabet {
                name: name.to_string(),
                source,
            })
    }

    /// Resolves `name` into a codec honouring the preset's mode and padding
    /// policy.
    pub fn codec(&self, name: &str) -> Result<RadixCodec, RegistryError> {
        self.lookup(name)?
            .build_codec()
            .map_err(|source| RegistryError::InvalidAlphabet {
                name: name.to_string(),
                source,
            })
    }

    fn lookup(&self, name: &str) -> Result<&AlphabetConfig, RegistryError> {
        self.get_alphabet(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
            suggestion: find_closest_name(name, &self.names()),
        })
    }
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len2 = s2.chars().count();
    if s1.is_empty() {
        return len2;
    }

    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for (i, c1) in s1.chars().enumerate() {
        curr_row[0] = i + 1;

        for (j, c2) in s2.chars().enumerate() {
            let cost = usize::from(c1 != c2);
            curr_row[j + 1] = (curr_row[j] + 1)
                .min(prev_row[j + 1] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}

/// Find the closest preset name, if any is within a small edit distance.
fn find_closest_name(name: &str, available: &[&str]) -> Option<String> {
    let threshold = if name.len() < 5 { 2 } else { 3 };

    available
        .iter()
        .map(|candidate| (levenshtein_distance(name, candidate), *candidate))
        .filter(|(distance, _)| *distance <= threshold)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.to_string())
}

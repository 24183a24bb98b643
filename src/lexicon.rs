use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rand::Rng;

const BUILTIN_JSON: &str = include_str!("../data/lexicon.json");

/// Headword to synonym table used for transient word swaps.
///
/// Lookups are case-insensitive; headwords are stored lowercased. Every headword has at
/// least one synonym.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, Vec<String>>,
}

impl Lexicon {
    /// The bundled English table.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_JSON).context("bundled lexicon is malformed")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<String>> =
            serde_json::from_str(json).context("failed to parse lexicon JSON")?;
        Self::from_entries(raw)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid lexicon {}", path.display()))
    }

    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: AsRef<str>,
    {
        let mut out = HashMap::new();
        for (headword, synonyms) in entries {
            let headword = headword.as_ref().trim().to_lowercase();
            if headword.is_empty() {
                return Err(anyhow!("lexicon contains an empty headword"));
            }
            if synonyms.is_empty() {
                return Err(anyhow!("headword {headword:?} has no synonyms"));
            }
            out.insert(headword, synonyms);
        }
        Ok(Self { entries: out })
    }

    pub fn synonyms(&self, word: &str) -> Option<&[String]> {
        self.entries.get(&word.to_lowercase()).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.synonyms(word).is_some()
    }

    /// Pick one synonym uniformly at random, or `None` if `word` is not a headword.
    pub fn choose_synonym(&self, word: &str, rng: &mut impl Rng) -> Option<&str> {
        let options = self.synonyms(word)?;
        Some(options[rng.gen_range(0..options.len())].as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

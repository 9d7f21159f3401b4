//! Known-word corpus used by the valid-word-ratio feature

use phishguard_core::{Error, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Immutable set of lower-cased known words.
///
/// Built once at startup; lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct WordCorpus {
    words: HashSet<String>,
}

impl WordCorpus {
    /// Load a corpus from a text file with one word per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. A file that
    /// cannot be read or yields no words is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::corpus(format!("failed to read word corpus {}: {}", path.display(), e))
        })?;

        let corpus = Self::from_words(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        );

        if corpus.is_empty() {
            return Err(Error::corpus(format!(
                "word corpus {} contains no words",
                path.display()
            )));
        }

        info!("Loaded {} words from {}", corpus.len(), path.display());
        Ok(corpus)
    }

    /// Build a corpus from in-memory words
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        Self { words }
    }

    /// Case-insensitive membership test
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word.to_lowercase().as_str())
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the corpus holds no words
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

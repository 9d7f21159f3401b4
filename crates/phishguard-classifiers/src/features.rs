//! Lexical and structural URL features
//!
//! Every feature is computed from the raw URL string alone (plus the word
//! corpus for `valid_word_ratio`). Extraction never fails: malformed input
//! produces zero or negative values instead of an error. In particular
//! `path_length` and `num_double_slash` are left unclamped and go negative
//! for short URLs, because the trained model saw them that way.

use crate::corpus::WordCorpus;
use crate::patterns::{
    KeywordSet, OBFUSCATION_WORDS, PHISHING_KEYWORDS, SENSITIVE_WORDS, SUSPICIOUS_DOMAINS,
};
use phishguard_core::{Error, FeatureVector, Result};
use regex::Regex;
use std::sync::Arc;

pub const URL_LENGTH: &str = "url_length";
pub const DOMAIN_LENGTH: &str = "domain_length";
pub const PATH_LENGTH: &str = "path_length";
pub const NUM_DOTS: &str = "num_dots";
pub const NUM_SLASHES: &str = "num_slashes";
pub const NUM_DOUBLE_SLASH: &str = "num_double_slash";
pub const NUM_DASHES: &str = "num_dashes";
pub const NUM_AT: &str = "num_at";
pub const NUM_PERCENT: &str = "num_percent";
pub const NUM_AMPERSAND: &str = "num_ampersand";
pub const NUM_HASH: &str = "num_hash";
pub const NUM_DIGITS: &str = "num_digits";
pub const HAS_IP_ADDRESS: &str = "has_ip_address";
pub const PHISHING_KEYWORD_FOUND: &str = "phishing_keyword_found";
pub const SUSPICIOUS_DOMAIN_FOUND: &str = "suspicious_domain_found";
pub const OBFUSCATION_KEYWORD_FOUND: &str = "obfuscation_keyword_found";
pub const HAS_SENSITIVE_WORD: &str = "has_sensitive_word";
pub const VALID_WORD_RATIO: &str = "valid_word_ratio";

/// Number of features produced per URL
pub const FEATURE_COUNT: usize = 18;

/// Feature names in extraction order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    URL_LENGTH,
    DOMAIN_LENGTH,
    PATH_LENGTH,
    NUM_DOTS,
    NUM_SLASHES,
    NUM_DOUBLE_SLASH,
    NUM_DASHES,
    NUM_AT,
    NUM_PERCENT,
    NUM_AMPERSAND,
    NUM_HASH,
    NUM_DIGITS,
    HAS_IP_ADDRESS,
    PHISHING_KEYWORD_FOUND,
    SUSPICIOUS_DOMAIN_FOUND,
    OBFUSCATION_KEYWORD_FOUND,
    HAS_SENSITIVE_WORD,
    VALID_WORD_RATIO,
];

/// Deterministic URL to [`FeatureVector`] mapping
pub struct FeatureExtractor {
    corpus: Arc<WordCorpus>,
    host_regex: Regex,
    ip_host_regex: Regex,
    scheme_regex: Regex,
    digit_regex: Regex,
    phishing: KeywordSet,
    suspicious_domains: KeywordSet,
    obfuscation: KeywordSet,
    sensitive: KeywordSet,
}

impl FeatureExtractor {
    /// Create an extractor backed by `corpus`
    pub fn new(corpus: Arc<WordCorpus>) -> Result<Self> {
        Ok(Self {
            corpus,
            host_regex: compile(r"https?://([^/]+)", "host")?,
            ip_host_regex: compile(r"^https?://(\d+\.\d+\.\d+\.\d+)", "IP host")?,
            scheme_regex: compile(r"https?://", "scheme")?,
            digit_regex: compile(DIGIT_CLASS, "digit")?,
            phishing: KeywordSet::new("phishing", PHISHING_KEYWORDS)?,
            suspicious_domains: KeywordSet::new("suspicious_domain", SUSPICIOUS_DOMAINS)?,
            obfuscation: KeywordSet::new("obfuscation", OBFUSCATION_WORDS)?,
            sensitive: KeywordSet::new("sensitive", SENSITIVE_WORDS)?,
        })
    }

    /// Compute every feature for `url`
    pub fn extract(&self, url: &str) -> FeatureVector {
        let lowered = url.to_lowercase();
        let mut features = FeatureVector::with_capacity(FEATURE_COUNT);

        features.insert(URL_LENGTH, url.chars().count() as f64);
        features.insert(DOMAIN_LENGTH, self.domain_length(url) as f64);
        features.insert(PATH_LENGTH, (url.split('/').count() as i64 - 3) as f64);

        features.insert(NUM_DOTS, url.matches('.').count() as f64);
        features.insert(NUM_SLASHES, url.matches('/').count() as f64);
        features.insert(NUM_DOUBLE_SLASH, (url.matches("//").count() as i64 - 1) as f64);
        features.insert(NUM_DASHES, url.matches('-').count() as f64);
        features.insert(NUM_AT, url.matches('@').count() as f64);
        features.insert(NUM_PERCENT, url.matches('%').count() as f64);
        features.insert(NUM_AMPERSAND, url.matches('&').count() as f64);
        features.insert(NUM_HASH, url.matches('#').count() as f64);

        features.insert(NUM_DIGITS, self.digit_regex.find_iter(url).count() as f64);
        features.insert_flag(HAS_IP_ADDRESS, self.ip_host_regex.is_match(url));

        features.insert_flag(PHISHING_KEYWORD_FOUND, self.phishing.is_match(&lowered));
        features.insert_flag(
            SUSPICIOUS_DOMAIN_FOUND,
            self.suspicious_domains.is_match(&lowered),
        );
        features.insert_flag(OBFUSCATION_KEYWORD_FOUND, self.obfuscation.is_match(&lowered));
        features.insert_flag(HAS_SENSITIVE_WORD, self.sensitive.is_match(&lowered));

        features.insert(VALID_WORD_RATIO, self.valid_word_ratio(url));

        features
    }

    /// The corpus backing `valid_word_ratio`
    pub fn corpus(&self) -> &WordCorpus {
        &self.corpus
    }

    /// Length of the host following the first `http(s)://`, or 0
    fn domain_length(&self, url: &str) -> usize {
        self.host_regex
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map_or(0, |host| host.as_str().chars().count())
    }

    /// Share of separator-delimited tokens found in the corpus.
    ///
    /// Every `http(s)://` occurrence is removed first. Empty tokens between
    /// adjacent separators are counted, so `example.com/` has three tokens.
    fn valid_word_ratio(&self, url: &str) -> f64 {
        let stripped = self.scheme_regex.replace_all(url, "");
        let tokens: Vec<&str> = stripped
            .split(|c: char| matches!(c, '-' | '_' | '/' | '.'))
            .collect();

        if tokens.is_empty() {
            return 0.0;
        }

        let valid = tokens
            .iter()
            .filter(|token| self.corpus.contains(token))
            .count();

        valid as f64 / tokens.len() as f64
    }
}

/// Decimal digits plus the other characters Unicode gives a single digit
/// value (superscripts, subscripts, circled and parenthesized digits).
/// Fractions and Roman numerals are not counted.
const DIGIT_CLASS: &str = concat!(
    r"[\p{Nd}\x{B2}\x{B3}\x{B9}\x{1369}-\x{1371}\x{19DA}\x{2070}\x{2074}-\x{2079}",
    r"\x{2080}-\x{2089}\x{2460}-\x{2468}\x{2474}-\x{247C}\x{2488}-\x{2490}\x{24EA}",
    r"\x{24F5}-\x{24FD}\x{24FF}\x{2776}-\x{277E}\x{2780}-\x{2788}\x{278A}-\x{2792}",
    r"\x{10A40}-\x{10A43}\x{10E60}-\x{10E68}\x{11052}-\x{1105A}\x{1F100}-\x{1F10A}]",
);

fn compile(pattern: &str, what: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::internal(format!("Failed to compile {} regex: {}", what, e)))
}

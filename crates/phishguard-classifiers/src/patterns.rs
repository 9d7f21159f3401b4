//! Keyword lists and the substring matchers built from them

use aho_corasick::AhoCorasick;
use phishguard_core::{Error, Result};

/// Words commonly found in credential-harvesting URLs
pub const PHISHING_KEYWORDS: &[&str] = &[
    "login",
    "secure",
    "verify",
    "update",
    "account",
    "banking",
    "password",
    "signin",
    "confirm",
    "validate",
    "reset",
    "support",
    "auth",
    "authentication",
];

/// Brands and institutions frequently impersonated
pub const SUSPICIOUS_DOMAINS: &[&str] = &[
    "paypal",
    "ebay",
    "amazon",
    "bankofamerica",
    "facebook",
    "google",
    "apple",
    "microsoft",
    "gov",
    "crypto",
    "wallet",
    "bitcoin",
    "investment",
];

/// Lure words used to bait clicks
pub const OBFUSCATION_WORDS: &[&str] = &[
    "free", "bonus", "offer", "win", "prize", "cheap", "discount", "gift",
];

/// Words that indicate a page asking for sensitive data
pub const SENSITIVE_WORDS: &[&str] = &["login", "secure", "bank", "verify", "account", "password"];

/// Substring matcher over a fixed keyword list using Aho-Corasick.
///
/// Matching is case-sensitive; callers pass lower-cased text and the
/// keyword lists are lower-case.
pub struct KeywordSet {
    matcher: AhoCorasick,
}

impl KeywordSet {
    /// Build a matcher for `keywords`; `name` labels the list in errors
    pub fn new(name: &str, keywords: &[&str]) -> Result<Self> {
        let matcher = AhoCorasick::new(keywords).map_err(|e| {
            Error::internal(format!("Failed to build {} keyword matcher: {}", name, e))
        })?;

        Ok(Self { matcher })
    }

    /// Whether any keyword occurs in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

//! Search-engine crawler detection.
//!
//! Crawlers execute JavaScript these days, and a chat bubble in every
//! indexed screenshot is noise for the tenant.  The loader skips
//! initialization when the user agent matches a small keyword pattern.

use regex::{Regex, RegexBuilder};

/// Keyword pattern matched against `navigator.userAgent`.
pub const DEFAULT_CRAWLER_PATTERN: &str = r"bot|crawler|spider|crawling";

/// Classifies user agents as automated crawlers.
#[derive(Debug, Clone)]
pub struct CrawlerDetector {
    pattern: Regex,
}

impl CrawlerDetector {
    /// Creates a detector with a custom pattern.  Matching is always
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: RegexBuilder::new(pattern).case_insensitive(true).build()?,
        })
    }

    /// `true` when `user_agent` looks like an automated crawler.
    pub fn is_crawler(&self, user_agent: &str) -> bool {
        self.pattern.is_match(user_agent)
    }
}

impl Default for CrawlerDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CRAWLER_PATTERN).expect("default crawler pattern compiles")
    }
}

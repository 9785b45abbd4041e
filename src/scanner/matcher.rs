//! Content Matcher
//!
//! Finds the 1-based line numbers whose text contains any auth keyword,
//! compared case-insensitively. CR, LF and CRLF all end a line. Content that
//! is binary or not valid UTF-8 cannot hold textual evidence and yields no
//! matches.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Default keyword set (identity provider configuration markers)
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "keycloak",
    "kc_context",
    "auth-server-url",
    "/auth/realms",
    "realm",
    "client-id",
    "clientid",
    "client_id",
    "client-secret",
    "client_secret",
    "oidc",
    "openid",
    "openid-connect",
    "oauth",
    "oauth2",
    "sso",
    "single sign on",
    "tokenendpoint",
    "logoutendpoint",
    "userinfoendpoint",
    "authentication",
    "authorization",
];

/// Bytes inspected when sniffing for binary content
const BINARY_SNIFF_LEN: usize = 8192;

static DEFAULT_MATCHER: Lazy<ContentMatcher> = Lazy::new(|| {
    // Escaped literals always compile
    ContentMatcher::new(DEFAULT_KEYWORDS.iter().copied())
        .unwrap_or_else(|_| ContentMatcher { pattern: None })
});

/// Why content was not searched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("content looks binary (NUL byte at offset {offset})")]
    Binary { offset: usize },
    #[error("content is not valid UTF-8 (invalid byte at offset {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
}

#[derive(Debug, Clone)]
pub struct ContentMatcher {
    pattern: Option<Regex>,
}

impl Default for ContentMatcher {
    fn default() -> Self {
        DEFAULT_MATCHER.clone()
    }
}

impl ContentMatcher {
    /// Build a matcher over literal keywords; blank keywords are ignored
    pub fn new<I, S>(keywords: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut alternatives: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .map(|k| regex::escape(&k))
            .collect();
        alternatives.sort();
        alternatives.dedup();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Default keywords plus the caller's extras
    pub fn with_extra_keywords(extra: &[String]) -> Result<Self, regex::Error> {
        if extra.is_empty() {
            return Ok(Self::default());
        }
        Self::new(
            DEFAULT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .chain(extra.iter().cloned()),
        )
    }

    /// Ascending 1-based numbers of matching lines; empty for binary content
    pub fn match_lines(&self, content: &[u8]) -> Vec<usize> {
        self.try_match_lines(content).unwrap_or_default()
    }

    pub fn try_match_lines(&self, content: &[u8]) -> Result<Vec<usize>, DecodeError> {
        let text = decode_text(content)?;
        let Some(pattern) = &self.pattern else {
            return Ok(Vec::new());
        };

        Ok(split_lines(text)
            .enumerate()
            .filter(|(_, line)| pattern.is_match(line))
            .map(|(index, _)| index + 1)
            .collect())
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(line))
    }
}

/// Interpret raw bytes as text, refusing binary and non-UTF-8 content
pub fn decode_text(content: &[u8]) -> Result<&str, DecodeError> {
    let sniff = &content[..content.len().min(BINARY_SNIFF_LEN)];
    if let Some(offset) = sniff.iter().position(|&b| b == 0) {
        return Err(DecodeError::Binary { offset });
    }

    let text = std::str::from_utf8(content).map_err(|e| DecodeError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Split on CRLF, CR or LF. A trailing terminator does not open a new line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        if current.is_empty() {
            rest = None;
            return None;
        }
        match current.find(['\r', '\n']) {
            Some(end) => {
                let skip = if current[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[end + skip..]);
                Some(&current[..end])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

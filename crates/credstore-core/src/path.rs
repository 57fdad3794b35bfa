// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dotted key paths addressing values inside a credentials document.
//!
//! `credentials.one` addresses key `one` inside table `credentials`. A segment
//! wrapped in double quotes may contain dots: `"api.example.com".token`.

use std::fmt;
use std::str::FromStr;

use crate::error::CredentialsError;

/// A parsed, non-empty dotted key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted path such as `database.password`.
    pub fn parse(raw: &str) -> Result<Self, CredentialsError> {
        let invalid = |reason: &str| CredentialsError::InvalidKeyPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut segments = Vec::new();
        let mut rest = raw;
        loop {
            let trimmed = rest.trim_start();
            let (segment, remainder) = if let Some(quoted) = trimmed.strip_prefix('"') {
                let end = quoted
                    .find('"')
                    .ok_or_else(|| invalid("unterminated quoted segment"))?;
                let segment = &quoted[..end];
                if segment.is_empty() {
                    return Err(invalid("quoted segment is empty"));
                }
                let after = quoted[end + 1..].trim_start();
                if !after.is_empty() && !after.starts_with('.') {
                    return Err(invalid("unexpected characters after quoted segment"));
                }
                (segment.to_string(), after)
            } else {
                let end = trimmed.find('.').unwrap_or(trimmed.len());
                let segment = trimmed[..end].trim();
                if segment.is_empty() {
                    return Err(invalid("empty segment"));
                }
                if segment.contains('"') {
                    return Err(invalid("quote inside unquoted segment"));
                }
                (segment.to_string(), &trimmed[end..])
            };
            segments.push(segment);

            match remainder.strip_prefix('.') {
                Some(next) => rest = next,
                None => break,
            }
        }

        Ok(Self { segments })
    }

    /// Path segments from outermost table to leaf key.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The leaf key name.
    pub fn leaf(&self) -> &str {
        // Parsing guarantees at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The enclosing table segments (empty for a top-level key).
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }
}

impl FromStr for KeyPath {
    type Err = CredentialsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            if segment.contains('.') || segment.trim() != segment {
                write!(f, "\"{segment}\"")?;
            } else {
                f.write_str(segment)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_segment() {
        let path = KeyPath::parse("upsert").unwrap();
        assert_eq!(path.segments(), ["upsert"]);
        assert_eq!(path.leaf(), "upsert");
        assert!(path.parents().is_empty());
    }

    #[test]
    fn parses_nested_segments() {
        let path = KeyPath::parse("credentials.aws.secret").unwrap();
        assert_eq!(path.segments(), ["credentials", "aws", "secret"]);
        assert_eq!(path.parents(), ["credentials", "aws"]);
        assert_eq!(path.leaf(), "secret");
    }

    #[test]
    fn quoted_segment_keeps_dots() {
        let path = KeyPath::parse("\"api.example.com\".token").unwrap();
        assert_eq!(path.segments(), ["api.example.com", "token"]);
        assert_eq!(path.to_string(), "\"api.example.com\".token");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let path = KeyPath::parse(" a . b ").unwrap();
        assert_eq!(path.segments(), ["a", "b"]);
    }

    #[test]
    fn rejects_empty_path() {
        assert!(matches!(
            KeyPath::parse("   "),
            Err(CredentialsError::InvalidKeyPath { .. })
        ));
    }

    #[test]
    fn rejects_empty_segments() {
        for raw in ["a..b", ".a", "a.", "\"\".a"] {
            assert!(
                matches!(
                    KeyPath::parse(raw),
                    Err(CredentialsError::InvalidKeyPath { .. })
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_unterminated_quote() {
        let err = KeyPath::parse("\"abc.def").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn rejects_garbage_after_quote() {
        assert!(KeyPath::parse("\"a\"b.c").is_err());
        assert!(KeyPath::parse("a\"b").is_err());
    }

    #[test]
    fn from_str_matches_parse() {
        let parsed: KeyPath = "one.two".parse().unwrap();
        assert_eq!(parsed, KeyPath::parse("one.two").unwrap());
    }
}

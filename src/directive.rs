//! Directive parsing.
//!
//! A directive is the text a template author writes to request an image:
//!
//! ```text
//! poster.jpg alt="The strange case of Dr. Jekyll"
//! gallery poster.jpg alt="The strange case of Dr. Jekyll" class="gal-img" data-selected
//! 350xAUTO posters/poster.jpg alt="The strange case of Dr. Jekyll"
//! ```
//!
//! The grammar is `[size] path [attributes]`:
//!
//! - **size**: optional; a single token with no `.`, `:` or `/` (a preset
//!   name or a `WIDTHxHEIGHT` pattern, resolved later by [`crate::size`]).
//! - **path**: mandatory; a token ending in a 3–4 character alphanumeric
//!   extension (`.jpg`, `.jpeg`, `.webp`, …).
//! - **attributes**: everything after the path, parsed by
//!   [`AttributeSet::parse`].
//!
//! A directive whose path can't be located is a content-authoring mistake and
//! fails loudly with [`DirectiveError::Malformed`].

use crate::attrs::AttributeSet;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error(
        "can't read image directive {0:?}; expected `[preset or WxH] path/to/img.jpg [attr=\"value\"]`"
    )]
    Malformed(String),
}

/// A parsed directive. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Preset name or `WxH` pattern, if given.
    pub size_token: Option<String>,
    /// Image path relative to the configured source directory.
    pub source_path: String,
    /// Attribute text after the path, leading whitespace removed.
    pub raw_attrs: String,
}

impl Directive {
    pub fn parse(raw: &str) -> Result<Self, DirectiveError> {
        let malformed = || DirectiveError::Malformed(raw.trim().to_string());

        let (first, rest) = next_token(raw);
        if first.is_empty() {
            return Err(malformed());
        }

        if is_image_path(first) {
            return Ok(Self {
                size_token: None,
                source_path: first.to_string(),
                raw_attrs: rest.trim().to_string(),
            });
        }

        if is_size_token(first) {
            let (second, rest) = next_token(rest);
            if is_image_path(second) {
                return Ok(Self {
                    size_token: Some(first.to_string()),
                    source_path: second.to_string(),
                    raw_attrs: rest.trim().to_string(),
                });
            }
        }

        Err(malformed())
    }

    /// Attributes written on the directive itself.
    pub fn attributes(&self) -> AttributeSet {
        AttributeSet::parse(&self.raw_attrs)
    }
}

impl FromStr for Directive {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split off the first whitespace-delimited token.
fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (&s[..end], &s[end..])
}

fn is_size_token(token: &str) -> bool {
    !token.is_empty() && !token.contains(['.', ':', '/'])
}

/// `something.ext` where `ext` is 3–4 ASCII alphanumerics.
fn is_image_path(token: &str) -> bool {
    match token.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && (3..=4).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

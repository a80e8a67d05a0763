//! Ordered HTML attribute sets.
//!
//! Attributes come from two places: the `attr` table of a preset in the
//! config file, and the free-form text trailing a directive. Both end up in an
//! [`AttributeSet`], which keeps insertion order because that order is the
//! order attributes appear in the emitted markup.
//!
//! ## Merging
//!
//! Directive attributes override preset attributes of the same name. The
//! overridden entry keeps the position it had in the preset; names the preset
//! doesn't know are appended:
//!
//! ```text
//! preset:    class="a" alt="x"
//! directive: class="b" data-selected
//! merged:    class="b" alt="x" data-selected
//! ```
//!
//! ## Rendering
//!
//! Each entry renders as `name="value" ` or, for a flag attribute, `name `.
//! The trailing space is part of the contract: callers splice the rendered
//! set straight into a tag (`<img src="…" class="b" >`).

use maud::html;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered mapping of attribute name to optional value.
///
/// A `None` value is a flag attribute (`disabled`, `data-selected`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    entries: Vec<(String, Option<String>)>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse directive attribute text.
    ///
    /// Accepts whitespace-separated `name`, `name="value"` and `name=value`
    /// tokens. Quoted values may contain whitespace and `\"`. Anything that
    /// doesn't fit (an unterminated quote, a stray `=`) degrades to flag
    /// attributes instead of failing. Repeated names keep the first position
    /// and the last value.
    pub fn parse(raw: &str) -> Self {
        let mut set = Self::new();
        let mut rest = raw;

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            let name_len = rest
                .find(|c: char| c.is_whitespace() || c == '=' || c == '"')
                .unwrap_or(rest.len());
            if name_len == 0 {
                // Stray `=` or `"` with no name in front of it
                let skip = rest.chars().next().map_or(1, char::len_utf8);
                rest = &rest[skip..];
                continue;
            }

            let name = &rest[..name_len];
            rest = &rest[name_len..];

            if let Some(quoted) = rest.strip_prefix("=\"") {
                match split_quoted(quoted) {
                    Some((value, after)) => {
                        set.insert(name, Some(value));
                        rest = after;
                    }
                    None => {
                        set.insert(name, None);
                        rest = &rest[1..];
                    }
                }
            } else if let Some(unquoted) = rest.strip_prefix('=') {
                let end = unquoted
                    .find(char::is_whitespace)
                    .unwrap_or(unquoted.len());
                let value = &unquoted[..end];
                if value.is_empty() || value.contains('"') {
                    set.insert(name, None);
                    rest = unquoted;
                } else {
                    set.insert(name, Some(value.to_string()));
                    rest = &unquoted[end..];
                }
            } else {
                set.insert(name, None);
            }
        }

        set
    }

    /// Insert or replace an attribute.
    ///
    /// Replacing keeps the existing position; new names are appended.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Merge `overrides` on top of `self`, returning a new set.
    pub fn merged(&self, overrides: &AttributeSet) -> AttributeSet {
        let mut merged = self.clone();
        for (name, value) in overrides.iter() {
            merged.insert(name, value.map(str::to_string));
        }
        merged
    }

    /// Whether an attribute with this name is present (flag or valued).
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// The value of a valued attribute. Flags and missing names return `None`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Render as `name="value" ` / `name ` pairs, values HTML-escaped.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.iter() {
            match value {
                Some(v) => {
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html! { (v) }.into_string());
                    out.push_str("\" ");
                }
                None => {
                    out.push_str(name);
                    out.push(' ');
                }
            }
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, Option<V>)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value.map(Into::into));
        }
        set
    }
}

/// Read a quoted value up to its closing `"`, unescaping `\"`.
///
/// Returns the value and the text after the closing quote, or `None` when the
/// quote is never closed.
fn split_quoted(s: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, '"')) => value.push('"'),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => value.push('\\'),
            },
            '"' => return Some((value, &s[i + 1..])),
            _ => value.push(c),
        }
    }
    None
}

// =============================================================================
// Config file representation
// =============================================================================

/// How an attribute is written in the config file.
///
/// `class = "gal"` is a valued attribute, `data-selected = true` a flag, and
/// `data-selected = false` drops the attribute. Numbers are kept as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    Float(f64),
}

impl Serialize for AttributeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            match value {
                Some(v) => map.serialize_entry(name, v)?,
                None => map.serialize_entry(name, &true)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttrVisitor;

        impl<'de> Visitor<'de> for AttrVisitor {
            type Value = AttributeSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of attribute names to strings or booleans")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut set = AttributeSet::new();
                while let Some((name, value)) = access.next_entry::<String, ConfigValue>()? {
                    match value {
                        ConfigValue::Text(v) => set.insert(name, Some(v)),
                        ConfigValue::Flag(true) => set.insert(name, None),
                        ConfigValue::Flag(false) => {}
                        ConfigValue::Integer(n) => set.insert(name, Some(n.to_string())),
                        ConfigValue::Float(n) => set.insert(name, Some(n.to_string())),
                    }
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(AttrVisitor)
    }
}

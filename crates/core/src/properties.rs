//! Java `.properties` files
//!
//! Gradle reads `gradle.properties` and most Flutter projects keep
//! `key.properties` next to it. Both use the `java.util.Properties` text
//! format, which this module parses and renders.

use crate::error::{Error, Result, ResultExt};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Parsed contents of a `.properties` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
    source: Option<PathBuf>,
}

impl Properties {
    /// Create an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties from text. Later duplicates win.
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in logical_lines(text) {
            let (key, value) = split_entry(&line);
            entries.insert(key, value);
        }
        Self { entries, source: None }
    }

    /// Read and parse a properties file
    ///
    /// The file is decoded as ISO-8859-1, like `java.util.Properties::load`
    /// with a byte stream; other characters arrive as `\uXXXX` escapes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(Error::from)
            .context(format!("Failed to read properties file {}", path.display()))?;
        let text: String = bytes.iter().copied().map(char::from).collect();

        let mut props = Self::parse(&text);
        props.source = Some(path.to_path_buf());
        Ok(props)
    }

    /// Like [`Properties::load`], but a missing file yields `None`
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert or replace a key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// File this set was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            source: None,
        }
    }
}

/// Render entries in the given order, escaping as `Properties.store` does
pub fn render<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' if is_key || i == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

/// Join continuation lines and drop blanks and comments
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let trimmed = raw.trim_start_matches([' ', '\t', '\x0c']);

        let mut line = match current.take() {
            Some(mut acc) => {
                acc.push_str(trimmed);
                acc
            }
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };

        if ends_with_continuation(&line) {
            line.pop();
            current = Some(line);
        } else {
            lines.push(line);
        }
    }

    if let Some(rest) = current {
        lines.push(rest);
    }
    lines
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (String, String) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut key_end = chars.len();
    let mut value_start = chars.len();

    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '=' | ':' => {
                key_end = i;
                value_start = i + 1;
                break;
            }
            ' ' | '\t' | '\x0c' => {
                key_end = i;
                let mut j = i;
                while j < chars.len() && matches!(chars[j], ' ' | '\t' | '\x0c') {
                    j += 1;
                }
                if j < chars.len() && matches!(chars[j], '=' | ':') {
                    j += 1;
                }
                value_start = j;
                break;
            }
            _ => i += 1,
        }
    }

    let key_end = key_end.min(chars.len());
    let mut value_start = value_start.min(chars.len());
    while value_start < chars.len() && matches!(chars[value_start], ' ' | '\t' | '\x0c') {
        value_start += 1;
    }

    let key: String = chars[..key_end].iter().collect();
    let value: String = chars[value_start..].iter().collect();
    (unescape(&key), unescape(&value))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => out.push(decoded),
                    // malformed escape, keep it readable rather than dropping data
                    _ => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

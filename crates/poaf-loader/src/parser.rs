//! Text decoding and OBO line lexing.
//!
//! The ontology parser works on `tag: value` lines whose values may carry
//! double-quoted strings with backslash escapes, a trailing `{qualifier}`
//! block and a trailing `! comment`. The helpers in [`parse`] locate those
//! pieces without being fooled by delimiters inside quotes.

use std::str::CharIndices;

use crate::types::{PoafError, PoafResult};

/// Decodes raw input bytes as UTF-8 text.
///
/// A leading byte-order mark is stripped. Bytes that are not valid UTF-8, or
/// that contain NUL bytes, fail the whole input: line-level recovery only
/// applies to text.
pub fn decode_text<'a>(bytes: &'a [u8], source_name: &str) -> PoafResult<&'a str> {
    let text = std::str::from_utf8(bytes).map_err(|e| PoafError::InputUnreadable {
        source_name: source_name.to_string(),
        reason: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
    })?;

    if let Some(offset) = text.find('\0') {
        return Err(PoafError::InputUnreadable {
            source_name: source_name.to_string(),
            reason: format!("binary content (NUL byte at offset {})", offset),
        });
    }

    Ok(text.trim_start_matches('\u{feff}'))
}

/// Iterates the characters of a value that are outside double quotes and not
/// escaped by a backslash. Quote characters themselves are not yielded.
struct Unquoted<'a> {
    chars: CharIndices<'a>,
    in_quotes: bool,
}

impl<'a> Unquoted<'a> {
    fn new(value: &'a str) -> Self {
        Self {
            chars: value.char_indices(),
            in_quotes: false,
        }
    }
}

impl Iterator for Unquoted<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((i, c)) = self.chars.next() {
            match c {
                '\\' => {
                    self.chars.next();
                }
                '"' => self.in_quotes = !self.in_quotes,
                _ if !self.in_quotes => return Some((i, c)),
                _ => {}
            }
        }
        None
    }
}

/// Helper functions for lexing OBO lines and values.
pub mod parse {
    use super::Unquoted;

    /// Returns the stanza name if the line is a stanza header (`[Term]`).
    pub fn stanza_header(line: &str) -> Option<&str> {
        let line = line.trim();
        line.strip_prefix('[')?.strip_suffix(']').map(str::trim)
    }

    /// Splits a line into its tag and value at the first unescaped `:`.
    ///
    /// Returns `None` for lines with no separator or an empty tag.
    pub fn tag_value(line: &str) -> Option<(&str, &str)> {
        let (i, _) = Unquoted::new(line).find(|&(_, c)| c == ':')?;
        let tag = line[..i].trim();
        if tag.is_empty() {
            return None;
        }
        Some((tag, line[i + 1..].trim()))
    }

    /// Removes a trailing `! comment` that is outside quotes.
    ///
    /// The `!` must start the value or follow whitespace, so identifiers and
    /// names containing `!` are left alone.
    pub fn strip_comment(value: &str) -> &str {
        let cut = Unquoted::new(value)
            .find(|&(i, c)| c == '!' && (i == 0 || value[..i].ends_with(char::is_whitespace)));
        match cut {
            Some((i, _)) => value[..i].trim_end(),
            None => value,
        }
    }

    /// Removes a trailing `{qualifier}` block that is outside quotes.
    pub fn strip_qualifiers(value: &str) -> &str {
        let value = value.trim_end();
        let mut open = None;
        let mut last = None;
        for (i, c) in Unquoted::new(value) {
            if c == '{' && i > 0 && value[..i].ends_with(char::is_whitespace) {
                open = Some(i);
            }
            last = Some((i, c));
        }
        match (open, last) {
            (Some(i), Some((j, '}'))) if j + 1 == value.len() => value[..i].trim_end(),
            _ => value,
        }
    }

    /// Parses a leading double-quoted string.
    ///
    /// Returns the unescaped text and the remainder after the closing quote.
    /// An unterminated quote takes the rest of the value. Returns `None` if
    /// the value does not start with a quote.
    pub fn quoted(value: &str) -> Option<(String, &str)> {
        let body = value.strip_prefix('"')?;
        let mut chars = body.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => return Some((unescape(&body[..i]), body[i + 1..].trim())),
                _ => {}
            }
        }
        Some((unescape(body), ""))
    }

    /// Parses a bracketed, comma-separated cross-reference list
    /// (`[PMID:123, GOC:abc]`). Returns an empty list if the value does not
    /// start with `[`.
    pub fn xref_list(value: &str) -> Vec<String> {
        let Some(body) = value.trim().strip_prefix('[') else {
            return Vec::new();
        };

        let end = Unquoted::new(body)
            .find(|&(_, c)| c == ']')
            .map(|(i, _)| i)
            .unwrap_or(body.len());
        let body = &body[..end];

        let mut xrefs = Vec::new();
        let mut start = 0;
        for (i, c) in Unquoted::new(body) {
            if c == ',' {
                xrefs.push(&body[start..i]);
                start = i + 1;
            }
        }
        xrefs.push(&body[start..]);

        xrefs
            .into_iter()
            .map(|x| unescape(strip_qualifiers(x.trim())))
            .filter(|x| !x.is_empty())
            .collect()
    }

    /// Resolves OBO backslash escapes.
    ///
    /// `\n` and `\t` become newline and tab, `\W` becomes a space, and any
    /// other escaped character stands for itself.
    pub fn unescape(value: &str) -> String {
        if !value.contains('\\') {
            return value.to_string();
        }

        let mut out = String::with_capacity(value.len());
        let mut chars = value.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('W') => out.push(' '),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        }
        out
    }
}

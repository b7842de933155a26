//! Name extraction module
//!
//! Pulls given-name candidates out of biography templates such as
//! `{{Personendaten|NAME=Schmidt, Otto|GEBURTSDATUM=...}}`.
//!
//! The delimiter sets below define what counts as a field, a value and a
//! given name.

use crate::error::SplitError;
use memchr::memmem;

/// Biography template of the German Wikipedia.
pub const DEFAULT_TEMPLATE: &str = "Personendaten";

/// Field key whose value holds "Surname, Given names".
pub const NAME_KEY: &str = "name";

/// U+02BF MODIFIER LETTER LEFT HALF RING, found in transliterated names.
pub const TRANSLITERATION_MARKER: char = '\u{02BF}';

const TEMPLATE_OPEN: &[u8] = b"{{";
const TEMPLATE_CLOSE: &[u8] = b"}}";

/// Characters separating several given names from each other.
#[inline]
fn is_given_name_delimiter(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0C}' | '\r' | ' ' | '-' | '.' | '\'' | '"' | TRANSLITERATION_MARKER
    )
}

/// Characters stripped from both ends of a field value.
#[inline]
fn is_value_filler(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0C}' | '\r' | ' ' | '\'' | '"' | TRANSLITERATION_MARKER
    )
}

/// One `key = value` segment of a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawField<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> RawField<'a> {
    /// Parse a segment, returning `None` if it is not a `key = value` pair.
    ///
    /// The key must consist of ASCII letters only. The value ends at the
    /// first line break and loses its leading and trailing filler.
    pub fn parse(segment: &'a str) -> Option<Self> {
        let (key, rest) = segment.split_once('=')?;

        let key = key.trim_matches(|c: char| c.is_ascii_whitespace());
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_alphabetic()) {
            return None;
        }

        let rest = rest.trim_start_matches(is_value_filler);
        let line = rest.split_once('\n').map_or(rest, |(line, _)| line);
        let value = line.trim_end_matches(is_value_filler);
        if value.is_empty() {
            return None;
        }

        Some(Self { key, value })
    }

    /// Case-insensitive key comparison
    #[inline]
    pub fn key_is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

/// A name value split at its first comma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRecord<'a> {
    pub surname: &'a str,
    /// The group right after the first comma. Later groups are ignored.
    pub given: &'a str,
}

impl<'a> NameRecord<'a> {
    pub fn parse(raw_value: &'a str) -> Result<Self, SplitError> {
        let (surname, rest) = raw_value
            .split_once(',')
            .ok_or(SplitError::NoSurnameSeparator)?;
        let given = rest.split_once(',').map_or(rest, |(group, _)| group);

        Ok(Self {
            surname: surname.trim_end_matches(|c: char| c.is_ascii_whitespace()),
            given,
        })
    }

    /// Individual given names, in order.
    pub fn given_names(&self) -> impl Iterator<Item = &'a str> {
        self.given
            .split(is_given_name_delimiter)
            .filter(|token| !token.is_empty())
    }

    pub fn first_name(&self) -> Result<&'a str, SplitError> {
        self.given_names().next().ok_or(SplitError::EmptyFirstName)
    }
}

/// Extract the first given name from a `"Surname, Given Names"` value.
///
/// The token is returned verbatim: no case folding, no Unicode normalization.
pub fn split_name_field(raw_value: &str) -> Result<&str, SplitError> {
    NameRecord::parse(raw_value)?.first_name()
}

/// Iterator over the bodies of every `{{<template>...}}` in a text.
///
/// The body is everything between the template name and the next `}}`.
/// Matches never overlap; an unterminated template ends the scan.
pub struct TemplateBodies<'a> {
    text: &'a str,
    name: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for TemplateBodies<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            let open = self.pos + memmem::find(&bytes[self.pos..], TEMPLATE_OPEN)?;
            let name_start = open + TEMPLATE_OPEN.len();
            let name_end = name_start + self.name.len();

            if name_end > bytes.len() || !bytes[name_start..name_end].eq_ignore_ascii_case(self.name) {
                self.pos = open + 1;
                continue;
            }

            let Some(close) = memmem::find(&bytes[name_end..], TEMPLATE_CLOSE) else {
                self.pos = bytes.len();
                return None;
            };

            let body_end = name_end + close;
            self.pos = body_end + TEMPLATE_CLOSE.len();

            if body_end > name_end {
                return Some(&self.text[name_end..body_end]);
            }
        }

        None
    }
}

/// Parsed fields of one template body. Malformed segments are skipped.
pub fn template_fields(body: &str) -> impl Iterator<Item = RawField<'_>> {
    body.split('|').filter_map(RawField::parse)
}

/// Locates biography templates and their name fields in record texts.
#[derive(Debug, Clone)]
pub struct NameExtractor {
    template: String,
}

impl NameExtractor {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn templates<'a>(&'a self, record_text: &'a str) -> TemplateBodies<'a> {
        TemplateBodies {
            text: record_text,
            name: self.template.as_bytes(),
            pos: 0,
        }
    }

    /// All `name` fields of all templates in the record.
    pub fn name_fields<'a>(&'a self, record_text: &'a str) -> impl Iterator<Item = RawField<'a>> + 'a {
        self.templates(record_text)
            .flat_map(template_fields)
            .filter(|field| field.key_is(NAME_KEY))
    }

    /// Candidate given names of one record. Unusable fields are skipped.
    pub fn extract_candidates<'a>(&'a self, record_text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.name_fields(record_text)
            .filter_map(|field| split_name_field(field.value).ok())
    }
}

impl Default for NameExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

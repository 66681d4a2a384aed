//! Field-level normalization shared by the contact builder and the writers.
//!
//! This is the only place where optional remote values become plain strings.

use crate::contacts::feed::TextField;
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("valid date regex"));

/// Flatten a possibly missing text node into one line.
pub fn safe_text(field: Option<&TextField>) -> String {
    safe_str(field.and_then(|f| f.text.as_deref()))
}

/// Flatten a possibly missing value into one line.
///
/// Every `\n` separates a piece, so a trailing newline leaves an empty last
/// piece: `"a\n"` gives `"a, "`. A `\r` before the newline is dropped.
pub fn safe_str(value: Option<&str>) -> String {
    value
        .map(|text| {
            text.split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

/// Reduce a feed timestamp such as `2011-12-04T01:16:11.081Z` to `2011-12-04`.
/// Anything not starting with a date is returned untouched.
pub fn canonicalize_date(raw: &str) -> String {
    match DATE_PREFIX.find(raw) {
        Some(m) => m.as_str().to_string(),
        None => raw.to_string(),
    }
}

/// Human label for a sub-record marker.
///
/// `http://schemas.google.com/g/2005#home` gives `Home`, a custom
/// `label=custom_tag` gives `Custom_Tag`. A missing marker gives an empty label.
pub fn label_from_rel(rel: Option<&str>) -> String {
    let rel = match rel {
        Some(rel) if !rel.is_empty() => rel,
        _ => return String::new(),
    };

    let raw = if let Some((_, label)) = rel.rsplit_once("label=") {
        label
    } else if let Some((_, fragment)) = rel.rsplit_once('#') {
        fragment
    } else {
        rel
    };

    title_case(raw)
}

/// Title-case the way Python's `str.title` does: a letter directly after
/// another letter is lowercased, every other letter is uppercased.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }

    out
}

/// Mail alias derived from a group name: lowercase, spaces become
/// underscores, ASCII punctuation (including pre-existing `_`) is dropped.
pub fn canonicalize_group_name(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_punctuation() => None,
            c => Some(c.to_ascii_lowercase()),
        })
        .collect()
}

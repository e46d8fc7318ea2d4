//! Title/artist canonicalization for cross-provider matching.
//!
//! Catalog metadata and MusicBrainz rarely agree byte-for-byte: editions add
//! "(Deluxe Edition)" suffixes, separators vary between dashes and colons,
//! and artist names carry diacritics.  `normalize` rewrites both sides into
//! the same canonical form before any comparison.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Parenthetical substrings, parentheses included: "Title (Deluxe)" → "Title".
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)\s*").unwrap());

/// Separator characters providers use interchangeably with spaces.
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-–—:]").unwrap());

/// Edition/reissue qualifiers, matched as whole words on lowercased input.
static QUALIFIERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:deluxe|remaster(?:ed)?|expanded|anniversary|special edition)\b").unwrap()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Canonicalize free text for comparison.
///
/// Ordered rewrites: lowercase, NFKD-decompose and drop combining marks,
/// delete parentheticals, map dashes/colons to spaces, strip edition
/// qualifiers, collapse whitespace, trim.  Deterministic and idempotent;
/// empty input normalizes to an empty string.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let no_parens = PARENTHETICAL.replace_all(&stripped, " ");
    let no_seps = SEPARATORS.replace_all(&no_parens, " ");
    let no_qualifiers = QUALIFIERS.replace_all(&no_seps, "");
    WHITESPACE
        .replace_all(&no_qualifiers, " ")
        .trim()
        .to_string()
}

//! Normalization functions for key labels and track titles.
//!
//! `normalize_key` canonicalizes key labels before grouping, and
//! `comparison_key` reduces a title to the form used to spot re-releases of
//! the same song.

use any_ascii::any_ascii;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::models::{Mode, NormalizedKey};

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Key label: letter, optional accidental, whitespace, mode.
/// The accidental `b` is case-sensitive so "B minor" is never read as a flat.
pub static KEY_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Ga-g])\s*(b|♭|#|♯)?\s+(?i:(major|minor))$").unwrap()
});

/// Release annotations stripped from titles before comparison (applied to
/// lower-cased text): "- Radio Edit", ": Instrumental", "Remastered",
/// "7-inch version", "7\" mix", ...
pub static ANNOTATION_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"[-–—:]?\s*(?:\b(?:instrumental|demo|edit(?:ed)?|remaster(?:ed)?|mix(?:ed)?|version|special|alternate|radio)\b|\b7\s*(?:"|”|''|-?\s*inch(?:es)?\b))"#,
    )
    .unwrap()
});

/// Parenthesized and bracketed substrings: "(Live)", "[2011 Remaster]"
pub static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").unwrap());

/// Regex to collapse runs of whitespace
pub static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Check if a character is a Unicode combining mark (diacritical mark).
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

/// Fold Unicode text to lower-case ASCII by applying NFKD decomposition and
/// removing combining marks, then transliterating what is left.
/// e.g., "Beyoncé" → "beyonce", "Кино" → "kino"
pub fn fold_to_ascii(s: &str) -> String {
    let stripped: String = s.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    any_ascii(&stripped).to_lowercase()
}

fn alphanumeric_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Canonicalize a raw key label.
///
/// "Ab Minor" and "A♭ minor" both become "A♭ Minor"; sharps are kept as
/// sharps ("F# Minor" stays "F# Minor", "F♯ Minor" is written with `#`).
/// Anything that does not parse becomes [`NormalizedKey::UNKNOWN`].
pub fn normalize_key(raw: &str) -> NormalizedKey {
    let collapsed = MULTI_SPACE.replace_all(raw.trim(), " ");
    let Some(caps) = KEY_LABEL.captures(&collapsed) else {
        return NormalizedKey::unknown();
    };

    let letter = caps[1].chars().next().unwrap_or('C');
    let accidental = caps.get(2).map(|m| match m.as_str() {
        "b" | "♭" => '♭',
        _ => '#',
    });
    let mode = if caps[3].eq_ignore_ascii_case("major") {
        Mode::Major
    } else {
        Mode::Minor
    };

    NormalizedKey::from_parts(letter, accidental, mode)
}

/// Normalize an optional key label; a missing label is unknown.
pub fn normalize_key_label(raw: Option<&str>) -> NormalizedKey {
    raw.map(normalize_key).unwrap_or_else(NormalizedKey::unknown)
}

/// Reduce a title to its comparison key.
///
/// Lower-cases, strips release annotations and bracketed text, folds to ASCII
/// and keeps only letters and digits:
/// "Hello (Live)" → "hello", "Hometown Glory - Radio Edit" → "hometownglory".
///
/// Never returns an empty string for a non-blank title: when stripping removes
/// everything ("(Intro)"), the folded title without stripping is used, and
/// failing that the lower-cased title itself.
pub fn comparison_key(title: &str) -> String {
    let lower = title.to_lowercase();
    let without_tokens = ANNOTATION_TOKENS.replace_all(&lower, "");
    let without_brackets = BRACKETED.replace_all(&without_tokens, "");

    let key = alphanumeric_only(&fold_to_ascii(&without_brackets));
    if !key.is_empty() {
        return key;
    }

    let unstripped = alphanumeric_only(&fold_to_ascii(&lower));
    if !unstripped.is_empty() {
        return unstripped;
    }

    lower.trim().to_string()
}

/// Two comparison keys are near-duplicates when either contains the other.
pub fn is_near_duplicate(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

// ============================================================================
// TESTS
// ============================================================================

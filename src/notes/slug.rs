//! Slug derivation from note titles.
//!
//! The title is lowercased, `&` becomes ` and `, runs of whitespace and
//! hyphens collapse into one `-`, characters outside the known alphabet are
//! dropped, and Cyrillic letters are transliterated with a fixed table. The
//! same title always yields the same slug.

use regex::Regex;
use std::sync::LazyLock;

/// Upper bound shared by generated and user-supplied slugs.
pub const MAX_SLUG_LENGTH: usize = 100;

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("static regex"));

static AMPERSAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&amp;|&").expect("static regex"));

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("static regex"));

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static regex"));

/// Transliteration of a single character, or `None` when it passes through.
fn transliterate_char(c: char) -> Option<&'static str> {
    let mapped = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // Ukrainian
        'є' => "ye",
        'і' => "i",
        'ї' => "yi",
        'ґ' => "g",
        // Typography
        '—' | '–' | '‒' | '−' => "-",
        '‘' | '’' => "'",
        '«' | '»' | '“' | '”' => "\"",
        '…' => "...",
        '№' => "#",
        _ => return None,
    };
    Some(mapped)
}

/// Characters that survive into transliteration: lowercase Latin letters,
/// digits, `-`, and everything the table knows how to spell.
fn in_alphabet(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || transliterate_char(c).is_some()
}

/// Replace every Cyrillic letter with its Latin spelling.
///
/// Input is lowercased first, so the table only needs lowercase entries.
pub fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars().flat_map(char::to_lowercase) {
        match transliterate_char(c) {
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
    out
}

/// Derive a URL-safe slug from a title.
///
/// Returns an empty string when nothing sluggable remains (e.g. a title made
/// only of punctuation); callers must treat that as "no slug". Leading and
/// trailing hyphens are kept.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let anded = AMPERSAND.replace_all(&lowered, " and ");
    let hyphenated = SEPARATORS.replace_all(&anded, "-");
    let kept: String = hyphenated.chars().filter(|c| in_alphabet(*c)).collect();
    let latin = transliterate(&kept);
    let cleaned = NON_WORD.replace_all(&latin, "");
    cleaned.trim().chars().take(MAX_SLUG_LENGTH).collect()
}

/// Whether `slug` is acceptable as an explicitly supplied slug.
pub fn is_valid_slug(slug: &str) -> bool {
    slug.chars().count() <= MAX_SLUG_LENGTH && SLUG_PATTERN.is_match(slug)
}

// Orthographic normalization: diacritic stripping, canonical spelling,
// common-quantity marking, Roman numerals and grammar-file line handling.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

static ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^M{0,4}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})$")
        .expect("roman numeral pattern")
});

// A long o followed by one or more breves, and a breve followed by repeated long o's.
static LONG_O_BREVES: Lazy<Regex> =
    Lazy::new(|| Regex::new("\u{14D}\u{306}+").expect("double diacritic pattern"));
static BREVE_LONG_OS: Lazy<Regex> =
    Lazy::new(|| Regex::new("\u{306}\u{14D}+").expect("double diacritic pattern"));

static HAS_PLAIN_VOWEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w*[aeiouy]").expect("vowel pattern"));

// Applied in order after a, i and o have been lengthened.
static COMMON_QUANTITY_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        ("([^\u{101}\u{103}\u{14D}])e", "${1}\u{113}\u{306}"),
        ("^e", "\u{113}"),
        ("([^\u{101}\u{113}q])u", "${1}\u{16B}\u{306}"),
        ("^u", "\u{16B}\u{306}"),
        ("^y", "\u{233}\u{306}"),
        ("([^\u{101}])y", "${1}\u{233}\u{306}"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("common quantity pattern"),
            replacement,
        )
    })
    .collect()
});

/// Remove diacritics from `s`.
///
/// Letters are decomposed and their combining marks dropped; ligatures are
/// expanded (æ → ae). With `fold_case == false`, uppercase characters are
/// kept exactly as written, diacritics included.
pub fn strip_diacritics(s: &str, fold_case: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        if !fold_case && c.is_uppercase() {
            out.push(c);
            continue;
        }
        match c {
            '\u{40E}' => out.push('Y'),
            '\u{45E}' => out.push('y'),
            'ı' => out.push('i'),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            _ => decompose_canonical(c, |d| {
                if !is_combining_mark(d) {
                    out.push(d);
                }
            }),
        }
    }
    out
}

/// Rewrite `s` into canonical orthography: j → i, v → u, ligatures expanded,
/// and stacked long-o/breve diacritics collapsed. Case and other diacritics
/// are preserved. Idempotent.
pub fn canonicalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'J' => out.push('I'),
            'j' => out.push('i'),
            'V' => out.push('U'),
            'v' => out.push('u'),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("Ae"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("Oe"),
            'ụ' => out.push('u'),
            _ => out.push(c),
        }
    }
    collapse_double_diacritics(&out)
}

/// Collapse a long o carrying extra breves, and breves followed by repeated
/// long o's, to a single mark.
pub fn collapse_double_diacritics(s: &str) -> String {
    let once = LONG_O_BREVES.replace_all(s, "\u{14D}");
    BREVE_LONG_OS.replace_all(&once, "\u{306}").into_owned()
}

/// Mark the vowels of a stem whose quantity the lexicon leaves unstated.
///
/// a, i and o become long; e, u and y become long-with-breve (common),
/// except after a long a, a short a, a long o (for e), a long a, a long e
/// or q (for u), and a long a (for y). A leading capital survives.
pub fn mark_common_quantities(s: &str) -> String {
    let Some(first) = s.chars().next() else {
        return String::new();
    };
    let capital = first.is_uppercase();
    let mut marked = s.to_lowercase();
    if HAS_PLAIN_VOWEL.is_match(&marked) {
        marked = marked
            .replace('a', "\u{101}")
            .replace('i', "\u{12B}")
            .replace('o', "\u{14D}");
        for (rule, replacement) in COMMON_QUANTITY_RULES.iter() {
            marked = rule.replace_all(&marked, *replacement).into_owned();
        }
    }
    if capital {
        capitalize(&marked)
    } else {
        marked
    }
}

/// Lengthen the final vowel of an ending before a suffix is appended to it.
///
/// No lengthening rule is defined for the supported grammars, so the
/// spelling comes back unchanged.
pub fn lengthen_final_vowel(s: &str) -> String {
    s.to_string()
}

/// Whether `s` is a well-formed uppercase Roman numeral (M{0,4} up to 4999).
pub fn is_valid_numeral_spelling(s: &str) -> bool {
    !s.is_empty() && ROMAN_NUMERAL.is_match(s)
}

/// Parse a list like `"1,3-5,9"` into the integers it covers, in order.
/// Returns `None` if any element is not an integer or an integer range.
pub fn parse_interval_list(s: &str) -> Option<Vec<u16>> {
    let mut codes = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        match part.split_once('-') {
            Some((low, high)) => {
                let low: u16 = low.trim().parse().ok()?;
                let high: u16 = high.trim().parse().ok()?;
                codes.extend(low..=high);
            }
            None => codes.push(part.parse().ok()?),
        }
    }
    Some(codes)
}

/// Collapse every run of whitespace to one space and trim the ends.
pub fn simplify_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The meaningful lines of a grammar or lexicon file: `!` starts a comment,
/// blank lines are skipped, doubled diacritics are collapsed.
pub fn content_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines().filter_map(|line| {
        let content = match line.find('!') {
            Some(at) => &line[..at],
            None => line,
        };
        let content = content.trim();
        if content.is_empty() {
            None
        } else {
            Some(collapse_double_diacritics(content))
        }
    })
}

/// Whether `s` contains any uppercase letter.
pub fn has_uppercase(s: &str) -> bool {
    s.chars().any(char::is_uppercase)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ascii_is_identity() {
        for s in ["lupus", "Romanorum", "XIV", "", "a-b c"] {
            assert_eq!(strip_diacritics(s, true), s);
            assert_eq!(strip_diacritics(s, false), s);
        }
    }

    #[test]
    fn test_strip_macrons_and_breves() {
        assert_eq!(strip_diacritics("Rōmānŭs", true), "Romanus");
        assert_eq!(strip_diacritics("lē\u{306}gō", true), "lego");
        assert_eq!(strip_diacritics("præda", true), "praeda");
    }

    #[test]
    fn test_strip_keeps_capitals_without_fold() {
        assert_eq!(strip_diacritics("Āmō", false), "Āmo");
        assert_eq!(strip_diacritics("Āmō", true), "Amo");
    }

    #[test]
    fn test_canonicalize_letters() {
        assert_eq!(canonicalize("Iuppiter"), "Iuppiter");
        assert_eq!(canonicalize("Juppiter"), "Iuppiter");
        assert_eq!(canonicalize("vivus"), "uiuus");
        assert_eq!(canonicalize("Vae"), "Uae");
        assert_eq!(canonicalize("præda"), "praeda");
        assert_eq!(canonicalize("Œdipus"), "Oedipus");
    }

    #[test]
    fn test_canonicalize_idempotent() {
        for s in [
            "Juuenis",
            "vōx",
            "ō\u{306}\u{306}",
            "\u{306}ōōō",
            "cæsar",
            "nĕc",
            "",
        ] {
            let once = canonicalize(s);
            assert_eq!(canonicalize(&once), once, "not idempotent on {s:?}");
        }
    }

    #[test]
    fn test_canonicalize_collapses_diacritics() {
        assert_eq!(canonicalize("ō\u{306}\u{306}"), "ō");
        assert_eq!(canonicalize("a\u{306}ōō"), "a\u{306}");
    }

    #[test]
    fn test_common_quantities() {
        assert_eq!(mark_common_quantities("praed"), "prāed");
        assert_eq!(mark_common_quantities("leg"), "lē\u{306}g");
        assert_eq!(mark_common_quantities("Roman"), "Rōmān");
        assert_eq!(mark_common_quantities("equ"), "ēqu");
        assert_eq!(mark_common_quantities("ūv"), "ūv");
    }

    #[test]
    fn test_common_quantities_leave_marked_stems() {
        assert_eq!(mark_common_quantities("ērgō"), "ērgō");
        assert_eq!(mark_common_quantities("nĕc"), "nĕc");
        assert_eq!(mark_common_quantities(""), "");
    }

    #[test]
    fn test_numerals() {
        assert!(is_valid_numeral_spelling("XIV"));
        assert!(is_valid_numeral_spelling("MDCXXIV"));
        assert!(is_valid_numeral_spelling("MMMMCMXCIX"));
        assert!(!is_valid_numeral_spelling(""));
        assert!(!is_valid_numeral_spelling("IIX"));
        assert!(!is_valid_numeral_spelling("xiv"));
    }

    #[test]
    fn test_interval_list() {
        assert_eq!(parse_interval_list("1,3-5,9"), Some(vec![1, 3, 4, 5, 9]));
        assert_eq!(parse_interval_list("7"), Some(vec![7]));
        assert_eq!(parse_interval_list("1-x"), None);
        assert_eq!(parse_interval_list(""), None);
    }

    #[test]
    fn test_content_lines() {
        let text = "! header\n\nmodele:lupus ! trailing\n  R:1:2  \n";
        let lines: Vec<String> = content_lines(text).collect();
        assert_eq!(lines, vec!["modele:lupus", "R:1:2"]);
    }
}

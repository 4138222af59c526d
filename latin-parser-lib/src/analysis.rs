// Word analysis: irregular lookup, stem + ending segmentation, Roman
// numerals, and the spelling-variant retries around them.

use tracing::trace;

use crate::lemma::{Lemma, Stem, StemId};
use crate::normalize::{
    canonicalize, has_uppercase, is_valid_numeral_spelling, strip_diacritics,
};
use crate::paradigm::Ending;
use crate::registry::{Registry, INVARIABLE_PARADIGM};
use crate::types::{Analysis, Origin, WordAnalysis};

/// Analyse a single word form: irregular forms, then every stem/ending
/// split, then the Roman-numeral reading.
pub fn analyze(word: &str, registry: &Registry) -> Vec<Analysis> {
    let mut analyses = Vec::new();
    structural(word, registry, &mut analyses);
    numeral(word, registry, &mut analyses);
    analyses
}

/// Analyse a word together with its spelling variants: the lower-cased
/// word, the word itself, its assimilated and de-assimilated prefixes, and
/// its expanded contractions. Results are concatenated in that order
/// without deduplication, followed by the Roman-numeral reading.
pub fn lemmatize(word: &str, registry: &Registry) -> WordAnalysis {
    let word = word.trim();
    let mut analyses = Vec::new();

    let lower = word.to_lowercase();
    if has_uppercase(word) {
        structural(&lower, registry, &mut analyses);
        rewrites(&lower, registry, &mut analyses);
    }
    structural(word, registry, &mut analyses);
    rewrites(word, registry, &mut analyses);

    // Numeral lemmas belong to no lexicon, so they take no part in the filter.
    if registry.options().core_only && analyses.iter().any(|a| a.origin == Origin::Core) {
        analyses.retain(|a| a.origin == Origin::Core);
    }
    numeral(word, registry, &mut analyses);

    WordAnalysis {
        word: word.to_string(),
        analyses,
    }
}

/// The spelling under which `word` is looked up: diacritics stripped,
/// canonical letters, case kept.
fn lookup_form(word: &str) -> String {
    canonicalize(&strip_diacritics(word, true))
}

fn structural(word: &str, registry: &Registry, out: &mut Vec<Analysis>) {
    let form = lookup_form(word);
    if form.is_empty() {
        return;
    }
    irregulars(&form, registry, out);
    segmentations(word, &form, registry, out);
}

fn rewrites(word: &str, registry: &Registry, out: &mut Vec<Analysis>) {
    let form = lookup_form(word);
    if let Some(assimilated) = registry.assimilate(&form) {
        structural(&assimilated, registry, out);
    }
    if let Some(plain) = registry.deassimilate(&form) {
        structural(&plain, registry, out);
    }

    let written = strip_diacritics(word, true);
    for (contracted, full) in registry.contractions() {
        let Some(rest) = written.strip_suffix(contracted.as_str()) else {
            continue;
        };
        // The letter guard compares v counts, so a v-spelled remainder keeps
        // the v-spelled expansion.
        let expanded = if rest.contains(['v', 'V']) {
            format!("{rest}{full}")
        } else {
            format!("{rest}{}", canonicalize(full))
        };
        trace!(word, %expanded, "contraction expanded");
        structural(&expanded, registry, out);
    }
}

fn irregulars(form: &str, registry: &Registry, out: &mut Vec<Analysis>) {
    for &id in registry.irregulars_for(form) {
        let irregular = registry.irregular(id);
        let lemma = registry.lemma_by_id(irregular.lemma());
        for &morpho in irregular.morphos() {
            out.push(record(form, irregular.accented().to_string(), lemma, morpho, registry));
        }
    }
}

/// Try every split of `form` into stem + ending. `written` is the word as
/// given, used by the letter guard.
fn segmentations(written: &str, form: &str, registry: &Registry, out: &mut Vec<Analysis>) {
    let letters = LetterCounts::of(written);
    let splits = form
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(form.len()));
    for split in splits {
        let (stem_part, ending_part) = form.split_at(split);
        let endings = registry.endings_for(ending_part);
        if endings.is_empty() {
            continue;
        }
        let mut stems: Vec<StemId> = registry.stems_for(stem_part).to_vec();
        // An ending in i may have absorbed the final i of the stem.
        if ending_part.starts_with('i') && !ending_part.starts_with("ii") && !stem_part.ends_with('i') {
            stems.extend_from_slice(registry.stems_for(&format!("{stem_part}i")));
        }

        for &stem_id in &stems {
            let stem = registry.stem(stem_id);
            let lemma = registry.lemma_by_id(stem.lemma());
            for &ending_id in endings {
                let ending = registry.ending(ending_id);
                if ending.paradigm() != lemma.paradigm()
                    || ending.slot() != stem.slot()
                    || lemma.is_suppressed(ending.morpho())
                    || !letters.admit(written, stem, ending)
                {
                    continue;
                }
                trace!(form, stem = stem.bare(), ending = ending.bare(), lemma = lemma.key(), "split accepted");
                let accented = reconstruct(stem_part, stem, ending);
                out.push(record(form, accented, lemma, ending.morpho(), registry));
            }
        }
    }
}

/// Stem plus ending with quantities. When the stem's own final i was
/// absorbed by the ending, that i is written long once.
fn reconstruct(stem_part: &str, stem: &Stem, ending: &Ending) -> String {
    if stem_part.ends_with('i') || !stem.bare().ends_with('i') {
        return format!("{}{}", stem.accented(), ending.accented());
    }
    let mut accented = stem.accented().to_string();
    while accented
        .chars()
        .last()
        .is_some_and(unicode_normalization::char::is_combining_mark)
    {
        accented.pop();
    }
    accented.pop();
    accented.push('\u{12B}');
    accented.extend(ending.accented().chars().skip(1));
    accented
}

/// Roman numeral reading of the word, or of its upper-cased form.
fn numeral(word: &str, registry: &Registry, out: &mut Vec<Analysis>) {
    let form = strip_diacritics(word, true);
    numeral_form(&form, registry, out);
    if form.chars().any(char::is_lowercase) {
        numeral_form(&form.to_uppercase(), registry, out);
    }
}

fn numeral_form(form: &str, registry: &Registry, out: &mut Vec<Analysis>) {
    if !is_valid_numeral_spelling(form) || registry.contains_lemma(form) {
        return;
    }
    let Some(paradigm) = registry.paradigm_id(INVARIABLE_PARADIGM) else {
        trace!(form, "no invariable paradigm, numeral reading skipped");
        return;
    };
    let lemma = Lemma::numeral(form, paradigm);
    out.push(record(form, form.to_string(), &lemma, registry.invariable_code(), registry));
}

fn record(form: &str, accented: String, lemma: &Lemma, morpho: u16, registry: &Registry) -> Analysis {
    Analysis {
        form: form.to_string(),
        accented,
        lemma_key: lemma.key().to_string(),
        lemma: lemma.spelling().to_string(),
        pos: lemma.pos(registry).to_string(),
        morpho,
        description: registry
            .describe(morpho)
            .map(str::to_string)
            .unwrap_or_default(),
        origin: lemma.origin(),
    }
}

// ---------------------------------------------------------------------------
// Letter guard
// ---------------------------------------------------------------------------

/// Counts of the letters whose spelling must agree with the stem: v (not
/// folded into u), and the ligatures æ and œ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LetterCounts {
    v: usize,
    ae: usize,
    oe: usize,
}

impl LetterCounts {
    fn of(written: &str) -> Self {
        let lower = written.to_lowercase();
        let mut ae = lower.matches('æ').count();
        if lower.ends_with('æ') {
            ae -= 1;
        }
        Self {
            v: lower.matches('v').count(),
            ae,
            oe: lower.matches('œ').count(),
        }
    }

    /// Whether a word spelled with these letters can be `stem` + `ending`.
    /// A zero count never constrains. A word spelled with a capital V may
    /// stand for a stem written with U.
    fn admit(&self, written: &str, stem: &Stem, ending: &Ending) -> bool {
        let stem_spelling = stem.accented().to_lowercase();
        let expected_v = stem_spelling.matches('v').count() + ending.accented().matches('v').count();
        let v_agrees = self.v == 0
            || self.v == expected_v
            || (written.starts_with('V') && stem.bare().starts_with('U') && self.v - 1 == expected_v);
        let ae_agrees = self.ae == 0
            || self.ae == stem_spelling.matches("\u{101}e").count() + stem_spelling.matches("pr\u{103}e").count();
        let oe_agrees = self.oe == 0 || self.oe == stem_spelling.matches("\u{14D}e").count();
        v_agrees && ae_agrees && oe_agrees
    }
}

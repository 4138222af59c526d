// Lemmas and their stems: lexicon line parsing, part-of-speech and gender
// derivation, cross-reference resolution.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Defect;
use crate::normalize::{canonicalize, mark_common_quantities, strip_diacritics};
use crate::paradigm::ParadigmId;
use crate::registry::Registry;
use crate::types::Origin;

/// Part-of-speech tag of numerals.
pub const NUMERAL_POS: &str = "m";

// Annotation substrings and the tag each one contributes, in output order.
const POS_RULES: &[(&str, char)] = &[
    ("adj.", 'a'),
    ("conj", 'c'),
    ("excl.", 'e'),
    ("interj", 'i'),
    ("num.", 'm'),
    ("pron.", 'p'),
    ("prép", 'r'),
    ("adv", 'd'),
    (" nom ", 'n'),
    ("npr.", 'n'),
];

const GENDER_RULES: &[(&str, char)] = &[(" m.", 'm'), (" f.", 'f'), (" n.", 'n')];

const MAX_CROSS_REFERENCE_HOPS: usize = 8;

static CROSS_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"cf\.\s(\w+)$").expect("cross-reference pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LemmaId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StemId(pub(crate) usize);

// ---------------------------------------------------------------------------
// Stems
// ---------------------------------------------------------------------------

/// A stem of one lemma for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stem {
    accented: String,
    bare: String,
    slot: u8,
    lemma: LemmaId,
}

impl Stem {
    pub(crate) fn new(spelling: &str, slot: u8, lemma: LemmaId) -> Self {
        Self {
            accented: mark_common_quantities(spelling),
            bare: strip_diacritics(spelling, true),
            slot,
            lemma,
        }
    }

    /// Spelling with every vowel quantity marked.
    pub fn accented(&self) -> &str {
        &self.accented
    }

    pub fn bare(&self) -> &str {
        &self.bare
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn lemma(&self) -> LemmaId {
        self.lemma
    }

    /// Key of the stem index: canonical, diacritic-free, lower case.
    pub(crate) fn index_key(&self) -> String {
        canonicalize(&self.bare).to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// Lexicon lines
// ---------------------------------------------------------------------------

/// One lexicon line split into its fields:
/// `canonical[=accented]|paradigm|stems 1|stems 2|annotation|occurrences`.
#[derive(Debug)]
pub(crate) struct LexiconLine<'a> {
    pub(crate) key: String,
    pub(crate) homonym: u8,
    pub(crate) accented: String,
    pub(crate) spelling: String,
    pub(crate) paradigm: String,
    pub(crate) explicit_stems: Vec<(u8, Vec<&'a str>)>,
    pub(crate) annotation: &'a str,
    pub(crate) frequency: u32,
    /// False when fields were missing or unreadable and defaults were used.
    pub(crate) complete: bool,
}

impl<'a> LexiconLine<'a> {
    pub(crate) fn parse(line: &'a str) -> Result<Self, Defect> {
        let fields: Vec<&'a str> = line.split('|').map(str::trim).collect();
        let field = |i: usize| fields.get(i).copied().unwrap_or("");
        let malformed = |reason| Defect::MalformedLexiconLine {
            line: line.to_string(),
            reason,
        };

        let paradigm = strip_diacritics(field(1), true);
        if paradigm.is_empty() {
            return Err(malformed("no paradigm"));
        }
        let (canonical, variant) = match field(0).split_once('=') {
            Some((canonical, variant)) => (canonical.trim(), Some(variant.trim())),
            None => (field(0), None),
        };
        let key = strip_diacritics(&canonicalize(canonical), true);
        if key.is_empty() {
            return Err(malformed("no lemma"));
        }
        let (homonym, written) = match canonical.chars().last().and_then(|c| c.to_digit(10)) {
            Some(digit) => (digit as u8, &canonical[..canonical.len() - 1]),
            None => (0, canonical),
        };
        let accented = variant.unwrap_or(written).to_string();
        let spelling = strip_diacritics(accented.split(',').next().unwrap_or("").trim(), true);

        let mut explicit_stems = Vec::new();
        for (slot, i) in [(1u8, 2usize), (2, 3)] {
            let alternatives: Vec<&str> = field(i)
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if !alternatives.is_empty() {
                explicit_stems.push((slot, alternatives));
            }
        }

        let mut complete = fields.len() >= 6;
        let frequency: u32 = match field(5) {
            "" => 1,
            count => count.parse().unwrap_or_else(|_| {
                complete = false;
                1
            }),
        };

        Ok(Self {
            key,
            homonym,
            accented,
            spelling,
            paradigm,
            explicit_stems,
            annotation: field(4),
            frequency,
            complete,
        })
    }
}

/// The lemma a `cf. WORD` annotation points to, if any.
pub(crate) fn cross_reference(annotation: &str) -> Option<String> {
    CROSS_REFERENCE
        .captures(annotation)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Part-of-speech tags for a lemma: from its annotation if any rule
/// matches, otherwise the paradigm's. A bare cross-reference with an
/// adverbial paradigm gets no tag of its own.
pub(crate) fn derive_pos(
    annotation: &str,
    has_cross_reference: bool,
    paradigm_pos: Option<&str>,
) -> String {
    let tags: String = POS_RULES
        .iter()
        .filter(|(needle, _)| annotation.contains(needle))
        .map(|(_, tag)| *tag)
        .collect();
    if !tags.is_empty() {
        return tags;
    }
    match paradigm_pos {
        Some("d") if has_cross_reference => String::new(),
        Some(pos) => pos.to_string(),
        None => String::new(),
    }
}

pub(crate) fn derive_gender(annotation: &str) -> String {
    GENDER_RULES
        .iter()
        .filter(|(needle, _)| annotation.contains(needle))
        .map(|(_, tag)| *tag)
        .collect()
}

// ---------------------------------------------------------------------------
// Lemmas
// ---------------------------------------------------------------------------

/// A lexicon entry: one dictionary headword with its paradigm and stems.
#[derive(Debug, Clone)]
pub struct Lemma {
    key: String,
    accented: String,
    spelling: String,
    paradigm: ParadigmId,
    pub(crate) stems: BTreeMap<u8, Vec<StemId>>,
    pub(crate) frequency: u32,
    homonym: u8,
    pos: String,
    gender: String,
    annotation: String,
    cross_reference: Option<String>,
    pub(crate) suppressed: BTreeSet<u16>,
    origin: Origin,
}

impl Lemma {
    pub(crate) fn from_line(
        line: &LexiconLine<'_>,
        paradigm: ParadigmId,
        paradigm_pos: Option<&str>,
        origin: Origin,
    ) -> Self {
        let cross_reference = cross_reference(line.annotation);
        Self {
            key: line.key.clone(),
            accented: line.accented.clone(),
            spelling: line.spelling.clone(),
            paradigm,
            stems: BTreeMap::new(),
            frequency: line.frequency,
            homonym: line.homonym,
            pos: derive_pos(line.annotation, cross_reference.is_some(), paradigm_pos),
            gender: derive_gender(line.annotation),
            annotation: line.annotation.to_string(),
            cross_reference,
            suppressed: BTreeSet::new(),
            origin,
        }
    }

    /// A lemma made up on the spot for a Roman numeral. It is never
    /// registered.
    pub(crate) fn numeral(form: &str, paradigm: ParadigmId) -> Self {
        Self {
            key: form.to_string(),
            accented: form.to_string(),
            spelling: form.to_string(),
            paradigm,
            stems: BTreeMap::new(),
            frequency: 1,
            homonym: 0,
            pos: NUMERAL_POS.to_string(),
            gender: String::new(),
            annotation: String::new(),
            cross_reference: None,
            suppressed: BTreeSet::new(),
            origin: Origin::Core,
        }
    }

    /// Lexicon key, homonym digit included.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Canonical spelling with quantities, possibly several `,`-separated doublets.
    pub fn accented(&self) -> &str {
        &self.accented
    }

    /// Display spelling: first doublet, without diacritics or homonym digit.
    pub fn spelling(&self) -> &str {
        &self.spelling
    }

    pub fn paradigm(&self) -> ParadigmId {
        self.paradigm
    }

    pub fn stems(&self, slot: u8) -> &[StemId] {
        self.stems.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn slots(&self) -> impl Iterator<Item = u8> + '_ {
        self.stems.keys().copied()
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// 0 when the headword has no homonyms.
    pub fn homonym(&self) -> u8 {
        self.homonym
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    pub fn cross_reference(&self) -> Option<&str> {
        self.cross_reference.as_deref()
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Whether regular forms for `morpho` are replaced by an exclusive irregular.
    pub fn is_suppressed(&self, morpho: u16) -> bool {
        self.suppressed.contains(&morpho)
    }

    /// Part-of-speech tags, following `cf.` cross-references when the lemma
    /// has none of its own.
    pub fn pos<'r>(&'r self, registry: &'r Registry) -> &'r str {
        self.resolve(registry, |lemma| lemma.pos.as_str())
    }

    /// Gender tags, following cross-references like [`Lemma::pos`].
    pub fn gender<'r>(&'r self, registry: &'r Registry) -> &'r str {
        self.resolve(registry, |lemma| lemma.gender.as_str())
    }

    fn resolve<'r>(&'r self, registry: &'r Registry, get: impl Fn(&'r Lemma) -> &'r str) -> &'r str {
        let mut current = self;
        for _ in 0..MAX_CROSS_REFERENCE_HOPS {
            let value = get(current);
            if !value.is_empty() {
                return value;
            }
            match current
                .cross_reference
                .as_deref()
                .and_then(|key| registry.lemma(key).ok())
            {
                Some(next) => current = next,
                None => return value,
            }
        }
        get(current)
    }

    /// Every bare form the regular inflection produces, sorted and
    /// deduplicated. Suppressed codes are left out.
    pub fn possible_forms(&self, registry: &Registry) -> Vec<String> {
        let paradigm = registry.paradigm_by_id(self.paradigm);
        let mut forms = BTreeSet::new();
        for ending_id in paradigm.all_endings() {
            let ending = registry.ending(ending_id);
            if self.is_suppressed(ending.morpho()) {
                continue;
            }
            for &stem_id in self.stems(ending.slot()) {
                forms.insert(format!("{}{}", registry.stem(stem_id).bare(), ending.bare()));
            }
        }
        forms.into_iter().collect()
    }
}

// Paradigm model: endings, stem-derivation rules, and the compiled
// (self-contained) paradigm table.

use std::collections::{BTreeMap, BTreeSet};

use crate::normalize::strip_diacritics;
use crate::registry::Registry;

/// Rarity of an ending whose grammar cell carries no trailing digit.
pub const DEFAULT_RARITY: u8 = 10;

/// Position of a paradigm in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParadigmId(pub(crate) usize);

/// Position of an ending in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndingId(pub(crate) usize);

// ---------------------------------------------------------------------------
// Endings
// ---------------------------------------------------------------------------

/// An inflectional suffix for one grammology code of one paradigm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ending {
    accented: String,
    bare: String,
    morpho: u16,
    slot: u8,
    rarity: u8,
    paradigm: ParadigmId,
}

impl Ending {
    /// Build an ending from one graphic alternative of a grammar cell.
    /// A trailing digit is the rarity; a lone `-` is the null ending.
    pub fn parse(cell: &str, morpho: u16, slot: u8, paradigm: ParadigmId) -> Self {
        let cell = cell.trim();
        let (spelling, rarity) = match cell.chars().last().and_then(|c| c.to_digit(10)) {
            Some(digit) => (&cell[..cell.len() - 1], digit as u8),
            None => (cell, DEFAULT_RARITY),
        };
        let spelling = if spelling == "-" { "" } else { spelling };
        Self {
            accented: spelling.to_string(),
            bare: strip_diacritics(spelling, true),
            morpho,
            slot,
            rarity,
            paradigm,
        }
    }

    /// The same ending, owned by another paradigm.
    pub fn cloned_for(&self, paradigm: ParadigmId) -> Self {
        Self {
            paradigm,
            ..self.clone()
        }
    }

    pub fn accented(&self) -> &str {
        &self.accented
    }

    pub fn bare(&self) -> &str {
        &self.bare
    }

    pub fn morpho(&self) -> u16 {
        self.morpho
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Lower is more frequent. Kept for callers; analysis does not rank.
    pub fn rarity(&self) -> u8 {
        self.rarity
    }

    pub fn paradigm(&self) -> ParadigmId {
        self.paradigm
    }
}

// ---------------------------------------------------------------------------
// Stem rules
// ---------------------------------------------------------------------------

/// How the stem of one slot is derived from a lemma's canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StemRule {
    /// The canonical spelling itself (`K`).
    Canonical,
    /// Drop `remove` trailing characters, then append `append`.
    Cut { remove: usize, append: String },
    /// No stem for this slot (`-`).
    Skipped,
}

impl StemRule {
    /// Parse the value part of an `R:slot:value` directive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "K" => Some(Self::Canonical),
            "-" => Some(Self::Skipped),
            value => {
                let (remove, append) = value.split_once(',').unwrap_or((value, "0"));
                let remove = remove.trim().parse().ok()?;
                let append = match append.trim() {
                    "0" => String::new(),
                    suffix => suffix.to_string(),
                };
                Some(Self::Cut { remove, append })
            }
        }
    }

    /// Derive a stem from one canonical spelling alternative. Counts are in
    /// characters; cutting at least the whole spelling leaves only the
    /// appended suffix.
    pub fn apply(&self, canonical: &str) -> Option<String> {
        match self {
            Self::Canonical => Some(canonical.to_string()),
            Self::Skipped => None,
            Self::Cut { remove, append } => {
                let len = canonical.chars().count();
                let mut stem: String = canonical.chars().take(len.saturating_sub(*remove)).collect();
                stem.push_str(append);
                Some(stem)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Paradigms
// ---------------------------------------------------------------------------

/// A compiled paradigm. Inheritance has already been resolved: the ending
/// table, stem rules and absent set are complete without the parent.
#[derive(Debug, Clone)]
pub struct Paradigm {
    pub(crate) id: ParadigmId,
    pub(crate) name: String,
    pub(crate) accented_name: String,
    pub(crate) parent: Option<ParadigmId>,
    pub(crate) stem_rules: BTreeMap<u8, StemRule>,
    pub(crate) endings: BTreeMap<u16, Vec<EndingId>>,
    pub(crate) absent: BTreeSet<u16>,
    pub(crate) pos: Option<String>,
}

impl Paradigm {
    pub fn id(&self) -> ParadigmId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accented_name(&self) -> &str {
        &self.accented_name
    }

    pub fn parent(&self) -> Option<ParadigmId> {
        self.parent
    }

    pub fn stem_rule(&self, slot: u8) -> Option<&StemRule> {
        self.stem_rules.get(&slot)
    }

    pub fn stem_rules(&self) -> impl Iterator<Item = (u8, &StemRule)> + '_ {
        self.stem_rules.iter().map(|(slot, rule)| (*slot, rule))
    }

    /// Grammology codes that have at least one ending, ascending.
    pub fn morphos(&self) -> impl Iterator<Item = u16> + '_ {
        self.endings.keys().copied()
    }

    /// Endings for one code, in definition order.
    pub fn endings(&self, morpho: u16) -> &[EndingId] {
        self.endings.get(&morpho).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_endings(&self) -> impl Iterator<Item = EndingId> + '_ {
        self.endings.values().flatten().copied()
    }

    pub fn is_absent(&self, morpho: u16) -> bool {
        self.absent.contains(&morpho)
    }

    pub fn absent(&self) -> &BTreeSet<u16> {
        &self.absent
    }

    /// Part of speech declared on this paradigm or inherited at compile time.
    pub fn pos(&self) -> Option<&str> {
        self.pos.as_deref()
    }

    /// Whether this paradigm is `name` or descends from it.
    pub fn is_a(&self, name: &str, registry: &Registry) -> bool {
        let mut current = Some(self);
        while let Some(paradigm) = current {
            if paradigm.name == name {
                return true;
            }
            current = paradigm.parent.map(|id| registry.paradigm_by_id(id));
        }
        false
    }
}

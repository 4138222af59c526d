// Paradigm compiler: turns one block of grammar directives into a
// self-contained paradigm, resolving inheritance from an already-compiled
// parent.
//
// Directive syntax, one per line:
//   modele:NAME            starts the block
//   pere:NAME              parent paradigm
//   des:CODES:SLOT:CELLS   endings, replacing the parent's for CODES
//   des+:CODES:SLOT:CELLS  endings, added in front of the parent's
//   R:SLOT:RULE            stem rule (K, -, N or N,SUFFIX)
//   abs:CODES / abs+:CODES absent codes, replacing / extending the parent's
//   suf:CODES:LITERAL      suffix class applied after inheritance
//   sufd:LITERAL           every parent ending, suffixed
//   pos:TAGS               part of speech
// CELLS are `;`-separated, one per code, with `,` between alternatives;
// the last cell repeats for any remaining codes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::error::{Defect, Error, Result};
use crate::normalize::{
    lengthen_final_vowel, parse_interval_list, simplify_whitespace, strip_diacritics,
};
use crate::paradigm::{Ending, Paradigm, ParadigmId, StemRule};
use crate::registry::Registry;

static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w*)\+?(\$\w+)").expect("variable pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Parent,
    Endings,
    AdditiveEndings,
    StemRule,
    Absent,
    AdditiveAbsent,
    SuffixClass,
    SuffixedParent,
    PartOfSpeech,
}

impl Directive {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "pere" => Some(Self::Parent),
            "des" => Some(Self::Endings),
            "des+" => Some(Self::AdditiveEndings),
            "R" => Some(Self::StemRule),
            "abs" => Some(Self::Absent),
            "abs+" => Some(Self::AdditiveAbsent),
            "suf" => Some(Self::SuffixClass),
            "sufd" => Some(Self::SuffixedParent),
            "pos" => Some(Self::PartOfSpeech),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AbsentMode {
    Inherited,
    Replaced,
    Extended,
}

/// A paradigm whose endings are built but not yet registered.
#[derive(Debug)]
pub(crate) struct CompiledParadigm {
    pub(crate) name: String,
    pub(crate) accented_name: String,
    pub(crate) parent: Option<ParadigmId>,
    pub(crate) stem_rules: BTreeMap<u8, StemRule>,
    /// In creation order; the registry assigns ids and indexes them in this order.
    pub(crate) endings: Vec<Ending>,
    pub(crate) absent: BTreeSet<u16>,
    pub(crate) pos: Option<String>,
}

impl CompiledParadigm {
    fn defines(&self, morpho: u16) -> bool {
        self.endings.iter().any(|e| e.morpho() == morpho)
    }
}

/// Working state for one directive block.
struct Compilation<'r> {
    id: ParadigmId,
    registry: &'r Registry,
    parent: Option<&'r Paradigm>,
    paradigm: CompiledParadigm,
    absent_mode: AbsentMode,
    suffix_classes: Vec<(String, BTreeSet<u16>)>,
    parent_suffixes: Vec<String>,
    parent_seen: bool,
}

/// Compile one directive block (first line `modele:NAME`) into a paradigm
/// that will be registered under `id`.
///
/// Fails if the block has no name, or if its parent is unknown or is the
/// paradigm itself. Problems in individual directives are pushed onto
/// `defects` and the directive is skipped.
pub(crate) fn compile<S: AsRef<str>>(
    lines: &[S],
    id: ParadigmId,
    registry: &Registry,
    defects: &mut Vec<Defect>,
) -> Result<CompiledParadigm> {
    let header = lines
        .first()
        .map(|l| l.as_ref().trim())
        .ok_or_else(|| Error::MalformedParadigm("empty directive block".to_string()))?;
    let accented_name = match header.split_once(':') {
        Some(("modele", name)) if !name.trim().is_empty() => name.trim(),
        _ => {
            return Err(Error::MalformedParadigm(format!(
                "expected modele:NAME, found {header:?}"
            )))
        }
    };
    let name = strip_diacritics(accented_name, true);
    let body: Vec<&str> = lines[1..].iter().map(|l| l.as_ref()).collect();
    let parent = resolve_parent(&name, &body, registry)?;

    let mut compilation = Compilation {
        id,
        registry,
        parent,
        paradigm: CompiledParadigm {
            name,
            accented_name: accented_name.to_string(),
            parent: parent.map(Paradigm::id),
            stem_rules: BTreeMap::new(),
            endings: Vec::new(),
            absent: BTreeSet::new(),
            pos: None,
        },
        absent_mode: AbsentMode::Inherited,
        suffix_classes: Vec::new(),
        parent_suffixes: Vec::new(),
        parent_seen: false,
    };

    for line in body {
        compilation.apply_line(line, defects);
    }
    compilation.apply_parent_suffixes();
    compilation.inherit(defects);
    compilation.apply_suffix_classes();

    trace!(
        paradigm = %compilation.paradigm.name,
        endings = compilation.paradigm.endings.len(),
        "paradigm compiled"
    );
    Ok(compilation.paradigm)
}

/// Find the `pere` directive of a block and look the parent up. The parent
/// must be registered before the child.
fn resolve_parent<'r>(
    name: &str,
    body: &[&str],
    registry: &'r Registry,
) -> Result<Option<&'r Paradigm>> {
    let Some(parent_name) = body.iter().find_map(|line| {
        let (keyword, value) = line.trim().split_once(':')?;
        (keyword == "pere").then(|| strip_diacritics(value.trim(), true))
    }) else {
        return Ok(None);
    };
    if parent_name == name {
        return Err(Error::CyclicParadigm(name.to_string()));
    }
    let parent = registry.paradigm(&parent_name)?;
    // An ancestor carrying our own name would make the chain loop once we
    // take that name over.
    let mut ancestor = Some(parent);
    while let Some(paradigm) = ancestor {
        if paradigm.name() == name {
            return Err(Error::CyclicParadigm(name.to_string()));
        }
        ancestor = paradigm.parent().map(|id| registry.paradigm_by_id(id));
    }
    Ok(Some(parent))
}

/// Substitute `$variable` references. A word glued in front of the
/// reference (`ĕr$impf`) is prefixed to every cell of the value.
/// Returns the unknown variable's name on failure.
fn expand_variables(
    line: &str,
    variables: &HashMap<String, String>,
) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for caps in VARIABLE.captures_iter(line) {
        let (Some(whole), Some(prefix), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let value = variables
            .get(name.as_str())
            .ok_or_else(|| name.as_str().to_string())?;
        let prefix = prefix.as_str();
        out.push_str(&line[last..whole.start()]);
        out.push_str(prefix);
        out.push_str(&value.replace(';', &format!(";{prefix}")));
        last = whole.end();
    }
    out.push_str(&line[last..]);
    Ok(out)
}

impl Compilation<'_> {
    fn apply_line(&mut self, line: &str, defects: &mut Vec<Defect>) {
        let expanded = match expand_variables(line, self.registry.variables()) {
            Ok(expanded) => simplify_whitespace(&expanded),
            Err(variable) => {
                defects.push(Defect::UnknownVariable {
                    paradigm: self.paradigm.name.clone(),
                    variable,
                });
                return;
            }
        };
        let fields: Vec<&str> = expanded.split(':').map(str::trim).collect();
        let Some(directive) = Directive::from_keyword(fields[0]) else {
            defects.push(Defect::UnknownDirective {
                paradigm: self.paradigm.name.clone(),
                directive: fields[0].to_string(),
            });
            return;
        };
        let applied = match directive {
            Directive::Parent => self.parent_directive(),
            Directive::Endings => self.endings(&fields, false),
            Directive::AdditiveEndings => self.endings(&fields, true),
            Directive::StemRule => self.stem_rule(&fields),
            Directive::Absent => self.absent(&fields, AbsentMode::Replaced),
            Directive::AdditiveAbsent => self.absent(&fields, AbsentMode::Extended),
            Directive::SuffixClass => self.suffix_class(&fields),
            Directive::SuffixedParent => self.parent_suffix(&fields),
            Directive::PartOfSpeech => self.pos(&fields),
        };
        if applied.is_none() {
            defects.push(Defect::MalformedDirective {
                paradigm: self.paradigm.name.clone(),
                line: line.to_string(),
            });
        }
    }

    /// Only the first `pere` of a block binds the parent.
    fn parent_directive(&mut self) -> Option<()> {
        if std::mem::replace(&mut self.parent_seen, true) {
            return None;
        }
        Some(())
    }

    fn endings(&mut self, fields: &[&str], additive: bool) -> Option<()> {
        let [_, codes, slot, cells] = fields else {
            return None;
        };
        let codes = parse_interval_list(codes)?;
        let slot: u8 = slot.parse().ok()?;
        let cells: Vec<&str> = cells.split(';').collect();
        if additive && self.parent.is_none() {
            return None;
        }
        for (i, &code) in codes.iter().enumerate() {
            let cell = cells.get(i).or(cells.last())?;
            for alternative in cell.split(',') {
                self.paradigm
                    .endings
                    .push(Ending::parse(alternative, code, slot, self.id));
            }
            if let (true, Some(parent)) = (additive, self.parent) {
                for &ending_id in parent.endings(code) {
                    let ending = self.registry.ending(ending_id).cloned_for(self.id);
                    self.paradigm.endings.push(ending);
                }
            }
        }
        Some(())
    }

    fn stem_rule(&mut self, fields: &[&str]) -> Option<()> {
        let [_, slot, rule] = fields else {
            return None;
        };
        let slot: u8 = slot.parse().ok()?;
        self.paradigm.stem_rules.insert(slot, StemRule::parse(rule)?);
        Some(())
    }

    fn absent(&mut self, fields: &[&str], mode: AbsentMode) -> Option<()> {
        let [_, codes] = fields else {
            return None;
        };
        let codes = parse_interval_list(codes)?;
        if mode == AbsentMode::Replaced || self.absent_mode == AbsentMode::Inherited {
            self.absent_mode = mode;
        }
        self.paradigm.absent.extend(codes);
        Some(())
    }

    fn suffix_class(&mut self, fields: &[&str]) -> Option<()> {
        let [_, codes, literal] = fields else {
            return None;
        };
        let codes = parse_interval_list(codes)?;
        match self.suffix_classes.iter_mut().find(|(l, _)| l.as_str() == *literal) {
            Some((_, existing)) => existing.extend(codes),
            None => self
                .suffix_classes
                .push((literal.to_string(), codes.into_iter().collect())),
        }
        Some(())
    }

    fn parent_suffix(&mut self, fields: &[&str]) -> Option<()> {
        let [_, literal] = fields else {
            return None;
        };
        self.parent?;
        self.parent_suffixes.push(literal.to_string());
        Some(())
    }

    fn pos(&mut self, fields: &[&str]) -> Option<()> {
        let [_, tags] = fields else {
            return None;
        };
        self.paradigm.pos = Some(tags.to_string());
        Some(())
    }

    /// `sufd`: every parent ending not locally absent, lengthened and
    /// suffixed, becomes an ending of this paradigm.
    fn apply_parent_suffixes(&mut self) {
        let Some(parent) = self.parent else {
            return;
        };
        for literal in std::mem::take(&mut self.parent_suffixes) {
            for ending_id in parent.all_endings() {
                let ending = self.registry.ending(ending_id);
                if self.paradigm.absent.contains(&ending.morpho()) {
                    continue;
                }
                let cell = format!("{}{}", lengthen_final_vowel(ending.accented()), literal);
                self.paradigm.endings.push(Ending::parse(
                    &cell,
                    ending.morpho(),
                    ending.slot(),
                    self.id,
                ));
            }
        }
    }

    fn inherit(&mut self, defects: &mut Vec<Defect>) {
        let Some(parent) = self.parent else {
            return;
        };
        if self.paradigm.pos.is_none() {
            self.paradigm.pos = parent.pos().map(str::to_string);
        }

        for morpho in parent.morphos() {
            if self.paradigm.defines(morpho) || self.paradigm.absent.contains(&morpho) {
                continue;
            }
            for &ending_id in parent.endings(morpho) {
                let ending = self.registry.ending(ending_id).cloned_for(self.id);
                self.paradigm.endings.push(ending);
            }
        }

        let slots: BTreeSet<u8> = self.paradigm.endings.iter().map(Ending::slot).collect();
        for slot in slots {
            if self.paradigm.stem_rules.contains_key(&slot) {
                continue;
            }
            match parent.stem_rule(slot) {
                Some(rule) => {
                    self.paradigm.stem_rules.insert(slot, rule.clone());
                }
                None => defects.push(Defect::MissingStemRule {
                    paradigm: self.paradigm.name.clone(),
                    slot,
                }),
            }
        }

        match self.absent_mode {
            AbsentMode::Inherited => self.paradigm.absent = parent.absent().clone(),
            AbsentMode::Extended => self.paradigm.absent.extend(parent.absent()),
            AbsentMode::Replaced => {}
        }
    }

    /// `suf`: every ending of a listed code gets a suffixed twin.
    fn apply_suffix_classes(&mut self) {
        let mut suffixed = Vec::new();
        for (literal, codes) in &self.suffix_classes {
            for ending in &self.paradigm.endings {
                if !codes.contains(&ending.morpho()) {
                    continue;
                }
                let cell = format!("{}{}", ending.accented(), literal);
                suffixed.push(Ending::parse(&cell, ending.morpho(), ending.slot(), self.id));
            }
        }
        self.paradigm.endings.extend(suffixed);
    }
}

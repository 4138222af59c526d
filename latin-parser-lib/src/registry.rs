// The registry: every paradigm, ending, lemma, stem and irregular form,
// with the lookup indices the analyzer queries. Built once by a `Builder`,
// then read-only and safe to share across threads.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::compiler::{self, CompiledParadigm};
use crate::error::{Defect, Error, Result};
use crate::irregular::{Irregular, IrregularId, IrregularLine};
use crate::lemma::{Lemma, LemmaId, LexiconLine, Stem, StemId};
use crate::morpho::Morphology;
use crate::normalize::{canonicalize, content_lines, strip_diacritics};
use crate::paradigm::{Ending, EndingId, Paradigm, ParadigmId};
use crate::types::{Options, Origin};

/// Name of the paradigm of words that do not inflect.
pub const INVARIABLE_PARADIGM: &str = "inv";

const MORPHOS_FILE: &str = "morphos.la";
// Name of the code table in upstream grammar directories, which carry one
// description file per gloss language.
const MORPHOS_FALLBACK_FILE: &str = "morphos.fr";
const PARADIGMS_FILE: &str = "modeles.la";
const LEXICON_FILE: &str = "lemmes.la";
const EXTENSION_FILE: &str = "lem_ext.la";
const IRREGULARS_FILE: &str = "irregs.la";
const ASSIMILATIONS_FILE: &str = "assimilations.la";
const CONTRACTIONS_FILE: &str = "contractions.la";

const EMBEDDED_MORPHOS: &str = include_str!("../data/morphos.la");
const EMBEDDED_PARADIGMS: &str = include_str!("../data/modeles.la");
const EMBEDDED_LEXICON: &str = include_str!("../data/lemmes.la");
const EMBEDDED_EXTENSION: &str = include_str!("../data/lem_ext.la");
const EMBEDDED_IRREGULARS: &str = include_str!("../data/irregs.la");
const EMBEDDED_ASSIMILATIONS: &str = include_str!("../data/assimilations.la");
const EMBEDDED_CONTRACTIONS: &str = include_str!("../data/contractions.la");

/// In-memory grammar and lexicon.
#[derive(Debug, Clone)]
pub struct Registry {
    morphology: Morphology,
    paradigms: Vec<Paradigm>,
    paradigm_names: HashMap<String, ParadigmId>,
    endings: Vec<Ending>,
    lemmas: Vec<Lemma>,
    lemma_keys: HashMap<String, LemmaId>,
    stems: Vec<Stem>,
    irregulars: Vec<Irregular>,
    ending_index: HashMap<String, Vec<EndingId>>,
    stem_index: HashMap<String, Vec<StemId>>,
    irregular_index: HashMap<String, Vec<IrregularId>>,
    assimilations: Vec<(String, String)>,
    contractions: Vec<(String, String)>,
    variables: HashMap<String, String>,
    defects: Vec<Defect>,
    options: Options,
}

impl Registry {
    /// Load the embedded grammar and lexicon with default options.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Load the embedded grammar and lexicon.
    pub fn with_options(options: Options) -> Self {
        let mut builder = Builder::with_options(options);
        builder
            .morphos(EMBEDDED_MORPHOS)
            .paradigms(EMBEDDED_PARADIGMS)
            .lexicon(EMBEDDED_LEXICON, Origin::Core)
            .lexicon(EMBEDDED_EXTENSION, Origin::Extension)
            .irregulars(EMBEDDED_IRREGULARS)
            .assimilations(EMBEDDED_ASSIMILATIONS)
            .contractions(EMBEDDED_CONTRACTIONS);
        builder.finish()
    }

    /// Load grammar and lexicon files from `dir`. `morphos.la` (or, when it
    /// is missing, `morphos.fr`), `modeles.la` and `lemmes.la` are required;
    /// the extension lexicon, irregulars, assimilations and contractions are
    /// read when present.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_dir_with(dir, Options::default())
    }

    pub fn from_dir_with(dir: impl AsRef<Path>, options: Options) -> Result<Self> {
        let dir = dir.as_ref();
        info!(dir = %dir.display(), "loading grammar");
        let mut builder = Builder::with_options(options);
        builder
            .morphos(&read_source(dir, morphos_file(dir))?)
            .paradigms(&read_source(dir, PARADIGMS_FILE)?)
            .lexicon(&read_source(dir, LEXICON_FILE)?, Origin::Core);
        if let Some(text) = read_optional_source(dir, EXTENSION_FILE)? {
            builder.lexicon(&text, Origin::Extension);
        }
        if let Some(text) = read_optional_source(dir, IRREGULARS_FILE)? {
            builder.irregulars(&text);
        }
        if let Some(text) = read_optional_source(dir, ASSIMILATIONS_FILE)? {
            builder.assimilations(&text);
        }
        if let Some(text) = read_optional_source(dir, CONTRACTIONS_FILE)? {
            builder.contractions(&text);
        }
        Ok(builder.finish())
    }

    fn empty(options: Options) -> Self {
        Self {
            morphology: Morphology::default(),
            paradigms: Vec::new(),
            paradigm_names: HashMap::new(),
            endings: Vec::new(),
            lemmas: Vec::new(),
            lemma_keys: HashMap::new(),
            stems: Vec::new(),
            irregulars: Vec::new(),
            ending_index: HashMap::new(),
            stem_index: HashMap::new(),
            irregular_index: HashMap::new(),
            assimilations: Vec::new(),
            contractions: Vec::new(),
            variables: HashMap::new(),
            defects: Vec::new(),
            options,
        }
    }

    // -----------------------------------------------------------------------
    // Paradigms and endings
    // -----------------------------------------------------------------------

    pub fn paradigm(&self, name: &str) -> Result<&Paradigm> {
        self.paradigm_id(name)
            .map(|id| self.paradigm_by_id(id))
            .ok_or_else(|| Error::UnknownParadigm(name.to_string()))
    }

    pub fn paradigm_id(&self, name: &str) -> Option<ParadigmId> {
        self.paradigm_names.get(name).copied()
    }

    pub fn paradigm_by_id(&self, id: ParadigmId) -> &Paradigm {
        &self.paradigms[id.0]
    }

    pub fn paradigms(&self) -> impl Iterator<Item = &Paradigm> {
        self.paradigms.iter()
    }

    /// Part of speech of a paradigm, or of its nearest ancestor that has one.
    pub fn paradigm_pos(&self, id: ParadigmId) -> Option<&str> {
        let mut current = Some(self.paradigm_by_id(id));
        while let Some(paradigm) = current {
            if let Some(pos) = paradigm.pos() {
                return Some(pos);
            }
            current = paradigm.parent().map(|parent| self.paradigm_by_id(parent));
        }
        None
    }

    pub fn ending(&self, id: EndingId) -> &Ending {
        &self.endings[id.0]
    }

    /// Endings whose canonical bare spelling is `key`, in registration order.
    pub fn endings_for(&self, key: &str) -> &[EndingId] {
        self.ending_index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    // -----------------------------------------------------------------------
    // Lemmas, stems and irregulars
    // -----------------------------------------------------------------------

    pub fn lemma(&self, key: &str) -> Result<&Lemma> {
        self.lemma_keys
            .get(key)
            .map(|id| self.lemma_by_id(*id))
            .ok_or_else(|| Error::UnknownLemma(key.to_string()))
    }

    pub fn lemma_by_id(&self, id: LemmaId) -> &Lemma {
        &self.lemmas[id.0]
    }

    pub fn contains_lemma(&self, key: &str) -> bool {
        self.lemma_keys.contains_key(key)
    }

    pub fn lemmas(&self) -> impl Iterator<Item = &Lemma> {
        self.lemmas.iter()
    }

    pub fn stem(&self, id: StemId) -> &Stem {
        &self.stems[id.0]
    }

    /// Stems whose canonical, lower-cased bare spelling is `key`.
    pub fn stems_for(&self, key: &str) -> &[StemId] {
        self.stem_index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn irregular(&self, id: IrregularId) -> &Irregular {
        &self.irregulars[id.0]
    }

    pub fn irregulars_for(&self, key: &str) -> &[IrregularId] {
        self.irregular_index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    // -----------------------------------------------------------------------
    // Morphology
    // -----------------------------------------------------------------------

    pub fn morphology(&self) -> &Morphology {
        &self.morphology
    }

    pub fn describe(&self, code: u16) -> Result<&str> {
        self.morphology.describe(code)
    }

    pub fn invariable_code(&self) -> u16 {
        self.morphology.invariable()
    }

    // -----------------------------------------------------------------------
    // Spelling rewrites
    // -----------------------------------------------------------------------

    /// Rewrite the longest unassimilated prefix of `form` (e.g. "adp") into
    /// its assimilated spelling ("app").
    pub fn assimilate(&self, form: &str) -> Option<String> {
        rewrite_prefix(form, self.assimilations.iter().map(|(p, a)| (p.as_str(), a.as_str())))
    }

    /// The reverse of [`Registry::assimilate`].
    pub fn deassimilate(&self, form: &str) -> Option<String> {
        rewrite_prefix(form, self.assimilations.iter().map(|(p, a)| (a.as_str(), p.as_str())))
    }

    /// (contracted suffix, full suffix) pairs, in file order.
    pub fn contractions(&self) -> &[(String, String)] {
        &self.contractions
    }

    // -----------------------------------------------------------------------
    // Build state
    // -----------------------------------------------------------------------

    pub(crate) fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    /// Configuration defects met while building, in the order they were found.
    pub fn defects(&self) -> &[Defect] {
        &self.defects
    }

    pub fn options(&self) -> Options {
        self.options
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the longest matching `from` prefix of `form` by its `to`.
/// The first entry wins among equally long prefixes.
fn rewrite_prefix<'a>(
    form: &str,
    rules: impl Iterator<Item = (&'a str, &'a str)>,
) -> Option<String> {
    let mut best: Option<(&str, &str)> = None;
    for (from, to) in rules {
        if from.is_empty() || !form.starts_with(from) {
            continue;
        }
        if best.map_or(true, |(current, _)| from.len() > current.len()) {
            best = Some((from, to));
        }
    }
    best.map(|(from, to)| format!("{to}{}", &form[from.len()..]))
}

fn read_source(dir: &Path, name: &str) -> Result<String> {
    let path: PathBuf = dir.join(name);
    fs::read_to_string(&path).map_err(|source| Error::Io { path, source })
}

fn morphos_file(dir: &Path) -> &'static str {
    if !dir.join(MORPHOS_FILE).exists() && dir.join(MORPHOS_FALLBACK_FILE).exists() {
        debug!(file = MORPHOS_FALLBACK_FILE, "using fallback code table");
        return MORPHOS_FALLBACK_FILE;
    }
    MORPHOS_FILE
}

fn read_optional_source(dir: &Path, name: &str) -> Result<Option<String>> {
    if !dir.join(name).exists() {
        debug!(file = name, "optional grammar file absent");
        return Ok(None);
    }
    read_source(dir, name).map(Some)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builds a [`Registry`] from grammar and lexicon text. Sources must be fed
/// in dependency order: morphology, paradigms, lexicons, irregulars; the
/// spelling tables may come at any point.
#[derive(Debug)]
pub struct Builder {
    registry: Registry,
}

impl Builder {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            registry: Registry::empty(options),
        }
    }

    /// Read `N:description` lines.
    pub fn morphos(&mut self, text: &str) -> &mut Self {
        for line in content_lines(text) {
            if let Err(defect) = self.registry.morphology.add_line(&line) {
                self.record(defect);
            }
        }
        self
    }

    /// Read variable definitions (`$name=value`) and paradigm blocks, each
    /// starting with `modele:NAME`. Paradigms compile in file order.
    pub fn paradigms(&mut self, text: &str) -> &mut Self {
        let mut block: Vec<String> = Vec::new();
        for line in content_lines(text) {
            if line.starts_with('$') {
                match line.split_once('=') {
                    Some((name, value)) => {
                        self.registry
                            .variables
                            .insert(name.trim().to_string(), value.trim().to_string());
                    }
                    None => self.record(Defect::MalformedTableLine {
                        table: "variables",
                        line,
                    }),
                }
                continue;
            }
            if line.starts_with("modele:") {
                if !block.is_empty() {
                    self.compile_block(&std::mem::take(&mut block));
                }
            } else if block.is_empty() {
                self.record(Defect::OrphanDirective(line));
                continue;
            }
            block.push(line);
        }
        if !block.is_empty() {
            self.compile_block(&block);
        }
        debug!(
            paradigms = self.registry.paradigms.len(),
            endings = self.registry.endings.len(),
            "paradigms compiled"
        );
        self
    }

    fn compile_block(&mut self, block: &[String]) {
        if let Err(err) = self.compile_paradigm(block) {
            let paradigm = block
                .first()
                .and_then(|header| header.split(':').nth(1))
                .unwrap_or_default()
                .to_string();
            self.record(Defect::SkippedParadigm {
                paradigm,
                reason: err.to_string(),
            });
        }
    }

    /// Compile one directive block and register the paradigm and its endings.
    pub fn compile_paradigm<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<ParadigmId> {
        let id = ParadigmId(self.registry.paradigms.len());
        let mut defects = Vec::new();
        let compiled = compiler::compile(lines, id, &self.registry, &mut defects);
        for defect in defects {
            self.record(defect);
        }
        Ok(self.insert_paradigm(id, compiled?))
    }

    fn insert_paradigm(&mut self, id: ParadigmId, compiled: CompiledParadigm) -> ParadigmId {
        let registry = &mut self.registry;
        let mut table: BTreeMap<u16, Vec<EndingId>> = BTreeMap::new();
        for ending in compiled.endings {
            let ending_id = EndingId(registry.endings.len());
            registry
                .ending_index
                .entry(canonicalize(ending.bare()))
                .or_default()
                .push(ending_id);
            table.entry(ending.morpho()).or_default().push(ending_id);
            registry.endings.push(ending);
        }
        let duplicate = registry
            .paradigm_names
            .insert(compiled.name.clone(), id)
            .is_some();
        registry.paradigms.push(Paradigm {
            id,
            name: compiled.name.clone(),
            accented_name: compiled.accented_name,
            parent: compiled.parent,
            stem_rules: compiled.stem_rules,
            endings: table,
            absent: compiled.absent,
            pos: compiled.pos,
        });
        if duplicate {
            self.record(Defect::DuplicateParadigm(compiled.name));
        }
        id
    }

    /// Read lexicon lines. Lemmas are tagged with `origin`.
    pub fn lexicon(&mut self, text: &str, origin: Origin) -> &mut Self {
        let before = self.registry.lemmas.len();
        for line in content_lines(text) {
            self.add_lemma(&line, origin);
        }
        debug!(
            ?origin,
            lemmas = self.registry.lemmas.len() - before,
            stems = self.registry.stems.len(),
            "lexicon loaded"
        );
        self
    }

    /// Register one lexicon line. A key that is already registered only adds
    /// its occurrence count to the existing lemma.
    pub fn add_lemma(&mut self, line: &str, origin: Origin) -> Option<LemmaId> {
        let entry = match LexiconLine::parse(line) {
            Ok(entry) => entry,
            Err(defect) => {
                self.record(defect);
                return None;
            }
        };
        if !entry.complete {
            self.record(Defect::MalformedLexiconLine {
                line: line.to_string(),
                reason: "missing or unreadable fields",
            });
        }
        let Some(paradigm_id) = self.registry.paradigm_id(&entry.paradigm) else {
            self.record(Defect::UnknownParadigmReference {
                line: line.to_string(),
                paradigm: entry.paradigm.clone(),
            });
            return None;
        };
        if let Some(&existing) = self.registry.lemma_keys.get(&entry.key) {
            self.registry.lemmas[existing.0].frequency += entry.frequency;
            return Some(existing);
        }

        let id = LemmaId(self.registry.lemmas.len());
        let mut lemma = Lemma::from_line(
            &entry,
            paradigm_id,
            self.registry.paradigm_pos(paradigm_id),
            origin,
        );

        let mut stems: Vec<Stem> = Vec::new();
        for (slot, alternatives) in &entry.explicit_stems {
            stems.extend(alternatives.iter().map(|s| Stem::new(s, *slot, id)));
        }
        let paradigm = self.registry.paradigm_by_id(paradigm_id);
        for (slot, rule) in paradigm.stem_rules() {
            if entry.explicit_stems.iter().any(|(explicit, _)| *explicit == slot) {
                continue;
            }
            for alternative in entry.accented.split(',') {
                if let Some(spelling) = rule.apply(alternative.trim()) {
                    stems.push(Stem::new(&spelling, slot, id));
                }
            }
        }

        let registry = &mut self.registry;
        for stem in stems {
            let stem_id = StemId(registry.stems.len());
            registry
                .stem_index
                .entry(stem.index_key())
                .or_default()
                .push(stem_id);
            lemma.stems.entry(stem.slot()).or_default().push(stem_id);
            registry.stems.push(stem);
        }
        registry.lemma_keys.insert(entry.key.clone(), id);
        registry.lemmas.push(lemma);
        Some(id)
    }

    /// Read `form[*]:lemma:codes` lines.
    pub fn irregulars(&mut self, text: &str) -> &mut Self {
        for line in content_lines(text) {
            self.add_irregular(&line);
        }
        debug!(irregulars = self.registry.irregulars.len(), "irregulars loaded");
        self
    }

    /// Register one irregular form. An exclusive form suppresses its codes
    /// on the lemma.
    pub fn add_irregular(&mut self, line: &str) -> Option<IrregularId> {
        let entry = match IrregularLine::parse(line) {
            Ok(entry) => entry,
            Err(defect) => {
                self.record(defect);
                return None;
            }
        };
        let Some(&lemma) = self.registry.lemma_keys.get(entry.lemma_key) else {
            self.record(Defect::UnknownLemmaReference {
                form: entry.accented.to_string(),
                lemma: entry.lemma_key.to_string(),
            });
            return None;
        };
        let irregular = Irregular::new(&entry, lemma);
        let registry = &mut self.registry;
        if irregular.is_exclusive() {
            registry.lemmas[lemma.0]
                .suppressed
                .extend(irregular.morphos().iter().copied());
        }
        let id = IrregularId(registry.irregulars.len());
        registry
            .irregular_index
            .entry(irregular.index_key())
            .or_default()
            .push(id);
        registry.irregulars.push(irregular);
        Some(id)
    }

    /// Read `unassimilated:assimilated` prefix pairs (e.g. `adp:app`).
    pub fn assimilations(&mut self, text: &str) -> &mut Self {
        for line in content_lines(text) {
            match line.split_once(':') {
                Some((plain, assimilated)) => self
                    .registry
                    .assimilations
                    .push((bare_key(plain), bare_key(assimilated))),
                None => self.record(Defect::MalformedTableLine {
                    table: "assimilations",
                    line,
                }),
            }
        }
        self
    }

    /// Read `contracted:full` suffix pairs (e.g. `arat:averat`).
    pub fn contractions(&mut self, text: &str) -> &mut Self {
        for line in content_lines(text) {
            match line.split_once(':') {
                Some((contracted, full)) => self
                    .registry
                    .contractions
                    .push((contracted.trim().to_string(), full.trim().to_string())),
                None => self.record(Defect::MalformedTableLine {
                    table: "contractions",
                    line,
                }),
            }
        }
        self
    }

    fn record(&mut self, defect: Defect) {
        warn!(%defect, "grammar defect");
        self.registry.defects.push(defect);
    }

    /// Registry read so far, e.g. to inspect defects mid-build.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn finish(self) -> Registry {
        let registry = self.registry;
        info!(
            paradigms = registry.paradigms.len(),
            lemmas = registry.lemmas.len(),
            irregulars = registry.irregulars.len(),
            defects = registry.defects.len(),
            "registry ready"
        );
        registry
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

fn bare_key(s: &str) -> String {
    canonicalize(&strip_diacritics(s.trim(), true))
}

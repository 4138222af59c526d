// Error types: fatal errors returned to callers, and configuration defects
// recorded while a registry is being built.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown paradigm {0:?}")]
    UnknownParadigm(String),

    #[error("unknown lemma {0:?}")]
    UnknownLemma(String),

    #[error("unknown grammology code {0}")]
    UnknownMorpho(u16),

    #[error("paradigm {0:?} inherits from itself")]
    CyclicParadigm(String),

    #[error("malformed paradigm: {0}")]
    MalformedParadigm(String),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A problem in the grammar or lexicon text. Building never stops on a
/// defect: the offending line (or paradigm) is skipped or repaired and the
/// defect is kept on the registry for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Defect {
    #[error("paradigm {paradigm}: no stem rule for slot {slot}")]
    MissingStemRule { paradigm: String, slot: u8 },

    #[error("paradigm {paradigm}: unknown directive {directive:?}")]
    UnknownDirective { paradigm: String, directive: String },

    #[error("paradigm {paradigm}: unknown variable {variable}")]
    UnknownVariable { paradigm: String, variable: String },

    #[error("paradigm {paradigm}: malformed directive {line:?}")]
    MalformedDirective { paradigm: String, line: String },

    #[error("paradigm {paradigm} skipped: {reason}")]
    SkippedParadigm { paradigm: String, reason: String },

    #[error("paradigm {0} defined twice, the later definition wins")]
    DuplicateParadigm(String),

    #[error("directive {0:?} outside any paradigm")]
    OrphanDirective(String),

    #[error("malformed lexicon line {line:?}: {reason}")]
    MalformedLexiconLine { line: String, reason: &'static str },

    #[error("lexicon line {line:?} names unknown paradigm {paradigm}")]
    UnknownParadigmReference { line: String, paradigm: String },

    #[error("malformed irregular line {0:?}")]
    MalformedIrregular(String),

    #[error("irregular form {form} names unknown lemma {lemma}")]
    UnknownLemmaReference { form: String, lemma: String },

    #[error("malformed {table} line {line:?}")]
    MalformedTableLine { table: &'static str, line: String },
}

// Irregular forms: explicit (form, lemma, codes) entries that bypass
// segmentation, optionally replacing the lemma's regular forms.

use crate::error::Defect;
use crate::lemma::LemmaId;
use crate::normalize::{canonicalize, parse_interval_list, strip_diacritics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IrregularId(pub(crate) usize);

/// A word form listed explicitly for a lemma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Irregular {
    accented: String,
    bare: String,
    lemma: LemmaId,
    morphos: Vec<u16>,
    exclusive: bool,
}

impl Irregular {
    pub(crate) fn new(line: &IrregularLine<'_>, lemma: LemmaId) -> Self {
        Self {
            accented: line.accented.to_string(),
            bare: strip_diacritics(line.accented, true),
            lemma,
            morphos: line.morphos.clone(),
            exclusive: line.exclusive,
        }
    }

    pub fn accented(&self) -> &str {
        &self.accented
    }

    pub fn bare(&self) -> &str {
        &self.bare
    }

    pub fn lemma(&self) -> LemmaId {
        self.lemma
    }

    pub fn morphos(&self) -> &[u16] {
        &self.morphos
    }

    /// An exclusive form suppresses the regular forms of its codes.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub(crate) fn index_key(&self) -> String {
        canonicalize(&self.bare)
    }
}

/// One irregulars line: `accented[*]:lemma key:codes`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct IrregularLine<'a> {
    pub(crate) accented: &'a str,
    pub(crate) exclusive: bool,
    pub(crate) lemma_key: &'a str,
    pub(crate) morphos: Vec<u16>,
}

impl<'a> IrregularLine<'a> {
    pub(crate) fn parse(line: &'a str) -> Result<Self, Defect> {
        let malformed = || Defect::MalformedIrregular(line.to_string());
        let mut fields = line.split(':').map(str::trim);
        let (Some(form), Some(lemma_key), Some(codes), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed());
        };
        let (accented, exclusive) = match form.strip_suffix('*') {
            Some(accented) => (accented.trim_end(), true),
            None => (form, false),
        };
        if accented.is_empty() || lemma_key.is_empty() {
            return Err(malformed());
        }
        let morphos = parse_interval_list(codes).ok_or_else(malformed)?;
        Ok(Self {
            accented,
            exclusive,
            lemma_key,
            morphos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exclusive() {
        let line = IrregularLine::parse("dī*:deus:7-8").unwrap();
        assert_eq!(line.accented, "dī");
        assert!(line.exclusive);
        assert_eq!(line.lemma_key, "deus");
        assert_eq!(line.morphos, vec![7, 8]);
    }

    #[test]
    fn test_parse_plain() {
        let line = IrregularLine::parse("ĕs:sum:50,88").unwrap();
        assert!(!line.exclusive);
        assert_eq!(line.morphos, vec![50, 88]);

        let irregular = Irregular::new(&line, LemmaId(3));
        assert_eq!(irregular.bare(), "es");
        assert_eq!(irregular.index_key(), "es");
        assert_eq!(irregular.lemma(), LemmaId(3));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(IrregularLine::parse("sum:sum").is_err());
        assert!(IrregularLine::parse("*:sum:49").is_err());
        assert!(IrregularLine::parse("sum:sum:x").is_err());
        assert!(IrregularLine::parse("sum:sum:49:50").is_err());
    }
}

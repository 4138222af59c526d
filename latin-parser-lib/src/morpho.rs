// Grammology table: numeric morphological codes and their descriptions.

use std::collections::BTreeMap;

use crate::error::{Defect, Error, Result};

/// Description of the invariable pseudo-code.
pub const INVARIABLE_DESCRIPTION: &str = "-";

/// Code → description, read from `N:description` lines.
#[derive(Debug, Clone, Default)]
pub struct Morphology {
    descriptions: BTreeMap<u16, String>,
}

impl Morphology {
    pub(crate) fn add_line(&mut self, line: &str) -> std::result::Result<(), Defect> {
        let malformed = || Defect::MalformedTableLine {
            table: "morphos",
            line: line.to_string(),
        };
        let (code, description) = line.split_once(':').ok_or_else(malformed)?;
        let code: u16 = code.trim().parse().map_err(|_| malformed())?;
        self.descriptions
            .insert(code, description.trim().to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    /// The code carried by words that do not inflect: one past the table.
    pub fn invariable(&self) -> u16 {
        self.descriptions.len() as u16 + 1
    }

    /// Description of `code`; `"-"` for the invariable code.
    pub fn describe(&self, code: u16) -> Result<&str> {
        if code == self.invariable() {
            return Ok(INVARIABLE_DESCRIPTION);
        }
        self.descriptions
            .get(&code)
            .map(String::as_str)
            .ok_or(Error::UnknownMorpho(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Morphology {
        let mut m = Morphology::default();
        m.add_line("1:nominative singular").unwrap();
        m.add_line("2:vocative singular").unwrap();
        m
    }

    #[test]
    fn test_describe() {
        let m = table();
        assert_eq!(m.describe(2).unwrap(), "vocative singular");
        assert_eq!(m.invariable(), 3);
        assert_eq!(m.describe(3).unwrap(), "-");
    }

    #[test]
    fn test_unknown_code() {
        let m = table();
        assert!(matches!(m.describe(4), Err(Error::UnknownMorpho(4))));
        assert!(matches!(m.describe(0), Err(Error::UnknownMorpho(0))));
    }

    #[test]
    fn test_malformed_line() {
        let mut m = table();
        assert!(m.add_line("nominative").is_err());
        assert!(m.add_line("x:nominative").is_err());
        assert_eq!(m.len(), 2);
    }
}

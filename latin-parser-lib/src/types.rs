use serde::{Deserialize, Serialize};

/// Which lexicon a lemma was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Core,
    Extension,
}

/// One morphological reading of a word form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// The bare form that was matched (canonical spelling, after any
    /// assimilation or contraction rewrite).
    pub form: String,
    /// The reconstructed form with vowel quantities.
    pub accented: String,
    /// Lexicon key of the lemma, homonym number included (e.g. "Romanus2").
    pub lemma_key: String,
    /// Display spelling of the lemma (e.g. "Romanus").
    pub lemma: String,
    /// Part-of-speech tags; empty when the lemma has none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pos: String,
    /// Grammology code of the reading.
    pub morpho: u16,
    /// Human-readable description of the code ("-" for invariable words).
    pub description: String,
    pub origin: Origin,
}

/// All readings of one input word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAnalysis {
    pub word: String,
    pub analyses: Vec<Analysis>,
}

impl WordAnalysis {
    /// Distinct (lemma key, part of speech) pairs, in first-seen order.
    pub fn lemmas(&self) -> Vec<(&str, &str)> {
        let mut seen = Vec::new();
        for a in &self.analyses {
            let pair = (a.lemma_key.as_str(), a.pos.as_str());
            if !seen.contains(&pair) {
                seen.push(pair);
            }
        }
        seen
    }
}

/// Readings for every word of a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceAnalysis {
    pub input: String,
    pub words: Vec<WordAnalysis>,
}

/// Query-time switches carried by a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Drop extension-lexicon readings of a word when a core reading exists.
    #[serde(default)]
    pub core_only: bool,
}

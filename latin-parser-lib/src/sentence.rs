// Sentence-level analysis: split into words and analyse each independently.

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use crate::analysis::lemmatize;
use crate::registry::Registry;
use crate::types::*;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("word separator pattern"));

/// Analyse every word of a sentence. Punctuation and whitespace separate
/// words; words are analysed in parallel and reported in input order.
pub fn lemmatize_sentence(input: &str, registry: &Registry) -> SentenceAnalysis {
    let words = split_sentence(input);
    SentenceAnalysis {
        input: input.to_string(),
        words: lemmatize_batch(&words, registry),
    }
}

/// Analyse many independent words in parallel, preserving their order.
pub fn lemmatize_batch<S>(words: &[S], registry: &Registry) -> Vec<WordAnalysis>
where
    S: AsRef<str> + Sync,
{
    words
        .par_iter()
        .map(|word| lemmatize(word.as_ref(), registry))
        .collect()
}

/// Split on runs of non-word characters, dropping empty pieces.
pub fn split_sentence(input: &str) -> Vec<&str> {
    NON_WORD.split(input).filter(|w| !w.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentence() {
        assert_eq!(
            split_sentence("Arma uirumque cano, Troiae qui primus ab oris."),
            vec!["Arma", "uirumque", "cano", "Troiae", "qui", "primus", "ab", "oris"]
        );
        assert_eq!(split_sentence("  ...  "), Vec::<&str>::new());
        assert_eq!(split_sentence("Rōmānī"), vec!["Rōmānī"]);
    }

    #[test]
    fn test_sentence_keeps_word_order() {
        let r = Registry::new();
        let parse = lemmatize_sentence("nec lupi, nec uitae.", &r);
        let words: Vec<&str> = parse.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["nec", "lupi", "nec", "uitae"]);
        assert!(parse.words.iter().all(|w| !w.analyses.is_empty()));
    }

    #[test]
    fn test_batch_matches_sequential() {
        let r = Registry::new();
        let words = ["lupus", "Romanorum", "legerat", "XIV"];
        let batch = lemmatize_batch(&words, &r);
        for (word, parsed) in words.iter().zip(&batch) {
            assert_eq!(parsed, &lemmatize(word, &r));
        }
    }
}

// Output formatting for analysis results.

use crate::types::*;

/// One analysis as a tab-separated line:
/// `form	accented	lemma	pos	description`.
pub fn to_tabular(a: &Analysis) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        a.form, a.accented, a.lemma, a.pos, a.description
    )
}

/// Every analysis of a word, one per line. A word without analyses prints
/// as its own line with `?` in place of the fields.
pub fn word_to_tabular(wa: &WordAnalysis) -> String {
    if wa.analyses.is_empty() {
        return format!("{}\t?", wa.word);
    }
    wa.analyses
        .iter()
        .map(to_tabular)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every word of a sentence, blocks separated by a blank line.
pub fn sentence_to_tabular(sa: &SentenceAnalysis) -> String {
    sa.words
        .iter()
        .map(word_to_tabular)
        .collect::<Vec<_>>()
        .join("\n\n")
}

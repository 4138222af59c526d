pub mod types;
pub mod error;
pub mod normalize;
pub mod paradigm;
mod compiler;
pub mod lemma;
pub mod irregular;
pub mod morpho;
pub mod registry;
pub mod analysis;
pub mod sentence;
pub mod output;

pub use analysis::{analyze, lemmatize};
pub use error::{Defect, Error, Result};
pub use registry::{Builder, Registry};
pub use sentence::{lemmatize_batch, lemmatize_sentence};
pub use types::{Analysis, Options, Origin, SentenceAnalysis, WordAnalysis};

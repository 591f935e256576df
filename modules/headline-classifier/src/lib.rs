pub mod claude;
pub mod error;
pub mod lexical;
pub mod normalizer;
pub mod stance;

pub use claude::ClaudeStanceClassifier;
pub use error::ClassifierError;
pub use lexical::{SuspiciousWordScanner, Tokenizer, WordTokenizer, SUSPICIOUS_WORDS};
pub use normalizer::{normalize, Normalizer};
pub use stance::{MockStanceClassifier, StanceClassifier, StanceLabel, UnavailableClassifier};

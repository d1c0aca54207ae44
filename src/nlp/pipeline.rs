//! Text preprocessing: tokenize, stem, bag-of-words.

use ndarray::Array1;
use rust_stemmers::Algorithm;
use rust_stemmers::Stemmer;

/// Tokenizes and stems raw message text.
pub struct Preprocessor {
    stemmer: Stemmer,
}

impl Preprocessor {
    pub fn new() -> Self {
        Preprocessor {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Lowercase, split, stem.
    ///
    /// Bare punctuation and one-character tokens are dropped, e.g.
    /// "The foxes quickly jumped!" becomes `["the", "fox", "quick", "jump"]`.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.chars().count() > 1)
            .map(|token| self.stemmer.stem(token).into_owned())
            .filter(|stem| stem.chars().count() > 1)
            .collect()
    }
}

/// Sorted, deduplicated stem list shared by training and prediction.
///
/// Kept sorted so word order (and with it, network input order) is stable
/// across retrains of the same dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    words: Vec<String>,
}

impl Vocabulary {
    /// Collect every stem appearing in the given documents.
    pub fn build(documents: &[Vec<String>]) -> Self {
        let mut words: Vec<String> = documents.iter().flatten().cloned().collect();
        words.sort();
        words.dedup();
        Vocabulary { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Binary bag-of-words vector over this vocabulary.
    ///
    /// ```text
    /// words:  ["again", "apple", "hello", "world"]
    /// tokens: ["hello", "world", "again"]
    /// bag:    [1, 0, 1, 1]
    /// ```
    pub fn bag(&self, tokens: &[String]) -> Array1<f32> {
        self.words
            .iter()
            .map(|word| if tokens.contains(word) { 1.0 } else { 0.0 })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_lowercased_stemmed_and_filtered() {
        let pre = Preprocessor::new();
        let tokens = pre.tokens("The rabbits quickly jumped!");
        assert_eq!(tokens, vec!["the", "rabbit", "quick", "jump"]);
    }

    #[test]
    fn punctuation_and_single_chars_are_dropped() {
        let pre = Preprocessor::new();
        assert!(pre.tokens(", . ? ! ~ a I").is_empty());
        assert!(pre.tokens("").is_empty());
    }

    #[test]
    fn vocabulary_is_sorted_and_unique() {
        let docs = vec![
            vec!["world".to_string(), "hello".to_string()],
            vec!["hello".to_string(), "again".to_string()],
        ];
        let vocab = Vocabulary::build(&docs);
        assert_eq!(vocab.len(), 3);

        let bag = vocab.bag(&["hello".to_string(), "missing".to_string()]);
        // "again" < "hello" < "world"
        assert_eq!(bag.to_vec(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn unknown_tokens_produce_the_zero_bag() {
        let vocab = Vocabulary::build(&[vec!["hello".to_string()]]);
        let bag = vocab.bag(&["goodbye".to_string()]);
        assert_eq!(bag.sum(), 0.0);
    }
}

//! The intent classifier: bag-of-words over a stemmed vocabulary, fed
//! through a small feed-forward network.

mod dataset;
mod model;
mod pipeline;

pub use dataset::Dataset;
pub use dataset::IntentData;

use ndarray::Array2;
use rand::seq::SliceRandom;

use crate::error::NlpError;
use model::Network;
use pipeline::Preprocessor;
use pipeline::Vocabulary;

/// A trained classifier and everything needed to run it.
pub struct Classifier {
    preprocessor: Preprocessor,
    vocabulary: Vocabulary,
    intents: Vec<String>,
    responses: Vec<Vec<String>>,
    network: Network,
}

/// One classification result.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// The winning intent.
    pub intent: String,
    /// A canned response picked for the winning intent.
    pub response: String,
    /// Softmax output for the winning intent, range `[0, 1]`.
    pub confidence: f32,
    /// Every intent with its confidence, best first.
    pub scores: Vec<(String, f32)>,
}

impl Classifier {
    /// Vectorize the dataset and train a fresh network on it.
    pub fn train(dataset: &Dataset, hidden: usize, epochs: usize) -> Result<Self, NlpError> {
        let preprocessor = Preprocessor::new();

        // One row per pattern, labelled with its intent index.
        let mut intents = Vec::new();
        let mut responses = Vec::new();
        let mut documents: Vec<(usize, Vec<String>)> = Vec::new();
        for (index, (name, entry)) in dataset.iter().enumerate() {
            intents.push(name.to_string());
            responses.push(entry.responses.clone());
            for pattern in &entry.patterns {
                documents.push((index, preprocessor.tokens(pattern)));
            }
        }

        let token_lists: Vec<Vec<String>> =
            documents.iter().map(|(_, tokens)| tokens.clone()).collect();
        let vocabulary = Vocabulary::build(&token_lists);
        if intents.is_empty() || vocabulary.is_empty() {
            return Err(NlpError::EmptyDataset);
        }

        let mut x = Array2::zeros((documents.len(), vocabulary.len()));
        let mut y = Array2::zeros((documents.len(), intents.len()));
        for (row, (index, tokens)) in documents.iter().enumerate() {
            x.row_mut(row).assign(&vocabulary.bag(tokens));
            y[[row, *index]] = 1.0;
        }

        let mut network = Network::new(vocabulary.len(), hidden, intents.len());
        network.train(&x, &y, epochs);

        Ok(Classifier {
            preprocessor,
            vocabulary,
            intents,
            responses,
            network,
        })
    }

    /// Classify one message.
    pub fn predict(&self, message: &str) -> Prediction {
        let tokens = self.preprocessor.tokens(message);
        let probabilities = self.network.forward(&self.vocabulary.bag(&tokens));

        let (index, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .expect("classifier always has at least one intent");

        let mut scores: Vec<(String, f32)> = self
            .intents
            .iter()
            .cloned()
            .zip(probabilities.iter().copied())
            .collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));

        let response = self.responses[index]
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default();

        Prediction {
            intent: self.intents[index].clone(),
            response,
            confidence,
            scores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset(dir: &tempfile::TempDir) -> Dataset {
        let path = dir.path().join("intents.json");
        std::fs::write(
            &path,
            r#"{
                "greeting": {
                    "patterns": ["hello there", "hello friend", "good morning", "morning friend"],
                    "responses": ["Hello!"]
                },
                "farewell": {
                    "patterns": ["goodbye now", "goodbye then", "later alligator", "goodbye alligator"],
                    "responses": ["See you!", "Bye!"]
                }
            }"#,
        )
        .unwrap();
        Dataset::load(path).unwrap()
    }

    #[test]
    fn classifies_training_like_messages() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = Classifier::train(&sample_dataset(&dir), 8, 1500).unwrap();

        let prediction = classifier.predict("hello there friend");
        assert_eq!(prediction.intent, "greeting");
        assert_eq!(prediction.response, "Hello!");
        assert!(prediction.confidence > 0.5);

        let prediction = classifier.predict("goodbye alligator");
        assert_eq!(prediction.intent, "farewell");
    }

    #[test]
    fn scores_cover_every_intent_and_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = Classifier::train(&sample_dataset(&dir), 8, 500).unwrap();

        let prediction = classifier.predict("hello there");
        assert_eq!(prediction.scores.len(), 2);
        assert!(prediction.scores[0].1 >= prediction.scores[1].1);
        assert_eq!(prediction.scores[0].0, prediction.intent);

        let total: f32 = prediction.scores.iter().map(|(_, score)| score).sum();
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[test]
    fn stemless_dataset_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intents.json");
        std::fs::write(
            &path,
            r#"{"empty": {"patterns": ["a", "!"], "responses": ["?"]}}"#,
        )
        .unwrap();
        let dataset = Dataset::load(path).unwrap();

        let result = Classifier::train(&dataset, 8, 10);
        assert!(matches!(result, Err(NlpError::EmptyDataset)));
    }
}

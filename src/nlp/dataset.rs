//! The hand-authored intent dataset (`intents.json`).
//!
//! The file is a JSON object keyed by intent name. File order is kept
//! (via [IndexMap]) so intent indices stay stable between a load and the
//! retrain that follows it.

use std::path::Path;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::error::NlpError;

/// Patterns and canned responses for one intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentData {
    /// Example utterances for this intent.
    pub patterns: Vec<String>,
    /// Replies to pick from when this intent wins.
    pub responses: Vec<String>,
}

/// The dataset file and its parsed contents.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    intents: IndexMap<String, IntentData>,
}

impl Dataset {
    /// Parse the dataset file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NlpError> {
        let content = std::fs::read_to_string(&path)?;
        let intents: IndexMap<String, IntentData> = serde_json::from_str(&content)?;
        if intents.is_empty() {
            return Err(NlpError::EmptyDataset);
        }

        Ok(Dataset {
            path: path.as_ref().to_path_buf(),
            intents,
        })
    }

    /// Append an utterance to an intent and rewrite the file.
    pub fn add_utterance(&mut self, intent: &str, utterance: &str) -> Result<(), NlpError> {
        let entry = self
            .intents
            .get_mut(intent)
            .ok_or_else(|| NlpError::UnknownIntent(intent.to_string()))?;
        entry.patterns.push(utterance.to_string());

        self.save()
    }

    fn save(&self) -> Result<(), NlpError> {
        let content = serde_json::to_string_pretty(&self.intents)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn contains(&self, intent: &str) -> bool {
        self.intents.contains_key(intent)
    }

    pub fn get(&self, intent: &str) -> Option<&IntentData> {
        self.intents.get(intent)
    }

    /// Number of intents.
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Intent names in file order.
    pub fn intent_names(&self) -> impl Iterator<Item = &str> {
        self.intents.keys().map(String::as_str)
    }

    /// Intents with their data, in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IntentData)> {
        self.intents.iter().map(|(name, data)| (name.as_str(), data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "greeting": {
            "patterns": ["hello there", "hi"],
            "responses": ["Hello!"]
        },
        "farewell": {
            "patterns": ["bye"],
            "responses": ["See you!"]
        }
    }"#;

    fn write_sample(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("intents.json");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn loads_intents_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = Dataset::load(write_sample(&dir)).unwrap();

        assert_eq!(dataset.len(), 2);
        let names: Vec<&str> = dataset.intent_names().collect();
        assert_eq!(names, vec!["greeting", "farewell"]);
        assert_eq!(dataset.get("greeting").unwrap().patterns.len(), 2);
    }

    #[test]
    fn add_utterance_rewrites_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir);

        let mut dataset = Dataset::load(&path).unwrap();
        dataset.add_utterance("farewell", "good night").unwrap();

        let reloaded = Dataset::load(&path).unwrap();
        let farewell = reloaded.get("farewell").unwrap();
        assert_eq!(farewell.patterns, vec!["bye", "good night"]);
    }

    #[test]
    fn unknown_intent_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = Dataset::load(write_sample(&dir)).unwrap();

        let result = dataset.add_utterance("nonsense", "hello");
        assert!(matches!(result, Err(NlpError::UnknownIntent(_))));
    }

    #[test]
    fn empty_and_malformed_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "{}").unwrap();
        assert!(matches!(Dataset::load(&empty), Err(NlpError::EmptyDataset)));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "not json").unwrap();
        assert!(matches!(Dataset::load(&broken), Err(NlpError::Json(_))));
    }
}

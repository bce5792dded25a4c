use crate::error::CoreError;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One labelled option of a trial's closed response set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResponseChoice(Arc<str>);

impl ResponseChoice {
    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResponseChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed, ordered set of options a participant can pick from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet {
    choices: Vec<ResponseChoice>,
}

impl ChoiceSet {
    pub fn new<I, S>(labels: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut choices: Vec<ResponseChoice> = Vec::new();
        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                return Err(CoreError::EmptyChoiceLabel);
            }
            if choices.iter().any(|c| c.label() == label) {
                return Err(CoreError::DuplicateChoice(label.to_string()));
            }
            choices.push(ResponseChoice(Arc::from(label)));
        }
        if choices.is_empty() {
            return Err(CoreError::EmptyChoiceSet);
        }
        Ok(Self { choices })
    }

    /// The two-alternative word/non-word set, in on-screen order.
    pub fn lexical_decision() -> Self {
        Self {
            choices: vec![
                ResponseChoice(Arc::from("no")),
                ResponseChoice(Arc::from("yes")),
            ],
        }
    }

    pub fn get(&self, label: &str) -> Option<&ResponseChoice> {
        self.choices.iter().find(|c| c.label() == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResponseChoice> {
        self.choices.iter()
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

impl Default for ChoiceSet {
    fn default() -> Self {
        Self::lexical_decision()
    }
}

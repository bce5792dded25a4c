#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("a choice set needs at least one option")]
    EmptyChoiceSet,
    #[error("choice label must not be empty")]
    EmptyChoiceLabel,
    #[error("duplicate choice label {0:?}")]
    DuplicateChoice(String),
}

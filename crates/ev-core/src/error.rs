use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct EventError {
    pub code: String,
    pub message: String,
    pub index: Option<usize>,
}

impl EventError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            index: None,
        }
    }

    pub fn at_index(code: impl Into<String>, message: impl Into<String>, index: usize) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            index: Some(index),
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index.get_or_insert(index);
        self
    }
}

use thiserror::Error;

/// Failures surfaced by the score service, its storage and its HTTP client.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// Bad name or score shape/range. The caller must correct the input.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// The backing store could not be read or written.
    #[error("storage failure: {0}")]
    Storage(String),
    /// The score server could not be reached or answered with garbage.
    #[error("score server unreachable: {0}")]
    Transport(String),
}

impl ScoreError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            ScoreError::Validation(_) => 400,
            ScoreError::NotFound(_) => 404,
            ScoreError::Storage(_) | ScoreError::Transport(_) => 500,
        }
    }
}

impl From<std::io::Error> for ScoreError {
    fn from(e: std::io::Error) -> Self {
        ScoreError::Storage(e.to_string())
    }
}

impl From<bincode::Error> for ScoreError {
    fn from(e: bincode::Error) -> Self {
        ScoreError::Storage(e.to_string())
    }
}

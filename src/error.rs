use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("no leaf of the spanning tree rooted at node {node} has an admissible closing edge")]
    NoClosableLeaf { node: usize },
    #[error("node {node} has no candidates")]
    EmptyCandidateSet { node: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

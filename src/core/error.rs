use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetrError {
    #[error("Invalid move: {0:?} (expected negotiate, hold or escalate)")]
    InvalidMove(String),

    #[error("Random source exhausted after {drawn} draws")]
    RandomSourceExhausted { drawn: usize },

    #[error("Advisory error: {0}")]
    Advisory(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Corrupt session: {0}")]
    CorruptSession(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NetrError>;

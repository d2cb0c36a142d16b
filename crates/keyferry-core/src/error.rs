use thiserror::Error;

pub type KeyferryResult<T> = Result<T, KeyferryError>;

#[derive(Debug, Error)]
pub enum KeyferryError {
    #[error("vault error: {0}")]
    Vault(String),

    #[error("chunking error: {0}")]
    Chunk(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// `--key` was empty
    #[error("API key is required")]
    MissingApiKey,

    #[error("worker count must be positive")]
    InvalidWorkers,

    #[error("error reading prompt file {}: {source}", path.display())]
    Prompt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shared HTTP client could not be constructed
    #[error("error building HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A single attempt failed before a response was received
    #[error("error during request: {0}")]
    Request(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

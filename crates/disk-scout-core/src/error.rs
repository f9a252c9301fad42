use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Cannot open root path {}: {source}", path.display())]
    RootAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse project manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid project manifest: {0}")]
    Invalid(String),

    #[error("project directory already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, ProjectError>;

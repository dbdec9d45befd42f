use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("cannot create directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create file {}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MaterializeError {
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateDir { path, .. } | Self::CreateFile { path, .. } => path,
        }
    }

    pub fn io_error(&self) -> &std::io::Error {
        match self {
            Self::CreateDir { source, .. } | Self::CreateFile { source, .. } => source,
        }
    }
}

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("no API key provided; set one before generating a structure")]
    MissingCredential,

    #[error("project description is empty")]
    EmptyDescription,

    #[error("request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response from model endpoint: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot write config {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {} already exists (use --force to overwrite)", path.display())]
    AlreadyExists { path: PathBuf },
}

pub type MaterializeResult<T> = Result<T, MaterializeError>;
pub type AdapterResult<T> = Result<T, AdapterError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

//! Error types for mirror probing, pip invocation and config persistence.

use std::{io, path::PathBuf, result};

/// Errors that can occur while probing mirrors or driving pip.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown mirror '{0}'")]
    UnknownMirror(String),

    #[error("mirror URL '{0}' has no host")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: reqwest::StatusCode, url: String },

    #[error("failed to build probe thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to run '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot locate the pip configuration directory")]
    NoConfigDir,
}

pub type Result<T> = result::Result<T, Error>;

use std::path::PathBuf;

use crate::ipc::IpcEndpoint;
use crate::search::PatternKind;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The compiler's own message is logged, never carried to the user.
    #[error("Invalid {kind} pattern, check your syntax")]
    InvalidPattern { kind: PatternKind },
    #[error("You don't have a target")]
    NoTarget,
    #[error("Internal error: {0}")]
    Internal(&'static str),
    #[error("Unknown command {0}")]
    UnknownCommand(String),
    #[error("Unknown IPC endpoint {0}")]
    UnknownEndpoint(String),
    #[error("IPC endpoint {0} takes no payload")]
    UnexpectedPayload(IpcEndpoint),
    #[error("Failed to acquire lock for search state")]
    AcquireSearchLock,
    #[error("Failed to read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to create log directory {path}: {source}")]
    CreateLogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to initialize tracing: {0}")]
    InitTracing(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for Result<T, PoisonError> to convert to Result<T, Error>
pub trait IntoCoreError<T> {
    fn with_lock_error(self, err: Error) -> Result<T>;
}

impl<T, G> IntoCoreError<T> for std::result::Result<T, std::sync::PoisonError<G>> {
    fn with_lock_error(self, err: Error) -> Result<T> {
        self.map_err(|_| err)
    }
}

//src/error.rs

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Every condition that stops the pipeline. Dropped reads, malformed lca rows and
/// empty contigs are not errors and never show up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed read->component row at {path}:{line}: expected at least 3 columns")]
    MalformedAssignment { path: PathBuf, line: usize },

    #[error("component id {0:?} cannot be used as a file name")]
    InvalidComponentId(String),

    #[error("reads file for component {component} does not exist: {path}")]
    MissingComponentReads { component: String, path: PathBuf },

    #[error("could not launch the assembler for component {component}: {source}")]
    AssemblerLaunch {
        component: String,
        #[source]
        source: std::io::Error,
    },

    #[error("assembly failed for component {component} ({status}), see {log} for more info")]
    AssemblyFailed {
        component: String,
        status: ExitStatus,
        log: PathBuf,
    },

    #[error("could not build the assembly worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    /// Wraps an `io::Error` with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Shorthand for attaching a path to `io::Result`s.
pub(crate) trait IoContext<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| PipelineError::io(path, e))
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures only. Unreadable entries are skipped inside the walker
/// and a failing top-level directory degrades to a partial result, so
/// neither ever reaches this enum.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid configuration in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("cannot list root directory {}: {source}", path.display())]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write CSV report to {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

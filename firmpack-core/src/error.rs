use std::path::PathBuf;

/// Failure kinds surfaced by manifest building and package assembly.
///
/// Carried inside `anyhow::Error` so call sites keep plain `?` propagation
/// while callers can still match on the kind via `downcast_ref`.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// A local file or directory is missing.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Release listing or asset download failed.
    #[error("remote fetch failed: {reason}")]
    RemoteFetch { reason: String },

    /// A recognized file is present but no version was supplied for it.
    #[error("no version for {filename}")]
    MissingVersion { filename: String },

    /// The target archive name is already taken.
    #[error("archive already exists: {}", path.display())]
    ArchiveExists { path: PathBuf },
}

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fresh temporary working directory for one assembly run.
///
/// Entering captures the caller's current directory and changes into a new
/// empty temporary directory. Dropping changes back to the origin on every
/// exit path, success or failure, before the directory itself is removed.
pub struct StagingDir {
    origin: PathBuf,
    temp: TempDir,
}

impl StagingDir {
    pub fn enter() -> Result<Self> {
        let origin = env::current_dir().context("resolve current directory")?;
        let temp = tempfile::tempdir().context("create staging directory")?;
        env::set_current_dir(temp.path())
            .with_context(|| format!("enter staging directory {:?}", temp.path()))?;
        Ok(Self { origin, temp })
    }

    /// The staging directory itself.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Where the process was before entering staging.
    pub fn origin(&self) -> &Path {
        &self.origin
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        // Must run before `temp` is cleaned up; a process cannot remove its
        // own current directory on some platforms.
        let _ = env::set_current_dir(&self.origin);
    }
}

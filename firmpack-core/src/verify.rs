use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

use crate::checksum;
use crate::error::PackError;
use crate::manifest;

/// Outcome of re-checking a package against its manifest.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub files_ok: u64,
    pub files_bad: u64,
    pub files_missing: u64,
}

impl VerifyReport {
    pub fn all_ok(&self) -> bool {
        self.files_bad == 0 && self.files_missing == 0
    }
}

/// Re-hash every manifest entry in `dir` and compare against the recorded
/// checksums.
pub fn verify_dir(dir: &Path) -> Result<VerifyReport> {
    let mf = manifest::read_manifest(dir)?;
    let mut report = VerifyReport { files_ok: 0, files_bad: 0, files_missing: 0 };
    for (_, entry) in mf.entries() {
        let path = dir.join(&entry.filename);
        if !path.is_file() {
            report.files_missing += 1;
            continue;
        }
        if checksum::file_md5_hex(&path)? == entry.md5sum {
            report.files_ok += 1;
        } else {
            report.files_bad += 1;
        }
    }
    Ok(report)
}

/// Unpack an update archive into a scratch directory and verify it.
pub fn verify_package(tar_path: &Path) -> Result<VerifyReport> {
    if !tar_path.is_file() {
        return Err(PackError::NotFound { path: tar_path.to_path_buf() }.into());
    }
    let scratch = tempfile::tempdir().context("create scratch directory")?;
    let file = File::open(tar_path).with_context(|| format!("open {:?}", tar_path))?;
    tar::Archive::new(file)
        .unpack(scratch.path())
        .with_context(|| format!("unpack {:?}", tar_path))?;
    verify_dir(scratch.path())
}

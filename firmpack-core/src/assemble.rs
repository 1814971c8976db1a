use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::archive;
use crate::error::PackError;
use crate::manifest::{self, ChecksumSet, Role, VersionSet};
use crate::release::{ReleaseSource, UPDATER_ASSET, UPDATER_PROJECT};
use crate::stage::StagingDir;

/// One package-assembly request. A default config performs the full
/// remote-fetch flow with no boot image.
#[derive(Clone, Debug)]
pub struct PackageConfig {
    /// Local updater binary to stage instead of fetching a release.
    pub updater: Option<PathBuf>,
    /// Local boot image; absent means no boot.bin in the package.
    pub boot: Option<PathBuf>,
    pub updater_version: Option<String>,
    pub boot_version: Option<String>,
    pub updater_checksum: Option<String>,
    /// Remote project queried when no local updater is given.
    pub project: String,
    /// Archive filename.
    pub package_name: String,
    /// Where the finished archive lands; defaults to the directory the
    /// process was in when assembly started.
    pub out_dir: Option<PathBuf>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            updater: None,
            boot: None,
            updater_version: None,
            boot_version: None,
            updater_checksum: None,
            project: UPDATER_PROJECT.to_string(),
            package_name: "update.tar".to_string(),
            out_dir: None,
        }
    }
}

/// Assemble an update package and return the absolute path of the published
/// archive.
///
/// The flow is strictly sequential: stage the updater (local copy or newest
/// release), stage the optional boot image, apply version/checksum
/// overrides, write the manifest, archive the staging directory, publish.
/// Any failing step aborts the run; the staging scope restores the origin
/// working directory and discards the temporary directory on all exits.
pub fn assemble(cfg: &PackageConfig, source: &dyn ReleaseSource) -> Result<PathBuf> {
    let stage = StagingDir::enter()?;
    let mut versions = VersionSet::default();

    // Caller paths may be relative to where the process was before the
    // staging chdir.
    let updater = cfg.updater.as_ref().map(|p| absolutize(stage.origin(), p));
    let boot = cfg.boot.as_ref().map(|p| absolutize(stage.origin(), p));

    match updater {
        Some(src_path) => stage_copy(&src_path, stage.path(), Role::Updater.filename())?,
        None => {
            eprintln!("fetching latest {} release...", cfg.project);
            let releases = source.list_releases(&cfg.project)?;
            let latest = releases.first().ok_or_else(|| PackError::RemoteFetch {
                reason: format!("{} has no releases", cfg.project),
            })?;
            versions.set(Role::Updater.filename(), latest.tag.clone());
            eprintln!("downloading {} {}...", UPDATER_ASSET, latest.tag);
            source.download_asset(&cfg.project, &latest.tag, UPDATER_ASSET, stage.path())?;
        }
    }

    if let Some(src_path) = boot {
        stage_copy(&src_path, stage.path(), Role::Boot.filename())?;
    }

    // Overrides win over whatever the acquisition steps established.
    if let Some(v) = &cfg.updater_version {
        versions.set(Role::Updater.filename(), v.clone());
    }
    if let Some(v) = &cfg.boot_version {
        versions.set(Role::Boot.filename(), v.clone());
    }
    let checksums = cfg.updater_checksum.as_ref().map(|sum| {
        let mut set = ChecksumSet::default();
        set.set(Role::Updater.filename(), sum.clone());
        set
    });

    manifest::build_manifest(stage.path(), &versions, checksums.as_ref())?;

    eprintln!("writing {}...", cfg.package_name);
    let archive_path = archive::create_archive(stage.path(), &cfg.package_name)?;

    let dest_dir = match &cfg.out_dir {
        Some(dir) => absolutize(stage.origin(), dir),
        None => stage.origin().to_path_buf(),
    };
    let published = archive::publish_archive(&archive_path, &dest_dir, &cfg.package_name)?;
    eprintln!("package written to {}", published.display());
    Ok(published)
}

fn absolutize(origin: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        origin.join(path)
    }
}

/// Copy a caller-supplied binary into the staging directory under its
/// canonical role filename.
fn stage_copy(src: &Path, stage_dir: &Path, filename: &str) -> Result<()> {
    match fs::copy(src, stage_dir.join(filename)) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(PackError::NotFound { path: src.to_path_buf() }.into())
        }
        Err(e) => Err(e).with_context(|| format!("copy {:?} into staging", src)),
    }
}

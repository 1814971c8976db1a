use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::error::PackError;

fn create_new(path: &Path) -> Result<File> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => Ok(f),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(PackError::ArchiveExists { path: path.to_path_buf() }.into())
        }
        Err(e) => Err(e).with_context(|| format!("create {:?}", path)),
    }
}

/// Bundle every regular file in `dir` into a tar archive at `dir/name`.
///
/// The member list is snapshotted before the archive file is created, so the
/// archive never contains itself. Members are stored by bare filename in
/// sorted order. Fails with `ArchiveExists` if `dir/name` is already taken.
pub fn create_archive(dir: &Path, name: &str) -> Result<PathBuf> {
    let mut members: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list {:?}", dir))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            members.push(entry.path());
        }
    }
    members.sort();

    let tar_path = dir.join(name);
    let file = create_new(&tar_path)?;
    let mut builder = tar::Builder::new(file);
    for member in &members {
        let member_name = member
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("unrepresentable file name {:?}", member))?;
        builder
            .append_path_with_name(member, member_name)
            .with_context(|| format!("archive {:?}", member))?;
    }
    builder.finish().with_context(|| format!("finish {:?}", tar_path))?;
    Ok(tar_path)
}

/// Copy a finished archive to `dest_dir/name` without overwriting; a
/// pre-existing file of that name fails with `ArchiveExists`.
pub fn publish_archive(archive: &Path, dest_dir: &Path, name: &str) -> Result<PathBuf> {
    let target = dest_dir.join(name);
    let mut out = create_new(&target)?;
    let mut src = File::open(archive).with_context(|| format!("open {:?}", archive))?;
    io::copy(&mut src, &mut out).with_context(|| format!("copy archive to {:?}", target))?;
    Ok(target)
}

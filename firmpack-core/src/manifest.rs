use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::Path;

use crate::checksum;
use crate::error::PackError;

/// Manifest filename written into the staging directory.
pub const MANIFEST_NAME: &str = "version.json";

/// Version recorded when nothing better is known.
pub const PLACEHOLDER_VERSION: &str = "0.0.0";

/// The fixed set of binary roles a package can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Bootloader,
    Updater,
    Boot,
}

impl Role {
    /// Declaration order; manifest keys are emitted in this order.
    pub const ALL: [Role; 3] = [Role::Bootloader, Role::Updater, Role::Boot];

    /// Canonical on-disk filename for the role.
    pub fn filename(self) -> &'static str {
        match self {
            Role::Bootloader => "ecoboot.bin",
            Role::Updater => "updater.bin",
            Role::Boot => "boot.bin",
        }
    }

    /// Key under which the role appears in the manifest document.
    pub fn key(self) -> &'static str {
        match self {
            Role::Bootloader => "bootloader",
            Role::Updater => "updater",
            Role::Boot => "boot",
        }
    }
}

/// Per-file version table, keyed by canonical filename.
#[derive(Clone, Debug)]
pub struct VersionSet {
    versions: BTreeMap<String, String>,
}

impl Default for VersionSet {
    /// Every recognized filename mapped to the placeholder version.
    fn default() -> Self {
        let mut versions = BTreeMap::new();
        for role in Role::ALL {
            versions.insert(role.filename().to_string(), PLACEHOLDER_VERSION.to_string());
        }
        Self { versions }
    }
}

impl VersionSet {
    /// No entries at all; every present recognized file then needs an
    /// explicit `set` before the manifest can be built.
    pub fn empty() -> Self {
        Self { versions: BTreeMap::new() }
    }

    pub fn set(&mut self, filename: &str, version: impl Into<String>) {
        self.versions.insert(filename.to_string(), version.into());
    }

    pub fn get(&self, filename: &str) -> Option<&str> {
        self.versions.get(filename).map(String::as_str)
    }
}

/// Per-file checksum overrides; a filename without an entry means "compute
/// from the file contents".
#[derive(Clone, Debug, Default)]
pub struct ChecksumSet {
    sums: BTreeMap<String, String>,
}

impl ChecksumSet {
    pub fn set(&mut self, filename: &str, md5sum: impl Into<String>) {
        self.sums.insert(filename.to_string(), md5sum.into());
    }

    pub fn get(&self, filename: &str) -> Option<&str> {
        self.sums.get(filename).map(String::as_str)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub filename: String,
    pub version: String,
    pub md5sum: String,
}

/// The version.json document. Field declaration order is the serialized key
/// order; absent roles are omitted entirely.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootloader: Option<ManifestEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updater: Option<ManifestEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot: Option<ManifestEntry>,
}

impl Manifest {
    /// Entry for `role`, if the package carries that file.
    pub fn entry(&self, role: Role) -> Option<&ManifestEntry> {
        match role {
            Role::Bootloader => self.bootloader.as_ref(),
            Role::Updater => self.updater.as_ref(),
            Role::Boot => self.boot.as_ref(),
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<ManifestEntry> {
        match role {
            Role::Bootloader => &mut self.bootloader,
            Role::Updater => &mut self.updater,
            Role::Boot => &mut self.boot,
        }
    }

    /// Present entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (Role, &ManifestEntry)> + '_ {
        Role::ALL.into_iter().filter_map(move |r| self.entry(r).map(|e| (r, e)))
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize with 4-space indentation and ASCII-only output.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let fmt = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, fmt);
        self.serialize(&mut ser).context("serialize manifest")?;
        let json = String::from_utf8(out).context("manifest serialization is not UTF-8")?;
        Ok(escape_non_ascii(&json).into_bytes())
    }
}

// Non-ASCII can only occur inside JSON strings, so escaping the serialized
// document wholesale is safe. Astral characters become a surrogate pair.
fn escape_non_ascii(json: &str) -> String {
    if json.is_ascii() {
        return json.to_string();
    }
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

/// Build the manifest for every recognized file present in `dir` and write
/// it to `dir/version.json`, overwriting any previous manifest.
///
/// Checksums come from `checksums` when one is supplied for a filename,
/// otherwise from the file contents. `versions` must cover every recognized
/// file that is actually present. Unrecognized files are skipped.
pub fn build_manifest(
    dir: &Path,
    versions: &VersionSet,
    checksums: Option<&ChecksumSet>,
) -> Result<Manifest> {
    if !dir.is_dir() {
        return Err(PackError::NotFound { path: dir.to_path_buf() }.into());
    }
    let mut present = BTreeSet::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list {:?}", dir))? {
        present.insert(entry?.file_name());
    }
    let mut manifest = Manifest::default();
    for role in Role::ALL {
        if !present.contains(OsStr::new(role.filename())) {
            continue;
        }
        let path = dir.join(role.filename());
        let md5sum = match checksums.and_then(|c| c.get(role.filename())) {
            Some(sum) => sum.to_string(),
            None => checksum::file_md5_hex(&path)?,
        };
        let version = versions
            .get(role.filename())
            .ok_or_else(|| PackError::MissingVersion { filename: role.filename().to_string() })?
            .to_string();
        *manifest.slot_mut(role) =
            Some(ManifestEntry { filename: role.filename().to_string(), version, md5sum });
    }
    let bytes = manifest.to_json_bytes()?;
    fs::write(dir.join(MANIFEST_NAME), bytes)
        .with_context(|| format!("write {MANIFEST_NAME} in {:?}", dir))?;
    Ok(manifest)
}

/// Read `dir/version.json` back.
pub fn read_manifest(dir: &Path) -> Result<Manifest> {
    let path = dir.join(MANIFEST_NAME);
    if !path.is_file() {
        return Err(PackError::NotFound { path }.into());
    }
    let mf: Manifest =
        serde_json::from_reader(File::open(&path)?).context("parse version.json")?;
    Ok(mf)
}

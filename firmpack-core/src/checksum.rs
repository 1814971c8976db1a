use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Lowercase hex MD5 of a byte slice; the format of the manifest `md5sum`
/// field.
pub fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

/// MD5 of a file's contents.
pub fn file_md5_hex(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read {:?}", path))?;
    Ok(md5_hex(&bytes))
}

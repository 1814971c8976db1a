use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PackError;

/// Release repository owner queried by default.
pub const DEFAULT_OWNER: &str = "mudita";
/// Project whose releases carry the updater binary.
pub const UPDATER_PROJECT: &str = "PureUpdater";
/// Asset name requested from a release; also the on-disk name.
pub const UPDATER_ASSET: &str = "updater.bin";

/// One release of a remote project.
#[derive(Deserialize, Clone, Debug)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// Remote release repository: list releases, download named assets.
///
/// Implementations report listing and download failures, unknown tags, and
/// unknown asset names as `PackError::RemoteFetch`. No retries.
pub trait ReleaseSource {
    /// Releases of `project`, most recent first.
    fn list_releases(&self, project: &str) -> Result<Vec<Release>>;

    /// Download `asset` from the release tagged `tag` into `dest`, storing
    /// it under the asset name. Returns the written path.
    fn download_asset(&self, project: &str, tag: &str, asset: &str, dest: &Path)
        -> Result<PathBuf>;
}

/// GitHub-style release API client, blocking.
pub struct GithubReleases {
    client: reqwest::blocking::Client,
    api_base: String,
    owner: String,
}

impl GithubReleases {
    /// Client against the default release host and owner.
    pub fn new() -> Result<Self> {
        Self::with_base("https://api.github.com", DEFAULT_OWNER)
    }

    /// Client against a specific API base URL and repository owner.
    pub fn with_base(api_base: impl Into<String>, owner: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("firmpack/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { client, api_base: api_base.into(), owner: owner.into() })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| PackError::RemoteFetch { reason: e.to_string() })?;
        let resp = resp
            .error_for_status()
            .map_err(|e| PackError::RemoteFetch { reason: e.to_string() })?;
        Ok(resp)
    }
}

impl ReleaseSource for GithubReleases {
    fn list_releases(&self, project: &str) -> Result<Vec<Release>> {
        let url = format!("{}/repos/{}/{}/releases", self.api_base, self.owner, project);
        let releases = self
            .get(&url)?
            .json::<Vec<Release>>()
            .map_err(|e| PackError::RemoteFetch { reason: format!("decode release list: {e}") })?;
        Ok(releases)
    }

    fn download_asset(
        &self,
        project: &str,
        tag: &str,
        asset: &str,
        dest: &Path,
    ) -> Result<PathBuf> {
        let url =
            format!("{}/repos/{}/{}/releases/tags/{}", self.api_base, self.owner, project, tag);
        let release = self
            .get(&url)?
            .json::<Release>()
            .map_err(|e| PackError::RemoteFetch { reason: format!("decode release {tag}: {e}") })?;
        let found = release.assets.iter().find(|a| a.name == asset).ok_or_else(|| {
            PackError::RemoteFetch { reason: format!("release {tag} has no asset {asset}") }
        })?;
        let bytes = self
            .get(&found.download_url)?
            .bytes()
            .map_err(|e| PackError::RemoteFetch { reason: format!("download {asset}: {e}") })?;
        let out = dest.join(asset);
        fs::write(&out, &bytes).with_context(|| format!("write {:?}", out))?;
        Ok(out)
    }
}

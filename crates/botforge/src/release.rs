//! Template-archive release lookups against the GitHub releases API.

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const RELEASES_URL: &str = "https://api.github.com/repos/wpilibsuite/vscode-wpilib/releases";
const ARCHIVE_ASSET: &str = "templates.zip";
const USER_AGENT: &str = concat!("botforge/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

impl Release {
    fn archive_asset(&self) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == ARCHIVE_ASSET)
    }
}

/// A release resolved down to the archive we actually download.
#[derive(Clone, Debug)]
pub struct ResolvedRelease {
    pub tag: String,
    pub archive_url: String,
}

fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

async fn get_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T> {
    let response = client()?
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch '{url}'"))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("release API error {status}: {body}");
    }
    response.json().await.context("failed to decode release JSON")
}

/// Resolve `"latest"` or a concrete tag to the release's archive asset.
pub async fn resolve(version: &str) -> Result<ResolvedRelease> {
    let url = if version == "latest" {
        format!("{RELEASES_URL}/latest")
    } else {
        format!("{RELEASES_URL}/tags/{version}")
    };
    let release: Release = get_json(&url).await?;
    let asset = release.archive_asset().with_context(|| {
        format!(
            "release '{}' has no '{ARCHIVE_ASSET}' asset",
            release.tag_name
        )
    })?;
    Ok(ResolvedRelease {
        tag: release.tag_name.clone(),
        archive_url: asset.browser_download_url.clone(),
    })
}

/// Tags of recent releases that carry a template archive.
pub async fn list_versions(count: u8) -> Result<Vec<String>> {
    let url = format!("{RELEASES_URL}?per_page={count}");
    let releases: Vec<Release> = get_json(&url).await?;
    Ok(releases
        .into_iter()
        .filter(|r| r.archive_asset().is_some())
        .map(|r| r.tag_name)
        .collect())
}

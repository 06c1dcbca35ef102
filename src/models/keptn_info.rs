//! Control-plane and bridge information models

use serde::{Deserialize, Serialize};

/// Bridge deployment information served by the bridge backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keptn_installation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Whether the installation wants the available-versions check
    #[serde(default)]
    pub enable_version_check_feature: bool,
    #[serde(default)]
    pub show_api_token: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects_page_size: Option<u32>,
}

/// Released versions per component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeptnVersions {
    #[serde(default)]
    pub cli: VersionList,
    #[serde(default)]
    pub bridge: VersionList,
    #[serde(default)]
    pub keptn: VersionList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionList {
    #[serde(default)]
    pub stable: Vec<String>,
    #[serde(default)]
    pub prerelease: Vec<String>,
}

impl VersionList {
    /// Highest stable version strictly newer than `current`
    ///
    /// Unparsable entries are skipped. Returns `None` if `current` itself
    /// cannot be parsed.
    pub fn newer_stable(&self, current: &str) -> Option<semver::Version> {
        let current = parse_version(current)?;
        self.stable
            .iter()
            .filter_map(|v| parse_version(v))
            .filter(|v| *v > current)
            .max()
    }
}

fn parse_version(version: &str) -> Option<semver::Version> {
    let version = version.trim();
    semver::Version::parse(version.strip_prefix('v').unwrap_or(version)).ok()
}

/// Combined bridge info and (best-effort) available versions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeptnInfo {
    pub bridge_info: BridgeInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_versions: Option<KeptnVersions>,
}

impl KeptnInfo {
    /// Newer stable bridge release, if versions are known and one exists
    pub fn bridge_update_available(&self) -> Option<semver::Version> {
        let current = self.bridge_info.bridge_version.as_deref()?;
        self.available_versions.as_ref()?.bridge.newer_stable(current)
    }
}

/// Control-plane metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keptnversion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keptnlabel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridgeversion: Option<String>,
    /// Shipyard version the control plane supports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipyardversion: Option<String>,
}

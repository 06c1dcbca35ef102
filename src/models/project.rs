//! Project, stage and service models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A project as reported by the control plane
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_name: String,
    #[serde(
        rename = "gitRemoteURI",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub git_remote_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipyard_version: Option<String>,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub stage_name: String,
    #[serde(default)]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_image: Option<String>,
    /// Event type -> id/time of the last event of that type
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub last_event_types: HashMap<String, serde_json::Value>,
}

/// One page of the project list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsPage {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u32>,
}

impl Project {
    pub fn new(project_name: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            project_name: project_name.into(),
            stages,
            ..Default::default()
        }
    }

    pub fn stage(&self, stage_name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.stage_name == stage_name)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.stage_name.as_str()).collect()
    }

    /// Service names across all stages, deduplicated in first-seen order
    pub fn distinct_service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for service in self.stages.iter().flat_map(|stage| &stage.services) {
            if !names.contains(&service.service_name) {
                names.push(service.service_name.clone());
            }
        }
        names
    }

    /// True if this project's shipyard cannot be handled by a bridge that
    /// supports shipyard `supported_version`
    pub fn is_shipyard_not_supported(&self, supported_version: &str) -> bool {
        shipyard_version_not_supported(self.shipyard_version.as_deref(), supported_version)
    }
}

impl Stage {
    pub fn new(stage_name: impl Into<String>, service_names: &[&str]) -> Self {
        Self {
            stage_name: stage_name.into(),
            services: service_names
                .iter()
                .map(|name| Service {
                    service_name: name.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    pub fn service(&self, service_name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.service_name == service_name)
    }
}

/// Compare a project's shipyard version against the supported version
///
/// Versions may carry an API prefix (`spec.keptn.sh/0.2.0`); only the last
/// path segment is compared. Absent, empty or unparsable project versions are
/// not supported, as are versions newer than `supported_version`. Older or
/// equal versions are supported.
pub fn shipyard_version_not_supported(
    project_version: Option<&str>,
    supported_version: &str,
) -> bool {
    let Some(project) = project_version.and_then(parse_shipyard_version) else {
        return true;
    };
    let Some(supported) = parse_shipyard_version(supported_version) else {
        tracing::warn!(
            "Unparsable supported shipyard version: {}",
            supported_version
        );
        return true;
    };
    project > supported
}

fn parse_shipyard_version(version: &str) -> Option<semver::Version> {
    let version = version.rsplit('/').next()?.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    if version.is_empty() {
        return None;
    }
    semver::Version::parse(version).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipyard_version_with_prefix() {
        assert!(!shipyard_version_not_supported(
            Some("spec.keptn.sh/0.2.0"),
            "0.2.0"
        ));
        assert!(shipyard_version_not_supported(
            Some("spec.keptn.sh/0.2.3"),
            "0.2.0"
        ));
    }

    #[test]
    fn test_shipyard_version_unparsable() {
        assert!(shipyard_version_not_supported(Some("latest"), "0.2.0"));
        assert!(shipyard_version_not_supported(Some("0.1.0"), "not-a-version"));
    }

    #[test]
    fn test_project_deserialization() {
        let json = serde_json::json!({
            "projectName": "sockshop",
            "gitRemoteURI": "https://github.com/example/sockshop",
            "shipyardVersion": "spec.keptn.sh/0.2.0",
            "stages": [
                {"stageName": "dev", "services": [{"serviceName": "carts"}]}
            ]
        });
        let project: Project = serde_json::from_value(json).unwrap();
        assert_eq!(project.project_name, "sockshop");
        assert_eq!(
            project.git_remote_uri.as_deref(),
            Some("https://github.com/example/sockshop")
        );
        assert_eq!(project.stage_names(), vec!["dev"]);
        assert!(project.stage("dev").unwrap().service("carts").is_some());
    }
}

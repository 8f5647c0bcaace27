//! Connection and scope configuration.
//!
//! Keys use the camelCase spelling found in configuration files. Every key is
//! optional at the type level so a partially-filled file still deserialises;
//! [`RallyConfig::validate`] then reports *all* missing required keys at once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{LogLevel, ProjectId, ResolverError, TestFolderId, WorkspaceId};

/// Service root used when `server` is not configured.
pub const DEFAULT_SERVER: &str = "https://rally1.rallydev.com";

/// Required keys, in the order they are reported.
pub const REQUIRED_KEYS: [&str; 6] = [
    "workspace",
    "project",
    "testFolder",
    "apiKey",
    "user",
    "requestOptions",
];

/// Extra options applied to every outgoing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    /// Additional HTTP headers (e.g. integration name/vendor headers).
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout in milliseconds. No timeout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Tracker connection configuration.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RallyConfig {
    /// Service root. Defaults to [`DEFAULT_SERVER`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub test_folder: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub request_options: Option<RequestOptions>,
    /// Threshold for the resolver's logger. Falls back to `LOG_LEVEL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl RallyConfig {
    /// Required keys that are absent or blank, in [`REQUIRED_KEYS`] order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let present = [
            !is_blank(&self.workspace),
            !is_blank(&self.project),
            !is_blank(&self.test_folder),
            !is_blank(&self.api_key),
            !is_blank(&self.user),
            self.request_options.is_some(),
        ];
        REQUIRED_KEYS
            .iter()
            .zip(present)
            .filter(|(_, ok)| !ok)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Fails with [`ResolverError::Configuration`] naming every missing key.
    pub fn validate(&self) -> Result<(), ResolverError> {
        let missing = self.missing_keys();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ResolverError::Configuration { missing })
        }
    }

    /// The configured server root without a trailing slash.
    pub fn server(&self) -> &str {
        self.server
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SERVER)
            .trim_end_matches('/')
    }

    pub fn workspace_id(&self) -> Option<WorkspaceId> {
        self.workspace.clone().and_then(WorkspaceId::new)
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project.clone().and_then(ProjectId::new)
    }

    pub fn test_folder_id(&self) -> Option<TestFolderId> {
        self.test_folder.clone().and_then(TestFolderId::new)
    }
}

impl std::fmt::Debug for RallyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RallyConfig")
            .field("server", &self.server())
            .field("workspace", &self.workspace)
            .field("project", &self.project)
            .field("test_folder", &self.test_folder)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .field("request_options", &self.request_options)
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete() -> RallyConfig {
        RallyConfig {
            server: None,
            workspace: Some("100".into()),
            project: Some("200".into()),
            test_folder: Some("TF1".into()),
            api_key: Some("_abc".into()),
            user: Some("qa@example.com".into()),
            request_options: Some(RequestOptions::default()),
            log_level: None,
        }
    }

    #[test]
    fn complete_config_validates() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn all_missing_keys_are_reported_in_order() {
        let config = RallyConfig {
            api_key: None,
            user: Some("   ".into()),
            ..complete()
        };
        assert_eq!(config.missing_keys(), vec!["apiKey", "user"]);
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("apiKey"));
        assert!(message.contains("user"));
    }

    #[test]
    fn empty_config_misses_everything() {
        assert_eq!(RallyConfig::default().missing_keys(), REQUIRED_KEYS.to_vec());
    }

    #[test]
    fn deserialises_camel_case_keys() {
        let config: RallyConfig = serde_json::from_value(json!({
            "server": "https://rally.example.com/",
            "workspace": "1",
            "project": "2",
            "testFolder": "TF9",
            "apiKey": "_k",
            "user": "u",
            "requestOptions": { "headers": { "X-RallyIntegrationName": "busybee" }, "timeoutMs": 5000 },
            "logLevel": "debug"
        }))
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server(), "https://rally.example.com");
        assert_eq!(config.test_folder_id().unwrap().as_str(), "TF9");
        assert_eq!(config.log_level, Some(LogLevel::Debug));
        assert_eq!(config.request_options.unwrap().timeout_ms, Some(5000));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let rendered = format!("{:?}", complete());
        assert!(!rendered.contains("_abc"));
        assert!(rendered.contains("[REDACTED]"));
    }
}

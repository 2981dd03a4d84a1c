//! Status payload parsing
//!
//! The remote status command prints one document per host describing the
//! host, its defined services and its installed/pending artefacts.
//! Payloads are JSON by default; YAML is accepted as a fallback since
//! older agents emit it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;

/// One service entry in a status payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Reported service state ("up", "down", ...); absent when the
    /// agent cannot determine it
    #[serde(default)]
    pub state: Option<String>,
    /// Component URIs this service needs
    #[serde(default)]
    pub needs: Vec<String>,
}

/// Parsed status payload for a single host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Short host name
    pub hostname: String,
    /// Fully qualified domain name
    #[serde(default)]
    pub fqdn: Option<String>,
    /// Services defined on this host, keyed by service name
    #[serde(default)]
    pub services: BTreeMap<String, ServiceEntry>,
    /// Installed artefacts as "name/version" specs
    #[serde(default)]
    pub current_artefacts: Vec<String>,
    /// Pending artefact upgrades, name -> version
    #[serde(default)]
    pub next_artefacts: BTreeMap<String, String>,
}

impl StatusPayload {
    /// Parse a raw payload, trying JSON first and YAML second
    ///
    /// # Errors
    /// Returns `ModelError::PayloadSyntax` when neither format parses,
    /// carrying both parser messages.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        match serde_json::from_str::<StatusPayload>(raw) {
            Ok(payload) => Ok(payload),
            Err(json_err) => {
                debug!(error = %json_err, "payload is not JSON, trying YAML");
                serde_yaml::from_str::<StatusPayload>(raw).map_err(|yaml_err| {
                    ModelError::PayloadSyntax(format!("json: {json_err}; yaml: {yaml_err}"))
                })
            }
        }
    }
}

/// Split an artefact spec of the form `name/version`
///
/// Specs without a version separator yield `(name, None)`.
#[must_use]
pub fn parse_artefact_spec(spec: &str) -> (String, Option<String>) {
    match spec.split_once('/') {
        Some((name, version)) if !version.is_empty() => {
            (name.to_string(), Some(version.to_string()))
        }
        _ => (spec.trim_end_matches('/').to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_payload() {
        let raw = r#"{
            "hostname": "web01",
            "fqdn": "web01.example.com",
            "services": {
                "nginx": { "state": "up", "needs": ["artefact://web01/nginx"] }
            },
            "current_artefacts": ["nginx/1.24-1"],
            "next_artefacts": { "nginx": "1.26-1" }
        }"#;

        let payload = StatusPayload::parse(raw).unwrap();

        assert_eq!(payload.hostname, "web01");
        assert_eq!(payload.fqdn.as_deref(), Some("web01.example.com"));
        assert_eq!(payload.services["nginx"].state.as_deref(), Some("up"));
        assert_eq!(payload.current_artefacts, vec!["nginx/1.24-1"]);
        assert_eq!(payload.next_artefacts["nginx"], "1.26-1");
    }

    #[test]
    fn test_parse_yaml_fallback() {
        let raw = r"
hostname: db01
services:
  postgres:
    state: up
    needs: []
current_artefacts:
  - postgres/15.4
";
        let payload = StatusPayload::parse(raw).unwrap();

        assert_eq!(payload.hostname, "db01");
        assert_eq!(payload.services["postgres"].state.as_deref(), Some("up"));
        assert!(payload.next_artefacts.is_empty());
    }

    #[test]
    fn test_parse_minimal_payload() {
        let payload = StatusPayload::parse(r#"{"hostname": "lone01"}"#).unwrap();

        assert_eq!(payload.hostname, "lone01");
        assert!(payload.fqdn.is_none());
        assert!(payload.services.is_empty());
        assert!(payload.current_artefacts.is_empty());
    }

    #[test]
    fn test_parse_garbage_fails() {
        let result = StatusPayload::parse(": not : valid : anything {{{");
        assert!(matches!(result, Err(ModelError::PayloadSyntax(_))));
    }

    #[test]
    fn test_artefact_spec() {
        assert_eq!(
            parse_artefact_spec("nginx/1.24-1"),
            ("nginx".to_string(), Some("1.24-1".to_string()))
        );
        assert_eq!(parse_artefact_spec("nginx"), ("nginx".to_string(), None));
        assert_eq!(parse_artefact_spec("nginx/"), ("nginx".to_string(), None));
    }
}

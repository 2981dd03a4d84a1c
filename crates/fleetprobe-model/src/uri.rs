//! Component URIs
//!
//! Every component in the fleet is addressed by a URI: `host://web01`,
//! `service://web01/nginx`, `artefact://web01/nginx/1.24-1`. URIs are the
//! keys of the component pool and the form in which payloads express
//! `needs` edges.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Typed component identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Uri {
    /// A fleet target host
    Host {
        /// Host name
        host: String,
    },
    /// A service defined on a host
    Service {
        /// Host the service runs on
        host: String,
        /// Service name
        name: String,
    },
    /// A deployable software unit tracked per host
    Artefact {
        /// Host the artefact is installed on
        host: String,
        /// Artefact name
        name: String,
        /// Artefact version (absent for version-agnostic references)
        version: Option<String>,
    },
}

impl Uri {
    /// Host component URI
    pub fn host(host: impl Into<String>) -> Self {
        Uri::Host { host: host.into() }
    }

    /// Service component URI
    pub fn service(host: impl Into<String>, name: impl Into<String>) -> Self {
        Uri::Service {
            host: host.into(),
            name: name.into(),
        }
    }

    /// Artefact component URI
    ///
    /// An empty version is normalised to `None`; sloppy payloads emit
    /// `""` where they mean "no version", and `Some("")` would display
    /// as a trailing-slash form the parser rejects.
    pub fn artefact(
        host: impl Into<String>,
        name: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Uri::Artefact {
            host: host.into(),
            name: name.into(),
            version: version.filter(|v| !v.is_empty()),
        }
    }

    /// The host this component belongs to
    #[must_use]
    pub fn host_name(&self) -> &str {
        match self {
            Uri::Host { host } | Uri::Service { host, .. } | Uri::Artefact { host, .. } => host,
        }
    }

    /// URI scheme ("host", "service", "artefact")
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Uri::Host { .. } => "host",
            Uri::Service { .. } => "service",
            Uri::Artefact { .. } => "artefact",
        }
    }

    fn sort_key(&self) -> (&str, u8, &str, &str) {
        match self {
            Uri::Host { host } => (host, 0, "", ""),
            Uri::Service { host, name } => (host, 1, name, ""),
            Uri::Artefact {
                host,
                name,
                version,
            } => (host, 2, name, version.as_deref().unwrap_or("")),
        }
    }
}

// Order by (host, kind, name, version) so that pool iteration groups
// each host with its services and artefacts.
impl Ord for Uri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Uri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uri::Host { host } => write!(f, "host://{host}"),
            Uri::Service { host, name } => write!(f, "service://{host}/{name}"),
            Uri::Artefact {
                host,
                name,
                version,
            } => match version {
                Some(v) => write!(f, "artefact://{host}/{name}/{v}"),
                None => write!(f, "artefact://{host}/{name}"),
            },
        }
    }
}

impl FromStr for Uri {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| ModelError::InvalidUri(s.to_string()))?;

        let segments: Vec<&str> = rest.split('/').collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(ModelError::InvalidUri(s.to_string()));
        }

        match (scheme, segments.as_slice()) {
            ("host", [host]) => Ok(Uri::host(*host)),
            ("service", [host, name]) => Ok(Uri::service(*host, *name)),
            ("artefact", [host, name]) => Ok(Uri::artefact(*host, *name, None)),
            ("artefact", [host, name, version]) => {
                Ok(Uri::artefact(*host, *name, Some((*version).to_string())))
            }
            _ => Err(ModelError::InvalidUri(s.to_string())),
        }
    }
}

impl TryFrom<String> for Uri {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Uri> for String {
    fn from(uri: Uri) -> Self {
        uri.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_uri() {
        let uri: Uri = "host://web01".parse().unwrap();
        assert_eq!(uri, Uri::host("web01"));
        assert_eq!(uri.kind(), "host");
        assert_eq!(uri.host_name(), "web01");
    }

    #[test]
    fn test_parse_service_uri() {
        let uri: Uri = "service://web01/nginx".parse().unwrap();
        assert_eq!(uri, Uri::service("web01", "nginx"));
    }

    #[test]
    fn test_parse_artefact_uri() {
        let uri: Uri = "artefact://web01/nginx/1.24-1".parse().unwrap();
        assert_eq!(
            uri,
            Uri::artefact("web01", "nginx", Some("1.24-1".to_string()))
        );

        let uri: Uri = "artefact://web01/nginx".parse().unwrap();
        assert_eq!(uri, Uri::artefact("web01", "nginx", None));
    }

    #[test]
    fn test_display_round_trip() {
        for raw in [
            "host://web01",
            "service://web01/nginx",
            "artefact://web01/nginx/1.24-1",
            "artefact://web01/nginx",
        ] {
            let uri: Uri = raw.parse().unwrap();
            assert_eq!(uri.to_string(), raw);
        }
    }

    #[test]
    fn test_reject_malformed() {
        for raw in [
            "web01",
            "host://",
            "host://a/b",
            "service://web01",
            "service://web01/",
            "artefact://web01/nginx/1.0/extra",
            "volume://web01/data",
        ] {
            assert!(raw.parse::<Uri>().is_err(), "accepted {raw}");
        }
    }

    #[test]
    fn test_ordering_groups_by_host() {
        let mut uris = vec![
            Uri::service("web02", "nginx"),
            Uri::artefact("web01", "nginx", Some("1.0".to_string())),
            Uri::host("web02"),
            Uri::service("web01", "nginx"),
            Uri::host("web01"),
        ];
        uris.sort();

        assert_eq!(uris[0], Uri::host("web01"));
        assert_eq!(uris[1], Uri::service("web01", "nginx"));
        assert_eq!(
            uris[2],
            Uri::artefact("web01", "nginx", Some("1.0".to_string()))
        );
        assert_eq!(uris[3], Uri::host("web02"));
    }

    #[test]
    fn test_empty_version_normalised() {
        let uri = Uri::artefact("web01", "nginx", Some(String::new()));
        assert_eq!(uri, Uri::artefact("web01", "nginx", None));
        assert_eq!(uri.to_string(), "artefact://web01/nginx");

        // Displayed form parses back to the same value
        let back: Uri = uri.to_string().parse().unwrap();
        assert_eq!(back, uri);
    }

    #[test]
    fn test_serde_as_string() {
        let uri = Uri::service("web01", "nginx");
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"service://web01/nginx\"");

        let back: Uri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uri);
    }
}

//! Core trait and data model for the orb registry collaborator
//!
//! This module defines the abstract registry interface consumed by the
//! orchestration layer, together with the response snapshot types the
//! registry hands back. The concrete HTTP implementation lives in
//! `crate::registry`; tests substitute counter/recording stubs.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::RegistryError;
use crate::validation::segment_validator::Segment;

// ============================================================================
// Registry Data Model
// ============================================================================

/// Opaque registry identifier for an orb.
///
/// Issued by the registry when an orb is created or resolved; the client
/// never inspects or synthesizes these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrbId(pub String);

impl fmt::Display for OrbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single declared parameter of a command, job, or executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbElementParameter {
    /// Parameter type as declared in the orb source (`string`, `boolean`,
    /// `enum`, `steps`, ...). Unknown types are carried through untouched.
    #[serde(rename = "type")]
    pub parameter_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default value; its JSON representation depends on `parameter_type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// A command, job, or executor definition exposed by an orb
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameter name to definition. Kept sorted so rendering and JSON
    /// output are deterministic.
    #[serde(default)]
    pub parameters: BTreeMap<String, OrbElementParameter>,
}

/// One published version of an orb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbVersion {
    pub version: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only snapshot of an orb's registry record
///
/// `versions` is ordered newest-first: the first entry is the most recent
/// publish, the last entry is the first release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbWithData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrbId>,

    pub name: String,

    pub highest_version: String,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub versions: Vec<OrbVersion>,

    #[serde(default)]
    pub commands: BTreeMap<String, OrbElement>,

    #[serde(default)]
    pub jobs: BTreeMap<String, OrbElement>,

    #[serde(default)]
    pub executors: BTreeMap<String, OrbElement>,
}

/// A listing response snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbsForListing {
    pub orbs: Vec<OrbWithData>,
}

/// Result of server-side validation or pre-registration processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedOrb {
    pub output_yaml: String,
}

// ============================================================================
// Registry Trait
// ============================================================================

/// Abstract interface to the remote orb registry
///
/// Each method maps to exactly one remote call. The registry owns all
/// version computation: increment and promote return the new highest
/// version, the client never derives one. Retry policy, timeouts, and
/// transport details belong to implementations, not callers.
#[async_trait]
pub trait OrbRegistry: Send + Sync {
    /// Resolve a namespace/name pair to its registry identifier.
    async fn resolve_id(&self, namespace: &str, name: &str) -> Result<OrbId, RegistryError>;

    /// Register `orb_yaml` as `version` of the orb with the given identifier.
    async fn publish_by_id(
        &self,
        orb_yaml: &str,
        id: &OrbId,
        version: &str,
    ) -> Result<OrbWithData, RegistryError>;

    /// Publish `orb_yaml` as the next release on the given segment.
    async fn increment_version(
        &self,
        orb_yaml: &str,
        namespace: &str,
        name: &str,
        segment: Segment,
    ) -> Result<OrbWithData, RegistryError>;

    /// Promote a dev version to the next release on the given segment.
    async fn promote(
        &self,
        namespace: &str,
        name: &str,
        dev_version: &str,
        segment: Segment,
    ) -> Result<OrbWithData, RegistryError>;

    /// Create an orb in the given namespace.
    async fn create_orb(&self, namespace: &str, name: &str) -> Result<OrbId, RegistryError>;

    /// List orbs across all namespaces.
    async fn list_all(&self, include_uncertified: bool) -> Result<OrbsForListing, RegistryError>;

    /// List orbs within one namespace.
    async fn list_by_namespace(&self, namespace: &str) -> Result<OrbsForListing, RegistryError>;

    /// Fetch the raw YAML source of a published orb version.
    async fn fetch_source(&self, reference: &str) -> Result<String, RegistryError>;

    /// Fetch the full metadata record for an orb reference.
    async fn fetch_info(&self, reference: &str) -> Result<OrbWithData, RegistryError>;

    /// Validate orb source without registering it.
    async fn validate_orb(&self, orb_yaml: &str) -> Result<ProcessedOrb, RegistryError>;

    /// Validate orb source and return its fully processed form.
    async fn process_orb(&self, orb_yaml: &str) -> Result<ProcessedOrb, RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_orb() -> OrbWithData {
        let mut commands = BTreeMap::new();
        commands.insert(
            "greet".to_string(),
            OrbElement {
                description: None,
                parameters: BTreeMap::from([(
                    "to".to_string(),
                    OrbElementParameter {
                        parameter_type: "string".to_string(),
                        description: None,
                        default: Some(serde_json::Value::String("world".to_string())),
                    },
                )]),
            },
        );

        OrbWithData {
            id: Some(OrbId("orb-id-1".to_string())),
            name: "foo/bar".to_string(),
            highest_version: "1.2.3".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            versions: vec![OrbVersion {
                version: "1.2.3".to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap(),
            }],
            commands,
            jobs: BTreeMap::new(),
            executors: BTreeMap::new(),
        }
    }

    #[test]
    fn test_orb_serializes_with_camel_case_field_names() {
        let json = serde_json::to_string(&sample_orb()).unwrap();

        assert!(json.contains("\"highestVersion\":\"1.2.3\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"commands\""));
        assert!(!json.contains("highest_version"));
    }

    #[test]
    fn test_parameter_type_serializes_as_type() {
        let parameter = OrbElementParameter {
            parameter_type: "boolean".to_string(),
            description: None,
            default: Some(serde_json::Value::Bool(true)),
        };

        let json = serde_json::to_string(&parameter).unwrap();
        assert!(json.contains("\"type\":\"boolean\""));
        assert!(json.contains("\"default\":true"));
    }

    #[test]
    fn test_orb_roundtrip() {
        let orb = sample_orb();
        let json = serde_json::to_string(&orb).unwrap();
        let back: OrbWithData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, orb);
    }

    #[test]
    fn test_orb_deserializes_with_missing_element_maps() {
        let json = r#"{
            "name": "foo/bar",
            "highestVersion": "0.0.1",
            "createdAt": "2024-01-01T00:00:00Z"
        }"#;

        let orb: OrbWithData = serde_json::from_str(json).unwrap();
        assert!(orb.commands.is_empty());
        assert!(orb.versions.is_empty());
        assert!(orb.id.is_none());
    }

    #[test]
    fn test_element_parameters_iterate_in_name_order() {
        let mut element = OrbElement::default();
        for name in ["zeta", "alpha", "mid"] {
            element.parameters.insert(
                name.to_string(),
                OrbElementParameter {
                    parameter_type: "string".to_string(),
                    description: None,
                    default: None,
                },
            );
        }

        let names: Vec<&str> = element.parameters.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_orb_id_is_transparent_in_json() {
        let orb = sample_orb();
        let json = serde_json::to_string(&orb).unwrap();
        assert!(json.contains("\"id\":\"orb-id-1\""));
    }
}

//! Reference Parser - Decomposes orb reference strings
//!
//! An orb reference takes the form `namespace/orb` or `namespace/orb@version`.
//! Parsing is pure and deterministic: well-formed input always splits the
//! same way, malformed input always fails with `InvalidReferenceFormat`
//! carrying the offending string.

use crate::core::error::OrbError;

const EXPECTED_NAMESPACE_AND_NAME: &str = "a namespace and orb in the form `namespace/orb`";
const EXPECTED_WITH_VERSION: &str =
    "a fully-qualified reference in the form `namespace/orb@version`";

/// A decomposed orb reference
///
/// Derived per command invocation and discarded after use; nothing is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    pub namespace: String,
    pub name: String,
    pub version: Option<String>,
}

impl ParsedReference {
    /// The `namespace/name` form, without any version suffix.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// Parser for orb reference strings
pub struct ReferenceParser;

impl ReferenceParser {
    /// Split a `namespace/orb` reference on its first `/`.
    ///
    /// Fails when no `/` is present or either side is empty.
    pub fn split_into_namespace_and_name(reference: &str) -> Result<(String, String), OrbError> {
        match reference.split_once('/') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                Ok((namespace.to_string(), name.to_string()))
            }
            _ => Err(OrbError::InvalidReferenceFormat {
                reference: reference.to_string(),
                expected: EXPECTED_NAMESPACE_AND_NAME,
            }),
        }
    }

    /// Split a `namespace/orb@version` reference into its three parts.
    ///
    /// The part before the `@` must itself be a valid `namespace/orb`
    /// reference; the part after it is the version. Fails when no `@` is
    /// present or the version portion is empty.
    pub fn split_into_namespace_name_and_version(
        reference: &str,
    ) -> Result<(String, String, String), OrbError> {
        let (before, version) = reference
            .split_once('@')
            .ok_or_else(|| Self::malformed_versioned(reference))?;
        if version.is_empty() {
            return Err(Self::malformed_versioned(reference));
        }

        let (namespace, name) = Self::split_into_namespace_and_name(before)
            .map_err(|_| Self::malformed_versioned(reference))?;

        Ok((namespace, name, version.to_string()))
    }

    fn malformed_versioned(reference: &str) -> OrbError {
        OrbError::InvalidReferenceFormat {
            reference: reference.to_string(),
            expected: EXPECTED_WITH_VERSION,
        }
    }
}

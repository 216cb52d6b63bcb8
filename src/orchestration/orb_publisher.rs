//! Orb Publisher - Orchestrates the version-lifecycle operations
//!
//! Sequences the remote calls behind publish, increment, promote, and
//! create. Every operation runs its local validation (reference shape,
//! segment label, dev-version precondition, source readability) to
//! completion before the first remote call, so malformed input never
//! costs a network round trip.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::core::error::{OrbError, RegistryError};
use crate::core::state_machine::{PublishSequence, PublishStage};
use crate::core::traits::{OrbId, OrbRegistry};
use crate::validation::reference_parser::{ParsedReference, ReferenceParser};
use crate::validation::segment_validator::SegmentValidator;
use crate::validation::version_classifier::{VersionClassifier, VersionKind};

/// Read orb source from a file path, or from stdin when the path is `-`.
///
/// Local step; always completed before any remote call that carries orb
/// content.
pub async fn read_orb_source(path: &str) -> Result<String, RegistryError> {
    if path == "-" {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .map_err(|e| RegistryError::Io {
                path: PathBuf::from(path),
                source: e,
            })?;
        return Ok(buffer);
    }

    fs::read_to_string(path).await.map_err(|e| RegistryError::Io {
        path: PathBuf::from(path),
        source: e,
    })
}

/// Outcome of a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedOrb {
    /// The reference exactly as the user gave it.
    pub reference: String,
    /// The version that was registered.
    pub version: String,
    /// Whether a dev label or a release was published; the command layer
    /// uses this to decide on the expiry/overwrite advisory.
    pub kind: VersionKind,
}

/// Outcome of a successful increment or promotion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpedOrb {
    /// The parsed input reference.
    pub reference: ParsedReference,
    /// The new highest version, computed and returned by the registry.
    pub highest_version: String,
}

/// Outcome of a successful orb creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrb {
    pub reference: ParsedReference,
    pub id: OrbId,
}

/// Orchestrator for the publish / increment / promote / create flows
///
/// Owns nothing but a handle to the registry collaborator; all state is
/// per-call and discarded on return, so re-running a failed operation
/// needs no cleanup.
pub struct OrbPublisher {
    registry: Arc<dyn OrbRegistry>,
}

impl OrbPublisher {
    pub fn new(registry: Arc<dyn OrbRegistry>) -> Self {
        Self { registry }
    }

    /// Publish orb source as a named version.
    ///
    /// Two remote calls: resolve the registry identifier (read), then
    /// register the source under it (write). The steps are not atomic; if
    /// the write fails, a retried publish simply resolves again.
    pub async fn publish(&self, path: &str, reference: &str) -> Result<PublishedOrb, OrbError> {
        let (namespace, name, version) =
            ReferenceParser::split_into_namespace_name_and_version(reference)?;

        let orb_yaml = read_orb_source(path).await.map_err(|e| {
            OrbError::registry(format!("failed to publish orb `{reference}`"), e)
        })?;

        let mut sequence = PublishSequence::new();

        let id = self
            .registry
            .resolve_id(&namespace, &name)
            .await
            .map_err(|e| {
                OrbError::registry(format!("failed to resolve orb `{namespace}/{name}`"), e)
            })?;
        sequence.advance();

        // The write step never runs before the sequence has left Resolving
        // with an identifier in hand.
        debug_assert_eq!(sequence.stage(), PublishStage::Publishing);
        self.registry
            .publish_by_id(&orb_yaml, &id, &version)
            .await
            .map_err(|e| OrbError::registry(format!("failed to publish orb `{reference}`"), e))?;
        sequence.advance();
        debug_assert!(sequence.is_done());

        let kind = VersionClassifier::classify(&version);
        Ok(PublishedOrb {
            reference: reference.to_string(),
            version,
            kind,
        })
    }

    /// Bump the released line of an orb on the given segment.
    ///
    /// The reference carries no version; the registry computes the bumped
    /// version and returns the new highest release.
    pub async fn increment(
        &self,
        path: &str,
        reference: &str,
        segment_label: &str,
    ) -> Result<BumpedOrb, OrbError> {
        let (namespace, name) = ReferenceParser::split_into_namespace_and_name(reference)?;
        let segment = SegmentValidator::validate(segment_label)?;

        let orb_yaml = read_orb_source(path).await.map_err(|e| {
            OrbError::registry(format!("failed to increment orb `{reference}`"), e)
        })?;

        let orb = self
            .registry
            .increment_version(&orb_yaml, &namespace, &name, segment)
            .await
            .map_err(|e| {
                OrbError::registry(format!("failed to increment orb `{namespace}/{name}`"), e)
            })?;

        Ok(BumpedOrb {
            reference: ParsedReference {
                namespace,
                name,
                version: None,
            },
            highest_version: orb.highest_version,
        })
    }

    /// Promote a dev version to a release on the given segment.
    ///
    /// Promoting a released version is a guaranteed registry rejection, so
    /// the dev-version precondition is checked locally and a violation
    /// never leaves this process.
    pub async fn promote(
        &self,
        reference: &str,
        segment_label: &str,
    ) -> Result<BumpedOrb, OrbError> {
        let (namespace, name, version) =
            ReferenceParser::split_into_namespace_name_and_version(reference)?;
        let segment = SegmentValidator::validate(segment_label)?;

        if VersionClassifier::classify(&version) == VersionKind::Released {
            return Err(OrbError::PromotionRequiresDevVersion { version });
        }

        let orb = self
            .registry
            .promote(&namespace, &name, &version, segment)
            .await
            .map_err(|e| OrbError::registry(format!("failed to promote orb `{reference}`"), e))?;

        Ok(BumpedOrb {
            reference: ParsedReference {
                namespace,
                name,
                version: Some(version),
            },
            highest_version: orb.highest_version,
        })
    }

    /// Create an orb record in the given namespace.
    pub async fn create(&self, reference: &str) -> Result<CreatedOrb, OrbError> {
        let (namespace, name) = ReferenceParser::split_into_namespace_and_name(reference)?;

        let id = self
            .registry
            .create_orb(&namespace, &name)
            .await
            .map_err(|e| OrbError::registry(format!("failed to create orb `{reference}`"), e))?;

        Ok(CreatedOrb {
            reference: ParsedReference {
                namespace,
                name,
                version: None,
            },
            id,
        })
    }
}

//! Listing Aggregator - Routes listing requests to the right registry call
//!
//! A namespace argument scopes the listing to that namespace; without one
//! the global listing is used, optionally including uncertified orbs.
//! Either path yields the same `OrbsForListing` snapshot shape, so the
//! caller cannot tell them apart beyond the count and disclaimer wording
//! of the rendered summary.

use std::sync::Arc;

use crate::core::error::OrbError;
use crate::core::traits::{OrbRegistry, OrbsForListing};

/// Aggregator for orb listing requests
pub struct ListingAggregator {
    registry: Arc<dyn OrbRegistry>,
}

impl ListingAggregator {
    pub fn new(registry: Arc<dyn OrbRegistry>) -> Self {
        Self { registry }
    }

    /// Fetch a listing snapshot.
    ///
    /// `include_uncertified` only applies to the global listing; a
    /// namespace-scoped listing always returns the whole namespace.
    pub async fn list(
        &self,
        namespace: Option<&str>,
        include_uncertified: bool,
    ) -> Result<OrbsForListing, OrbError> {
        match namespace {
            Some(namespace) => self
                .registry
                .list_by_namespace(namespace)
                .await
                .map_err(|e| {
                    OrbError::registry(
                        format!("failed to list orbs in namespace `{namespace}`"),
                        e,
                    )
                }),
            None => self
                .registry
                .list_all(include_uncertified)
                .await
                .map_err(|e| OrbError::registry("failed to list orbs", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RegistryError;
    use crate::core::traits::{OrbId, OrbWithData, ProcessedOrb};
    use crate::validation::segment_validator::Segment;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Stub that records which listing call was routed to and with what.
    #[derive(Default)]
    struct ListingStub {
        calls: Mutex<Vec<String>>,
    }

    impl ListingStub {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrbRegistry for ListingStub {
        async fn resolve_id(&self, _: &str, _: &str) -> Result<OrbId, RegistryError> {
            unimplemented!("not a listing call")
        }

        async fn publish_by_id(
            &self,
            _: &str,
            _: &OrbId,
            _: &str,
        ) -> Result<OrbWithData, RegistryError> {
            unimplemented!("not a listing call")
        }

        async fn increment_version(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: Segment,
        ) -> Result<OrbWithData, RegistryError> {
            unimplemented!("not a listing call")
        }

        async fn promote(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: Segment,
        ) -> Result<OrbWithData, RegistryError> {
            unimplemented!("not a listing call")
        }

        async fn create_orb(&self, _: &str, _: &str) -> Result<OrbId, RegistryError> {
            unimplemented!("not a listing call")
        }

        async fn list_all(
            &self,
            include_uncertified: bool,
        ) -> Result<OrbsForListing, RegistryError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("list_all({include_uncertified})"));
            Ok(OrbsForListing::default())
        }

        async fn list_by_namespace(
            &self,
            namespace: &str,
        ) -> Result<OrbsForListing, RegistryError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("list_by_namespace({namespace})"));
            Ok(OrbsForListing::default())
        }

        async fn fetch_source(&self, _: &str) -> Result<String, RegistryError> {
            unimplemented!("not a listing call")
        }

        async fn fetch_info(&self, _: &str) -> Result<OrbWithData, RegistryError> {
            unimplemented!("not a listing call")
        }

        async fn validate_orb(&self, _: &str) -> Result<ProcessedOrb, RegistryError> {
            unimplemented!("not a listing call")
        }

        async fn process_orb(&self, _: &str) -> Result<ProcessedOrb, RegistryError> {
            unimplemented!("not a listing call")
        }
    }

    #[tokio::test]
    async fn test_namespace_routes_to_scoped_listing() {
        let stub = ListingStub::new();
        let aggregator = ListingAggregator::new(stub.clone());

        aggregator.list(Some("circleci"), true).await.unwrap();

        assert_eq!(stub.calls(), vec!["list_by_namespace(circleci)"]);
    }

    #[tokio::test]
    async fn test_no_namespace_routes_to_global_listing() {
        let stub = ListingStub::new();
        let aggregator = ListingAggregator::new(stub.clone());

        aggregator.list(None, false).await.unwrap();
        aggregator.list(None, true).await.unwrap();

        assert_eq!(stub.calls(), vec!["list_all(false)", "list_all(true)"]);
    }
}

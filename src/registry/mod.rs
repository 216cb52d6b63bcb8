//! Registry collaborator implementations
//!
//! The abstract interface lives in `crate::core::traits`; this module
//! holds the HTTP client that fulfills it in production.

pub mod http_client;

pub use http_client::RegistryClient;

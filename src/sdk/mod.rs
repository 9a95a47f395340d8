//! Client side of the remote entity configuration and query service.
//!
//! The service owns entity definitions and instance persistence. This module
//! only describes its request/response shapes and exposes them through the
//! [`EntityApi`] trait so pages, the CLI and tests can swap implementations.

pub mod http;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpEntityApi;
pub use models::*;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request to entity service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("entity service responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid response from entity service: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("entity service is not configured: {0}")]
    NotConfigured(String),
}

impl SdkError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::NotFound(_))
    }
}

pub type SdkResult<T> = Result<T, SdkError>;

/// Operations of the entity configuration/query service for one project
#[async_trait]
pub trait EntityApi: Send + Sync {
    /// Project the client is bound to
    fn project_id(&self) -> &str;

    async fn get_all_entity_definitions(&self) -> SdkResult<Vec<EntityDefinition>>;

    async fn get_entity_definition_config(&self, entity_definition_id: &str) -> SdkResult<EntityDefinition>;

    /// `Ok(None)` when no instance carries the slug
    async fn get_instance_by_slug(
        &self,
        entity_definition_id: &str,
        slug: &str,
        lookup: SlugLookup,
    ) -> SdkResult<Option<Instance>>;

    async fn get_instances(&self, entity_definition_id: &str, query: &InstanceQuery) -> SdkResult<InstancesPage>;
}

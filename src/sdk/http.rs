use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::models::{EntityDefinition, Instance, InstanceQuery, InstancesPage, SlugLookup};
use super::{EntityApi, SdkError, SdkResult};
use crate::config::RemoteApiConfig;

/// REST implementation of [`EntityApi`]
///
/// Routes, relative to the configured base URL:
/// - `GET projects/{project}/entity-definitions`
/// - `GET projects/{project}/entity-definitions/{id}`
/// - `GET projects/{project}/entity-definitions/{id}/instances`
/// - `GET projects/{project}/entity-definitions/{id}/instances/by-slug/{slug}`
///
/// `filters` and `relationFilterModes` travel as JSON-encoded query parameters.
#[derive(Clone)]
pub struct HttpEntityApi {
    client: Client,
    base_url: Url,
    project_id: String,
    api_key: Option<String>,
}

impl HttpEntityApi {
    pub fn new(config: &RemoteApiConfig, project_id: impl Into<String>) -> SdkResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(client, &config.base_url, project_id, config.api_key.clone())
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        project_id: impl Into<String>,
        api_key: Option<String>,
    ) -> SdkResult<Self> {
        // Trailing slash so relative joins keep the base path
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| SdkError::NotConfigured(format!("invalid entity API url '{}': {}", base_url, e)))?;

        Ok(Self {
            client,
            base_url,
            project_id: project_id.into(),
            api_key,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> SdkResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| SdkError::NotConfigured(format!("entity API url cannot be a base: {}", self.base_url)))?;
            path.pop_if_empty();
            path.push("projects").push(&self.project_id).push("entity-definitions");
            path.extend(segments);
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> SdkResult<T> {
        tracing::debug!("GET {}", url);
        let response = self.authorize(self.client.get(url.clone())).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(SdkError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            return Err(SdkError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull a human readable message out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl EntityApi for HttpEntityApi {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn get_all_entity_definitions(&self) -> SdkResult<Vec<EntityDefinition>> {
        let url = self.endpoint(&[])?;
        self.get_json(url).await
    }

    async fn get_entity_definition_config(&self, entity_definition_id: &str) -> SdkResult<EntityDefinition> {
        let url = self.endpoint(&[entity_definition_id])?;
        self.get_json(url).await
    }

    async fn get_instance_by_slug(
        &self,
        entity_definition_id: &str,
        slug: &str,
        lookup: SlugLookup,
    ) -> SdkResult<Option<Instance>> {
        let mut url = self.endpoint(&[entity_definition_id, "instances", "by-slug", slug])?;
        url.query_pairs_mut()
            .append_pair("relationsAsIds", &lookup.relations_as_ids.to_string())
            .append_pair("loadFiles", &lookup.load_files.to_string());

        match self.get_json::<Instance>(url).await {
            Ok(instance) => Ok(Some(instance)),
            Err(SdkError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_instances(&self, entity_definition_id: &str, query: &InstanceQuery) -> SdkResult<InstancesPage> {
        let mut url = self.endpoint(&[entity_definition_id, "instances"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("page", &query.page.to_string())
                .append_pair("limit", &query.limit.to_string());
            if let Some(search) = &query.search {
                pairs.append_pair("search", search);
            }
            if let Some(filters) = &query.filters {
                pairs.append_pair("filters", &serde_json::to_string(filters)?);
            }
            if let Some(modes) = &query.relation_filter_modes {
                pairs.append_pair("relationFilterModes", &serde_json::to_string(modes)?);
            }
        }
        self.get_json(url).await
    }
}

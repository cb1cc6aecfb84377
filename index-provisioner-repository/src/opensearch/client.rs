//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `IndexAdmin`
//! using the OpenSearch Rust client. The same wire protocol is served by
//! managed Elasticsearch domains, so the client works against both.

use async_trait::async_trait;
use opensearch::{
    cert::CertificateValidation,
    http::{
        headers::HeaderMap,
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    indices::{
        IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesGetMappingParts,
        IndicesPutMappingParts, IndicesStatsParts,
    },
    OpenSearch,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::config::ConnectionConfig;
use crate::errors::IndexAdminError;
use crate::interfaces::IndexAdmin;
use crate::opensearch::auth::resolve_credentials;
use crate::types::IndexStats;
use index_provisioner_shared::MappingSpec;

/// Error type the service reports when creating an index that already exists.
const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// Bytes escaped when a name is placed in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// OpenSearch client implementation.
///
/// Performs index-level administration against a single service endpoint,
/// signing each request with AWS SigV4 unless the connection is anonymous.
///
/// # Example
///
/// ```ignore
/// use index_provisioner_repository::{ConnectionConfig, CredentialSource, IndexAdmin};
/// let config = ConnectionConfig::new("search-movies.us-east-2.es.amazonaws.com")
///     .with_credentials(CredentialSource::static_keys("AKID...", "secret"));
/// let client = OpenSearchClient::new(config).await?;
///
/// if client.index_exists("movies").await? {
///     client.delete_index("movies").await?;
/// }
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the configured endpoint.
    ///
    /// No request is sent here. The first request opens the connection.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(IndexAdminError)` - If the endpoint, credentials, or transport are invalid
    pub async fn new(config: ConnectionConfig) -> Result<Self, IndexAdminError> {
        let url = config.url()?;

        let conn_pool = SingleNodeConnectionPool::new(url.clone());
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();

        if !config.verify_certs {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(credentials) = resolve_credentials(&config).await? {
            builder = builder
                .auth(credentials)
                .service_name(&config.service_name);
        }

        let transport = builder
            .build()
            .map_err(|e| IndexAdminError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            region = %config.region,
            service = %config.service_name,
            signed = config.credentials.signs_requests(),
            "Created OpenSearch client"
        );

        Ok(Self { client })
    }

    /// Read the status and body of a failed response into a message.
    async fn failure_message(operation: &str, response: Response) -> (Option<String>, String) {
        let status = response.status_code();
        let body = response.text().await.unwrap_or_default();
        let (error_type, reason) = parse_error_body(&body);

        error!(status = %status, body = %body, "{} request failed", operation);

        (
            error_type,
            format!("{} failed with status {}: {}", operation, status, reason),
        )
    }
}

/// Build `/{index}/_mapping/{type}` with both names escaped.
///
/// Dot segments are refused since the URL parser would resolve them.
fn typed_mapping_path(index: &str, document_type: &str) -> Result<String, IndexAdminError> {
    for segment in [index, document_type] {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(IndexAdminError::validation(format!(
                "invalid mapping path segment: {:?}",
                segment
            )));
        }
    }

    Ok(format!(
        "/{}/_mapping/{}",
        utf8_percent_encode(index, PATH_SEGMENT),
        utf8_percent_encode(document_type, PATH_SEGMENT)
    ))
}

/// Extract `error.type` and `error.reason` from a service error body.
///
/// Falls back to the raw body when it is not the usual JSON error envelope.
fn parse_error_body(body: &str) -> (Option<String>, String) {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return (None, body.to_string());
    };

    let error_type = parsed
        .pointer("/error/type")
        .and_then(Value::as_str)
        .map(str::to_string);
    let reason = parsed
        .pointer("/error/reason")
        .and_then(Value::as_str)
        .or_else(|| parsed.get("error").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());

    (error_type, reason)
}

/// Extract the field mapping of `index` from a get-mapping response.
///
/// Accepts the typeless layout `{index: {mappings: {properties}}}` and the
/// single-type legacy layout `{index: {mappings: {type: {properties}}}}`.
/// When `index` is an alias the response is keyed by the concrete index, so
/// the single entry is used.
fn mapping_from_body(index: &str, body: &Value) -> Result<MappingSpec, IndexAdminError> {
    let entry = body
        .get(index)
        .or_else(|| body.as_object().and_then(|m| m.values().next()))
        .ok_or_else(|| IndexAdminError::parse(format!("No mapping returned for {}", index)))?;

    let mappings = entry
        .get("mappings")
        .and_then(Value::as_object)
        .ok_or_else(|| IndexAdminError::parse("Mapping response has no mappings object"))?;

    if mappings.is_empty() {
        return Ok(MappingSpec::new());
    }

    let typed = if mappings.contains_key("properties") {
        None
    } else {
        mappings
            .values()
            .find(|v| v.get("properties").is_some())
    };

    let source = match typed {
        Some(type_mapping) => type_mapping.clone(),
        None => Value::Object(mappings.clone()),
    };

    serde_json::from_value(source)
        .map_err(|e| IndexAdminError::parse(format!("Invalid mapping for {}: {}", index, e)))
}

#[async_trait]
impl IndexAdmin for OpenSearchClient {
    #[instrument(skip(self))]
    async fn index_exists(&self, index: &str) -> Result<bool, IndexAdminError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| IndexAdminError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            return Ok(false);
        }

        let (_, message) = Self::failure_message("Exists", response).await;
        Err(IndexAdminError::unknown(message))
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<(), IndexAdminError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| IndexAdminError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(IndexAdminError::index_not_found(index));
        }
        if !status.is_success() {
            let (_, message) = Self::failure_message("Delete", response).await;
            return Err(IndexAdminError::delete(message));
        }

        debug!(index = %index, "Index deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_index(&self, index: &str) -> Result<(), IndexAdminError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .send()
            .await
            .map_err(|e| IndexAdminError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let (error_type, message) = Self::failure_message("Create", response).await;
            if error_type.as_deref() == Some(ALREADY_EXISTS_ERROR) {
                return Err(IndexAdminError::index_already_exists(index));
            }
            return Err(IndexAdminError::create(message));
        }

        debug!(index = %index, "Index created");
        Ok(())
    }

    #[instrument(skip(self, mapping), fields(fields = ?mapping.field_names()))]
    async fn put_mapping(
        &self,
        index: &str,
        document_type: Option<&str>,
        mapping: &MappingSpec,
    ) -> Result<(), IndexAdminError> {
        let body = mapping.to_json();

        // Typed mappings predate the typeless endpoint and have no builder in the client.
        let result = match document_type {
            Some(document_type) => {
                let path = typed_mapping_path(index, document_type)?;
                self.client
                    .send::<JsonBody<Value>, ()>(
                        Method::Put,
                        &path,
                        HeaderMap::new(),
                        None,
                        Some(JsonBody::new(body)),
                        None,
                    )
                    .await
            }
            None => {
                self.client
                    .indices()
                    .put_mapping(IndicesPutMappingParts::Index(&[index]))
                    .body(body)
                    .send()
                    .await
            }
        };

        let response = result.map_err(|e| IndexAdminError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let (_, message) = Self::failure_message("Put mapping", response).await;
            return Err(IndexAdminError::mapping(message));
        }

        debug!(index = %index, "Mapping applied");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_mapping(&self, index: &str) -> Result<MappingSpec, IndexAdminError> {
        let response = self
            .client
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| IndexAdminError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(IndexAdminError::index_not_found(index));
        }
        if !status.is_success() {
            let (_, message) = Self::failure_message("Get mapping", response).await;
            return Err(IndexAdminError::unknown(message));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IndexAdminError::parse(e.to_string()))?;

        mapping_from_body(index, &body)
    }

    #[instrument(skip(self))]
    async fn index_stats(&self, index: &str) -> Result<IndexStats, IndexAdminError> {
        let response = self
            .client
            .indices()
            .stats(IndicesStatsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| IndexAdminError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(IndexAdminError::index_not_found(index));
        }
        if !status.is_success() {
            let (_, message) = Self::failure_message("Stats", response).await;
            return Err(IndexAdminError::unknown(message));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IndexAdminError::parse(e.to_string()))?;

        IndexStats::from_stats_body(&body)
    }
}

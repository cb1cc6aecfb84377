//! Provisioner settings loaded from environment variables.

use std::env;
use std::time::Duration;

use index_provisioner_repository::config::{DEFAULT_PORT, DEFAULT_REGION, DEFAULT_SERVICE_NAME};
use index_provisioner_repository::opensearch::INDEX_NAME;
use index_provisioner_repository::{ConnectionConfig, CredentialSource, IndexConfig};

use crate::ProvisionError;

/// Everything the provisioner needs to know before it sends a request.
#[derive(Debug, Clone)]
pub struct ProvisionerSettings {
    /// How to reach and authenticate against the search service.
    pub connection: ConnectionConfig,
    /// Which index to provision.
    pub index: IndexConfig,
}

impl ProvisionerSettings {
    /// Load settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_HOST`: service endpoint host (required)
    /// - `OPENSEARCH_PORT`: port (default: 443)
    /// - `OPENSEARCH_USE_TLS`: use https (default: true)
    /// - `OPENSEARCH_VERIFY_CERTS`: validate certificates (default: true)
    /// - `OPENSEARCH_AUTH`: `sigv4` or `none` (default: sigv4)
    /// - `OPENSEARCH_TIMEOUT_SECS`: per-request timeout (default: transport default)
    /// - `AWS_REGION`: signing region (default: us-east-2)
    /// - `AWS_SERVICE_NAME`: signing service (default: es)
    /// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`:
    ///   static credentials; when unset the default provider chain is used
    /// - `INDEX_NAME`: target index (default: movies)
    /// - `DOCUMENT_TYPE`: legacy mapping type label (default: none)
    pub fn from_env() -> Result<Self, ProvisionError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProvisionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("OPENSEARCH_HOST")
            .ok_or_else(|| ProvisionError::config("OPENSEARCH_HOST is required"))?;

        let port = match get("OPENSEARCH_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                ProvisionError::config(format!("OPENSEARCH_PORT is not a valid port: {}", raw))
            })?,
            None => DEFAULT_PORT,
        };

        let use_tls = parse_bool("OPENSEARCH_USE_TLS", get("OPENSEARCH_USE_TLS"), true)?;
        let verify_certs =
            parse_bool("OPENSEARCH_VERIFY_CERTS", get("OPENSEARCH_VERIFY_CERTS"), true)?;

        let credentials = match get("OPENSEARCH_AUTH").as_deref().map(str::to_ascii_lowercase) {
            None => static_or_default_chain(&get)?,
            Some(mode) if mode == "sigv4" => static_or_default_chain(&get)?,
            Some(mode) if mode == "none" => CredentialSource::Anonymous,
            Some(mode) => {
                return Err(ProvisionError::config(format!(
                    "OPENSEARCH_AUTH must be 'sigv4' or 'none', got '{}'",
                    mode
                )))
            }
        };

        let mut connection = ConnectionConfig::new(host)
            .with_port(port)
            .with_tls(use_tls)
            .with_verify_certs(verify_certs)
            .with_region(get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()))
            .with_service_name(
                get("AWS_SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            )
            .with_credentials(credentials);

        if let Some(raw) = get("OPENSEARCH_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                ProvisionError::config(format!(
                    "OPENSEARCH_TIMEOUT_SECS must be a positive integer: {}",
                    raw
                ))
            })?;
            connection = connection.with_request_timeout(Duration::from_secs(secs));
        }

        let mut index = IndexConfig::new(get("INDEX_NAME").unwrap_or_else(|| INDEX_NAME.to_string()));
        if let Some(document_type) = get("DOCUMENT_TYPE") {
            index = index.with_document_type(document_type);
        }

        Ok(Self { connection, index })
    }

    /// Override the target index name.
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index.name = name.into();
        self
    }

    /// Override the legacy document type label.
    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.index.document_type = Some(document_type.into());
        self
    }
}

fn static_or_default_chain<G>(get: &G) -> Result<CredentialSource, ProvisionError>
where
    G: Fn(&str) -> Option<String>,
{
    match (get("AWS_ACCESS_KEY_ID"), get("AWS_SECRET_ACCESS_KEY")) {
        (Some(access_key_id), Some(secret_access_key)) => Ok(CredentialSource::Static {
            access_key_id,
            secret_access_key,
            session_token: get("AWS_SESSION_TOKEN"),
        }),
        (None, None) => Ok(CredentialSource::DefaultChain),
        _ => Err(ProvisionError::config(
            "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together",
        )),
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool, ProvisionError> {
    let Some(raw) = value else {
        return Ok(default);
    };

    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ProvisionError::config(format!(
            "{} must be a boolean, got '{}'",
            key, raw
        ))),
    }
}

//! Connection configuration for the search service.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::errors::IndexAdminError;

/// Default HTTPS port for managed search endpoints.
pub const DEFAULT_PORT: u16 = 443;

/// Default AWS region used to sign requests.
pub const DEFAULT_REGION: &str = "us-east-2";

/// Default AWS service name used to sign requests.
pub const DEFAULT_SERVICE_NAME: &str = "es";

/// Where request-signing credentials come from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Explicit access key and secret.
    Static {
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    },
    /// The AWS SDK default provider chain (environment, profile, instance role).
    DefaultChain,
    /// No request signing. For local or proxy-fronted clusters.
    Anonymous,
}

impl CredentialSource {
    /// Static credentials without a session token.
    pub fn static_keys(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self::Static {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Whether requests are signed with SigV4.
    pub fn signs_requests(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static {
                access_key_id,
                session_token,
                ..
            } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .field("session_token", &session_token.as_ref().map(|_| "<redacted>"))
                .finish(),
            Self::DefaultChain => f.write_str("DefaultChain"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Configuration for connecting to the search service.
///
/// Immutable once built; read once when the client is created.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Endpoint host, without scheme or port.
    pub host: String,
    /// Endpoint port.
    pub port: u16,
    /// Use HTTPS.
    pub use_tls: bool,
    /// Validate the server certificate chain.
    pub verify_certs: bool,
    /// AWS region for SigV4 signing.
    pub region: String,
    /// AWS service name for SigV4 signing (`es` for managed Elasticsearch/OpenSearch).
    pub service_name: String,
    /// Signing credentials.
    pub credentials: CredentialSource,
    /// Per-request timeout. `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
}

impl ConnectionConfig {
    /// Create a config for the given host with managed-service defaults:
    /// port 443, TLS with certificate verification, and SigV4 signing through
    /// the default credential chain.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            use_tls: true,
            verify_certs: true,
            region: DEFAULT_REGION.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            credentials: CredentialSource::DefaultChain,
            request_timeout: None,
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable TLS.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Enable or disable certificate verification.
    pub fn with_verify_certs(mut self, verify_certs: bool) -> Self {
        self.verify_certs = verify_certs;
        self
    }

    /// Set the signing region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the signing service name.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    /// Set the credential source.
    pub fn with_credentials(mut self, credentials: CredentialSource) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set a per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// The base URL of the service endpoint.
    pub fn url(&self) -> Result<Url, IndexAdminError> {
        if self.host.trim().is_empty() {
            return Err(IndexAdminError::validation("host must not be empty"));
        }

        let scheme = if self.use_tls { "https" } else { "http" };
        Url::parse(&format!("{}://{}:{}", scheme, self.host, self.port))
            .map_err(|e| IndexAdminError::validation(format!("Invalid endpoint: {}", e)))
    }
}

//! AWS SigV4 request signing credentials.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::SharedCredentialsProvider;
use opensearch::auth::Credentials;
use tracing::debug;

use crate::config::{ConnectionConfig, CredentialSource};
use crate::errors::IndexAdminError;

/// Provider name reported by static credentials.
const STATIC_PROVIDER_NAME: &str = "index-provisioner-static";

/// Resolve the transport credentials for a connection.
///
/// Returns `None` for anonymous connections. Otherwise returns SigV4
/// credentials bound to the configured region.
pub(crate) async fn resolve_credentials(
    config: &ConnectionConfig,
) -> Result<Option<Credentials>, IndexAdminError> {
    let region = Region::new(config.region.clone());

    let provider = match &config.credentials {
        CredentialSource::Anonymous => {
            debug!("Request signing disabled");
            return Ok(None);
        }
        CredentialSource::Static {
            access_key_id,
            secret_access_key,
            session_token,
        } => {
            debug!(access_key_id = %access_key_id, "Using static AWS credentials");
            SharedCredentialsProvider::new(aws_credential_types::Credentials::new(
                access_key_id.clone(),
                secret_access_key.clone(),
                session_token.clone(),
                None,
                STATIC_PROVIDER_NAME,
            ))
        }
        CredentialSource::DefaultChain => {
            debug!("Resolving AWS credentials from the default provider chain");
            let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                .region(region.clone())
                .load()
                .await;
            sdk_config.credentials_provider().ok_or_else(|| {
                IndexAdminError::connection("No AWS credentials provider available")
            })?
        }
    };

    Ok(Some(Credentials::AwsSigV4(provider, region)))
}

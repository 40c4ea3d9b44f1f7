//! HTTP client for the VMC validation service.

use std::future::Future;
use std::sync::Arc;

use url::Url;

use super::schema::parse_response;
use super::types::VmcValidationResult;
use crate::config::{API_KEY_HEADER, VALIDATOR_PATH};
use crate::error_handling::{InitializationError, VerificationError};

/// Source of VMC validation results.
///
/// One call is one request to the service; retry policy lives in
/// [`crate::retry`].
pub trait VmcValidator: Send + Sync {
    fn validate(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<VmcValidationResult, VerificationError>> + Send;
}

/// `GET <base>/validate?domain=<domain>` with an `X-API-Key` header.
#[derive(Debug, Clone)]
pub struct VmcClient {
    client: Arc<reqwest::Client>,
    endpoint: Url,
    api_key: String,
}

impl VmcClient {
    /// Builds a client for the service rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::EndpointError` if the endpoint URL
    /// cannot be derived from `base_url`.
    pub fn new(
        client: Arc<reqwest::Client>,
        base_url: &Url,
        api_key: impl Into<String>,
    ) -> Result<Self, InitializationError> {
        // Url::join replaces the last path segment unless the base ends in '/'
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(VALIDATOR_PATH)?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// The validation endpoint, without query string.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, domain: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().clear().append_pair("domain", domain);
        url
    }
}

impl VmcValidator for VmcClient {
    async fn validate(&self, domain: &str) -> Result<VmcValidationResult, VerificationError> {
        let url = self.request_url(domain);
        log::debug!("Requesting VMC validation for {domain}");

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("VMC validator returned {status} for {domain}");
            return Err(VerificationError::ValidationServiceError {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let result = parse_response(domain, &body).inspect_err(|e| {
            log::warn!("Rejected VMC validator response for {domain}: {e}");
        })?;
        log::debug!(
            "VMC validation for {domain}: {:?} (revocation_ok={:?})",
            result.status,
            result.revocation_ok
        );
        Ok(result)
    }
}

//! Delegated REST provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use relay_core::config::{RestAuthConfig, RestAuthMode};
use relay_core::error::{AppError, ErrorKind};
use relay_core::result::AppResult;

use super::credentials::PeerCredentials;
use super::table::PeerTable;
use super::{AuthDecision, AuthorizationProvider};
use crate::context::{HandshakeContext, PeerDescriptor};

/// Scheme name of the delegated REST provider.
pub const REST_SCHEME: &str = "rest";

/// Forwards `peerId:secret` to a remote endpoint after consulting a local
/// override table.
///
/// Only a `200` whose body is a peer descriptor authorizes. Any other
/// status, a transport error, or an unparsable body denies without retry.
#[derive(Debug)]
pub struct RestProvider {
    client: reqwest::Client,
    endpoint: String,
    mode: RestAuthMode,
    peer_id_field: String,
    peer_key_field: String,
    overrides: PeerTable,
}

impl RestProvider {
    /// Creates the provider from the `auth.rest` section.
    pub fn from_config(config: &RestAuthConfig) -> AppResult<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(AppError::configuration("auth.rest.endpoint is empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("tenant-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build authorization HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            mode: config.mode,
            peer_id_field: config.peer_id_field.clone(),
            peer_key_field: config.peer_key_field.clone(),
            overrides: PeerTable::new(config.peers.iter().cloned()),
        })
    }

    /// The local override table.
    pub fn overrides(&self) -> &PeerTable {
        &self.overrides
    }

    async fn call_out(&self, creds: &PeerCredentials, tenant: &str) -> AuthDecision {
        let request = self.client.post(&self.endpoint).header(ACCEPT, "application/json");
        let request = match self.mode {
            RestAuthMode::Basic => request.basic_auth(&creds.peer_id, Some(&creds.secret)),
            RestAuthMode::Form => request.form(&[
                (self.peer_id_field.as_str(), creds.peer_id.as_str()),
                (self.peer_key_field.as_str(), creds.secret.as_str()),
            ]),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(peer_id = %creds.peer_id, endpoint = %self.endpoint, error = %e, "Authorization endpoint unreachable");
                return AuthDecision::deny("authorization endpoint unreachable");
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!(peer_id = %creds.peer_id, status = %status, "Authorization endpoint refused peer");
            return AuthDecision::deny(format!("authorization endpoint returned {status}"));
        }

        let mut descriptor = match response.json::<PeerDescriptor>().await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(peer_id = %creds.peer_id, error = %e, "Malformed authorization response");
                return AuthDecision::deny("malformed authorization response");
            }
        };

        if descriptor.tenant.is_empty() {
            descriptor.tenant = tenant.to_string();
        } else if descriptor.tenant != tenant {
            return AuthDecision::deny(format!(
                "peer '{}' does not belong to tenant '{tenant}'",
                creds.peer_id
            ));
        }
        descriptor.id = creds.peer_id.clone();

        AuthDecision::Allow(descriptor)
    }
}

#[async_trait]
impl AuthorizationProvider for RestProvider {
    fn name(&self) -> &str {
        REST_SCHEME
    }

    async fn authorize(&self, ctx: &HandshakeContext) -> AuthDecision {
        let Some(creds) = ctx.token().and_then(PeerCredentials::parse) else {
            return AuthDecision::deny("missing or malformed token");
        };
        let tenant = ctx.tenant().unwrap_or_default();

        if let Some(decision) = self.overrides.verify(&creds, tenant) {
            debug!(peer_id = %creds.peer_id, allowed = decision.is_allowed(), "Matched local override");
            return decision;
        }

        self.call_out(&creds, tenant).await
    }
}

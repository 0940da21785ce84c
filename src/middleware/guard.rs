// Pre-request guard
// Decides, before a request leaves the process, whether it already carries
// sufficient credentials

use async_trait::async_trait;
use reqwest::{Request, Response};
use std::sync::Arc;

use super::{attach_bearer, Interceptor, Next};
use crate::auth::{CredentialStore, IdentityApi, LogoutHandler};
use crate::endpoints::EndpointClassifier;
use crate::error::{AuthError, Result};

/// Interceptor A.
///
/// Public endpoints pass through untouched; they must never trigger
/// session checks or token attachment (the session-check call is itself
/// routed through this pipeline). A cached token is attached without
/// re-verification; its staleness is discovered reactively by the recovery
/// stage. With no token cached, the guard drives the verify-then-issue
/// sequence before letting the request out, or drops it.
pub struct AuthGuard {
    store: CredentialStore,
    identity: Arc<dyn IdentityApi>,
    classifier: Arc<EndpointClassifier>,
    logout: LogoutHandler,
}

impl AuthGuard {
    pub fn new(
        store: CredentialStore,
        identity: Arc<dyn IdentityApi>,
        classifier: Arc<EndpointClassifier>,
        logout: LogoutHandler,
    ) -> Self {
        Self {
            store,
            identity,
            classifier,
            logout,
        }
    }
}

#[async_trait]
impl Interceptor for AuthGuard {
    async fn handle(&self, mut request: Request, next: Next<'_>) -> Result<Response> {
        let url = request.url().to_string();

        if self.classifier.is_public(&url) {
            tracing::debug!(url = %url, "Public endpoint, forwarding unmodified");
            return next.run(request).await;
        }

        if let Some(token) = self.store.token().await {
            // A cached token is sufficient to attempt the request
            attach_bearer(&mut request, &token)?;
            return next.run(request).await;
        }

        // No token cached: verify the session before the request leaves
        match self.identity.check_session().await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(url = %url, "Session invalid, request dropped");
                self.store.clear().await;
                self.logout.logout().await;
                return Err(AuthError::Unauthenticated);
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Session check failed");
                self.logout.logout().await;
                return Err(e);
            }
        }

        match self.identity.issue_token().await {
            Ok(token) => {
                self.store.set_token(token.clone()).await;
                attach_bearer(&mut request, &token)?;
                next.run(request).await
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Preflight token issuance failed");
                self.logout.logout().await;
                Err(e)
            }
        }
    }
}

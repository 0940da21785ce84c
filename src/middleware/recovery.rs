// Post-response recovery
// Recovers from authorization failures without burdening call sites with
// retry logic

use async_trait::async_trait;
use reqwest::{Request, Response, StatusCode};
use std::sync::Arc;

use super::{attach_bearer, Interceptor, Next};
use crate::auth::{LogoutHandler, NotificationSink, RefreshCoordinator};
use crate::endpoints::EndpointClassifier;
use crate::error::{AuthError, Result};

const SESSION_EXPIRED_TITLE: &str = "Not authorized";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Interceptor B.
///
/// A 401/403 from a protected endpoint triggers one single-flight refresh
/// and one resubmission of the original request with the new token. A
/// second authorization failure on the retried request is terminal.
/// Everything else - other statuses, transport errors, no-retry endpoints,
/// requests whose body cannot be cloned - passes through untouched.
pub struct Recovery {
    coordinator: RefreshCoordinator,
    classifier: Arc<EndpointClassifier>,
    logout: LogoutHandler,
    notifier: Arc<dyn NotificationSink>,
}

impl Recovery {
    pub fn new(
        coordinator: RefreshCoordinator,
        classifier: Arc<EndpointClassifier>,
        logout: LogoutHandler,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            coordinator,
            classifier,
            logout,
            notifier,
        }
    }
}

fn is_authorization_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[async_trait]
impl Interceptor for Recovery {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response> {
        let url = request.url().to_string();

        // Taken before the body is consumed; None for streaming bodies
        let reissue = request.try_clone();

        let response = next.run(request).await?;
        let status = response.status();

        if !is_authorization_failure(status) {
            return Ok(response);
        }

        if self.classifier.should_not_retry(&url) {
            tracing::debug!(
                url = %url,
                status = status.as_u16(),
                "Authorization failure on a no-retry endpoint, passing through"
            );
            return Ok(response);
        }

        let Some(mut retry) = reissue else {
            tracing::debug!(url = %url, "Request body is not cloneable, cannot recover");
            return Ok(response);
        };

        tracing::warn!(
            url = %url,
            status = status.as_u16(),
            "Authorization failure, refreshing token"
        );

        match self.coordinator.refresh().await {
            Ok(token) => {
                attach_bearer(&mut retry, &token)?;
                let retried = next.run(retry).await?;
                let retried_status = retried.status();

                if is_authorization_failure(retried_status) {
                    tracing::error!(
                        url = %url,
                        status = retried_status.as_u16(),
                        "Authorization failed again after refresh"
                    );
                    return Err(AuthError::AuthorizationFailed {
                        status: retried_status.as_u16(),
                    });
                }

                Ok(retried)
            }
            Err(e) => {
                // The refresh failure is the more actionable cause; it wins
                // over the original 401/403
                self.notifier
                    .notify(SESSION_EXPIRED_TITLE, SESSION_EXPIRED_MESSAGE);
                self.logout.logout().await;
                Err(e)
            }
        }
    }
}

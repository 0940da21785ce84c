use anyhow::{Context, Result};
use reqwest::{Client, Request, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{
    CredentialStore, HttpIdentityClient, IdentityApi, LogNavigator, LogNotifier, LogoutHandler,
    NavigationSink, NotificationSink, RefreshCoordinator,
};
use crate::config::AuthConfig;
use crate::endpoints::EndpointClassifier;
use crate::error::AuthError;
use crate::middleware::{AuthGuard, HttpTransport, Pipeline, Recovery};

/// Authenticated HTTP client for the console API.
///
/// Wires the credential store, identity client, refresh coordinator, and
/// the two interceptors around one pooled `reqwest::Client`. Every request
/// handed to [`execute`](Self::execute) passes through the pipeline:
/// pre-request guard, transport, post-response recovery.
pub struct AuthHttpClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Guard -> recovery -> transport
    pipeline: Pipeline,

    /// Shared token state, exposed for application login/logout flows
    store: CredentialStore,

    /// Session teardown choke point
    logout: LogoutHandler,
}

impl AuthHttpClient {
    /// Create a client with explicit notification and navigation sinks.
    pub fn new(
        config: AuthConfig,
        notifier: Arc<dyn NotificationSink>,
        navigator: Arc<dyn NavigationSink>,
    ) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.http_connect_timeout))
            .timeout(Duration::from_secs(config.http_request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        let store = CredentialStore::new();
        let identity: Arc<dyn IdentityApi> = Arc::new(HttpIdentityClient::new(
            client.clone(),
            config.session_check_url(),
            config.token_issuance_url(),
        ));
        let classifier = Arc::new(EndpointClassifier::new(
            config.public_endpoints.clone(),
            config.no_retry_endpoints.clone(),
        ));
        let logout = LogoutHandler::new(store.clone(), navigator);
        let coordinator = RefreshCoordinator::new(store.clone(), identity.clone());

        let guard = AuthGuard::new(
            store.clone(),
            identity,
            classifier.clone(),
            logout.clone(),
        );
        let recovery = Recovery::new(coordinator, classifier, logout.clone(), notifier);

        let pipeline = Pipeline::new(Arc::new(HttpTransport::new(client.clone())))
            .stage(Arc::new(guard))
            .stage(Arc::new(recovery));

        Ok(Self {
            client,
            pipeline,
            store,
            logout,
        })
    }

    /// Create a client whose sinks only log; suitable for headless use.
    pub fn with_logging_sinks(config: AuthConfig) -> Result<Self> {
        let navigator = Arc::new(LogNavigator::new(config.login_route.clone()));
        Self::new(config, Arc::new(LogNotifier), navigator)
    }

    /// Carry a request through the authentication pipeline.
    pub async fn execute(&self, request: Request) -> std::result::Result<Response, AuthError> {
        let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        let method = request.method().clone();
        let url = request.url().clone();

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            url = %url,
            "Dispatching request"
        );

        let result = self.pipeline.execute(request).await;

        match &result {
            Ok(response) => {
                tracing::debug!(
                    request_id = %request_id,
                    status = response.status().as_u16(),
                    "Request completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    error = %e,
                    "Request failed"
                );
            }
        }

        result
    }

    /// Build a request on the underlying pooled client, then pass it to
    /// [`execute`](Self::execute).
    pub fn request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Get the underlying HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Shared credential state. Application login flows store the token
    /// they obtained here; the pipeline picks it up on the next request.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Explicitly end the session: clear credentials and navigate to login.
    pub async fn sign_out(&self) {
        self.logout.logout().await;
    }
}

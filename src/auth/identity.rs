// Identity provider boundary
// The two calls this core makes on its own behalf: session verification
// and token issuance

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::AuthError;

/// Token issuance response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

/// The slice of the identity provider this pipeline consumes.
///
/// Injectable so the guard and the refresh coordinator can be exercised
/// against deterministic implementations in tests.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Ask the identity provider whether the current session is valid.
    ///
    /// A transport failure or non-success status is an error of the check
    /// itself, distinct from a definitive "not authenticated".
    async fn check_session(&self) -> Result<bool, AuthError>;

    /// Exchange the current session for a fresh bearer token.
    async fn issue_token(&self) -> Result<String, AuthError>;
}

/// `reqwest`-backed identity client targeting the configured endpoints.
pub struct HttpIdentityClient {
    client: Client,
    session_check_url: String,
    token_issuance_url: String,
}

impl HttpIdentityClient {
    pub fn new(client: Client, session_check_url: String, token_issuance_url: String) -> Self {
        Self {
            client,
            session_check_url,
            token_issuance_url,
        }
    }
}

#[async_trait]
impl IdentityApi for HttpIdentityClient {
    async fn check_session(&self) -> Result<bool, AuthError> {
        tracing::debug!(url = %self.session_check_url, "Verifying session");

        let response = self
            .client
            .get(&self.session_check_url)
            .send()
            .await
            .map_err(AuthError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                message = %message,
                "Session check endpoint returned an error"
            );
            return Err(AuthError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        // The endpoint conveys a bare JSON boolean; anything else that came
        // back with a success status counts as "not authenticated"
        let body = response.text().await.map_err(AuthError::transport)?;
        let authenticated = serde_json::from_str::<bool>(body.trim()).unwrap_or(false);

        tracing::debug!(authenticated, "Session check completed");
        Ok(authenticated)
    }

    async fn issue_token(&self) -> Result<String, AuthError> {
        tracing::debug!(url = %self.token_issuance_url, "Requesting authorization token");

        let response = self
            .client
            .get(&self.token_issuance_url)
            .send()
            .await
            .map_err(|e| AuthError::IssuanceFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                message = %message,
                "Token issuance failed"
            );
            return Err(AuthError::IssuanceFailed(format!(
                "{} - {}",
                status.as_u16(),
                message
            )));
        }

        let data: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::IssuanceFailed(format!("malformed response: {}", e)))?;

        if data.access_token.is_empty() {
            return Err(AuthError::IssuanceFailed(
                "response does not contain accessToken".to_string(),
            ));
        }

        tracing::info!("Authorization token issued");
        Ok(data.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_session_parses_bare_boolean() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/account/check-authentication")
            .with_status(200)
            .with_body("true")
            .create_async()
            .await;

        let identity = HttpIdentityClient::new(
            Client::new(),
            format!("{}/api/account/check-authentication", server.url()),
            format!("{}/api/account/authorization-token", server.url()),
        );

        assert_eq!(identity.check_session().await, Ok(true));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_check_session_treats_non_boolean_as_unauthenticated() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/account/check-authentication")
            .with_status(200)
            .with_body(r#"{"unexpected": "shape"}"#)
            .create_async()
            .await;

        let identity = HttpIdentityClient::new(
            Client::new(),
            format!("{}/api/account/check-authentication", server.url()),
            format!("{}/api/account/authorization-token", server.url()),
        );

        assert_eq!(identity.check_session().await, Ok(false));
    }

    #[tokio::test]
    async fn test_check_session_server_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/account/check-authentication")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let identity = HttpIdentityClient::new(
            Client::new(),
            format!("{}/api/account/check-authentication", server.url()),
            format!("{}/api/account/authorization-token", server.url()),
        );

        assert_eq!(
            identity.check_session().await,
            Err(AuthError::Upstream {
                status: 500,
                message: "boom".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_issue_token_returns_access_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/account/authorization-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accessToken": "tok-1"}"#)
            .create_async()
            .await;

        let identity = HttpIdentityClient::new(
            Client::new(),
            format!("{}/api/account/check-authentication", server.url()),
            format!("{}/api/account/authorization-token", server.url()),
        );

        assert_eq!(identity.issue_token().await, Ok("tok-1".to_string()));
    }

    #[tokio::test]
    async fn test_issue_token_rejects_empty_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/account/authorization-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accessToken": ""}"#)
            .create_async()
            .await;

        let identity = HttpIdentityClient::new(
            Client::new(),
            format!("{}/api/account/check-authentication", server.url()),
            format!("{}/api/account/authorization-token", server.url()),
        );

        assert!(matches!(
            identity.issue_token().await,
            Err(AuthError::IssuanceFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_issue_token_failure_status_is_issuance_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/account/authorization-token")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let identity = HttpIdentityClient::new(
            Client::new(),
            format!("{}/api/account/check-authentication", server.url()),
            format!("{}/api/account/authorization-token", server.url()),
        );

        assert!(matches!(
            identity.issue_token().await,
            Err(AuthError::IssuanceFailed(_))
        ));
    }
}

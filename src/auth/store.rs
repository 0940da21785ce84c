use std::sync::Arc;
use tokio::sync::RwLock;

/// Credential state shared by the guard, the recovery interceptor, and the
/// refresh coordinator.
///
/// `is_authenticated` is the cached belief from the most recent session
/// check; the token may be present while the flag is still false, so
/// callers must not derive one field from the other. `signed_out` latches
/// after a sign-out so the navigation side effect fires once per session,
/// and re-arms when a new token is stored.
#[derive(Debug, Default)]
struct Credential {
    access_token: Option<String>,
    is_authenticated: bool,
    signed_out: bool,
}

/// Single source of truth for "do we currently believe we have a valid
/// token". Created empty at process start; the only writer of token state.
///
/// One lock over all fields keeps every write atomic from the caller's
/// point of view. This component never calls the network.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    credential: Arc<RwLock<Credential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bearer token, if any. Non-blocking read.
    pub async fn token(&self) -> Option<String> {
        self.credential.read().await.access_token.clone()
    }

    /// Cached belief about session validity.
    pub async fn is_authenticated(&self) -> bool {
        self.credential.read().await.is_authenticated
    }

    /// Store a freshly issued token and mark the session authenticated.
    /// No validation of the token's contents.
    pub async fn set_token(&self, token: String) {
        let mut credential = self.credential.write().await;
        credential.access_token = Some(token);
        credential.is_authenticated = true;
        credential.signed_out = false;
    }

    /// Drop the token and mark the session unauthenticated.
    pub async fn clear(&self) {
        let mut credential = self.credential.write().await;
        credential.access_token = None;
        credential.is_authenticated = false;
    }

    /// Clear credentials and latch the signed-out state. Returns true on
    /// the transition into signed-out, false if already signed out.
    pub async fn begin_sign_out(&self) -> bool {
        let mut credential = self.credential.write().await;
        credential.access_token = None;
        credential.is_authenticated = false;

        let first = !credential.signed_out;
        credential.signed_out = true;
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_starts_empty() {
        let store = CredentialStore::new();
        assert_eq!(store.token().await, None);
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_set_token_marks_authenticated() {
        let store = CredentialStore::new();
        store.set_token("abc123".to_string()).await;

        assert_eq!(store.token().await, Some("abc123".to_string()));
        assert!(store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_clear_drops_both_fields() {
        let store = CredentialStore::new();
        store.set_token("abc123".to_string()).await;
        store.clear().await;

        assert_eq!(store.token().await, None);
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_sign_out_latches_until_next_token() {
        let store = CredentialStore::new();
        store.set_token("abc123".to_string()).await;

        assert!(store.begin_sign_out().await);
        assert_eq!(store.token().await, None);

        // Latched: a second sign-out is not a transition
        assert!(!store.begin_sign_out().await);

        // A new token re-arms the latch
        store.set_token("def456".to_string()).await;
        assert!(store.begin_sign_out().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = CredentialStore::new();
        let view = store.clone();

        store.set_token("shared".to_string()).await;
        assert_eq!(view.token().await, Some("shared".to_string()));
    }
}

// Single-flight token refresh
// Turns N concurrent "please refresh" calls into exactly one upstream call

use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use super::identity::IdentityApi;
use super::store::CredentialStore;
use crate::error::AuthError;

/// Coordinator state. Exactly one `InFlight` may exist at a time; most
/// identity providers invalidate prior refresh tokens on each use, so a
/// second concurrent upstream call would fail and cascade into logouts.
enum RefreshState {
    Idle,
    InFlight(broadcast::Sender<Result<String, AuthError>>),
}

struct Inner {
    store: CredentialStore,
    identity: Arc<dyn IdentityApi>,
    state: Mutex<RefreshState>,
}

/// Single-flight refresh coordinator.
///
/// The first caller transitions `Idle -> InFlight` and spawns the upstream
/// issuance call; every caller that arrives while the call is pending
/// subscribes to the same completion. The upstream call runs on a detached
/// task, so a caller that drops its future does not cancel the call for
/// the waiters that remain. Results are broadcast once and never cached:
/// the next call after completion starts a fresh attempt.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(store: CredentialStore, identity: Arc<dyn IdentityApi>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                identity,
                state: Mutex::new(RefreshState::Idle),
            }),
        }
    }

    /// Obtain a refreshed token, joining the in-flight refresh if one is
    /// already pending. On success the token is stored before any waiter
    /// observes it; on failure the store is cleared and every waiter
    /// receives the same `RefreshFailed`.
    pub async fn refresh(&self) -> Result<String, AuthError> {
        let mut rx = {
            let mut state = self.inner.state.lock().await;
            match &*state {
                RefreshState::InFlight(tx) => {
                    tracing::debug!("Refresh already in flight, subscribing to its result");
                    tx.subscribe()
                }
                RefreshState::Idle => {
                    // Only one result is ever sent per flight
                    let (tx, rx) = broadcast::channel(1);
                    *state = RefreshState::InFlight(tx.clone());

                    let inner = Arc::clone(&self.inner);
                    tokio::spawn(async move {
                        inner.drive(tx).await;
                    });

                    rx
                }
            }
        };

        match rx.recv().await {
            Ok(result) => result,
            Err(_) => Err(AuthError::RefreshFailed(
                "refresh task ended without a result".to_string(),
            )),
        }
    }
}

impl Inner {
    async fn drive(&self, tx: broadcast::Sender<Result<String, AuthError>>) {
        tracing::info!("Starting token refresh");

        let result = match self.identity.issue_token().await {
            Ok(token) => {
                // Store before broadcasting so callers resolved after this
                // one see the updated state immediately
                self.store.set_token(token.clone()).await;
                tracing::info!("Token refresh succeeded");
                Ok(token)
            }
            Err(e) => {
                self.store.clear().await;
                tracing::error!(error = %e, "Token refresh failed");
                Err(AuthError::RefreshFailed(e.to_string()))
            }
        };

        // Return to Idle before broadcasting, under the same lock a new
        // caller would take: a caller arriving after completion must start
        // a fresh attempt, not subscribe to a finished channel.
        let mut state = self.state.lock().await;
        *state = RefreshState::Idle;
        let _ = tx.send(result);
    }
}

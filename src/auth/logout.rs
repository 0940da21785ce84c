// Session teardown
// The single choke point through which the pipeline gives up on a session

use std::sync::Arc;

use super::store::CredentialStore;

/// Fire-and-forget user notification, used only when a refresh fails.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Fire-and-forget navigation to the login surface.
pub trait NavigationSink: Send + Sync {
    fn navigate_to_login(&self);
}

/// Default notification sink for headless deployments: logs the message.
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        tracing::warn!(title, message, "User notification");
    }
}

/// Default navigation sink for headless deployments: logs the redirect.
pub struct LogNavigator {
    login_route: String,
}

impl LogNavigator {
    pub fn new(login_route: String) -> Self {
        Self { login_route }
    }
}

impl NavigationSink for LogNavigator {
    fn navigate_to_login(&self) {
        tracing::info!(route = %self.login_route, "Navigating to login");
    }
}

/// Clears credentials, then navigates to the login entry point.
///
/// Idempotent: the navigation fires once per sign-out; storing a new token
/// re-arms it. Clearing an already-empty store is a no-op.
#[derive(Clone)]
pub struct LogoutHandler {
    store: CredentialStore,
    navigator: Arc<dyn NavigationSink>,
}

impl LogoutHandler {
    pub fn new(store: CredentialStore, navigator: Arc<dyn NavigationSink>) -> Self {
        Self { store, navigator }
    }

    pub async fn logout(&self) {
        if self.store.begin_sign_out().await {
            tracing::info!("Session ended");
            self.navigator.navigate_to_login();
        } else {
            tracing::debug!("Already signed out, navigation suppressed");
        }
    }
}

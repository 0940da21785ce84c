// Authentication module
// Token state, identity endpoints, single-flight refresh, session teardown

mod identity;
mod logout;
mod refresh;
mod store;

pub use identity::{HttpIdentityClient, IdentityApi, TokenResponse};
pub use logout::{LogNavigator, LogNotifier, LogoutHandler, NavigationSink, NotificationSink};
pub use refresh::RefreshCoordinator;
pub use store::CredentialStore;

// console-auth - Authenticated request pipeline for the admin console

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http_client;
pub mod middleware;

pub use config::AuthConfig;
pub use error::AuthError;
pub use http_client::AuthHttpClient;

// Request pipeline
// An ordered chain of (request, next) stages in front of one transport

pub mod guard;
pub mod recovery;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Response};
use std::sync::Arc;

use crate::error::{AuthError, Result};

pub use guard::AuthGuard;
pub use recovery::Recovery;

/// Terminal stage of the pipeline: puts a request on the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        self.client
            .execute(request)
            .await
            .map_err(AuthError::transport)
    }
}

/// One stage of the pipeline. A stage may forward the request via `next`,
/// rewrite it first, short-circuit with an error, or run `next` again with
/// a reissued request.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response>;
}

/// The remainder of the pipeline from a stage's point of view. `Copy`, so
/// a stage can invoke it more than once (the recovery stage resubmits the
/// original request after a refresh).
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn Interceptor>],
    transport: &'a dyn Transport,
}

impl Next<'_> {
    pub async fn run(self, request: Request) -> Result<Response> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let next = Next {
                    stages: rest,
                    transport: self.transport,
                };
                stage.handle(request, next).await
            }
            None => self.transport.send(request).await,
        }
    }
}

/// Ordered pipeline of stages in front of a transport. Stages run in
/// insertion order on the way out; the first stage sees the request first.
pub struct Pipeline {
    stages: Vec<Arc<dyn Interceptor>>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            stages: Vec::new(),
            transport,
        }
    }

    pub fn stage(mut self, stage: Arc<dyn Interceptor>) -> Self {
        self.stages.push(stage);
        self
    }

    pub async fn execute(&self, request: Request) -> Result<Response> {
        let next = Next {
            stages: &self.stages,
            transport: self.transport.as_ref(),
        };
        next.run(request).await
    }
}

/// Replace the Authorization header with a bearer token.
pub(crate) fn attach_bearer(request: &mut Request, token: &str) -> Result<()> {
    let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        AuthError::Transport("bearer token contains invalid header characters".to_string())
    })?;
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

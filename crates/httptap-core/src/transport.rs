//! The seam between the recorder and the network.

use async_trait::async_trait;
use reqwest::{Request, Response};

/// Anything that can carry out a single HTTP exchange.
///
/// Implementations own connection handling, TLS and retries; the recorder
/// only sees one request in and one response or error out.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn execute(&self, request: Request) -> reqwest::Result<Response> {
        reqwest::Client::execute(self, request).await
    }
}

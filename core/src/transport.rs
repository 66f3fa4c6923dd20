//! The seam between request building and the network.
//!
//! # Design
//! `Transport` executes one `HttpRequest`. Any HTTP status counts as a
//! response; only failures that produce no response at all are errors.
//! `PostSource` pairs a transport with a `PostClient` and is the single
//! "fetch all posts" operation the controller depends on.

use async_trait::async_trait;

use crate::client::PostClient;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::Post;

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Remote post source: build, execute, classify.
#[derive(Debug, Clone)]
pub struct PostSource<T> {
    client: PostClient,
    transport: T,
}

impl<T: Transport> PostSource<T> {
    pub fn new(client: PostClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PostClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn fetch_posts(&self) -> Result<Vec<Post>, ApiError> {
        let request = self.client.build_list_posts();
        tracing::debug!(method = request.method.as_str(), path = %request.path, "fetching posts");
        let response = self.transport.execute(request).await?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "posts response");
        self.client.parse_list_posts(response)
    }
}

#[cfg(feature = "http")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "http")]
mod reqwest_transport {
    use std::error::Error as _;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::Transport;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// `Transport` backed by a shared `reqwest::Client`.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        http: reqwest::Client,
    }

    impl ReqwestTransport {
        /// Uses reqwest's defaults, which impose no overall request timeout.
        pub fn new() -> Self {
            Self {
                http: reqwest::Client::new(),
            }
        }

        pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
            let http = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| TransportError::new(describe(&e)))?;
            Ok(Self { http })
        }

        pub fn from_client(http: reqwest::Client) -> Self {
            Self { http }
        }
    }

    impl Default for ReqwestTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
            };
            let mut builder = self.http.request(method, &request.path);
            for (key, value) in &request.headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| classify(&e))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
                .collect();
            let body = response.text().await.map_err(|e| classify(&e))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    /// Builder errors (bad URL, bad header) never touched the network.
    fn classify(err: &reqwest::Error) -> TransportError {
        if err.is_builder() {
            TransportError::invalid_request(describe(err))
        } else {
            TransportError::new(describe(err))
        }
    }

    /// reqwest's top-level message hides the root cause; append the chain.
    fn describe(err: &reqwest::Error) -> String {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

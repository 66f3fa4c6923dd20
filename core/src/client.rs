//! Stateless request builder and response classifier for the posts API.
//!
//! # Design
//! `PostClient` holds only a `base_url`. `build_list_posts` produces the
//! `HttpRequest`, `parse_list_posts` turns whatever came back into posts or
//! an `ApiError`. The network round trip happens elsewhere, so every
//! classification rule is testable with hand-built responses.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Post;

/// Public endpoint the mobile app talks to by default.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/";

#[derive(Debug, Clone)]
pub struct PostClient {
    base_url: String,
}

impl PostClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_posts(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/posts/", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Classify a `GET /posts/` response.
    ///
    /// An empty array is a valid result; an absent body (`null`, nothing at
    /// all, or a 204/205) is `ApiError::EmptyBody`.
    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        check_status(&response)?;
        if body_is_absent(&response) {
            return Err(ApiError::EmptyBody);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

impl Default for PostClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Map non-2xx status codes to `ApiError::Server`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Server {
        status: response.status,
        body: response.body.clone(),
    })
}

fn body_is_absent(response: &HttpResponse) -> bool {
    if matches!(response.status, 204 | 205) {
        return true;
    }
    let body = response.body.trim();
    body.is_empty() || body == "null"
}

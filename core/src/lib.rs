//! Post-list loading core for the mobile client.
//!
//! # Overview
//! `FetchController` owns one observable [`UiState`] and drives it through
//! `Idle -> Loading -> Success | Error` with a single `GET /posts/` round
//! trip. Hosts (the CLI, or a mobile app through `posts-ffi`) observe the
//! state and issue `fetch_tasks` as the retry command.
//!
//! # Design
//! - `PostClient` is stateless: `build_list_posts` produces an `HttpRequest`,
//!   `parse_list_posts` classifies an `HttpResponse`.
//! - `Transport` is the only I/O seam. `ReqwestTransport` (feature `http`)
//!   is the production implementation; tests script their own.
//! - Every failure ends at the controller as `UiState::Error`; nothing is
//!   propagated to the UI as a Rust error.

pub mod client;
pub mod controller;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{PostClient, DEFAULT_BASE_URL};
pub use controller::{FetchController, StateObserver, UiState};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
pub use transport::{PostSource, Transport};
pub use types::Post;

//! Domain DTOs for the posts API.
//!
//! # Design
//! `Post` mirrors the remote schema field-for-field. Decoding is strict: a
//! record with a missing or mistyped field fails the whole list, which the
//! controller surfaces as an unknown error rather than a partial result.

use serde::{Deserialize, Serialize};

/// A single post returned by `GET /posts/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: i64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

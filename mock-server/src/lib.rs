use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: i64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// What `GET /posts/` answers with.
#[derive(Clone, Debug)]
pub enum Feed {
    Posts(Vec<Post>),
    /// 200 with a literal `null` payload.
    NullBody,
    Status { status: u16, body: String },
    /// 200 with `application/json` content type but arbitrary text.
    Malformed(String),
}

impl Default for Feed {
    fn default() -> Self {
        Feed::Posts(Vec::new())
    }
}

#[derive(Clone, Default)]
pub struct MockState {
    feed: Arc<RwLock<Feed>>,
    delay: Option<Duration>,
    hits: Arc<AtomicUsize>,
}

impl MockState {
    pub fn new(feed: Feed) -> Self {
        Self {
            feed: Arc::new(RwLock::new(feed)),
            ..Self::default()
        }
    }

    /// Hold every response for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn set_feed(&self, feed: Feed) {
        *self.feed.write().await = feed;
    }

    /// Number of `GET /posts/` requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/", get(list_posts))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

/// A handful of posts in the shape of the public placeholder API.
pub fn sample_posts() -> Vec<Post> {
    (1..=5u64)
        .map(|id| Post {
            user_id: 1 + (id as i64 - 1) / 2,
            id,
            title: format!("sample post {id}"),
            body: format!("body of sample post {id}"),
        })
        .collect()
}

async fn list_posts(State(state): State<MockState>) -> Response {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    tracing::debug!(hit, "GET /posts/");
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
    let feed = state.feed.read().await.clone();
    match feed {
        Feed::Posts(posts) => Json(posts).into_response(),
        Feed::NullBody => Json(Option::<Vec<Post>>::None).into_response(),
        Feed::Status { status, body } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body).into_response()
        }
        Feed::Malformed(raw) => ([(header::CONTENT_TYPE, "application/json")], raw).into_response(),
    }
}

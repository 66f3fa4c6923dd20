//! The observe/render/retry loop.

use std::io::{self, Write};

use posts_core::{FetchController, Transport, UiState};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Posts were loaded and printed.
    Loaded,
    /// A fetch failed and the user declined to retry.
    GaveUp,
    /// The controller was torn down before a result arrived.
    Closed,
}

/// Drive `controller` until a result is shown and no retry is requested.
///
/// Starts a fetch if the controller is still `Idle`. On every `Error` the
/// user is asked whether to retry; retries are only ever user-initiated.
pub async fn run<T, R, W>(controller: &FetchController<T>, input: R, out: &mut W) -> io::Result<Outcome>
where
    T: Transport,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut observer = controller.observe();
    if controller.state() == UiState::Idle {
        controller.fetch_tasks();
    }

    while let Some(state) = observer.next().await {
        render::write_state(out, &state)?;
        match state {
            UiState::Success { .. } => return Ok(Outcome::Loaded),
            UiState::Error { .. } => {
                write!(out, "Retry? [y/N] ")?;
                out.flush()?;
                let answer = lines.next_line().await?;
                if !answer.as_deref().is_some_and(wants_retry) {
                    return Ok(Outcome::GaveUp);
                }
                tracing::debug!("user requested retry");
                controller.fetch_tasks();
            }
            UiState::Idle | UiState::Loading => {}
        }
        out.flush()?;
    }
    Ok(Outcome::Closed)
}

fn wants_retry(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

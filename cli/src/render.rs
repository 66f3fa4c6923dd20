//! Text rendering of `UiState`.

use std::io::{self, Write};

use posts_core::{Post, UiState};

pub fn write_state<W: Write>(out: &mut W, state: &UiState) -> io::Result<()> {
    match state {
        UiState::Idle => Ok(()),
        UiState::Loading => writeln!(out, "Loading posts..."),
        UiState::Success { tasks } if tasks.is_empty() => writeln!(out, "No posts."),
        UiState::Success { tasks } => {
            for post in tasks {
                write_post(out, post)?;
            }
            writeln!(out, "{} posts.", tasks.len())
        }
        UiState::Error { message } => writeln!(out, "Error: {message}"),
    }
}

fn write_post<W: Write>(out: &mut W, post: &Post) -> io::Result<()> {
    writeln!(out, "#{} [user {}] {}", post.id, post.user_id, post.title)?;
    for line in post.body.lines() {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}

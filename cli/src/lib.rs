//! Terminal host for the posts controller.
//!
//! The CLI plays the part of the mobile screen: it observes `UiState`,
//! renders each transition, and turns a "y" on stdin into a retry.

pub mod app;
pub mod config;
pub mod render;

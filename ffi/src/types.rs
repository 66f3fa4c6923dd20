//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! `FfiUiState` is a snapshot: it owns copies of every string and post, so a
//! host can keep it across later transitions and release it with
//! `posts_free_state`. Strings are NUL-terminated; interior NUL bytes in
//! server text are dropped rather than failing the conversion.

use std::ffi::CString;
use std::os::raw::c_char;

use posts_core::{FetchController, Post, ReqwestTransport, StateObserver, UiState};

/// Opaque handle to a controller and the runtime its requests run on.
///
/// Field order matters: the controller is torn down (cancelling any
/// in-flight request) before the runtime shuts down.
pub struct FfiPostsController {
    pub(crate) controller: FetchController<ReqwestTransport>,
    pub(crate) runtime: tokio::runtime::Runtime,
}

/// Opaque handle to a state observer.
pub struct FfiStateObserver {
    pub(crate) inner: StateObserver,
}

/// Which `UiState` variant a snapshot holds.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStateTag {
    Idle = 0,
    Loading = 1,
    Success = 2,
    Error = 3,
}

/// A single post exposed to C.
#[repr(C)]
pub struct FfiPost {
    pub id: u64,
    pub user_id: i64,
    pub title: *mut c_char,
    pub body: *mut c_char,
}

/// Snapshot of the controller state.
///
/// `posts`/`posts_len` (a `size_t`) are set only for `Success` (`posts` is null when the
/// list is empty). `error_message` is set only for `Error`.
#[repr(C)]
pub struct FfiUiState {
    pub tag: FfiStateTag,
    pub posts: *mut FfiPost,
    pub posts_len: usize,
    pub error_message: *mut c_char,
}

impl FfiUiState {
    /// Convert a core `UiState` into a heap-allocated `FfiUiState`.
    pub(crate) fn from_core(state: UiState) -> *mut Self {
        let snapshot = match state {
            UiState::Idle => Self::bare(FfiStateTag::Idle),
            UiState::Loading => Self::bare(FfiStateTag::Loading),
            UiState::Success { tasks } => {
                let posts_len = tasks.len();
                let posts = if tasks.is_empty() {
                    std::ptr::null_mut()
                } else {
                    let items: Box<[FfiPost]> = tasks.into_iter().map(FfiPost::from_core).collect();
                    Box::into_raw(items) as *mut FfiPost
                };
                FfiUiState {
                    tag: FfiStateTag::Success,
                    posts,
                    posts_len,
                    error_message: std::ptr::null_mut(),
                }
            }
            UiState::Error { message } => FfiUiState {
                error_message: to_c_string(message),
                ..Self::bare(FfiStateTag::Error)
            },
        };
        Box::into_raw(Box::new(snapshot))
    }

    fn bare(tag: FfiStateTag) -> Self {
        FfiUiState {
            tag,
            posts: std::ptr::null_mut(),
            posts_len: 0,
            error_message: std::ptr::null_mut(),
        }
    }

    /// Release a snapshot produced by `from_core`. `ptr` must not be null
    /// and must not have been freed already.
    pub(crate) fn free(ptr: *mut Self) {
        let state = unsafe { Box::from_raw(ptr) };
        if !state.error_message.is_null() {
            drop(unsafe { CString::from_raw(state.error_message) });
        }
        if !state.posts.is_null() && state.posts_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(state.posts, state.posts_len);
            let items = unsafe { Box::from_raw(slice) };
            for item in items.iter() {
                free_ffi_post_fields(item);
            }
        }
    }
}

impl FfiPost {
    fn from_core(post: Post) -> Self {
        FfiPost {
            id: post.id,
            user_id: post.user_id,
            title: to_c_string(post.title),
            body: to_c_string(post.body),
        }
    }
}

/// Free the C-string fields of an `FfiPost` (but not the struct itself).
fn free_ffi_post_fields(post: &FfiPost) {
    if !post.title.is_null() {
        drop(unsafe { CString::from_raw(post.title) });
    }
    if !post.body.is_null() {
        drop(unsafe { CString::from_raw(post.body) });
    }
}

pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

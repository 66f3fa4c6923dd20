//! C-ABI wrapper around `posts-core` for mobile hosts.
//!
//! # Overview
//! A host creates one controller per screen, calls `posts_controller_fetch`
//! on start and on every retry tap, and renders the snapshots it reads back
//! through `posts_controller_state` or an observer.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Each controller owns a small tokio runtime; requests run there and the
//!   host thread never blocks.
//! - `posts_controller_free` is the scope teardown: the in-flight request is
//!   cancelled and observers stop receiving states.
//! - Observers are polled (`posts_observer_poll`), which fits a host's
//!   frame or main-loop tick. Every transition is queued, none is skipped.
//! - The caller owns all returned pointers and must release them with the
//!   matching `posts_*_free` function.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use posts_core::{FetchController, PostClient, PostSource, ReqwestTransport};

use types::*;

// ---------------------------------------------------------------------------
// Controller lifecycle
// ---------------------------------------------------------------------------

/// Create a controller for `base_url` (e.g. `https://jsonplaceholder.typicode.com/`).
///
/// Returns null if `base_url` is null, not UTF-8, or if the runtime cannot
/// be started. The caller must free the returned pointer with
/// `posts_controller_free`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_controller_new(base_url: *const c_char) -> *mut FfiPostsController {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = unsafe { CStr::from_ptr(base_url) }.to_str() else {
            return std::ptr::null_mut();
        };
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("posts-ffi")
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "failed to start runtime");
                return std::ptr::null_mut();
            }
        };
        let source = PostSource::new(PostClient::new(url), ReqwestTransport::new());
        let controller = FetchController::new(source, runtime.handle().clone());
        tracing::debug!(base_url = url, "controller created");
        Box::into_raw(Box::new(FfiPostsController {
            controller,
            runtime,
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Tear down a controller created by `posts_controller_new`. Safe to call
/// with null. Any in-flight request is cancelled.
#[unsafe(no_mangle)]
pub extern "C" fn posts_controller_free(controller: *mut FfiPostsController) {
    if controller.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let handle = unsafe { Box::from_raw(controller) };
        handle.controller.close();
        let FfiPostsController { controller, runtime } = *handle;
        drop(controller);
        runtime.shutdown_background();
    }));
}

// ---------------------------------------------------------------------------
// Commands and state
// ---------------------------------------------------------------------------

/// Start loading posts. Returns `true` if a request was started, `false` if
/// one is already in flight or `controller` is null.
#[unsafe(no_mangle)]
pub extern "C" fn posts_controller_fetch(controller: *const FfiPostsController) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if controller.is_null() {
            return false;
        }
        let controller = unsafe { &*controller };
        controller.controller.fetch_tasks()
    }))
    .unwrap_or(false)
}

/// Snapshot the current state. Returns null if `controller` is null.
/// The caller must free the result with `posts_free_state`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_controller_state(controller: *const FfiPostsController) -> *mut FfiUiState {
    catch_unwind(AssertUnwindSafe(|| {
        if controller.is_null() {
            return std::ptr::null_mut();
        }
        let controller = unsafe { &*controller };
        FfiUiState::from_core(controller.controller.state())
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Observers
// ---------------------------------------------------------------------------

/// Attach an observer. Its first poll yields the current state.
///
/// Returns null if `controller` is null. The caller must free the result
/// with `posts_observer_free`; observers may outlive their controller.
#[unsafe(no_mangle)]
pub extern "C" fn posts_observer_new(controller: *const FfiPostsController) -> *mut FfiStateObserver {
    catch_unwind(AssertUnwindSafe(|| {
        if controller.is_null() {
            return std::ptr::null_mut();
        }
        let controller = unsafe { &*controller };
        let inner = controller.controller.observe();
        Box::into_raw(Box::new(FfiStateObserver { inner }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Take the next queued state without blocking.
///
/// Returns null when nothing is pending (or `observer` is null). The caller
/// must free a non-null result with `posts_free_state`.
#[unsafe(no_mangle)]
pub extern "C" fn posts_observer_poll(observer: *mut FfiStateObserver) -> *mut FfiUiState {
    catch_unwind(AssertUnwindSafe(|| {
        if observer.is_null() {
            return std::ptr::null_mut();
        }
        let observer = unsafe { &mut *observer };
        match observer.inner.try_next() {
            Some(state) => FfiUiState::from_core(state),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free an observer created by `posts_observer_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn posts_observer_free(observer: *mut FfiStateObserver) {
    if observer.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        drop(unsafe { Box::from_raw(observer) });
    }));
}

/// Free a state snapshot and every string and post it owns. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn posts_free_state(state: *mut FfiUiState) {
    if state.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| FfiUiState::free(state)));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::time::{Duration, Instant};

    use mock_server::{sample_posts, Feed, MockState};

    /// Start the mock server on its own thread and return its base URL.
    fn spawn_server(state: MockState) -> CString {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener, state).await
            })
            .unwrap();
        });
        CString::new(format!("http://{addr}/")).unwrap()
    }

    /// Poll until a settled (Success/Error) snapshot arrives.
    fn poll_settled(observer: *mut FfiStateObserver) -> *mut FfiUiState {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            let state = posts_observer_poll(observer);
            if state.is_null() {
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }
            let tag = unsafe { &*state }.tag;
            if matches!(tag, FfiStateTag::Success | FfiStateTag::Error) {
                return state;
            }
            posts_free_state(state);
        }
        panic!("fetch did not settle");
    }

    fn tag_of(state: *mut FfiUiState) -> FfiStateTag {
        let tag = unsafe { &*state }.tag;
        posts_free_state(state);
        tag
    }

    #[test]
    fn controller_new_and_free() {
        let url = CString::new("http://localhost:3000").unwrap();
        let controller = posts_controller_new(url.as_ptr());
        assert!(!controller.is_null());
        posts_controller_free(controller);
    }

    #[test]
    fn controller_new_null_returns_null() {
        assert!(posts_controller_new(std::ptr::null()).is_null());
    }

    #[test]
    fn null_handles_are_rejected() {
        posts_controller_free(std::ptr::null_mut());
        assert!(!posts_controller_fetch(std::ptr::null()));
        assert!(posts_controller_state(std::ptr::null()).is_null());
        assert!(posts_observer_new(std::ptr::null()).is_null());
        assert!(posts_observer_poll(std::ptr::null_mut()).is_null());
        posts_observer_free(std::ptr::null_mut());
        posts_free_state(std::ptr::null_mut());
    }

    #[test]
    fn new_controller_is_idle() {
        let url = CString::new("http://localhost:3000").unwrap();
        let controller = posts_controller_new(url.as_ptr());
        assert_eq!(tag_of(posts_controller_state(controller)), FfiStateTag::Idle);

        let observer = posts_observer_new(controller);
        assert_eq!(tag_of(posts_observer_poll(observer)), FfiStateTag::Idle);
        assert!(posts_observer_poll(observer).is_null());

        posts_observer_free(observer);
        posts_controller_free(controller);
    }

    #[test]
    fn fetch_loads_posts() {
        let url = spawn_server(MockState::new(Feed::Posts(sample_posts())));
        let controller = posts_controller_new(url.as_ptr());
        let observer = posts_observer_new(controller);

        assert!(posts_controller_fetch(controller));
        let state = poll_settled(observer);
        let s = unsafe { &*state };
        assert_eq!(s.tag, FfiStateTag::Success);
        assert!(s.error_message.is_null());
        assert_eq!(s.posts_len, 5);

        let items = unsafe { std::slice::from_raw_parts(s.posts, s.posts_len) };
        assert_eq!(items[0].id, 1);
        let title = unsafe { CStr::from_ptr(items[0].title) }.to_str().unwrap();
        assert_eq!(title, "sample post 1");
        let body = unsafe { CStr::from_ptr(items[4].body) }.to_str().unwrap();
        assert_eq!(body, "body of sample post 5");

        posts_free_state(state);
        posts_observer_free(observer);
        posts_controller_free(controller);
    }

    #[test]
    fn empty_list_has_null_posts() {
        let url = spawn_server(MockState::new(Feed::Posts(Vec::new())));
        let controller = posts_controller_new(url.as_ptr());
        let observer = posts_observer_new(controller);

        posts_controller_fetch(controller);
        let state = poll_settled(observer);
        let s = unsafe { &*state };
        assert_eq!(s.tag, FfiStateTag::Success);
        assert_eq!(s.posts_len, 0);
        assert!(s.posts.is_null());

        posts_free_state(state);
        posts_observer_free(observer);
        posts_controller_free(controller);
    }

    #[test]
    fn server_error_carries_message() {
        let url = spawn_server(MockState::new(Feed::Status {
            status: 404,
            body: "Not Found".to_string(),
        }));
        let controller = posts_controller_new(url.as_ptr());
        let observer = posts_observer_new(controller);

        posts_controller_fetch(controller);
        let state = poll_settled(observer);
        let s = unsafe { &*state };
        assert_eq!(s.tag, FfiStateTag::Error);
        let message = unsafe { CStr::from_ptr(s.error_message) }.to_str().unwrap();
        assert_eq!(message, "Not Found");

        posts_free_state(state);
        posts_observer_free(observer);
        posts_controller_free(controller);
    }

    #[test]
    fn second_fetch_while_loading_is_ignored() {
        let state = MockState::new(Feed::Posts(sample_posts())).with_delay(Duration::from_millis(200));
        let url = spawn_server(state.clone());
        let controller = posts_controller_new(url.as_ptr());
        let observer = posts_observer_new(controller);

        assert!(posts_controller_fetch(controller));
        assert!(!posts_controller_fetch(controller));
        assert_eq!(tag_of(posts_controller_state(controller)), FfiStateTag::Loading);
        assert_eq!(tag_of(poll_settled(observer)), FfiStateTag::Success);
        assert_eq!(state.hits(), 1);

        posts_observer_free(observer);
        posts_controller_free(controller);
    }

    #[test]
    fn free_during_fetch_stops_transitions() {
        let state = MockState::new(Feed::Posts(sample_posts())).with_delay(Duration::from_millis(300));
        let url = spawn_server(state);
        let controller = posts_controller_new(url.as_ptr());
        let observer = posts_observer_new(controller);

        posts_controller_fetch(controller);
        posts_controller_free(controller);
        std::thread::sleep(Duration::from_millis(500));

        assert_eq!(tag_of(posts_observer_poll(observer)), FfiStateTag::Idle);
        assert_eq!(tag_of(posts_observer_poll(observer)), FfiStateTag::Loading);
        assert!(posts_observer_poll(observer).is_null());
        posts_observer_free(observer);
    }

    #[test]
    fn snapshot_length_matches_post_count() {
        let tasks: Vec<posts_core::Post> = (1..=300u64)
            .map(|id| posts_core::Post {
                user_id: 1,
                id,
                title: format!("t{id}"),
                body: String::new(),
            })
            .collect();
        let state = FfiUiState::from_core(posts_core::UiState::Success { tasks });
        let s = unsafe { &*state };
        assert_eq!(s.posts_len, 300);

        let items = unsafe { std::slice::from_raw_parts(s.posts, s.posts_len) };
        assert_eq!(items[299].id, 300);
        let title = unsafe { CStr::from_ptr(items[299].title) }.to_str().unwrap();
        assert_eq!(title, "t300");

        posts_free_state(state);
    }

    #[test]
    fn to_c_string_drops_interior_nul() {
        let ptr = to_c_string("a\0b".to_string());
        let s = unsafe { CString::from_raw(ptr) };
        assert_eq!(s.to_str().unwrap(), "ab");
    }
}

//! Task spawning.
//!
//! - Native: `tokio::task::spawn`; the spawned future must be `Send`.
//! - WASM: `wasm_bindgen_futures::spawn_local` with a oneshot-backed
//!   `JoinHandle`, so callers can await results on either target.
//!
//! Spawning on native requires an entered Tokio runtime.

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::task::{yield_now, JoinError, JoinHandle};

#[cfg(not(target_arch = "wasm32"))]
/// Spawns a task onto the current Tokio runtime.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

#[cfg(target_arch = "wasm32")]
pub use crate::wasm_task::{spawn, yield_now, JoinError, JoinHandle};

/// Result type for awaited task handles.
pub type Result<T> = std::result::Result<T, JoinError>;

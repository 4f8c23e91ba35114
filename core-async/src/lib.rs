//! Runtime-agnostic async helpers for the reels core.
//!
//! Native builds delegate to Tokio; WebAssembly builds run on the browser event
//! loop through `wasm-bindgen-futures` and `gloo-timers`. Core crates depend on
//! this crate instead of on tokio so that the same cache and prefetch code
//! compiles for both hosts.
//!
//! # Modules
//!
//! - `task`: task spawning (`spawn` returns an awaitable `JoinHandle` on both targets)
//! - `time`: `sleep`, `timeout`, `Instant`, and wall-clock helpers
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(10)).await;
//!         42
//!     });
//!     let _ = handle.await;
//! }
//! ```

pub mod task;
pub mod time;

#[cfg(target_arch = "wasm32")]
mod wasm_task;

pub use task::spawn;
pub use time::{sleep, timeout, Duration, Instant};

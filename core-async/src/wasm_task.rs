//! Single-threaded task spawning for WebAssembly.

use futures::channel::oneshot;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Returned when a spawned task is dropped before producing a value.
#[derive(Debug, Clone)]
pub struct JoinError;

impl JoinError {
    /// Tasks on wasm can only fail by being dropped.
    pub fn is_cancelled(&self) -> bool {
        true
    }
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task was cancelled")
    }
}

impl std::error::Error for JoinError {}

/// Awaitable handle to a task spawned with [`spawn`].
pub struct JoinHandle<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> Future for JoinHandle<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(value)) => Poll::Ready(Ok(value)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(JoinError)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Spawns a future on the browser event loop.
///
/// Dropping the returned handle does not cancel the task.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + 'static,
    F::Output: 'static,
{
    let (sender, receiver) = oneshot::channel();
    wasm_bindgen_futures::spawn_local(async move {
        let output = future.await;
        let _ = sender.send(output);
    });
    JoinHandle { receiver }
}

/// Yields once to the event loop.
pub async fn yield_now() {
    gloo_timers::future::TimeoutFuture::new(0).await;
}

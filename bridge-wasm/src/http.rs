//! `HttpClient` over the browser `fetch` API.
//!
//! Media, manifest and Drive requests all go through here. A request timeout
//! arms an `AbortController` raced against a timer that covers the body read
//! as well as the response headers. [`CacheMode`] is forwarded as the fetch
//! `cache` option: prefetch on restricted hosts relies on `force-cache` with
//! the body discarded, manifest loads on `no-store`.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    http::{CacheMode, HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use bytes::Bytes;
use futures::{
    future::{select, Either},
    pin_mut,
};
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Uint8Array};
use std::{collections::HashMap, time::Duration};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AbortController, AbortSignal, Headers, Request, RequestCache, RequestInit, RequestMode,
    Response, Window,
};

/// Fetch-backed client bound to the page's `window`.
pub struct WasmHttpClient {
    window: Window,
}

impl WasmHttpClient {
    pub fn new() -> BridgeResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".to_string()))?;
        Ok(Self { window })
    }

    /// Request plus body read, both under the same abort signal.
    async fn exchange(&self, request: &Request, discard_body: bool) -> BridgeResult<HttpResponse> {
        let response = JsFuture::from(self.window.fetch_with_request(request))
            .await
            .map_err(|err| js_error("fetch", err))?
            .dyn_into::<Response>()
            .map_err(|_| BridgeError::OperationFailed("fetch resolved to a non-Response".into()))?;

        let status = response.status();
        let headers = response_headers(&response.headers())?;
        let buffer = read_body(&response).await?;
        let body = if discard_body {
            Bytes::new()
        } else {
            Bytes::from(Uint8Array::new(&buffer).to_vec())
        };
        debug!(status, bytes = body.len(), discard_body, "fetch completed");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait(?Send)]
impl HttpClient for WasmHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let deadline = request.timeout.map(Deadline::arm).transpose()?;
        let signal = deadline.as_ref().map(|d| d.controller.signal());

        let js_request = to_js_request(&request, signal.as_ref())?;
        let exchange = self.exchange(&js_request, request.discard_body);

        let Some(deadline) = deadline else {
            return exchange.await;
        };

        let timer = TimeoutFuture::new(deadline.millis());
        pin_mut!(exchange, timer);
        match select(exchange, timer).await {
            Either::Left((outcome, _)) => {
                deadline.disarm();
                outcome
            }
            Either::Right(((), exchange)) => {
                deadline.controller.abort();
                // Drain the aborted fetch so its rejection is not left unobserved.
                let _ = exchange.await;
                Err(BridgeError::Timeout(format!(
                    "fetch aborted after {} ms",
                    deadline.after.as_millis()
                )))
            }
        }
    }

    async fn is_connected(&self) -> bool {
        self.window.navigator().on_line()
    }
}

/// Abort handle plus the delay after which it fires.
///
/// Dropping an armed deadline aborts the request, so a caller that gives up
/// mid-download does not leave the transfer running.
struct Deadline {
    controller: AbortController,
    after: Duration,
    settled: bool,
}

impl Deadline {
    fn arm(after: Duration) -> BridgeResult<Self> {
        let controller =
            AbortController::new().map_err(|err| js_error("create AbortController", err))?;
        Ok(Self {
            controller,
            after,
            settled: false,
        })
    }

    fn millis(&self) -> u32 {
        u32::try_from(self.after.as_millis()).unwrap_or(u32::MAX)
    }

    fn disarm(mut self) {
        self.settled = true;
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        if !self.settled {
            self.controller.abort();
        }
    }
}

fn to_js_request(request: &HttpRequest, signal: Option<&AbortSignal>) -> BridgeResult<Request> {
    let init = RequestInit::new();
    init.set_method(method_name(request.method));
    init.set_mode(RequestMode::Cors);
    init.set_cache(fetch_cache(request.cache_mode));
    if signal.is_some() {
        init.set_signal(signal);
    }

    let headers = Headers::new().map_err(|err| js_error("create headers", err))?;
    for (name, value) in &request.headers {
        headers
            .set(name, value)
            .map_err(|err| js_error("set header", err))?;
    }
    init.set_headers(&headers);

    if let Some(body) = &request.body {
        init.set_body(&Uint8Array::from(body.as_ref()).into());
    }

    Request::new_with_str_and_init(&request.url, &init).map_err(|err| js_error("build request", err))
}

async fn read_body(response: &Response) -> BridgeResult<JsValue> {
    let buffer = response
        .array_buffer()
        .map_err(|err| js_error("read body", err))?;
    JsFuture::from(buffer)
        .await
        .map_err(|err| js_error("read body", err))
}

fn response_headers(headers: &Headers) -> BridgeResult<HashMap<String, String>> {
    let entries = js_sys::try_iter(headers.as_ref())
        .map_err(|err| js_error("iterate headers", err))?
        .ok_or_else(|| BridgeError::OperationFailed("headers are not iterable".into()))?;

    let mut collected = HashMap::new();
    for entry in entries {
        let pair = Array::from(&entry.map_err(|err| js_error("iterate headers", err))?);
        if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
            collected.insert(name, value);
        }
    }
    Ok(collected)
}

fn method_name(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Get => "GET",
        HttpMethod::Post => "POST",
        HttpMethod::Put => "PUT",
        HttpMethod::Patch => "PATCH",
        HttpMethod::Delete => "DELETE",
        HttpMethod::Head => "HEAD",
    }
}

fn fetch_cache(mode: CacheMode) -> RequestCache {
    match mode {
        CacheMode::Default => RequestCache::Default,
        CacheMode::ForceCache => RequestCache::ForceCache,
        CacheMode::NoStore => RequestCache::NoStore,
    }
}

fn js_error(context: &str, err: JsValue) -> BridgeError {
    let message = err
        .as_string()
        .or_else(|| err.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{err:?}"));
    BridgeError::OperationFailed(format!("fetch {context}: {message}"))
}

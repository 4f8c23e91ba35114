//! IndexedDB-backed media blob store.
//!
//! # Schema
//!
//! - **Database**: `mental-biriyani-media`, version 1
//! - **Object store**: `media-blobs`, key path `url`
//! - **Index**: `timestamp` (non-unique), used for age-ordered scans and
//!   range deletion
//!
//! Records are plain JS objects `{ url, blob, mimeType, timestamp }` where
//! `blob` is a native `Blob`, so other scripts on the page can read the same
//! store.

use async_trait::async_trait;
use bridge_traits::{
    blob_store::{BlobMetadata, BlobStore, CachedBlob},
    error::Result as BridgeResult,
};
use bytes::Bytes;
use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::StreamExt;
use js_sys::{Array, Object, Reflect, Uint8Array};
use std::cell::RefCell;
use tracing::{debug, info, instrument};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, IdbCursorWithValue, IdbDatabase, IdbIndexParameters, IdbKeyRange,
    IdbObjectStore, IdbObjectStoreParameters, IdbOpenDbRequest, IdbRequest, IdbTransaction,
    IdbTransactionMode, IdbVersionChangeEvent,
};

use crate::error::{describe, WasmError, WasmResult};

/// Default database name.
pub const MEDIA_DB_NAME: &str = "mental-biriyani-media";
/// Object store holding the blobs.
pub const MEDIA_STORE_NAME: &str = "media-blobs";
/// Secondary index on insertion time.
pub const TIMESTAMP_INDEX: &str = "timestamp";

const DB_VERSION: f64 = 1.0;

/// [`BlobStore`] on top of the browser's IndexedDB.
///
/// The database is opened lazily on first use and the handle is kept for the
/// lifetime of the store.
pub struct IndexedDbBlobStore {
    db_name: String,
    db: RefCell<Option<IdbDatabase>>,
}

impl IndexedDbBlobStore {
    pub fn new() -> Self {
        Self::with_name(MEDIA_DB_NAME)
    }

    /// Use a different database name (tests, multiple profiles).
    pub fn with_name(db_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            db: RefCell::new(None),
        }
    }

    async fn database(&self) -> WasmResult<IdbDatabase> {
        if let Some(db) = self.db.borrow().as_ref() {
            return Ok(db.clone());
        }

        let db = open_database(&self.db_name).await?;
        *self.db.borrow_mut() = Some(db.clone());
        debug!(name = %self.db_name, "Opened IndexedDB media store");
        Ok(db)
    }

    async fn transaction(&self, mode: IdbTransactionMode) -> WasmResult<IdbTransaction> {
        let db = self.database().await?;
        let names = Array::new();
        names.push(&JsValue::from_str(MEDIA_STORE_NAME));
        db.transaction_with_str_sequence_and_mode(&names, mode)
            .map_err(|e| WasmError::from_idb("open transaction", e))
    }
}

impl Default for IndexedDbBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Open or create the media database and its object store.
async fn open_database(name: &str) -> WasmResult<IdbDatabase> {
    let window =
        web_sys::window().ok_or_else(|| WasmError::NotAvailable("window".to_string()))?;
    let factory = window
        .indexed_db()
        .map_err(|e| WasmError::from_idb("indexedDB", e))?
        .ok_or_else(|| WasmError::NotAvailable("indexedDB".to_string()))?;

    let open_request: IdbOpenDbRequest = factory
        .open_with_f64(name, DB_VERSION)
        .map_err(|e| WasmError::from_idb("open database", e))?;

    let onupgradeneeded = Closure::once(move |event: IdbVersionChangeEvent| {
        let Some(request) = event
            .target()
            .and_then(|target| target.dyn_into::<IdbOpenDbRequest>().ok())
        else {
            return;
        };
        let Some(db) = request
            .result()
            .ok()
            .and_then(|result| result.dyn_into::<IdbDatabase>().ok())
        else {
            return;
        };

        if !db.object_store_names().contains(MEDIA_STORE_NAME) {
            let options = IdbObjectStoreParameters::new();
            options.set_key_path(&JsValue::from_str("url"));
            if let Ok(store) = db.create_object_store_with_optional_parameters(MEDIA_STORE_NAME, &options) {
                let index_options = IdbIndexParameters::new();
                index_options.set_unique(false);
                let _ = store.create_index_with_str_and_optional_parameters(
                    TIMESTAMP_INDEX,
                    "timestamp",
                    &index_options,
                );
            }
        }
    });
    open_request.set_onupgradeneeded(Some(onupgradeneeded.as_ref().unchecked_ref()));
    onupgradeneeded.forget();

    let result = JsFuture::from(request_to_promise(&open_request))
        .await
        .map_err(|e| WasmError::from_idb("open database", e))?;

    result
        .dyn_into::<IdbDatabase>()
        .map_err(|_| WasmError::IndexedDb("open result is not an IDBDatabase".to_string()))
}

/// Resolve with `request.result` on success, reject with `request.error`.
///
/// For requests that fire once; cursor walks use [`CursorWalk`].
fn request_to_promise(request: &IdbRequest) -> js_sys::Promise {
    js_sys::Promise::new(&mut |resolve, reject| {
        let request_clone = request.clone();
        let onsuccess = Closure::once(move || {
            let result = request_clone.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
        onsuccess.forget();

        let request_clone = request.clone();
        let onerror = Closure::once(move || {
            let error = request_clone
                .error()
                .ok()
                .flatten()
                .map(JsValue::from)
                .unwrap_or_else(|| JsValue::from_str("request failed"));
            let _ = reject.call1(&JsValue::NULL, &error);
        });
        request.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    })
}

/// Resolve when the transaction commits, reject when it aborts or errors.
///
/// Quota failures often surface only here, after the request itself succeeded.
fn transaction_to_promise(transaction: &IdbTransaction) -> js_sys::Promise {
    js_sys::Promise::new(&mut |resolve, reject| {
        let oncomplete = Closure::once(move || {
            let _ = resolve.call0(&JsValue::NULL);
        });
        transaction.set_oncomplete(Some(oncomplete.as_ref().unchecked_ref()));
        oncomplete.forget();

        let tx_clone = transaction.clone();
        let reject_clone = reject.clone();
        let onabort = Closure::once(move || {
            let error = tx_clone
                .error()
                .map(JsValue::from)
                .unwrap_or_else(|| JsValue::from_str("transaction aborted"));
            let _ = reject_clone.call1(&JsValue::NULL, &error);
        });
        transaction.set_onabort(Some(onabort.as_ref().unchecked_ref()));
        onabort.forget();

        let tx_clone = transaction.clone();
        let onerror = Closure::once(move || {
            let error = tx_clone
                .error()
                .map(JsValue::from)
                .unwrap_or_else(|| JsValue::from_str("transaction error"));
            let _ = reject.call1(&JsValue::NULL, &error);
        });
        transaction.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    })
}

/// Cursor walk over one `IDBRequest`.
///
/// The request fires `success` once per step, so the handlers are installed a
/// single time and feed a channel. They are detached and freed when the walk
/// is dropped.
struct CursorWalk {
    request: IdbRequest,
    steps: UnboundedReceiver<Result<JsValue, JsValue>>,
    _onsuccess: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl CursorWalk {
    fn new(request: IdbRequest) -> Self {
        let (tx, steps) = mpsc::unbounded();

        let success_tx = tx.clone();
        let success_request = request.clone();
        let onsuccess = Closure::<dyn FnMut()>::new(move || {
            let result = success_request.result().unwrap_or(JsValue::UNDEFINED);
            let _ = success_tx.unbounded_send(Ok(result));
        });
        request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));

        let error_request = request.clone();
        let onerror = Closure::<dyn FnMut()>::new(move || {
            let error = error_request
                .error()
                .ok()
                .flatten()
                .map(JsValue::from)
                .unwrap_or_else(|| JsValue::from_str("cursor request failed"));
            let _ = tx.unbounded_send(Err(error));
        });
        request.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        Self {
            request,
            steps,
            _onsuccess: onsuccess,
            _onerror: onerror,
        }
    }

    /// Next cursor position, `None` once the range is exhausted.
    async fn next(&mut self) -> WasmResult<Option<IdbCursorWithValue>> {
        let result = match self.steps.next().await {
            Some(Ok(result)) => result,
            Some(Err(error)) => return Err(WasmError::from_idb("cursor", error)),
            None => return Ok(None),
        };
        if result.is_null() || result.is_undefined() {
            return Ok(None);
        }

        result
            .dyn_into::<IdbCursorWithValue>()
            .map(Some)
            .map_err(|_| WasmError::IndexedDb("cursor cast failed".to_string()))
    }
}

impl Drop for CursorWalk {
    fn drop(&mut self) {
        self.request.set_onsuccess(None);
        self.request.set_onerror(None);
    }
}

fn object_store(transaction: &IdbTransaction) -> WasmResult<IdbObjectStore> {
    transaction
        .object_store(MEDIA_STORE_NAME)
        .map_err(|e| WasmError::from_idb("object store", e))
}

fn get_field(record: &JsValue, field: &str) -> WasmResult<JsValue> {
    Reflect::get(record, &JsValue::from_str(field))
        .map_err(|e| WasmError::Serialization(format!("read {field}: {}", describe(&e))))
}

/// Byte length of a stored payload without reading it.
fn payload_size(payload: &JsValue) -> u64 {
    if let Some(blob) = payload.dyn_ref::<Blob>() {
        blob.size() as u64
    } else if let Some(array) = payload.dyn_ref::<Uint8Array>() {
        array.length() as u64
    } else if let Some(buffer) = payload.dyn_ref::<js_sys::ArrayBuffer>() {
        buffer.byte_length() as u64
    } else {
        0
    }
}

async fn payload_bytes(payload: &JsValue) -> WasmResult<Bytes> {
    let array = if let Some(blob) = payload.dyn_ref::<Blob>() {
        let buffer = JsFuture::from(blob.array_buffer()).await?;
        Uint8Array::new(&buffer)
    } else if let Some(array) = payload.dyn_ref::<Uint8Array>() {
        array.clone()
    } else if payload.is_instance_of::<js_sys::ArrayBuffer>() {
        Uint8Array::new(payload)
    } else {
        return Ok(Bytes::new());
    };

    let mut bytes = vec![0u8; array.length() as usize];
    array.copy_to(&mut bytes);
    Ok(Bytes::from(bytes))
}

fn metadata_from_record(record: &JsValue) -> WasmResult<BlobMetadata> {
    let url = get_field(record, "url")?
        .as_string()
        .ok_or_else(|| WasmError::Serialization("record without url".to_string()))?;
    let mime_type = get_field(record, "mimeType")?
        .as_string()
        .unwrap_or_default();
    let timestamp = get_field(record, "timestamp")?.as_f64().unwrap_or(0.0) as i64;
    let size = payload_size(&get_field(record, "blob")?);

    Ok(BlobMetadata {
        url,
        size,
        timestamp,
        mime_type,
    })
}

fn record_from_entry(entry: &CachedBlob) -> WasmResult<Object> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(entry.blob.as_ref()));
    let options = BlobPropertyBag::new();
    options.set_type(&entry.mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| WasmError::JavaScript(format!("create Blob: {}", describe(&e))))?;

    let record = Object::new();
    let set = |key: &str, value: &JsValue| {
        Reflect::set(&record, &JsValue::from_str(key), value)
            .map(|_| ())
            .map_err(|e| WasmError::Serialization(format!("write {key}: {}", describe(&e))))
    };
    set("url", &JsValue::from_str(&entry.url))?;
    set("blob", &blob)?;
    set("mimeType", &JsValue::from_str(&entry.mime_type))?;
    set("timestamp", &JsValue::from_f64(entry.timestamp as f64))?;
    Ok(record)
}

#[async_trait(?Send)]
impl BlobStore for IndexedDbBlobStore {
    async fn open(&self) -> BridgeResult<()> {
        self.database().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> BridgeResult<Option<CachedBlob>> {
        let transaction = self.transaction(IdbTransactionMode::Readonly).await?;
        let store = object_store(&transaction)?;
        let request = store
            .get(&JsValue::from_str(url))
            .map_err(|e| WasmError::from_idb("get", e))?;
        let record = JsFuture::from(request_to_promise(&request))
            .await
            .map_err(|e| WasmError::from_idb("get", e))?;

        if record.is_undefined() || record.is_null() {
            return Ok(None);
        }

        let metadata = metadata_from_record(&record)?;
        let blob = payload_bytes(&get_field(&record, "blob")?).await?;

        Ok(Some(CachedBlob {
            url: metadata.url,
            blob,
            mime_type: metadata.mime_type,
            timestamp: metadata.timestamp,
        }))
    }

    #[instrument(skip(self, entry), fields(url = %entry.url, size = entry.size()))]
    async fn put(&self, entry: CachedBlob) -> BridgeResult<()> {
        let record = record_from_entry(&entry)?;
        let transaction = self.transaction(IdbTransactionMode::Readwrite).await?;
        let done = transaction_to_promise(&transaction);
        let store = object_store(&transaction)?;

        let request = store
            .put(&record)
            .map_err(|e| WasmError::from_idb("put", e))?;
        JsFuture::from(request_to_promise(&request))
            .await
            .map_err(|e| WasmError::from_idb("put", e))?;
        JsFuture::from(done)
            .await
            .map_err(|e| WasmError::from_idb("put commit", e))?;

        debug!("Stored blob");
        Ok(())
    }

    async fn delete(&self, url: &str) -> BridgeResult<()> {
        let transaction = self.transaction(IdbTransactionMode::Readwrite).await?;
        let done = transaction_to_promise(&transaction);
        let store = object_store(&transaction)?;
        let request = store
            .delete(&JsValue::from_str(url))
            .map_err(|e| WasmError::from_idb("delete", e))?;
        JsFuture::from(request_to_promise(&request))
            .await
            .map_err(|e| WasmError::from_idb("delete", e))?;
        JsFuture::from(done)
            .await
            .map_err(|e| WasmError::from_idb("delete commit", e))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_older_than(&self, cutoff: i64) -> BridgeResult<usize> {
        let transaction = self.transaction(IdbTransactionMode::Readwrite).await?;
        let done = transaction_to_promise(&transaction);
        let store = object_store(&transaction)?;
        let index = store
            .index(TIMESTAMP_INDEX)
            .map_err(|e| WasmError::from_idb("timestamp index", e))?;
        let range = IdbKeyRange::upper_bound_with_open(&JsValue::from_f64(cutoff as f64), true)
            .map_err(|e| WasmError::from_idb("key range", e))?;
        let request = index
            .open_cursor_with_range(&range)
            .map_err(|e| WasmError::from_idb("open cursor", e))?;

        let mut walk = CursorWalk::new(request);
        let mut removed = 0usize;
        while let Some(cursor) = walk.next().await? {
            cursor
                .delete()
                .map_err(|e| WasmError::from_idb("cursor delete", e))?;
            removed += 1;
            cursor
                .continue_()
                .map_err(|e| WasmError::from_idb("cursor continue", e))?;
        }

        JsFuture::from(done)
            .await
            .map_err(|e| WasmError::from_idb("delete commit", e))?;

        if removed > 0 {
            info!(removed, "Deleted blobs older than cutoff");
        }
        Ok(removed)
    }

    async fn entries_by_age(&self) -> BridgeResult<Vec<BlobMetadata>> {
        let transaction = self.transaction(IdbTransactionMode::Readonly).await?;
        let store = object_store(&transaction)?;
        let index = store
            .index(TIMESTAMP_INDEX)
            .map_err(|e| WasmError::from_idb("timestamp index", e))?;
        let request = index
            .open_cursor()
            .map_err(|e| WasmError::from_idb("open cursor", e))?;

        let mut walk = CursorWalk::new(request);
        let mut entries = Vec::new();
        while let Some(cursor) = walk.next().await? {
            let value = cursor
                .value()
                .map_err(|e| WasmError::from_idb("cursor value", e))?;
            entries.push(metadata_from_record(&value)?);
            cursor
                .continue_()
                .map_err(|e| WasmError::from_idb("cursor continue", e))?;
        }

        Ok(entries)
    }

    async fn clear(&self) -> BridgeResult<()> {
        let transaction = self.transaction(IdbTransactionMode::Readwrite).await?;
        let done = transaction_to_promise(&transaction);
        let store = object_store(&transaction)?;
        let request = store.clear().map_err(|e| WasmError::from_idb("clear", e))?;
        JsFuture::from(request_to_promise(&request))
            .await
            .map_err(|e| WasmError::from_idb("clear", e))?;
        JsFuture::from(done)
            .await
            .map_err(|e| WasmError::from_idb("clear commit", e))?;
        info!("Cleared blob store");
        Ok(())
    }
}

//! FFI layer for host applications.
//!
//! This module provides C-compatible functions over an in-memory
//! [`MemoryStore`]. The host loads its key-value state into the store as one
//! JSON object, runs export, backup or import, and dumps the store back.
//!
//! # Memory Management
//!
//! - Strings returned by `stockpile_*` functions are allocated by Rust
//! - Caller must free them with `stockpile_string_free`
//! - Store pointers must be freed with `stockpile_store_free`
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::{snapshot, EncodeOptions, MemoryStore, MergeStrategy};
use serde::de::DeserializeOwned;
use std::ffi::{c_char, CStr, CString};
use std::ptr;

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

fn error_string(message: impl Into<String>) -> *mut c_char {
    to_c_string(FfiResult::<()>::err(message).to_json())
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `stockpile_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        // Document text or values contained a NUL byte
        Err(_) => CString::from(c"{\"error\":\"string contained null bytes\"}").into_raw(),
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Parse an optional JSON argument; null means the default value.
unsafe fn parse_optional<T: DeserializeOwned + Default>(ptr: *const c_char) -> Result<T, String> {
    if ptr.is_null() {
        return Ok(T::default());
    }
    let text = from_c_string(ptr).ok_or_else(|| "argument is not valid UTF-8".to_string())?;
    serde_json::from_str(&text).map_err(|e| format!("parse error: {}", e))
}

// ============================================================================
// Store Lifecycle
// ============================================================================

/// Create a new, empty store.
///
/// Caller must free the returned pointer with `stockpile_store_free`.
#[no_mangle]
pub extern "C" fn stockpile_store_new() -> *mut MemoryStore {
    Box::into_raw(Box::new(MemoryStore::new()))
}

/// Free a store.
///
/// # Safety
/// - `store` must be a valid pointer from `stockpile_store_new`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn stockpile_store_free(store: *mut MemoryStore) {
    if !store.is_null() {
        drop(Box::from_raw(store));
    }
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `stockpile_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn stockpile_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Replace the store contents with a JSON object of name to value.
///
/// # Returns
/// JSON string: `{"ok": <entry count>}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `stockpile_store_new` or null
/// - `entries_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `stockpile_string_free`
#[no_mangle]
pub unsafe extern "C" fn stockpile_store_load(
    store: *mut MemoryStore,
    entries_json: *const c_char,
) -> *mut c_char {
    let store = match store.as_mut() {
        Some(s) => s,
        None => return error_string("null store pointer"),
    };

    let entries_str = match from_c_string(entries_json) {
        Some(s) => s,
        None => return error_string("invalid entries JSON"),
    };

    match serde_json::from_str::<MemoryStore>(&entries_str) {
        Ok(loaded) => {
            *store = loaded;
            to_c_string(FfiResult::ok(store.len()).to_json())
        }
        Err(e) => error_string(format!("parse error: {}", e)),
    }
}

/// Dump the store contents as a JSON object of name to value.
///
/// # Returns
/// JSON string: `{"ok": {...}}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `stockpile_store_new` or null
/// - Caller must free the returned string with `stockpile_string_free`
#[no_mangle]
pub unsafe extern "C" fn stockpile_store_dump(store: *const MemoryStore) -> *mut c_char {
    match store.as_ref() {
        Some(s) => to_c_string(FfiResult::ok(s).to_json()),
        None => error_string("null store pointer"),
    }
}

// ============================================================================
// Snapshot Operations
// ============================================================================

/// Export an allow-list of collections.
///
/// # Arguments
/// - `names_json`: JSON array of collection names
/// - `options_json`: JSON [`EncodeOptions`] or null for defaults
///
/// # Returns
/// JSON string: `{"ok": "<document text>"}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `stockpile_store_new` or null
/// - `names_json` and `options_json` must be valid null-terminated C strings or null
/// - Caller must free the returned string with `stockpile_string_free`
#[no_mangle]
pub unsafe extern "C" fn stockpile_export(
    store: *const MemoryStore,
    names_json: *const c_char,
    options_json: *const c_char,
) -> *mut c_char {
    let store = match store.as_ref() {
        Some(s) => s,
        None => return error_string("null store pointer"),
    };

    let names: Vec<String> = match from_c_string(names_json).map(|s| serde_json::from_str(&s)) {
        Some(Ok(names)) => names,
        Some(Err(e)) => return error_string(format!("parse error: {}", e)),
        None => return error_string("invalid names JSON"),
    };

    let options: EncodeOptions = match parse_optional(options_json) {
        Ok(o) => o,
        Err(e) => return error_string(e),
    };

    match snapshot::export(store, &names, &options) {
        Ok(text) => to_c_string(FfiResult::ok(text).to_json()),
        Err(e) => error_string(e.to_string()),
    }
}

/// Back up every collection under a name prefix.
///
/// # Arguments
/// - `prefix`: name prefix; null or empty selects everything
/// - `options_json`: JSON [`EncodeOptions`] or null for defaults
///
/// # Returns
/// JSON string: `{"ok": "<document text>"}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `stockpile_store_new` or null
/// - `prefix` and `options_json` must be valid null-terminated C strings or null
/// - Caller must free the returned string with `stockpile_string_free`
#[no_mangle]
pub unsafe extern "C" fn stockpile_backup(
    store: *const MemoryStore,
    prefix: *const c_char,
    options_json: *const c_char,
) -> *mut c_char {
    let store = match store.as_ref() {
        Some(s) => s,
        None => return error_string("null store pointer"),
    };

    let prefix = from_c_string(prefix).unwrap_or_default();

    let options: EncodeOptions = match parse_optional(options_json) {
        Ok(o) => o,
        Err(e) => return error_string(e),
    };

    match snapshot::backup(store, &prefix, &options) {
        Ok(text) => to_c_string(FfiResult::ok(text).to_json()),
        Err(e) => error_string(e.to_string()),
    }
}

/// Import a document into the store.
///
/// # Arguments
/// - `text`: document text
/// - `strategy_json`: JSON [`MergeStrategy`] or null for concatenation
///
/// # Returns
/// JSON string: `{"ok": ImportReport}` or `{"error": "message"}`
///
/// # Safety
/// - `store` must be a valid pointer from `stockpile_store_new` or null
/// - `text` and `strategy_json` must be valid null-terminated C strings or null
/// - Caller must free the returned string with `stockpile_string_free`
#[no_mangle]
pub unsafe extern "C" fn stockpile_import(
    store: *mut MemoryStore,
    text: *const c_char,
    strategy_json: *const c_char,
) -> *mut c_char {
    let store = match store.as_mut() {
        Some(s) => s,
        None => return error_string("null store pointer"),
    };

    let text = match from_c_string(text) {
        Some(t) => t,
        None => return error_string("invalid document text"),
    };

    let strategy: MergeStrategy = match parse_optional(strategy_json) {
        Ok(s) => s,
        Err(e) => return error_string(e),
    };

    match snapshot::import(store, &text, strategy) {
        Ok(report) => to_c_string(FfiResult::ok(report).to_json()),
        Err(e) => error_string(e.to_string()),
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Get the engine version.
///
/// # Returns
/// Static string pointer (do not free)
#[no_mangle]
pub extern "C" fn stockpile_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take(ptr: *mut c_char) -> serde_json::Value {
        let json = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        stockpile_string_free(ptr);
        serde_json::from_str(&json).unwrap()
    }

    unsafe fn loaded_store() -> *mut MemoryStore {
        let store = stockpile_store_new();
        let entries = CString::new(
            r#"{
                "products": [{"id": 1, "name": "Widget", "price": 9.99}],
                "orders": [{"id": 100, "total": 9.99, "paid": true}],
                "settings": {"currency": "EUR"}
            }"#,
        )
        .unwrap();
        let result = take(stockpile_store_load(store, entries.as_ptr()));
        assert_eq!(result["ok"], 3);
        store
    }

    #[test]
    fn ffi_export() {
        unsafe {
            let store = loaded_store();

            let names = CString::new(r#"["products", "settings"]"#).unwrap();
            let result = take(stockpile_export(store, names.as_ptr(), ptr::null()));
            assert_eq!(result["ok"], "# products\nid,name,price\n1,Widget,9.99");

            stockpile_store_free(store);
        }
    }

    #[test]
    fn ffi_backup_typed() {
        unsafe {
            let store = loaded_store();

            let options = CString::new(r#"{"typedHeader": true}"#).unwrap();
            let result = take(stockpile_backup(store, ptr::null(), options.as_ptr()));
            let text = result["ok"].as_str().unwrap();
            assert!(text.contains("# orders\nid:number,total:number,paid:boolean"));
            assert!(text.contains("# products\nid:number,name:string,price:number"));

            stockpile_store_free(store);
        }
    }

    #[test]
    fn ffi_import_and_dump() {
        unsafe {
            let store = loaded_store();

            let text = CString::new("# orders\nid,total,paid\n101,5,false\n\nbroken").unwrap();
            let result = take(stockpile_import(store, text.as_ptr(), ptr::null()));
            assert_eq!(result["ok"]["sectionsImported"], 1);
            assert_eq!(result["ok"]["skipped"].as_array().unwrap().len(), 1);

            let dump = take(stockpile_store_dump(store));
            assert_eq!(dump["ok"]["orders"].as_array().unwrap().len(), 2);
            assert_eq!(dump["ok"]["orders"][0]["id"], 101);

            stockpile_store_free(store);
        }
    }

    #[test]
    fn ffi_import_with_strategy() {
        unsafe {
            let store = loaded_store();

            let text = CString::new("# orders\nid,total,paid\n100,12,true").unwrap();
            let strategy = CString::new(r#"{"type": "replaceById", "key": "id"}"#).unwrap();
            let result = take(stockpile_import(store, text.as_ptr(), strategy.as_ptr()));
            assert_eq!(result["ok"]["sectionsImported"], 1);

            let dump = take(stockpile_store_dump(store));
            assert_eq!(dump["ok"]["orders"].as_array().unwrap().len(), 1);
            assert_eq!(dump["ok"]["orders"][0]["total"], 12);

            stockpile_store_free(store);
        }
    }

    #[test]
    fn ffi_version() {
        let version = stockpile_version();
        let version_str = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn ffi_error_handling() {
        unsafe {
            // Null store pointer
            let names = CString::new("[]").unwrap();
            let result = take(stockpile_export(ptr::null(), names.as_ptr(), ptr::null()));
            assert!(result["error"].is_string());

            // Invalid JSON
            let store = stockpile_store_new();
            let invalid = CString::new("not valid json").unwrap();
            let result = take(stockpile_store_load(store, invalid.as_ptr()));
            assert!(result["error"].as_str().unwrap().starts_with("parse error"));

            let text = CString::new("# a\nid\n1").unwrap();
            let result = take(stockpile_import(store, text.as_ptr(), invalid.as_ptr()));
            assert!(result["error"].is_string());

            stockpile_store_free(store);
        }
    }
}

//! FFI bindings for Synheart MindScore
//!
//! This module provides C-compatible functions for calling MindScore from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `mindscore_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::engine::{assess_to_json, ScoreEngine};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Assess a request against a model, both given as JSON, with the default configuration.
///
/// # Safety
/// - `model_json` and `request_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `mindscore_free_string`.
/// - Returns NULL on error; call `mindscore_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindscore_assess(
    model_json: *const c_char,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let model_str = match cstr_to_string(model_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model JSON string pointer");
            return ptr::null_mut();
        }
    };

    let request_str = match cstr_to_string(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid request JSON string pointer");
            return ptr::null_mut();
        }
    };

    match assess_to_json(model_str, request_str) {
        Ok(payload) => string_to_cstr(&payload),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Engine API
// ============================================================================

/// Opaque handle to a ScoreEngine
pub struct ScoreEngineHandle {
    engine: ScoreEngine,
}

/// Create an engine from a model JSON and an optional configuration JSON.
///
/// # Safety
/// - `model_json` must be a valid null-terminated C string.
/// - `config_json` must be a valid null-terminated C string or NULL (default configuration).
/// - Returns a pointer that must be freed with `mindscore_engine_free`.
/// - Returns NULL on error; call `mindscore_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindscore_engine_new(
    model_json: *const c_char,
    config_json: *const c_char,
) -> *mut ScoreEngineHandle {
    clear_last_error();

    let model_str = match cstr_to_string(model_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model JSON string pointer");
            return ptr::null_mut();
        }
    };

    let config = if config_json.is_null() {
        EngineConfig::default()
    } else {
        let config_str = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config JSON string pointer");
                return ptr::null_mut();
            }
        };
        match EngineConfig::from_json(&config_str) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match ScoreEngine::from_model_json(&model_str, config) {
        Ok(engine) => Box::into_raw(Box::new(ScoreEngineHandle { engine })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Assess a request JSON with an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `mindscore_engine_new`.
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `mindscore_free_string`.
/// - Returns NULL on error; call `mindscore_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindscore_engine_assess(
    engine: *const ScoreEngineHandle,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &*engine;

    let request_str = match cstr_to_string(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid request JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.engine.assess_json(&request_str) {
        Ok(payload) => string_to_cstr(&payload),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `mindscore_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mindscore_engine_free(engine: *mut ScoreEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by MindScore functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a MindScore function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mindscore_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next MindScore function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn mindscore_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the MindScore library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn mindscore_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

//! FFI bindings for git-big
//!
//! This module provides C-compatible functions for calling git-big from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `gitbig_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::GraphError;
use crate::input::ActivityInput;
use crate::pipeline::{parse_end_date, GraphArtifacts, GraphProcessor};
use crate::theme::{GraphTheme, Palette};

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

/// Convert a required C string; `None` for NULL or invalid UTF-8.
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Convert an optional C string; NULL maps to `Ok(None)`.
unsafe fn optional_cstr(ptr: *const c_char, what: &str) -> Result<Option<String>, String> {
    if ptr.is_null() {
        return Ok(None);
    }
    cstr_to_string(ptr)
        .map(Some)
        .ok_or_else(|| format!("Invalid {what} string"))
}

/// Convert a Rust string to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Shared body of the render entry points: parse, run, pick an output.
unsafe fn run_pipeline<F>(
    processor: &GraphProcessor,
    json: *const c_char,
    end_date: *const c_char,
    select: F,
) -> *mut c_char
where
    F: FnOnce(&GraphArtifacts) -> Result<String, GraphError>,
{
    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let end_str = match optional_cstr(end_date, "end date") {
        Ok(s) => s,
        Err(msg) => {
            set_last_error(&msg);
            return ptr::null_mut();
        }
    };

    let result = parse_end_date(end_str.as_deref()).and_then(|end| {
        let records = ActivityInput::parse_array(&json_str)?;
        let artifacts = processor.process(&records, end);
        select(&artifacts)
    });

    match result {
        Ok(output) => string_to_cstr(&output),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Turn a JSON array of activity records into the trailing-year levels JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - `end_date` may be NULL (today, UTC) or a `YYYY-MM-DD` C string.
/// - Returns a newly allocated string that must be freed with `gitbig_free_string`.
/// - Returns NULL on error; call `gitbig_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gitbig_activities_to_levels(
    json: *const c_char,
    end_date: *const c_char,
) -> *mut c_char {
    clear_last_error();
    run_pipeline(&GraphProcessor::new(), json, end_date, |artifacts| {
        artifacts.levels_json()
    })
}

/// Render a JSON array of activity records as an SVG graph.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - `end_date` may be NULL (today, UTC) or a `YYYY-MM-DD` C string.
/// - `theme` may be NULL (dark) or `"dark"` / `"light"`.
/// - Returns a newly allocated string that must be freed with `gitbig_free_string`.
/// - Returns NULL on error; call `gitbig_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gitbig_render_graph(
    json: *const c_char,
    end_date: *const c_char,
    theme: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let theme = match parse_theme(theme) {
        Ok(theme) => theme,
        Err(msg) => {
            set_last_error(&msg);
            return ptr::null_mut();
        }
    };

    run_pipeline(&GraphProcessor::new(), json, end_date, |artifacts| {
        Ok(artifacts.svg(theme).to_string())
    })
}

unsafe fn parse_theme(theme: *const c_char) -> Result<GraphTheme, String> {
    match optional_cstr(theme, "theme")? {
        Some(name) => name.parse::<GraphTheme>().map_err(|e| e.to_string()),
        None => Ok(GraphTheme::default()),
    }
}

/// Opaque handle to a GraphProcessor
pub struct GraphProcessorHandle {
    processor: GraphProcessor,
}

/// Create a processor with an optional title and palette.
///
/// # Safety
/// - `title` may be NULL or a valid null-terminated C string.
/// - `palette` may be NULL or five comma-separated hex colors.
/// - Must be freed with `gitbig_processor_free`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn gitbig_processor_new(
    title: *const c_char,
    palette: *const c_char,
) -> *mut GraphProcessorHandle {
    clear_last_error();

    let built = optional_cstr(title, "title").and_then(|title| {
        let mut processor = GraphProcessor::new();
        if let Some(title) = title {
            processor = processor.with_title(title);
        }
        if let Some(colors) = optional_cstr(palette, "palette")? {
            let palette = colors.parse::<Palette>().map_err(|e| e.to_string())?;
            processor = processor.with_palette(palette);
        }
        Ok(processor)
    });

    match built {
        Ok(processor) => Box::into_raw(Box::new(GraphProcessorHandle { processor })),
        Err(msg) => {
            set_last_error(&msg);
            ptr::null_mut()
        }
    }
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `gitbig_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn gitbig_processor_free(processor: *mut GraphProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Render with a configured processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `gitbig_processor_new`.
/// - `json`, `end_date` and `theme` follow `gitbig_render_graph`.
/// - Returns a newly allocated string that must be freed with `gitbig_free_string`.
/// - Returns NULL on error; call `gitbig_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gitbig_processor_render(
    processor: *const GraphProcessorHandle,
    json: *const c_char,
    end_date: *const c_char,
    theme: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }
    let handle = &*processor;

    let theme = match parse_theme(theme) {
        Ok(theme) => theme,
        Err(msg) => {
            set_last_error(&msg);
            return ptr::null_mut();
        }
    };

    run_pipeline(&handle.processor, json, end_date, |artifacts| {
        Ok(artifacts.svg(theme).to_string())
    })
}

/// Free a string returned by git-big functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a git-big function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn gitbig_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next git-big call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn gitbig_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn gitbig_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

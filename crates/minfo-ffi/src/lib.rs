//! C FFI surface for minfo.
//!
//! Pattern: opaque SessionHandle + C strings + JSON serialization.
//!
//! Any host with a C FFI (Python, Dart, Swift, Node.js) can drive a
//! session: open a handle, load files, read the result tree as JSON.
//! A handle must not be used from two threads at once.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use minfo_core::format::{self, DurationStyle, SizeUnit};
use minfo_core::{LanguageTable, Session, SessionConfig};

// ---------------------------------------------------------------------------
// Error handling (thread-local last error)
// ---------------------------------------------------------------------------

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_error(msg: String) {
    log::debug!("minfo-ffi: {}", msg);
    LAST_ERROR.with(|cell| *cell.borrow_mut() = Some(msg));
}

fn clear_error() {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = None);
}

/// Returns the last error message (caller frees with `minfo_string_free`).
#[no_mangle]
pub extern "C" fn minfo_last_error() -> *mut c_char {
    LAST_ERROR.with(|cell| {
        cell.borrow_mut()
            .take()
            .and_then(|s| CString::new(s).ok())
            .map(|s| s.into_raw())
            .unwrap_or(ptr::null_mut())
    })
}

/// Frees a string returned from minfo FFI.
///
/// # Safety
/// Must be a pointer returned from this FFI and not already freed.
#[no_mangle]
pub unsafe extern "C" fn minfo_string_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}

// ---------------------------------------------------------------------------
// Opaque handle
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct SessionHandle {
    _private: [u8; 0],
}

struct SessionHandleInner {
    session: Session,
}

fn into_handle(session: Session) -> *mut SessionHandle {
    Box::into_raw(Box::new(SessionHandleInner { session })) as *mut SessionHandle
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Opens a session over the native library. `config_json` may be NULL
/// for defaults. Returns an opaque handle, or NULL on error.
///
/// # Safety
/// `config_json` must be NULL or a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn minfo_session_open(config_json: *const c_char) -> *mut SessionHandle {
    clear_error();
    let config = if config_json.is_null() {
        SessionConfig::default()
    } else {
        let json = match read_cstr(config_json) {
            Ok(s) => s,
            Err(e) => {
                set_error(e);
                return ptr::null_mut();
            }
        };
        match SessionConfig::from_json(&json) {
            Ok(c) => c,
            Err(e) => {
                set_error(e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match Session::new(config) {
        Ok(session) => into_handle(session),
        Err(e) => {
            set_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Closes the session and releases the library handle.
#[no_mangle]
pub extern "C" fn minfo_session_close(handle: *mut SessionHandle) {
    if !handle.is_null() {
        let inner = unsafe { Box::from_raw(handle as *mut SessionHandleInner) };
        if let Err(e) = inner.session.close() {
            log::warn!("minfo-ffi: close failed: {}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Open `path` and extract its metadata. Returns 1 on success, 0 on error.
#[no_mangle]
pub extern "C" fn minfo_load(handle: *mut SessionHandle, path: *const c_char) -> i32 {
    clear_error();
    let session = match session_mut(handle) {
        Ok(s) => s,
        Err(e) => {
            set_error(e);
            return 0;
        }
    };
    let path = match read_cstr(path) {
        Ok(p) => p,
        Err(e) => {
            set_error(e);
            return 0;
        }
    };
    match session.open(&path) {
        Ok(_) => 1,
        Err(e) => {
            set_error(e.to_string());
            0
        }
    }
}

/// Result tree of the last load as JSON (caller frees).
#[no_mangle]
pub extern "C" fn minfo_result_tree(handle: *mut SessionHandle) -> *mut c_char {
    clear_error();
    match session_mut(handle) {
        Ok(s) => json_to_cstr(s.result_tree()),
        Err(e) => err_null(e),
    }
}

/// The library's formatted report for the loaded file (caller frees).
#[no_mangle]
pub extern "C" fn minfo_report(handle: *mut SessionHandle) -> *mut c_char {
    clear_error();
    let session = match session_mut(handle) {
        Ok(s) => s,
        Err(e) => return err_null(e),
    };
    match session.report_text() {
        Ok(text) => to_cstr(text),
        Err(e) => err_null(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Library version string (caller frees).
#[no_mangle]
pub extern "C" fn minfo_version(handle: *mut SessionHandle) -> *mut c_char {
    clear_error();
    let session = match session_mut(handle) {
        Ok(s) => s,
        Err(e) => return err_null(e),
    };
    match session.version() {
        Ok(v) => to_cstr(v),
        Err(e) => err_null(e.to_string()),
    }
}

/// Set a library option. Returns the library's reply (caller frees).
#[no_mangle]
pub extern "C" fn minfo_set_option(
    handle: *mut SessionHandle,
    name: *const c_char,
    value: *const c_char,
) -> *mut c_char {
    clear_error();
    let session = match session_mut(handle) {
        Ok(s) => s,
        Err(e) => return err_null(e),
    };
    let name = match read_cstr(name) {
        Ok(s) => s,
        Err(e) => return err_null(e),
    };
    let value = match read_cstr(value) {
        Ok(s) => s,
        Err(e) => return err_null(e),
    };
    match session.set_option(&name, &value) {
        Ok(reply) => to_cstr(reply),
        Err(e) => err_null(e.to_string()),
    }
}

/// Query a library option (caller frees).
#[no_mangle]
pub extern "C" fn minfo_get_option(handle: *mut SessionHandle, name: *const c_char) -> *mut c_char {
    clear_error();
    let session = match session_mut(handle) {
        Ok(s) => s,
        Err(e) => return err_null(e),
    };
    let name = match read_cstr(name) {
        Ok(s) => s,
        Err(e) => return err_null(e),
    };
    match session.option(&name) {
        Ok(value) => to_cstr(value),
        Err(e) => err_null(e.to_string()),
    }
}

/// Forward a `key;value` translation table. Non-zero `global` also makes
/// it the default for sessions opened later. Returns 1 on success.
#[no_mangle]
pub extern "C" fn minfo_set_language(
    handle: *mut SessionHandle,
    table: *const c_char,
    global: i32,
) -> i32 {
    clear_error();
    let session = match session_mut(handle) {
        Ok(s) => s,
        Err(e) => {
            set_error(e);
            return 0;
        }
    };
    let text = match read_cstr(table) {
        Ok(s) => s,
        Err(e) => {
            set_error(e);
            return 0;
        }
    };
    let result = LanguageTable::parse(&text).and_then(|t| session.set_language(&t, global != 0));
    match result {
        Ok(()) => 1,
        Err(e) => {
            set_error(e.to_string());
            0
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Render milliseconds. `style` is NULL or "" for `HH:MM:SS.mmm`, or one
/// of "hmsm", "hms", "hm" (caller frees).
///
/// # Safety
/// `style` must be NULL or a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn minfo_format_duration(milliseconds: u64, style: *const c_char) -> *mut c_char {
    clear_error();
    let style = if style.is_null() {
        DurationStyle::default()
    } else {
        match read_cstr(style).and_then(|s| s.parse::<DurationStyle>().map_err(|e| e.to_string())) {
            Ok(s) => s,
            Err(e) => return err_null(e),
        }
    };
    to_cstr(format::format_duration(milliseconds, style))
}

/// Render a byte count. `unit` is NULL for automatic scaling, or one of
/// "B", "KB", "MB", "GB", "TB". Non-zero `binary` divides by 1024
/// (caller frees).
///
/// # Safety
/// `unit` must be NULL or a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn minfo_human_size(
    bytes: u64,
    unit: *const c_char,
    decimals: u32,
    binary: i32,
) -> *mut c_char {
    clear_error();
    let unit = if unit.is_null() {
        None
    } else {
        match read_cstr(unit).and_then(|s| s.parse::<SizeUnit>().map_err(|e| e.to_string())) {
            Ok(u) => Some(u),
            Err(e) => return err_null(e),
        }
    };
    to_cstr(format::human_size(bytes, unit, decimals, binary != 0))
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Returns the FFI API version.
#[no_mangle]
pub extern "C" fn minfo_api_version() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn session_mut<'a>(handle: *mut SessionHandle) -> Result<&'a mut Session, String> {
    if handle.is_null() {
        return Err("null session handle".into());
    }
    let inner = unsafe { &mut *(handle as *mut SessionHandleInner) };
    Ok(&mut inner.session)
}

fn read_cstr(ptr: *const c_char) -> Result<String, String> {
    if ptr.is_null() {
        return Err("null string pointer".into());
    }
    unsafe {
        CStr::from_ptr(ptr)
            .to_str()
            .map(String::from)
            .map_err(|_| "invalid utf-8".into())
    }
}

fn json_to_cstr<T: serde::Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => to_cstr(json),
        Err(e) => err_null(e.to_string()),
    }
}

fn to_cstr(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(_) => err_null("string contains an interior NUL".into()),
    }
}

fn err_null(msg: String) -> *mut c_char {
    set_error(msg);
    ptr::null_mut()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use minfo_core::{MemoryBackend, MemoryMedia, MemoryStream, StreamKind};
    use once_cell::sync::Lazy;
    use std::ffi::CString;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const CATALOG: &str = "General\nFormat;Format used\nDuration;Play time\nAudio\nFormat;Format used\nBitRate;Bit rate\n";

    /// Open a memory-backed session with one registered file.
    /// Returns (dir, file path, handle).
    fn ffi_session() -> (TempDir, PathBuf, *mut SessionHandle) {
        let dir = TempDir::new().expect("tempdir");
        let file = dir.path().join("song.flac");
        std::fs::write(&file, b"fLaC").unwrap();

        let media = MemoryMedia::new()
            .stream(
                StreamKind::General,
                MemoryStream::new()
                    .field("Format", "FLAC")
                    .field("Duration", "240000")
                    .field("Duration/String3", "00:04:00.000"),
            )
            .stream(
                StreamKind::Audio,
                MemoryStream::new()
                    .field("Format", "FLAC")
                    .field("BitRate", "1411200")
                    .field("BitRate/String", "1 411 kb/s"),
            )
            .report("General\nFormat : FLAC\n");
        let backend = MemoryBackend::new(CATALOG)
            .with_version("MediaInfoLib - v24.01")
            .with_file(&file, media);
        let session = Session::with_backend(Box::new(backend), SessionConfig::default()).unwrap();
        (dir, file, into_handle(session))
    }

    /// Read a *mut c_char into a String and free it.
    fn read_ffi_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null(), "FFI returned null string");
        let s = unsafe { CStr::from_ptr(ptr).to_str().unwrap().to_string() };
        unsafe { minfo_string_free(ptr) };
        s
    }

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    #[test]
    fn ffi_api_version() {
        assert_eq!(minfo_api_version(), 1);
    }

    #[test]
    fn ffi_open_without_library_sets_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        std::env::set_var("MINFO_LIBRARY", "/nonexistent/libmediainfo.so");
        let handle = unsafe { minfo_session_open(ptr::null()) };
        std::env::remove_var("MINFO_LIBRARY");

        assert!(handle.is_null());
        let err = read_ffi_string(minfo_last_error());
        assert!(err.contains("libmediainfo"), "unexpected error: {err}");
    }

    #[test]
    fn ffi_open_rejects_bad_config() {
        let config = c("{not json");
        let handle = unsafe { minfo_session_open(config.as_ptr()) };
        assert!(handle.is_null());
        assert!(read_ffi_string(minfo_last_error()).starts_with("JSON error"));
    }

    #[test]
    fn ffi_null_handle_returns_error() {
        let path = c("/tmp/a.mkv");
        assert_eq!(minfo_load(ptr::null_mut(), path.as_ptr()), 0);
        let err = read_ffi_string(minfo_last_error());
        assert_eq!(err, "null session handle");

        assert!(minfo_result_tree(ptr::null_mut()).is_null());
        // Closing a null handle is a no-op.
        minfo_session_close(ptr::null_mut());
    }

    // -------------------------------------------------------------------
    // Extraction
    // -------------------------------------------------------------------

    #[test]
    fn ffi_load_and_read_tree() {
        let (_dir, file, handle) = ffi_session();
        let path = c(file.to_str().unwrap());
        assert_eq!(minfo_load(handle, path.as_ptr()), 1);

        let json = read_ffi_string(minfo_result_tree(handle));
        let tree: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(tree["General"][0]["Format"], "FLAC");
        assert_eq!(tree["General"][0]["Duration"], "00:04:00.000");
        assert_eq!(tree["Audio"][0]["BitRate"], "1 411 kb/s");
        assert!(tree.get("Video").is_none());

        minfo_session_close(handle);
    }

    #[test]
    fn ffi_load_missing_file_fails() {
        let (dir, _file, handle) = ffi_session();
        let path = c(dir.path().join("gone.flac").to_str().unwrap());
        assert_eq!(minfo_load(handle, path.as_ptr()), 0);
        let err = read_ffi_string(minfo_last_error());
        assert!(err.contains("no such file"));
        minfo_session_close(handle);
    }

    #[test]
    fn ffi_report_and_template() {
        let (_dir, file, handle) = ffi_session();
        assert!(minfo_report(handle).is_null());

        let path = c(file.to_str().unwrap());
        assert_eq!(minfo_load(handle, path.as_ptr()), 1);
        assert_eq!(read_ffi_string(minfo_report(handle)), "General\nFormat : FLAC\n");

        let name = c("ReportTemplate");
        let template = c("Audio;%Format% @ %BitRate%");
        read_ffi_string(minfo_set_option(handle, name.as_ptr(), template.as_ptr()));
        assert_eq!(read_ffi_string(minfo_report(handle)), "FLAC @ 1411200\n");

        minfo_session_close(handle);
    }

    // -------------------------------------------------------------------
    // Options
    // -------------------------------------------------------------------

    #[test]
    fn ffi_version_and_options() {
        let (_dir, _file, handle) = ffi_session();
        assert_eq!(read_ffi_string(minfo_version(handle)), "MediaInfoLib - v24.01");

        let name = c("ParseUnknownExtensions");
        assert_eq!(read_ffi_string(minfo_get_option(handle, name.as_ptr())), "1");
        minfo_session_close(handle);
    }

    #[test]
    fn ffi_set_language_local() {
        let (_dir, _file, handle) = ffi_session();
        let table = c("Format;Formato\n");
        assert_eq!(minfo_set_language(handle, table.as_ptr(), 0), 1);

        let name = c("Language");
        assert_eq!(read_ffi_string(minfo_get_option(handle, name.as_ptr())), "Format;Formato\n");

        let broken = c("no separator");
        assert_eq!(minfo_set_language(handle, broken.as_ptr(), 0), 0);
        assert!(read_ffi_string(minfo_last_error()).contains("line 1"));
        minfo_session_close(handle);
    }

    // -------------------------------------------------------------------
    // Formatting
    // -------------------------------------------------------------------

    #[test]
    fn ffi_format_duration() {
        let text = unsafe { minfo_format_duration(5_025_678, ptr::null()) };
        assert_eq!(read_ffi_string(text), "01:23:45.678");

        let style = c("bogus");
        assert!(unsafe { minfo_format_duration(1, style.as_ptr()) }.is_null());
        assert!(read_ffi_string(minfo_last_error()).contains("bogus"));
    }

    #[test]
    fn ffi_human_size() {
        let text = unsafe { minfo_human_size(512, ptr::null(), 2, 0) };
        assert_eq!(read_ffi_string(text), "512.00 B");

        let text = unsafe { minfo_human_size(5_982_664_375, ptr::null(), 2, 1) };
        assert_eq!(read_ffi_string(text), "5.57 GB");

        let unit = c("parsecs");
        assert!(unsafe { minfo_human_size(1, unit.as_ptr(), 2, 0) }.is_null());
    }

    #[test]
    fn ffi_string_free_null_safe() {
        unsafe { minfo_string_free(ptr::null_mut()) };
    }
}

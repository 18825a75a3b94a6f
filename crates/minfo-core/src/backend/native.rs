//! Native backend: `libmediainfo` resolved at runtime.
//!
//! Uses the narrow-string `MediaInfoA_*` entry points with the library's
//! charset set to UTF-8. Every returned string is owned by the library
//! and only valid until the next call on the same handle, so it is
//! copied out immediately.

use std::ffi::{c_void, CStr, CString, OsStr, OsString};
use std::os::raw::{c_char, c_int};
use std::path::Path;
use std::sync::Arc;

use libloading::Library;

use super::MediaBackend;
use crate::error::{Error, Result};
use crate::models::{InfoKind, StreamKind};
use crate::options;

/// Environment variable overriding the library location.
pub const LIBRARY_ENV: &str = "MINFO_LIBRARY";

#[cfg(target_os = "windows")]
const DEFAULT_NAMES: &[&str] = &["MediaInfo.dll"];
#[cfg(target_os = "macos")]
const DEFAULT_NAMES: &[&str] = &["libmediainfo.0.dylib", "libmediainfo.dylib"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const DEFAULT_NAMES: &[&str] = &["libmediainfo.so.0", "libmediainfo.so"];

/// `(size_t)-1`: "all streams" in `Count_Get`.
const ALL_STREAMS: usize = usize::MAX;

type NewFn = unsafe extern "C" fn() -> *mut c_void;
type DeleteFn = unsafe extern "C" fn(*mut c_void);
type OpenFn = unsafe extern "C" fn(*mut c_void, *const c_char) -> usize;
type CloseFn = unsafe extern "C" fn(*mut c_void);
type OptionFn = unsafe extern "C" fn(*mut c_void, *const c_char, *const c_char) -> *const c_char;
type InformFn = unsafe extern "C" fn(*mut c_void, usize) -> *const c_char;
type GetFn =
    unsafe extern "C" fn(*mut c_void, c_int, usize, *const c_char, c_int, c_int) -> *const c_char;
type GetIFn = unsafe extern "C" fn(*mut c_void, c_int, usize, usize, c_int) -> *const c_char;
type CountGetFn = unsafe extern "C" fn(*mut c_void, c_int, usize) -> usize;

struct Api {
    new: NewFn,
    delete: DeleteFn,
    open: OpenFn,
    close: CloseFn,
    option: OptionFn,
    inform: InformFn,
    get: GetFn,
    get_i: GetIFn,
    count_get: CountGetFn,
}

// ---------------------------------------------------------------------------
// Library
// ---------------------------------------------------------------------------

/// A loaded `libmediainfo`. Shared by every handle created from it.
pub struct NativeLibrary {
    api: Api,
    // Declared last: unloaded after nothing can call through `api`.
    _lib: Library,
}

impl NativeLibrary {
    /// Load from `MINFO_LIBRARY`, or else the platform's default names.
    pub fn load() -> Result<Arc<Self>> {
        if let Some(path) = std::env::var_os(LIBRARY_ENV) {
            return Self::load_from(path);
        }
        let mut failures = Vec::new();
        for name in DEFAULT_NAMES {
            match Self::load_from(name) {
                Ok(lib) => return Ok(lib),
                Err(e) => failures.push(e.to_string()),
            }
        }
        Err(Error::LibraryUnavailable(failures.join("; ")))
    }

    /// Load from an explicit file name or path.
    pub fn load_from(path: impl AsRef<OsStr>) -> Result<Arc<Self>> {
        let path: OsString = path.as_ref().to_owned();
        // SAFETY: loading runs the library's initializers; libmediainfo
        // has no load-time requirements beyond its own dependencies.
        let lib = unsafe { Library::new(&path) }.map_err(|e| {
            Error::LibraryUnavailable(format!("{}: {}", path.to_string_lossy(), e))
        })?;
        // SAFETY: the signatures below match MediaInfoDLL.h.
        let api = unsafe {
            Api {
                new: symbol(&lib, b"MediaInfoA_New\0")?,
                delete: symbol(&lib, b"MediaInfoA_Delete\0")?,
                open: symbol(&lib, b"MediaInfoA_Open\0")?,
                close: symbol(&lib, b"MediaInfoA_Close\0")?,
                option: symbol(&lib, b"MediaInfoA_Option\0")?,
                inform: symbol(&lib, b"MediaInfoA_Inform\0")?,
                get: symbol(&lib, b"MediaInfoA_Get\0")?,
                get_i: symbol(&lib, b"MediaInfoA_GetI\0")?,
                count_get: symbol(&lib, b"MediaInfoA_Count_Get\0")?,
            }
        };
        log::debug!("minfo: loaded {}", path.to_string_lossy());
        Ok(Arc::new(Self { api, _lib: lib }))
    }
}

unsafe fn symbol<T: Copy>(lib: &Library, name: &[u8]) -> Result<T> {
    lib.get::<T>(name).map(|s| *s).map_err(|e| {
        let name = String::from_utf8_lossy(&name[..name.len().saturating_sub(1)]);
        Error::LibraryUnavailable(format!("missing symbol {}: {}", name, e))
    })
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// One library handle. Closed and deleted exactly once, on drop.
pub struct NativeBackend {
    lib: Arc<NativeLibrary>,
    handle: *mut c_void,
}

impl NativeBackend {
    pub fn new(lib: Arc<NativeLibrary>) -> Result<Self> {
        // SAFETY: no preconditions.
        let handle = unsafe { (lib.api.new)() };
        if handle.is_null() {
            return Err(Error::LibraryUnavailable("MediaInfoA_New returned null".into()));
        }
        let mut backend = Self { lib, handle };
        backend.option(options::CHARSET, "UTF-8")?;
        Ok(backend)
    }

    /// Load the library with [`NativeLibrary::load`] and create a handle.
    pub fn open_default() -> Result<Self> {
        Self::new(NativeLibrary::load()?)
    }
}

impl Drop for NativeBackend {
    fn drop(&mut self) {
        // SAFETY: `handle` came from `MediaInfoA_New` and is released
        // only here.
        unsafe {
            (self.lib.api.close)(self.handle);
            (self.lib.api.delete)(self.handle);
        }
    }
}

impl MediaBackend for NativeBackend {
    fn open(&mut self, path: &Path) -> Result<bool> {
        let path = path
            .to_str()
            .ok_or_else(|| Error::InvalidInput(format!("non UTF-8 path: {}", path.display())))?;
        let c_path = to_cstring(path)?;
        // SAFETY: valid handle, NUL-terminated path.
        let opened = unsafe { (self.lib.api.open)(self.handle, c_path.as_ptr()) };
        Ok(opened != 0)
    }

    fn close(&mut self) -> Result<()> {
        // SAFETY: valid handle; closing with no input open is a no-op.
        unsafe { (self.lib.api.close)(self.handle) };
        Ok(())
    }

    fn option(&mut self, name: &str, value: &str) -> Result<String> {
        let c_name = to_cstring(name)?;
        let c_value = to_cstring(value)?;
        // SAFETY: valid handle and strings; result copied before return.
        unsafe {
            let out = (self.lib.api.option)(self.handle, c_name.as_ptr(), c_value.as_ptr());
            Ok(copy_out(out))
        }
    }

    fn inform(&self) -> Result<String> {
        // SAFETY: valid handle.
        unsafe { Ok(copy_out((self.lib.api.inform)(self.handle, 0))) }
    }

    fn count(&self, kind: StreamKind, stream: Option<usize>) -> Result<usize> {
        let stream = stream.unwrap_or(ALL_STREAMS);
        // SAFETY: valid handle; out-of-range values yield 0.
        Ok(unsafe { (self.lib.api.count_get)(self.handle, kind.as_raw(), stream) })
    }

    fn get(&self, kind: StreamKind, stream: usize, field: &str, info: InfoKind) -> Result<String> {
        let c_field = to_cstring(field)?;
        // SAFETY: valid handle and string; result copied before return.
        unsafe {
            let out = (self.lib.api.get)(
                self.handle,
                kind.as_raw(),
                stream,
                c_field.as_ptr(),
                info.as_raw(),
                InfoKind::Name.as_raw(),
            );
            Ok(copy_out(out))
        }
    }

    fn get_by_index(
        &self,
        kind: StreamKind,
        stream: usize,
        index: usize,
        info: InfoKind,
    ) -> Result<String> {
        // SAFETY: valid handle; result copied before return.
        unsafe {
            let out = (self.lib.api.get_i)(self.handle, kind.as_raw(), stream, index, info.as_raw());
            Ok(copy_out(out))
        }
    }
}

fn to_cstring(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::Library(format!("interior NUL in argument: {:?}", s)))
}

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn copy_out(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_unavailable() {
        let err = NativeLibrary::load_from("/nonexistent/libmediainfo.so").err().unwrap();
        assert!(matches!(err, Error::LibraryUnavailable(_)));
    }

    #[test]
    fn interior_nul_is_a_library_error() {
        assert!(matches!(to_cstring("a\0b"), Err(Error::Library(_))));
    }
}

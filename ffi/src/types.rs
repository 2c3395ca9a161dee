//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use hexfilter_core::error::ApiError;
use hexfilter_core::http::HttpMethod;

/// Opaque handle to a `QueryClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiFilterClient {
    pub(crate) inner: hexfilter_core::QueryClient,
}

/// Move `s` into a heap C string. Interior NULs yield an empty string.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `hexfilter_build_*` functions. The C caller executes the request
/// and passes the response back through `hexfilter_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: hexfilter_core::HttpRequest) -> *mut Self {
        let path = c_string(req.path);
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `hexfilter_parse_*` function. The FFI layer
/// reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiFilterResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidArgument = 1,
    InvalidHexColor = 2,
    ColorNotFound = 3,
    RemoteQuery = 4,
    MalformedResponse = 5,
    Transport = 6,
    Panic = 7,
    NullArg = 8,
}

impl From<&ApiError> for FfiErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::InvalidArgument(_) => FfiErrorCode::InvalidArgument,
            ApiError::InvalidHexColor(_) => FfiErrorCode::InvalidHexColor,
            ApiError::ColorNotFound { .. } => FfiErrorCode::ColorNotFound,
            ApiError::RemoteQuery(_) => FfiErrorCode::RemoteQuery,
            ApiError::MalformedResponse(_) => FfiErrorCode::MalformedResponse,
            ApiError::Transport(_) => FfiErrorCode::Transport,
        }
    }
}

/// What `FfiFilterResult::data` holds.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// A CSS filter value.
    Filter = 1,
    /// A JSON document.
    Json = 2,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data` is a
/// C string tagged by `data_tag`. On failure `error_code` describes the
/// category, `error_message` is a human-readable C string, and `data` is
/// null. `http_status` echoes the parsed response's status either way.
#[repr(C)]
pub struct FfiFilterResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_char,
}

impl FfiFilterResult {
    fn boxed(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    /// Build a success result carrying a string payload.
    pub(crate) fn ok(data_tag: FfiDataTag, data: String, http_status: u16) -> *mut Self {
        FfiFilterResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status,
            data_tag,
            data: c_string(data),
        }
        .boxed()
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError, http_status: u16) -> *mut Self {
        FfiFilterResult {
            error_code: FfiErrorCode::from(&err),
            error_message: c_string(err.to_string()),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
        .boxed()
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        FfiFilterResult {
            error_code: FfiErrorCode::NullArg,
            error_message: c_string(format!("null argument: {name}")),
            http_status: 0,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
        .boxed()
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        FfiFilterResult {
            error_code: FfiErrorCode::Panic,
            error_message: c_string(msg),
            http_status: 0,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
        .boxed()
    }
}

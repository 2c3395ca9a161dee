//! C-ABI wrapper around `hexfilter-core`.
//!
//! # Overview
//! Exposes the sans-IO half of the client through `extern "C"` functions so
//! any language with a C FFI can build lookup requests and turn the
//! responses into CSS filter values. The caller performs the HTTP POST.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `hexfilter_build_*` / `hexfilter_parse_*` mirror the core `QueryClient`.
//! - A single `FfiFilterResult` envelope with `FfiDataTag` + `char* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `hexfilter_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use hexfilter_core::{ClientOptions, FilterOptions, HexColor, HttpResponse, QueryClient, QueryOptions};

use types::*;

/// Borrow a C string as UTF-8. Null or invalid UTF-8 yields `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for `api_key`. `api_url` may be null to use the default
/// endpoint host.
///
/// Returns null if `api_key` is null or empty, or if an internal panic
/// occurs. The caller must free the returned pointer with
/// `hexfilter_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn hexfilter_client_new(
    api_key: *const c_char,
    api_url: *const c_char,
) -> *mut FfiFilterClient {
    catch_unwind(|| {
        let Some(key) = (unsafe { read_str(api_key) }) else {
            return std::ptr::null_mut();
        };
        let options = ClientOptions {
            api_url: unsafe { read_str(api_url) }.map(str::to_string),
            ..Default::default()
        };
        match QueryClient::new(key, options) {
            Ok(client) => Box::into_raw(Box::new(FfiFilterClient { inner: client })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `hexfilter_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hexfilter_client_free(client: *mut FfiFilterClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the POST for an arbitrary SQL statement.
///
/// Returns null if `client` or `sql` is null, or if `sql` is empty.
/// The caller must free the returned pointer with `hexfilter_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn hexfilter_build_query(
    client: *const FfiFilterClient,
    sql: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(sql) = (unsafe { read_str(sql) }) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_query(sql) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the POST that looks up `hex_color`.
///
/// Returns null if `client` or `hex_color` is null, or if `hex_color` is not
/// a 3- or 6-digit hex color.
#[unsafe(no_mangle)]
pub extern "C" fn hexfilter_build_color_lookup(
    client: *const FfiFilterClient,
    hex_color: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let color = match unsafe { read_str(hex_color) }.map(HexColor::parse) {
            Some(Ok(color)) => color,
            _ => return std::ptr::null_mut(),
        };
        FfiHttpRequest::from_core(client.inner.build_color_lookup(color))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as the empty string.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = unsafe { read_str(resp.body) }.unwrap_or("").to_string();
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Parse the response to a `hexfilter_build_query` request.
///
/// Returns a result with `data_tag = Json` on success; `data` is the
/// payload (or its first value when `get_first_value` is set) as JSON text.
#[unsafe(no_mangle)]
pub extern "C" fn hexfilter_parse_query(
    client: *const FfiFilterClient,
    response: *const FfiHttpResponse,
    get_first_value: bool,
) -> *mut FfiFilterResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiFilterResult::null_arg("client");
        }
        if response.is_null() {
            return FfiFilterResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        let status = core_resp.status;
        let options = QueryOptions { get_first_value };
        match client.inner.parse_query(core_resp, options) {
            Ok(value) => FfiFilterResult::ok(FfiDataTag::Json, value.to_string(), status),
            Err(e) => FfiFilterResult::from_error(e, status),
        }
    })
    .unwrap_or_else(|_| FfiFilterResult::panic("panic in hexfilter_parse_query"))
}

/// Parse the response to a `hexfilter_build_color_lookup` request into a CSS
/// filter value.
///
/// `hex_color` must be the color the request was built for. Returns a result
/// with `data_tag = Filter` on success.
#[unsafe(no_mangle)]
pub extern "C" fn hexfilter_parse_filter(
    client: *const FfiFilterClient,
    hex_color: *const c_char,
    response: *const FfiHttpResponse,
    filter_prefix: bool,
    pre_blacken: bool,
) -> *mut FfiFilterResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiFilterResult::null_arg("client");
        }
        if response.is_null() {
            return FfiFilterResult::null_arg("response");
        }
        let Some(hex) = (unsafe { read_str(hex_color) }) else {
            return FfiFilterResult::null_arg("hex_color");
        };
        let client = unsafe { &*client };
        let color = match HexColor::parse(hex) {
            Ok(color) => color,
            Err(e) => return FfiFilterResult::from_error(e, 0),
        };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        let status = core_resp.status;
        let options = FilterOptions {
            filter_prefix,
            pre_blacken,
        };
        match client.inner.parse_filter(core_resp, color, options) {
            Ok(filter) => FfiFilterResult::ok(FfiDataTag::Filter, filter, status),
            Err(e) => FfiFilterResult::from_error(e, status),
        }
    })
    .unwrap_or_else(|_| FfiFilterResult::panic("panic in hexfilter_parse_filter"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `hexfilter_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hexfilter_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiFilterResult` returned by any `hexfilter_parse_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hexfilter_free_result(result: *mut FfiFilterResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.data);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hexfilter_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    const ROW: &str = r#"[[
        {"Name":"id","Type":4,"Value":"4382381"},
        {"Name":"invert","Type":4,"Value":"66"},
        {"Name":"sepia","Type":4,"Value":"56"},
        {"Name":"saturate","Type":4,"Value":"416"},
        {"Name":"hue-rotate","Type":4,"Value":"110"},
        {"Name":"brightness","Type":4,"Value":"0"},
        {"Name":"contrast","Type":4,"Value":"100"},
        {"Name":"loss","Type":5,"Value":"0.2578769732"}
    ]]"#;

    fn new_client() -> *mut FfiFilterClient {
        let key = CString::new("testApiKey").unwrap();
        let url = CString::new("http://localhost:3000").unwrap();
        let client = hexfilter_client_new(key.as_ptr(), url.as_ptr());
        assert!(!client.is_null());
        client
    }

    fn c_str<'a>(ptr: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        hexfilter_client_free(client);
    }

    #[test]
    fn client_new_null_or_empty_key_returns_null() {
        assert!(hexfilter_client_new(std::ptr::null(), std::ptr::null()).is_null());
        let empty = CString::new("").unwrap();
        assert!(hexfilter_client_new(empty.as_ptr(), std::ptr::null()).is_null());
    }

    #[test]
    fn client_new_null_url_uses_default() {
        let key = CString::new("k").unwrap();
        let client = hexfilter_client_new(key.as_ptr(), std::ptr::null());
        let sql = CString::new("SELECT 1").unwrap();
        let req = hexfilter_build_query(client, sql.as_ptr());
        assert_eq!(c_str(unsafe { &*req }.path), "https://api.dbhub.io/v1/query");

        hexfilter_free_request(req);
        hexfilter_client_free(client);
    }

    #[test]
    fn client_free_null_is_safe() {
        hexfilter_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_color_lookup_returns_form_post() {
        let client = new_client();
        let hex = CString::new("#333").unwrap();
        let req = hexfilter_build_color_lookup(client, hex.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Post));
        assert_eq!(c_str(req_ref.path), "http://localhost:3000/v1/query");
        assert_eq!(req_ref.headers_len, 1);

        let header = unsafe { &*req_ref.headers };
        assert_eq!(c_str(header.key), "content-type");
        assert_eq!(c_str(header.value), "application/x-www-form-urlencoded");

        let body = c_str(req_ref.body);
        assert!(body.starts_with("apikey=testApiKey&dbowner=blakegearin&"));
        assert!(body.contains("&sql="));

        hexfilter_free_request(req);
        hexfilter_client_free(client);
    }

    #[test]
    fn build_color_lookup_invalid_hex_returns_null() {
        let client = new_client();
        let hex = CString::new("#3333").unwrap();
        assert!(hexfilter_build_color_lookup(client, hex.as_ptr()).is_null());
        assert!(hexfilter_build_color_lookup(client, std::ptr::null()).is_null());
        hexfilter_client_free(client);
    }

    #[test]
    fn build_query_empty_or_null_returns_null() {
        let client = new_client();
        let empty = CString::new("").unwrap();
        assert!(hexfilter_build_query(client, empty.as_ptr()).is_null());
        assert!(hexfilter_build_query(client, std::ptr::null()).is_null());
        assert!(hexfilter_build_query(std::ptr::null(), empty.as_ptr()).is_null());
        hexfilter_client_free(client);
    }

    #[test]
    fn parse_filter_success() {
        let client = new_client();
        let hex = CString::new("333").unwrap();
        let body = CString::new(ROW).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = hexfilter_parse_filter(client, hex.as_ptr(), &resp, true, false);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert_eq!(r.data_tag, FfiDataTag::Filter);
        assert_eq!(r.http_status, 200);
        assert_eq!(
            c_str(r.data),
            "filter: invert(66%) sepia(56%) saturate(416%) hue-rotate(110deg) contrast(100%)"
        );

        hexfilter_free_result(result);
        hexfilter_client_free(client);
    }

    #[test]
    fn parse_filter_not_found() {
        let client = new_client();
        let hex = CString::new("#333").unwrap();
        let body = CString::new("null").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = hexfilter_parse_filter(client, hex.as_ptr(), &resp, false, false);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::ColorNotFound);
        assert!(c_str(r.error_message).contains("#333333"));
        assert!(r.data.is_null());

        hexfilter_free_result(result);
        hexfilter_client_free(client);
    }

    #[test]
    fn parse_filter_remote_error_keeps_status() {
        let client = new_client();
        let hex = CString::new("#333").unwrap();
        let body = CString::new(r#"{"error":"bad query"}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 400,
            body: body.as_ptr(),
        };
        let result = hexfilter_parse_filter(client, hex.as_ptr(), &resp, false, false);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::RemoteQuery);
        assert_eq!(r.http_status, 400);
        assert!(c_str(r.error_message).contains("bad query"));

        hexfilter_free_result(result);
        hexfilter_client_free(client);
    }

    #[test]
    fn parse_filter_invalid_hex() {
        let client = new_client();
        let hex = CString::new("blue").unwrap();
        let body = CString::new(ROW).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = hexfilter_parse_filter(client, hex.as_ptr(), &resp, false, false);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::InvalidHexColor);

        hexfilter_free_result(result);
        hexfilter_client_free(client);
    }

    #[test]
    fn parse_query_first_value() {
        let client = new_client();
        let body = CString::new(r#"[[{"Value":"X"}]]"#).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = hexfilter_parse_query(client, &resp, true);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Json);
        assert_eq!(c_str(r.data), r#""X""#);

        hexfilter_free_result(result);
        hexfilter_client_free(client);
    }

    #[test]
    fn parse_query_returns_payload_as_json_text() {
        let client = new_client();
        let body = CString::new(r#"{"data":"stubbedResponse"}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = hexfilter_parse_query(client, &resp, true);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        let payload: serde_json::Value = serde_json::from_str(c_str(r.data)).unwrap();
        assert_eq!(payload["data"], "stubbedResponse");

        hexfilter_free_result(result);
        hexfilter_client_free(client);
    }

    #[test]
    fn parse_query_null_body_is_transport_error() {
        let client = new_client();
        let resp = FfiHttpResponse {
            status: 502,
            body: std::ptr::null(),
        };
        let result = hexfilter_parse_query(client, &resp, false);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Transport);

        hexfilter_free_result(result);
        hexfilter_client_free(client);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let body = CString::new("null").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = hexfilter_parse_query(std::ptr::null(), &resp, false);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        hexfilter_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = new_client();
        let hex = CString::new("#333").unwrap();
        let result = hexfilter_parse_filter(client, hex.as_ptr(), std::ptr::null(), false, false);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(c_str(r.error_message), "null argument: response");

        hexfilter_free_result(result);
        hexfilter_client_free(client);
    }

    #[test]
    fn free_request_null_is_safe() {
        hexfilter_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        hexfilter_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        hexfilter_free_string(std::ptr::null_mut());
    }
}

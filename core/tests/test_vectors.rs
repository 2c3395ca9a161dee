//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Form bodies are compared field by field after
//! decoding, and the `sql` field after base64-decoding, so the vectors stay
//! readable.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hexfilter_core::{
    ApiError, ClientOptions, FilterOptions, HexColor, HttpMethod, HttpRequest, HttpResponse,
    QueryClient, QueryOptions,
};
use serde_json::Value;
use url::form_urlencoded;

const BASE_URL: &str = "https://api.dbhub.io";

fn client() -> QueryClient {
    QueryClient::new("testApiKey", ClientOptions::default()).unwrap()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

/// Compare a built request with the vector's `expected_request`.
fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    let fields: Vec<(String, String)> =
        form_urlencoded::parse(req.body.as_deref().unwrap().as_bytes())
            .into_owned()
            .collect();
    let form = expected["form"].as_object().unwrap();
    assert_eq!(fields.len(), form.len(), "{name}: form field count");
    for (key, value) in &fields {
        let expected_value = form[key].as_str().unwrap();
        if key == "sql" {
            let decoded = String::from_utf8(BASE64.decode(value).unwrap()).unwrap();
            assert_eq!(decoded, expected_value, "{name}: sql");
        } else {
            assert_eq!(value, expected_value, "{name}: {key}");
        }
    }
}

fn assert_error(name: &str, err: &ApiError, case: &Value) {
    let kind = case["expected_error"].as_str().unwrap();
    let matched = match kind {
        "InvalidArgument" => matches!(err, ApiError::InvalidArgument(_)),
        "InvalidHexColor" => matches!(err, ApiError::InvalidHexColor(_)),
        "ColorNotFound" => matches!(err, ApiError::ColorNotFound { .. }),
        "RemoteQuery" => matches!(err, ApiError::RemoteQuery(_)),
        "MalformedResponse" => matches!(err, ApiError::MalformedResponse(_)),
        "Transport" => matches!(err, ApiError::Transport(_)),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: expected {kind}, got {err:?}");

    if let Some(message) = case.get("expected_message").and_then(Value::as_str) {
        if let ApiError::RemoteQuery(actual) = err {
            assert_eq!(actual, message, "{name}: message");
        }
    }
}

// ---------------------------------------------------------------------------
// Color lookup
// ---------------------------------------------------------------------------

#[test]
fn lookup_test_vectors() {
    let raw = include_str!("../../test-vectors/lookup.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let color = HexColor::parse(case["input"].as_str().unwrap()).unwrap();
        let options = FilterOptions {
            filter_prefix: case["options"]["filter_prefix"].as_bool().unwrap_or(false),
            pre_blacken: case["options"]["pre_blacken"].as_bool().unwrap_or(false),
        };

        // Verify build
        let req = c.build_color_lookup(color);
        assert_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_filter(simulated_response(case), color, options);
        if case.get("expected_error").is_some() {
            assert_error(name, &result.unwrap_err(), case);
        } else {
            assert_eq!(result.unwrap(), case["expected_result"].as_str().unwrap(), "{name}: filter");
        }
    }
}

// ---------------------------------------------------------------------------
// Hex validation
// ---------------------------------------------------------------------------

#[test]
fn invalid_hex_test_vectors() {
    let raw = include_str!("../../test-vectors/invalid_hex.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let input = case["input"].as_str().unwrap();
        let err = HexColor::parse(input).unwrap_err();
        assert_error(input, &err, case);
        if let ApiError::InvalidHexColor(original) = &err {
            assert_eq!(original, input, "{input}: carries original input");
        }
    }
}

// ---------------------------------------------------------------------------
// Raw query
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sql = case["sql"].as_str().unwrap();

        let req = match c.build_query(sql) {
            Ok(req) => req,
            Err(err) => {
                assert_error(name, &err, case);
                continue;
            }
        };
        assert_request(name, &req, &case["expected_request"]);

        let options = QueryOptions {
            get_first_value: case["get_first_value"].as_bool().unwrap_or(false),
        };
        let value = c.parse_query(simulated_response(case), options).unwrap();
        assert_eq!(value, case["expected_result"], "{name}: parsed result");
    }
}

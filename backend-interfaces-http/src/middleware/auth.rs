use std::io::Read;

use anyhow::Result;
use axum::http::HeaderMap;
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;

use backend_domain::RuntimeConfig;

pub const ACTOR_HEADER: &str = "X-Actor-Id";
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

pub fn actor_id(headers: &HeaderMap) -> Option<String> {
    header_text(headers, ACTOR_HEADER)
}

pub fn idempotency_key(headers: &HeaderMap) -> Option<String> {
    header_text(headers, IDEMPOTENCY_HEADER)
}

/// Decodes a JSON body, gunzipping it first when sent with
/// `Content-Encoding: gzip`.
pub fn parse_json_body<T: DeserializeOwned>(headers: &HeaderMap, body: &[u8]) -> Result<T> {
    let content = maybe_gunzip(headers, body)?;
    Ok(serde_json::from_str(&content)?)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let mut decoder = GzDecoder::new(body);
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

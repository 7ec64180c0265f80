use serde::de::DeserializeOwned;
use log::warn;

use crate::common::Request;
use crate::error::Error;

/// Content-Typeの許容範囲を判定（拡張しやすい実装）
pub fn is_json_like_content_type(ct: &str) -> bool {
    let main_type = ct
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    // 明示リスト（将来拡張しやすい）
    const EXTRA_ALLOWED: &[&str] = &[
        // RFC 7464 JSON Text Sequences
        "application/json-seq",
    ];

    main_type == "application/json"
        || main_type.ends_with("+json")
        || EXTRA_ALLOWED.contains(&main_type.as_str())
}

/// 空でないボディのみContent-Typeを検証してJSONとしてデコードする
pub fn decode_json_body<T: DeserializeOwned>(req: &Request) -> Result<Option<T>, Error> {
    let has_non_empty_body = req.body.as_ref().map(|b| !b.is_empty()).unwrap_or(false);
    if !has_non_empty_body {
        return Ok(None);
    }

    let ct = req.header("content-type").ok_or_else(|| {
        warn!("Request with body missing Content-Type header");
        Error::InvalidRequestBody("Missing Content-Type header".to_string())
    })?;

    if !is_json_like_content_type(ct) {
        warn!("Unsupported Content-Type for JSON parsing: {}", ct);
        return Err(Error::InvalidRequestBody(format!(
            "Unsupported Content-Type: {} (expected application/json or *+json)",
            ct
        )));
    }

    req.json::<T>().map(Some)
}

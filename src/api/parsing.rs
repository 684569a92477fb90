use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::BotError;
use crate::slack::Interaction;

pub fn is_interactive_body(body: &str) -> bool {
    body.starts_with("payload=") || body.contains("&payload=")
}

/// Decode an `application/x-www-form-urlencoded` component (`+` is a space).
pub fn decode_form_component(raw: &str) -> Result<String, BotError> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| BotError::ParseError(format!("Failed to decode payload: {e}")))
}

pub fn parse_interactive_payload(form_body: &str) -> Result<Value, BotError> {
    for pair in form_body.split('&') {
        if let Some((key, raw_val)) = pair.split_once('=')
            && key == "payload"
        {
            let decoded = decode_form_component(raw_val)?;
            return serde_json::from_str(&decoded)
                .map_err(|e| BotError::ParseError(format!("Invalid JSON payload: {e}")));
        }
    }
    Err(BotError::ParseError("Missing payload field".to_string()))
}

/// Slack posts interactions form-encoded; raw JSON bodies are accepted too.
pub fn parse_interaction(body: &str) -> Result<Interaction, BotError> {
    let value = if is_interactive_body(body) {
        parse_interactive_payload(body)?
    } else {
        serde_json::from_str(body)
            .map_err(|e| BotError::ParseError(format!("Invalid JSON payload: {e}")))?
    };
    serde_json::from_value(value)
        .map_err(|e| BotError::ParseError(format!("Unrecognized interaction: {e}")))
}

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Request path of an API Gateway event (HTTP API v2 or REST v1).
pub fn request_path(payload: &Value) -> Option<&str> {
    v_str(payload, &["rawPath"]).or_else(|| v_str(payload, &["path"]))
}

/// Raw request body, base64-decoded when API Gateway flagged it as binary.
pub fn extract_body(payload: &Value) -> Result<String, BotError> {
    let Some(body) = payload.get("body") else {
        return Ok(String::new());
    };
    let Some(body) = body.as_str() else {
        return Err(BotError::ParseError("Invalid body format".to_string()));
    };

    let is_base64 = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !is_base64 {
        return Ok(body.to_string());
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| BotError::ParseError(format!("Invalid base64 body: {e}")))?;
    String::from_utf8(bytes).map_err(|e| BotError::ParseError(format!("Body is not UTF-8: {e}")))
}

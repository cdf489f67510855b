use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

/// Header Telegram attaches to webhook calls when a secret was registered.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Verify the webhook secret header.
/// Returns true if no secret is configured or if the header matches.
pub fn verify_secret(headers: &HeaderMap, expected: &Option<String>) -> bool {
    let expected = match expected {
        Some(t) => t,
        None => return true,
    };

    match headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok()) {
        Some(provided) => constant_time_eq(provided.as_bytes(), expected.as_bytes()),
        None => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

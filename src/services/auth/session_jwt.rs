//! Session JWT claim extraction (unverified).
//!
//! This module only *reads* the payload segment of a session JWT. It does not
//! check the signature, `iss`, `aud`, or `exp`. Verification against the issuer's
//! JWKS (`Config::jwks_url`) is expected to replace `decode_subject` later; the
//! middleware call site does not need to change when that happens.

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Standard alphabet, padding required, lenient about trailing bits.
///
/// The payload is normalized (re-padded, URL-safe chars translated) before it
/// reaches this engine.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("expected 3 token segments, got {0}")]
    SegmentCount(usize),
    #[error("payload is not valid base64url")]
    PayloadEncoding,
    #[error("payload is not a JSON object")]
    PayloadJson,
    #[error("missing 'sub' claim")]
    MissingSub,
    #[error("'sub' claim is not a string")]
    NonStringSub,
    #[error("empty 'sub' claim")]
    EmptySub,
}

/// Extract the `sub` claim from a session JWT without verifying it.
pub fn decode_subject(token: &str) -> Result<String, SessionTokenError> {
    let claims = decode_claims(token)?;

    match claims.get("sub") {
        None | Some(Value::Null) => Err(SessionTokenError::MissingSub),
        Some(Value::String(sub)) if sub.is_empty() => Err(SessionTokenError::EmptySub),
        Some(Value::String(sub)) => Ok(sub.clone()),
        Some(_) => Err(SessionTokenError::NonStringSub),
    }
}

/// Decode the payload segment (header.payload.signature) into a claims map.
pub fn decode_claims(token: &str) -> Result<Map<String, Value>, SessionTokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_header, payload, _signature] = segments.as_slice() else {
        return Err(SessionTokenError::SegmentCount(segments.len()));
    };

    let bytes = decode_base64url(payload)?;

    // Bad UTF-8 and unpaired surrogate escapes become U+FFFD instead of failing
    // the whole payload; only the `sub` claim matters here.
    let text = String::from_utf8_lossy(&bytes);
    let text = replace_lone_surrogates(&text);

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(claims)) => Ok(claims),
        _ => Err(SessionTokenError::PayloadJson),
    }
}

// `\uD800` without its pair -> `\uFFFD`. Well-formed pairs are left alone.
fn replace_lone_surrogates(json: &str) -> Cow<'_, str> {
    if !json.contains("\\u") {
        return Cow::Borrowed(json);
    }

    let bytes = json.as_bytes();
    let mut out = String::with_capacity(json.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }

        let Some(unit) = escaped_unit(bytes, i) else {
            // `\\`, `\"`, ... : skip the escaped char as well
            i += 2;
            continue;
        };

        match unit {
            0xD800..=0xDBFF if matches!(escaped_unit(bytes, i + 6), Some(0xDC00..=0xDFFF)) => {
                i += 12;
            }
            0xD800..=0xDFFF => {
                out.push_str(&json[copied..i]);
                out.push_str("\\uFFFD");
                i += 6;
                copied = i;
            }
            _ => i += 6,
        }
    }

    if copied == 0 {
        return Cow::Borrowed(json);
    }
    out.push_str(&json[copied..]);
    Cow::Owned(out)
}

// Code unit of a `\uXXXX` escape starting at `at`.
fn escaped_unit(bytes: &[u8], at: usize) -> Option<u16> {
    let escape = bytes.get(at..at + 6)?;
    if !escape.starts_with(b"\\u") || !escape[2..].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }

    std::str::from_utf8(&escape[2..])
        .ok()
        .and_then(|hex| u16::from_str_radix(hex, 16).ok())
}

// base64url (padding optional) -> bytes
fn decode_base64url(segment: &str) -> Result<Vec<u8>, SessionTokenError> {
    let mut normalized: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let rem = normalized.len() % 4;
    if rem != 0 {
        normalized.extend(std::iter::repeat_n('=', 4 - rem));
    }

    PAYLOAD_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|_| SessionTokenError::PayloadEncoding)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    /// Build an unsigned demo token around the given JSON payload.
    pub(crate) fn token_with_payload(payload: &str) -> String {
        token_with_raw_payload(payload.as_bytes())
    }

    fn token_with_raw_payload(payload: &[u8]) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(payload);
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn extracts_string_sub() {
        let token = token_with_payload(r#"{"sub":"user-123"}"#);
        assert_eq!(decode_subject(&token).as_deref(), Ok("user-123"));
    }

    #[test]
    fn ignores_other_claims() {
        let token =
            token_with_payload(r#"{"sub":"user-test-1","exp":1,"iss":"https://elsewhere"}"#);
        assert_eq!(decode_subject(&token).as_deref(), Ok("user-test-1"));
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert_eq!(
            decode_subject("only.two"),
            Err(SessionTokenError::SegmentCount(2))
        );
        assert_eq!(
            decode_subject("a.b.c.d"),
            Err(SessionTokenError::SegmentCount(4))
        );
        assert_eq!(
            decode_subject("no-dots-at-all"),
            Err(SessionTokenError::SegmentCount(1))
        );
    }

    #[test]
    fn restores_missing_padding() {
        // {"sub":"ab"} is 12 bytes -> 16 chars padded, no '=' needed.
        // {"sub":"abc"} is 13 bytes -> needs "==" when padded.
        let token = token_with_payload(r#"{"sub":"abc"}"#);
        let payload = token.split('.').nth(1).unwrap();
        assert_ne!(payload.len() % 4, 0);
        assert_eq!(decode_subject(&token).as_deref(), Ok("abc"));
    }

    #[test]
    fn accepts_already_padded_payload() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(br#"{"sub":"abc"}"#);
        assert!(payload.ends_with('='));
        let token = format!("h.{payload}.s");
        assert_eq!(decode_subject(&token).as_deref(), Ok("abc"));
    }

    #[test]
    fn translates_url_safe_alphabet() {
        // A run of '~' always lands an aligned triple on '-'.
        let json = r#"{"sub":"a?>>?b","note":"~~~~~~"}"#;
        let payload = URL_SAFE_NO_PAD.encode(json.as_bytes());
        assert!(payload.contains('-') || payload.contains('_'));
        let token = format!("h.{payload}.s");
        assert_eq!(decode_subject(&token).as_deref(), Ok("a?>>?b"));
    }

    #[test]
    fn rejects_bad_base64() {
        assert_eq!(
            decode_subject("h.!!!not-base64!!!.s"),
            Err(SessionTokenError::PayloadEncoding)
        );
        // A single leftover char can never be valid base64.
        assert_eq!(
            decode_subject("h.abcde.s"),
            Err(SessionTokenError::PayloadEncoding)
        );
    }

    #[test]
    fn rejects_non_json_payload() {
        let token = token_with_payload("not json");
        assert_eq!(decode_subject(&token), Err(SessionTokenError::PayloadJson));
    }

    #[test]
    fn rejects_json_that_is_not_an_object() {
        let token = token_with_payload(r#"["sub","user-123"]"#);
        assert_eq!(decode_subject(&token), Err(SessionTokenError::PayloadJson));
    }

    #[test]
    fn rejects_missing_sub() {
        let token = token_with_payload(r#"{"iss":"x"}"#);
        assert_eq!(decode_subject(&token), Err(SessionTokenError::MissingSub));

        let token = token_with_payload(r#"{"sub":null}"#);
        assert_eq!(decode_subject(&token), Err(SessionTokenError::MissingSub));
    }

    #[test]
    fn rejects_non_string_sub() {
        let token = token_with_payload(r#"{"sub":123}"#);
        assert_eq!(decode_subject(&token), Err(SessionTokenError::NonStringSub));

        let token = token_with_payload(r#"{"sub":{"id":"user-123"}}"#);
        assert_eq!(decode_subject(&token), Err(SessionTokenError::NonStringSub));
    }

    #[test]
    fn rejects_empty_sub() {
        let token = token_with_payload(r#"{"sub":""}"#);
        assert_eq!(decode_subject(&token), Err(SessionTokenError::EmptySub));
    }

    #[test]
    fn invalid_utf8_elsewhere_does_not_hide_sub() {
        let token = token_with_raw_payload(b"{\"sub\":\"user-123\",\"name\":\"\xff\"}");
        assert_eq!(decode_subject(&token).as_deref(), Ok("user-123"));
    }

    #[test]
    fn invalid_utf8_in_sub_is_replaced() {
        let token = token_with_raw_payload(b"{\"sub\":\"u\xffx\"}");
        assert_eq!(decode_subject(&token).as_deref(), Ok("u\u{FFFD}x"));
    }

    #[test]
    fn lone_surrogate_elsewhere_does_not_hide_sub() {
        let token = token_with_payload(r#"{"sub":"user-123","x":"\ud800"}"#);
        assert_eq!(decode_subject(&token).as_deref(), Ok("user-123"));

        let token = token_with_payload(r#"{"sub":"user-123","x":"\udc00\ud800z"}"#);
        assert_eq!(decode_subject(&token).as_deref(), Ok("user-123"));
    }

    #[test]
    fn lone_surrogate_in_sub_is_replaced() {
        let token = token_with_payload(r#"{"sub":"a\ud800b"}"#);
        assert_eq!(decode_subject(&token).as_deref(), Ok("a\u{FFFD}b"));
    }

    #[test]
    fn surrogate_pairs_and_escaped_backslashes_are_kept() {
        let token = token_with_payload(r#"{"sub":"\ud83d\ude00"}"#);
        assert_eq!(decode_subject(&token).as_deref(), Ok("\u{1F600}"));

        let token = token_with_payload(r#"{"sub":"\\ud800"}"#);
        assert_eq!(decode_subject(&token).as_deref(), Ok(r"\ud800"));
    }

    #[test]
    fn lone_surrogate_rewrite() {
        assert_eq!(replace_lone_surrogates(r#"{"a":"b"}"#), r#"{"a":"b"}"#);
        assert_eq!(
            replace_lone_surrogates(r#""\ud800A""#),
            r#""\uFFFDA""#
        );
        assert!(matches!(
            replace_lone_surrogates(r#""\u0041""#),
            Cow::Borrowed(_)
        ));
    }
}

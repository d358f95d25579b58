use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::Sha256;

use crate::error::{AsinError, Result};
use crate::params::Params;

type HmacSha256 = Hmac<Sha256>;

/// Everything except `A-Z a-z 0-9 - . _ ~` is escaped. Space is left alone
/// here and turned into `+` by [`form_encode`].
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b' ');

/// Form-encodes a value: unreserved characters pass through, space becomes
/// `+`, every other byte becomes `%XX` (uppercase hex).
pub(crate) fn form_encode(s: &str) -> String {
    utf8_percent_encode(s, FORM_ENCODE_SET)
        .to_string()
        .replace(' ', "+")
}

/// Sorts `key=value` pairs as plain strings, joins them with `&` and turns
/// the form-encoded spaces into `%20`.
///
/// The sort runs before the `+` replacement, so a space orders after every
/// `%XX` escape.
fn canonicalize(mut pairs: Vec<String>) -> String {
    pairs.sort();
    pairs.join("&").replace('+', "%20")
}

/// Builds the canonical query string for a parameter set.
///
/// Keys are emitted verbatim, values are list-joined and form-encoded.
pub(crate) fn canonical_query(params: &Params) -> String {
    let pairs = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, form_encode(&value.to_query_value())))
        .collect();
    canonicalize(pairs)
}

/// The string covered by the signature: method, host, path and query on
/// separate lines, without a trailing newline.
pub(crate) fn string_to_sign(host: &str, path: &str, canonical_query: &str) -> String {
    format!("GET\n{}\n{}\n{}", host, path, canonical_query)
}

/// HMAC-SHA256 of `string_to_sign` keyed with `secret`, base64 encoded.
pub(crate) fn compute_signature(string_to_sign: &str, secret: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AsinError::Signature(format!("HMAC key error: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(BASE64.encode(digest).trim_end_matches('\n').to_string())
}

/// Signs a complete parameter set for `GET {host}{path}`.
///
/// Returns `{canonical_query}&Signature={encoded_signature}`, ready to be
/// appended to `http://{host}{path}?`.
pub(crate) fn sign_query(host: &str, path: &str, params: &Params, secret: &str) -> Result<String> {
    let query = canonical_query(params);
    let signature = compute_signature(&string_to_sign(host, path, &query), secret)?;
    Ok(format!("{}&Signature={}", query, form_encode(&signature)))
}

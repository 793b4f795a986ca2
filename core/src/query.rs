//! Query string encoding.
//!
//! Keys and values are encoded independently with the
//! `application/x-www-form-urlencoded` byte rules: ASCII alphanumerics and
//! `*-._` pass through, a space becomes `+`, and every other UTF-8 byte is
//! written as an uppercase `%XX` escape. The encoding is total.

use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::error::TransportError;

/// Encode parameters as `key=value` pairs joined by `&`.
///
/// Pairs appear in iteration order. An empty input yields an empty string.
pub fn encode_query_parameters<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut encoded = String::new();
    for (key, value) in params {
        if !encoded.is_empty() {
            encoded.push('&');
        }
        encoded.extend(byte_serialize(key.as_ref().as_bytes()));
        encoded.push('=');
        encoded.extend(byte_serialize(value.as_ref().as_bytes()));
    }
    encoded
}

/// Append the encoded query to `target` after a literal `?` and validate
/// the result as an absolute URL.
///
/// No `?` is added when there are no parameters.
pub fn build_target_url<I, K, V>(target: &str, params: I) -> Result<String, TransportError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let query = encode_query_parameters(params);
    let url = if query.is_empty() {
        target.to_string()
    } else {
        format!("{target}?{query}")
    };

    Url::parse(&url).map_err(|source| TransportError::MalformedTarget {
        url: url.clone(),
        source,
    })?;
    Ok(url)
}

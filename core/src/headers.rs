//! Case-insensitive header helpers.
//!
//! Header maps are ordered `(name, value)` lists. Request headers carry plain
//! strings, response headers carry [`HeaderValue`]s; both work here through
//! [`HeaderLookup`].

use crate::http::HeaderValue;

pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// A header value that can yield a single string for lookups.
pub trait HeaderLookup {
    fn first_value(&self) -> Option<&str>;
}

impl HeaderLookup for String {
    fn first_value(&self) -> Option<&str> {
        Some(self)
    }
}

impl HeaderLookup for HeaderValue {
    fn first_value(&self) -> Option<&str> {
        self.first()
    }
}

/// Find a header by name, ignoring ASCII case.
///
/// The first entry whose name matches wins. Repeated headers yield their first
/// element.
pub fn lookup<'a, V: HeaderLookup>(headers: &'a [(String, V)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.first_value())
}

/// Whether any header has the given name, ignoring ASCII case.
pub fn contains<V>(headers: &[(String, V)], name: &str) -> bool {
    headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name))
}

/// Return a copy with every name lower-cased and values untouched.
///
/// Names that collide after lower-casing collapse into one entry: the later
/// value wins and the entry stays where the first spelling appeared.
pub fn lowercase_keys<V: Clone>(headers: &[(String, V)]) -> Vec<(String, V)> {
    let mut out: Vec<(String, V)> = Vec::with_capacity(headers.len());
    for (key, value) in headers {
        let key = key.to_ascii_lowercase();
        match out.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value.clone(),
            None => out.push((key, value.clone())),
        }
    }
    out
}

//! HTTP transport

mod client;

pub use client::{HttpClient, HttpClientBuilder};

const SNIPPET_CHARS: usize = 256;

/// Leading part of a response body, for debug logs.
pub(crate) fn body_snippet(body: &str) -> &str {
    let end = body.char_indices().nth(SNIPPET_CHARS).map_or(body.len(), |(index, _)| index);
    &body[..end]
}

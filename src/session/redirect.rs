//! `?next=` bookkeeping across the login redirect.
//!
//! The remembered path is only ever overwritten, never cleared: reading it does
//! not consume it.

use crate::session::page::KeyValueStore;
use url::{Url, form_urlencoded};

const NEXT_PARAM: &str = "next";

/// Non-empty `next` query parameter of `location`.
pub(crate) fn next_param(location: &Url) -> Option<String> {
    location
        .query_pairs()
        .find(|(key, _)| key == NEXT_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Store the page's `next` parameter, if it has one. Returns what was stored.
pub(crate) fn remember_next_param(
    location: &Url,
    storage: &dyn KeyValueStore,
    key: &str,
) -> Option<String> {
    let next = next_param(location)?;
    storage.set(key, &next);
    Some(next)
}

/// `login_page?next=<current path>`, with the path percent-encoded.
pub(crate) fn login_href(login_page: &str, current_path: &str) -> String {
    let next: String = form_urlencoded::byte_serialize(current_path.as_bytes()).collect();
    format!("{login_page}?{NEXT_PARAM}={next}")
}

/// Remembered destination, or `default` when none (or an empty one) is stored.
pub(crate) fn redirect_target(storage: &dyn KeyValueStore, key: &str, default: &str) -> String {
    storage
        .get(key)
        .filter(|target| !target.is_empty())
        .unwrap_or_else(|| default.to_string())
}

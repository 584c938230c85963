//! URL handling module
//!
//! This module provides href normalization against a page origin and the
//! canonical form used as the visited-set key.

mod normalize;

pub use normalize::{canonicalize, normalize};

use ::url::Url;

/// Returns the authority (host plus explicit port) of a parsed URL
///
/// Relative hrefs found on a page are resolved against this value, so a page
/// served from `127.0.0.1:8080` keeps its port in discovered links.
pub fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

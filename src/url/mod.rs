//! URL handling: link normalization and host comparison.

use url::Url;

use crate::{UrlError, UrlResult};

/// Normalizes a link for visited-set membership and fetching.
///
/// Strips the fragment and rejects anything that is not an absolute HTTP(S)
/// URL with a host. Two links that differ only in their fragment normalize
/// to the same URL.
///
/// # Examples
///
/// ```
/// use linkrot::url::normalize_link;
///
/// let url = normalize_link("https://example.com/page#section").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_link(raw: &str) -> UrlResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

/// True when both URLs point at the same host and port.
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

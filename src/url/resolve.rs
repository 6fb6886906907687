use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a discovered reference against the page that contained it
///
/// `reference` may be absolute (`https://other.org/x`), scheme-relative
/// (`//cdn.example.com/a.js`), root-relative (`/about`) or path-relative
/// (`img.png`, `../up`). Resolution follows the WHATWG URL standard: scheme and
/// host are inherited from `base`, dot segments are removed, and the query and
/// fragment come from the reference.
///
/// No further canonicalization happens. The fragment is kept and the scheme is
/// not filtered.
///
/// # Arguments
///
/// * `reference` - The raw attribute value found in the page
/// * `base` - The absolute URL of the page the reference was found on
///
/// # Returns
///
/// * `Ok(Url)` - The absolute URL
/// * `Err(UrlError::Base)` - `base` is not an absolute URL
/// * `Err(UrlError::Parse)` - `reference` cannot be resolved
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::resolve;
///
/// let url = resolve("img.png", "http://example.com/dir/page.html").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/dir/img.png");
///
/// let url = resolve("/abs", "http://example.com/dir/page.html").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/abs");
/// ```
pub fn resolve(reference: &str, base: &str) -> UrlResult<Url> {
    let base_url = Url::parse(base).map_err(|e| UrlError::Base {
        base: base.to_string(),
        reason: e.to_string(),
    })?;

    resolve_against(reference, &base_url)
}

/// Resolves a reference against an already-parsed base URL
pub fn resolve_against(reference: &str, base: &Url) -> UrlResult<Url> {
    base.join(reference).map_err(|e| UrlError::Parse {
        reference: reference.to_string(),
        reason: e.to_string(),
    })
}

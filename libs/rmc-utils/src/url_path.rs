use thiserror::Error;
use url::Url;

/// The base URL cannot carry a path (e.g. `mailto:` or `data:` URLs).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("URL '{base}' cannot be used as a base")]
pub struct UrlPathError {
    base: String,
}

/// Append path segments to `base`, keeping any path prefix it already has.
///
/// Unlike [`Url::join`], a base without a trailing slash is not truncated:
/// `https://h/gw` + `["v1", "catalog"]` yields `https://h/gw/v1/catalog`.
/// Query and fragment of the base are dropped.
///
/// # Errors
///
/// Returns [`UrlPathError`] if `base` cannot be a base URL.
pub fn append_path(base: &Url, segments: &[&str]) -> Result<Url, UrlPathError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut path = url.path_segments_mut().map_err(|()| UrlPathError {
            base: base.to_string(),
        })?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

//! Cache key generation.
//!
//! Keys are derived from the normalized URL, plus the raw body for `POST`.
//! Query parameters are sorted by name and each parameter's values are sorted,
//! so parameter order never changes the key.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::http::{header, uri::PathAndQuery, Method, Request, Uri};
use url::form_urlencoded;

use crate::error::Result;

// == Query Normalization ==
/// Sorts a raw query string and strips the refresh parameter.
///
/// Returns the re-encoded query and whether the refresh parameter was present.
/// A refresh key of `None` or `""` disables refresh detection.
pub fn normalize_query(query: &str, refresh_key: Option<&str>) -> (String, bool) {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(name.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    let refreshed = refresh_key
        .filter(|key| !key.is_empty())
        .is_some_and(|key| params.remove(key).is_some());

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, values) in &mut params {
        values.sort();
        for value in values.iter() {
            serializer.append_pair(name, value);
        }
    }

    (serializer.finish(), refreshed)
}

/// Applies [`normalize_query`] to a request URI.
///
/// URIs without a query are returned unchanged.
pub fn normalize_uri(uri: &Uri, refresh_key: Option<&str>) -> (Uri, bool) {
    let Some(query) = uri.query() else {
        return (uri.clone(), false);
    };

    let (normalized, refreshed) = normalize_query(query, refresh_key);
    let rebuilt = if normalized.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), normalized)
    };

    let Ok(path_and_query) = rebuilt.parse::<PathAndQuery>() else {
        return (uri.clone(), refreshed);
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);

    match Uri::from_parts(parts) {
        Ok(uri) => (uri, refreshed),
        Err(_) => (uri.clone(), refreshed),
    }
}

// == Absolute URL ==
/// Renders the request URL in absolute form.
///
/// Origin-form URIs are qualified with the `Host` header when present.
pub fn absolute_url<B>(request: &Request<B>) -> String {
    let uri = request.uri();
    if uri.scheme().is_some() {
        return uri.to_string();
    }

    let path_and_query = uri
        .path_and_query()
        .map(PathAndQuery::as_str)
        .unwrap_or("/");

    match request
        .headers()
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
    {
        Some(host) => format!("http://{}{}", host, path_and_query),
        None => path_and_query.to_string(),
    }
}

// == Default Strategies ==
/// Default key function.
///
/// The key is the absolute URL; `POST` requests append their raw body. The
/// body is already buffered, so this never fails.
pub fn generate_key(request: &Request<Bytes>) -> Result<String> {
    let url = absolute_url(request);

    if request.method() == Method::POST {
        return Ok(format!("{}{}", url, String::from_utf8_lossy(request.body())));
    }

    Ok(url)
}

/// Default cacheability predicate: only `GET` requests are cached.
pub fn is_cacheable<B>(request: &Request<B>) -> bool {
    request.method() == Method::GET
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str, body: &'static str) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    #[test]
    fn test_normalize_sorts_names_and_values() {
        assert_eq!(normalize_query("b=2&a=1", None).0, "a=1&b=2");
        assert_eq!(normalize_query("x=2&x=1", None).0, "x=1&x=2");
        assert_eq!(
            normalize_query("zaz=baz&baz=zaz", None),
            normalize_query("baz=zaz&zaz=baz", None)
        );
    }

    #[test]
    fn test_normalize_strips_refresh_key() {
        let (query, refreshed) = normalize_query("a=1&rk=true&b=2", Some("rk"));
        assert_eq!(query, "a=1&b=2");
        assert!(refreshed);

        let (query, refreshed) = normalize_query("rk", Some("rk"));
        assert_eq!(query, "");
        assert!(refreshed);
    }

    #[test]
    fn test_normalize_without_refresh_key_keeps_params() {
        let (query, refreshed) = normalize_query("rk=1", None);
        assert_eq!(query, "rk=1");
        assert!(!refreshed);

        let (_, refreshed) = normalize_query("=1", Some(""));
        assert!(!refreshed);
    }

    #[test]
    fn test_normalize_reencodes_values() {
        let (query, _) = normalize_query("q=hello%20world&a=%26", None);
        assert_eq!(query, "a=%26&q=hello+world");
    }

    #[test]
    fn test_normalize_uri() {
        let uri: Uri = "http://foo.bar/test-3?zaz=baz&baz=zaz&rk".parse().unwrap();
        let (normalized, refreshed) = normalize_uri(&uri, Some("rk"));

        assert_eq!(normalized.to_string(), "http://foo.bar/test-3?baz=zaz&zaz=baz");
        assert!(refreshed);
    }

    #[test]
    fn test_normalize_uri_drops_empty_query() {
        let uri: Uri = "/path?refresh=1".parse().unwrap();
        let (normalized, refreshed) = normalize_uri(&uri, Some("refresh"));

        assert_eq!(normalized.to_string(), "/path");
        assert!(refreshed);
    }

    #[test]
    fn test_normalize_uri_without_query() {
        let uri: Uri = "/path".parse().unwrap();
        assert_eq!(normalize_uri(&uri, Some("rk")), (uri.clone(), false));
    }

    #[test]
    fn test_generate_key_get() {
        let first = request(Method::GET, "http://x/y?a=1&b=2", "");
        assert_eq!(generate_key(&first).unwrap(), "http://x/y?a=1&b=2");
    }

    #[test]
    fn test_generate_key_post_appends_body() {
        let post = request(Method::POST, "http://foo.bar/test-2", "{\"id\":1}");
        assert_eq!(
            generate_key(&post).unwrap(),
            "http://foo.bar/test-2{\"id\":1}"
        );

        let put = request(Method::PUT, "http://foo.bar/test-2", "{\"id\":1}");
        assert_eq!(generate_key(&put).unwrap(), "http://foo.bar/test-2");
    }

    #[test]
    fn test_absolute_url_uses_host_header() {
        let req = Request::builder()
            .uri("/y?a=1")
            .header(header::HOST, "x.test")
            .body(())
            .unwrap();
        assert_eq!(absolute_url(&req), "http://x.test/y?a=1");

        let bare = Request::builder().uri("/y").body(()).unwrap();
        assert_eq!(absolute_url(&bare), "/y");
    }

    #[test]
    fn test_default_cacheability() {
        assert!(is_cacheable(&request(Method::GET, "/", "")));
        assert!(!is_cacheable(&request(Method::POST, "/", "")));
        assert!(!is_cacheable(&request(Method::DELETE, "/", "")));
    }
}

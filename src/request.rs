//! Turns endpoints into concrete HTTP requests. Nothing here performs I/O.

use crate::config::ApplicationConfig;
use crate::endpoint::{Endpoint, ResultShape};
use crate::error::{Error, Result};
use crate::oauth::Authorization;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

pub const LANG_PARAM: &str = "lang";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub type QueryParams = BTreeMap<String, String>;

/// A fully resolved request, ready for a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Endpoint URL without the query string.
    pub url: Url,
    pub query: QueryParams,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// The URL including the query parameters.
    pub fn url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        url
    }

    /// The bearer token attached to this request, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }
}

/// Add the configured locale as `lang` unless the caller already set one.
pub fn with_locale(mut query: QueryParams, config: &ApplicationConfig) -> QueryParams {
    query
        .entry(LANG_PARAM.to_owned())
        .or_insert_with(|| config.locale().to_string());
    query
}

/// Build a request for `endpoint`.
///
/// Only the access token of `authorization` is attached, as a bearer header.
///
/// # Errors
///
/// - [`Error::MalformedEndpoint`] if `path_args` does not fill the template.
/// - [`Error::InvalidPathArgument`] if a path argument is empty, `.` or `..`.
/// - [`Error::InvalidRequest`] if the access token cannot be sent as a header.
pub fn build(
    config: &ApplicationConfig,
    endpoint: &Endpoint,
    path_args: &[&str],
    query: QueryParams,
    authorization: Option<&Authorization>,
) -> Result<HttpRequest> {
    let url = config.url_for(&endpoint.resolve_path(path_args)?)?;

    let mut headers = HeaderMap::new();
    if matches!(endpoint.shape, ResultShape::JsonObject | ResultShape::JsonArray) {
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    }
    if let Some(authorization) = authorization {
        headers.insert(AUTHORIZATION, bearer(endpoint, authorization.access_token())?);
    }

    Ok(HttpRequest {
        method: endpoint.method.clone(),
        url,
        query,
        headers,
        body: None,
    })
}

/// Build a token endpoint request whose body is `form`, URL-encoded in field order.
pub(crate) fn form(
    config: &ApplicationConfig,
    endpoint: &Endpoint,
    form: &impl Serialize,
) -> Result<HttpRequest> {
    let body = serde_urlencoded::to_string(form).map_err(|e| Error::InvalidRequest {
        endpoint: endpoint.name,
        message: format!("could not encode form: {e}"),
    })?;

    let mut request = build(config, endpoint, &[], QueryParams::new(), None)?;
    request
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    request.body = Some(body.into_bytes());
    Ok(request)
}

fn bearer(endpoint: &Endpoint, token: &str) -> Result<HeaderValue> {
    let mut value =
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| Error::InvalidRequest {
            endpoint: endpoint.name,
            message: "access token contains characters not allowed in a header".into(),
        })?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use crate::endpoint::{COURSE_GROUPS, DEGREES, PERSON};

    fn config() -> ApplicationConfig {
        ApplicationConfig::new(
            "key",
            "secret",
            "https://app.example/callback",
            "https://fenix.example",
        )
        .unwrap()
        .with_locale(Locale::new("en", "US"))
    }

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn locale_is_added_when_missing() {
        let merged = with_locale(query(&[("academicTerm", "2023/2024")]), &config());
        assert_eq!(merged.get("lang").map(String::as_str), Some("en-US"));
        assert_eq!(merged.get("academicTerm").map(String::as_str), Some("2023/2024"));
    }

    #[test]
    fn caller_lang_is_not_overwritten() {
        let merged = with_locale(query(&[("lang", "pt-PT")]), &config());
        assert_eq!(merged.get("lang").map(String::as_str), Some("pt-PT"));
    }

    #[test]
    fn builds_url_with_query() {
        let request = build(
            &config(),
            &COURSE_GROUPS,
            &["42"],
            query(&[("lang", "en-US")]),
            None,
        )
        .unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://fenix.example/api/fenix/v1/courses/42/groups?lang=en-US"
        );
        assert!(request.body.is_none());
        assert!(request.bearer_token().is_none());
    }

    #[test]
    fn attaches_only_the_access_token() {
        let authorization = Authorization::new("access-1", "refresh-1");
        let request = build(&config(), &PERSON, &[], QueryParams::new(), Some(&authorization))
            .unwrap();

        assert_eq!(request.bearer_token(), Some("access-1"));
        let everything = format!("{:?} {}", request.headers, request.url());
        assert!(!everything.contains("refresh-1"));
        assert!(!everything.contains("access-1"), "bearer header must be sensitive");
    }

    #[test]
    fn building_is_deterministic() {
        let authorization = Authorization::new("a", "r");
        let params = query(&[("b", "2"), ("a", "1"), ("lang", "en-US")]);
        let first = build(&config(), &DEGREES, &[], params.clone(), Some(&authorization)).unwrap();
        let second = build(&config(), &DEGREES, &[], params, Some(&authorization)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.url(), second.url());
    }

    #[test]
    fn unusable_access_token_is_a_request_error() {
        let authorization = Authorization::new("bad\ntoken", "r");
        match build(&config(), &PERSON, &[], QueryParams::new(), Some(&authorization)) {
            Err(Error::InvalidRequest { endpoint, message }) => {
                assert_eq!(endpoint, "PERSON");
                assert!(!message.contains("bad"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn malformed_endpoint_yields_no_request() {
        let result = build(&config(), &DEGREES, &["unexpected"], QueryParams::new(), None);
        assert!(matches!(
            result,
            Err(Error::MalformedEndpoint { expected: 0, actual: 1, .. })
        ));
    }
}

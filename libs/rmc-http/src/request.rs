use crate::client::{BufferedService, map_buffer_error, try_acquire_buffer_slot};
use crate::config::TransportSecurity;
use crate::error::{HttpError, UrlProblem};
use crate::response::HttpResponse;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::Request;
use http_body_util::Full;
use serde::Serialize;
use std::time::Duration;
use tower::Service;

#[derive(Debug)]
enum Body {
    Empty,
    Json(Bytes),
    Form(Bytes),
}

impl Body {
    fn content_type(&self) -> Option<&'static str> {
        match self {
            Body::Empty => None,
            Body::Json(_) => Some("application/json"),
            Body::Form(_) => Some("application/x-www-form-urlencoded"),
        }
    }

    fn into_bytes(self) -> Bytes {
        match self {
            Body::Empty => Bytes::new(),
            Body::Json(b) | Body::Form(b) => b,
        }
    }
}

/// Builder for a single outbound request
///
/// Header errors are deferred and surface from [`send`](Self::send) (or
/// from [`json`](Self::json)/[`form`](Self::form), which already return a
/// `Result`).
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    request_timeout: Duration,
    transport: TransportSecurity,
    method: http::Method,
    url: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Body,
    error: Option<HttpError>,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        request_timeout: Duration,
        transport: TransportSecurity,
        method: http::Method,
        url: &str,
    ) -> Self {
        Self {
            service,
            max_body_size,
            request_timeout,
            transport,
            method,
            url: url.to_owned(),
            headers: Vec::new(),
            body: Body::Empty,
            error: None,
        }
    }

    /// Add a header.
    pub fn header(self, name: &str, value: &str) -> Self {
        self.push_header(name, value, false)
    }

    /// Add a header whose value must never be logged (credentials).
    pub fn sensitive_header(self, name: &str, value: &str) -> Self {
        self.push_header(name, value, true)
    }

    fn push_header(mut self, name: &str, value: &str, sensitive: bool) -> Self {
        if self.error.is_some() {
            return self;
        }
        let parsed = HeaderName::try_from(name)
            .map_err(HttpError::from)
            .and_then(|n| Ok((n, HeaderValue::try_from(value)?)));
        match parsed {
            Ok((name, mut value)) => {
                value.set_sensitive(sensitive);
                self.headers.push((name, value));
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Serialize `body` as the JSON request body.
    ///
    /// # Errors
    /// Returns a deferred header error or `HttpError::Json`
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.body = Body::Json(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// Encode `fields` as an `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    /// Returns a deferred header error or `HttpError::FormEncode`
    pub fn form(mut self, fields: &[(&str, &str)]) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.body = Body::Form(Bytes::from(serde_urlencoded::to_string(fields)?));
        Ok(self)
    }

    fn validate_url(&self) -> Result<http::Uri, HttpError> {
        let invalid = |problem, reason: String| HttpError::InvalidUrl {
            url: self.url.clone(),
            problem,
            reason,
        };

        let uri: http::Uri = self
            .url
            .parse()
            .map_err(|e: http::uri::InvalidUri| invalid(UrlProblem::Malformed, e.to_string()))?;

        if uri.authority().is_none() {
            return Err(invalid(
                UrlProblem::NoHost,
                "no host".to_owned(),
            ));
        }

        match (uri.scheme_str(), self.transport) {
            (Some("https"), _) | (Some("http"), TransportSecurity::AllowInsecureHttp) => Ok(uri),
            (Some("http"), TransportSecurity::TlsOnly) => Err(HttpError::InvalidScheme {
                scheme: "http".to_owned(),
                reason: "plain HTTP is disabled; use https".to_owned(),
            }),
            (Some(other), _) => Err(HttpError::InvalidScheme {
                scheme: other.to_owned(),
                reason: "only http:// and https:// schemes are supported".to_owned(),
            }),
            (None, _) => Err(invalid(
                UrlProblem::NotAbsolute,
                "relative URL".to_owned(),
            )),
        }
    }

    /// Send the request.
    ///
    /// Resolves to `Ok` for every HTTP status; only transport, timeout and
    /// validation failures are errors.
    ///
    /// # Errors
    /// Returns the deferred builder error, URL validation errors,
    /// `HttpError::Overloaded` when the buffer is full, or transport errors
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        let uri = self.validate_url()?;

        let mut builder = Request::builder().method(self.method).uri(uri);
        let has_content_type = self.headers.iter().any(|(n, _)| n == CONTENT_TYPE);
        if !has_content_type && let Some(ct) = self.body.content_type() {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        let request = builder.body(Full::new(self.body.into_bytes()))?;

        // Headers are bounded by the timeout layer; the body read gets
        // whatever is left of the same budget.
        let deadline = tokio::time::Instant::now().checked_add(self.request_timeout);

        try_acquire_buffer_slot(&mut self.service).await?;
        let inner = self.service.call(request).await.map_err(map_buffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
            deadline,
            request_timeout: self.request_timeout,
        })
    }
}

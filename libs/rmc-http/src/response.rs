use crate::error::{BoxError, HttpError};
use crate::security::ERROR_BODY_PREVIEW_LIMIT;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Boxed response body type used by the client stack
pub type ResponseBody = http_body_util::combinators::BoxBody<Bytes, BoxError>;

/// HTTP response with size-limited body readers
///
/// `send()` yields this for every status code. Non-2xx statuses only become
/// errors through the checked readers ([`checked_bytes`](Self::checked_bytes),
/// [`json`](Self::json)). Body reads share the request's timeout budget.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
    /// `None` when the timeout is too large to represent.
    pub(crate) deadline: Option<tokio::time::Instant>,
    pub(crate) request_timeout: Duration,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Read the whole body regardless of status.
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` past the size limit,
    /// `HttpError::Timeout` once the request deadline passes, or a transport
    /// error
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        let limit = self.max_body_size;
        self.read_body(limit).await
    }

    /// Read the body as (lossy) UTF-8 regardless of status.
    ///
    /// # Errors
    /// Same as [`bytes`](Self::bytes)
    pub async fn text(self) -> Result<String, HttpError> {
        let body = self.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Read the body, failing with a preview of it on non-2xx status.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` for non-2xx, otherwise as [`bytes`](Self::bytes)
    pub async fn checked_bytes(self) -> Result<Bytes, HttpError> {
        let status = self.inner.status();
        if status.is_success() {
            return self.bytes().await;
        }

        let limit = self.max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
        let body_preview = match self.read_body(limit).await {
            Ok(body) => String::from_utf8_lossy(&body).into_owned(),
            Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
            Err(e) => return Err(e),
        };
        Err(HttpError::HttpStatus {
            status,
            body_preview,
        })
    }

    /// Deserialize a 2xx JSON body.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` for non-2xx and `HttpError::Json` for bad JSON
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = self.checked_bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl HttpResponse {
    async fn read_body(self, limit: usize) -> Result<Bytes, HttpError> {
        let read = read_limited(self.inner, limit);
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, read)
                .await
                .map_err(|_| HttpError::Timeout(self.request_timeout))?,
            None => read.await,
        }
    }
}

async fn read_limited(response: Response<ResponseBody>, limit: usize) -> Result<Bytes, HttpError> {
    let mut body = response.into_body();
    let mut collected = Vec::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            let total = collected.len() + chunk.len();
            if total > limit {
                return Err(HttpError::BodyTooLarge {
                    limit,
                    actual: total,
                });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::{Body, Frame};
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Body that never yields a frame, like a server stuck after the headers.
    struct Stalled;

    impl Body for Stalled {
        type Data = Bytes;
        type Error = BoxError;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
            Poll::Pending
        }
    }

    fn wrap(status: u16, body: ResponseBody, limit: usize, timeout: Duration) -> HttpResponse {
        let inner = Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        HttpResponse {
            inner,
            max_body_size: limit,
            deadline: tokio::time::Instant::now().checked_add(timeout),
            request_timeout: timeout,
        }
    }

    fn response(status: u16, body: &'static str, limit: usize) -> HttpResponse {
        let body: ResponseBody = Full::new(Bytes::from_static(body.as_bytes()))
            .map_err(|never| -> BoxError { match never {} })
            .boxed();
        wrap(status, body, limit, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn checked_bytes_carries_error_body_preview() {
        let err = response(400, r#"{"error":"bad"}"#, 1024)
            .checked_bytes()
            .await
            .unwrap_err();
        match err {
            HttpError::HttpStatus {
                status,
                body_preview,
            } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body_preview, r#"{"error":"bad"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn text_reads_error_bodies() {
        let text = response(500, "boom", 1024).text().await.unwrap();
        assert_eq!(text, "boom");
    }

    #[tokio::test]
    async fn body_limit_is_enforced() {
        let err = response(200, "0123456789", 4).bytes().await.unwrap_err();
        assert!(matches!(err, HttpError::BodyTooLarge { limit: 4, .. }));
    }

    #[tokio::test]
    async fn json_rejects_non_json_success_body() {
        let err = response(200, "<html>", 1024)
            .json::<serde_json::Value>()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Json(_)));
    }

    #[tokio::test]
    async fn stalled_body_hits_the_request_deadline() {
        let resp = wrap(200, Stalled.boxed(), 1024, Duration::from_millis(50));
        let err = resp.bytes().await.unwrap_err();
        assert!(
            matches!(err, HttpError::Timeout(d) if d == Duration::from_millis(50)),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn stalled_error_body_hits_the_request_deadline() {
        let resp = wrap(502, Stalled.boxed(), 1024, Duration::from_millis(50));
        let err = resp.checked_bytes().await.unwrap_err();
        assert!(matches!(err, HttpError::Timeout(_)), "{err:?}");
    }
}

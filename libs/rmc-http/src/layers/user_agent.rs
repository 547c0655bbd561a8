use crate::error::HttpError;
use http::{HeaderValue, Request, header::USER_AGENT};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower layer that stamps a `User-Agent` header on outgoing requests
#[derive(Clone, Debug)]
pub struct UserAgentLayer {
    value: HeaderValue,
}

impl UserAgentLayer {
    /// # Errors
    /// Returns `HttpError::InvalidHeader` if `user_agent` is not a valid header value
    pub fn try_new(user_agent: &str) -> Result<Self, HttpError> {
        Ok(Self {
            value: HeaderValue::from_str(user_agent)?,
        })
    }
}

impl<S> Layer<S> for UserAgentLayer {
    type Service = UserAgentService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UserAgentService {
            inner,
            value: self.value.clone(),
        }
    }
}

/// Service produced by [`UserAgentLayer`]
#[derive(Clone, Debug)]
pub struct UserAgentService<S> {
    inner: S,
    value: HeaderValue,
}

impl<S, B> Service<Request<B>> for UserAgentService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        // A caller-supplied User-Agent wins
        req.headers_mut()
            .entry(USER_AGENT)
            .or_insert_with(|| self.value.clone());
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{ServiceExt, service_fn};

    async fn echo_ua(req: Request<()>) -> Result<Option<HeaderValue>, Infallible> {
        Ok(req.headers().get(USER_AGENT).cloned())
    }

    #[tokio::test]
    async fn adds_user_agent_when_missing() {
        let svc = UserAgentLayer::try_new("rmc-query/1.0")
            .unwrap()
            .layer(service_fn(echo_ua));

        let ua = svc.oneshot(Request::new(())).await.unwrap();
        assert_eq!(ua.unwrap(), "rmc-query/1.0");
    }

    #[tokio::test]
    async fn keeps_caller_user_agent() {
        let svc = UserAgentLayer::try_new("rmc-query/1.0")
            .unwrap()
            .layer(service_fn(echo_ua));

        let req = Request::builder()
            .header(USER_AGENT, "custom/2.0")
            .body(())
            .unwrap();
        let ua = svc.oneshot(req).await.unwrap();
        assert_eq!(ua.unwrap(), "custom/2.0");
    }

    #[test]
    fn rejects_invalid_value() {
        let err = UserAgentLayer::try_new("bad\nagent").unwrap_err();
        assert!(matches!(err, HttpError::InvalidHeader(_)));
    }
}

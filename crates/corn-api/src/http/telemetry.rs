//! HTTP metrics middleware for request counting.
//!
//! Requests are counted per matched route (falling back to the raw path) and
//! status code; server errors are additionally logged with their request id.
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use crate::http::constants::HEADER_REQUEST_ID;
use axum::extract::MatchedPath;
use axum::http::Request;
use corn_telemetry::{Metrics, with_request_context};
use tower::{Layer, Service};
use tracing::warn;

/// Wraps HTTP services to record request metrics per route and status code.
#[derive(Clone)]
pub(crate) struct HttpMetricsLayer {
    telemetry: Metrics,
}

impl HttpMetricsLayer {
    pub(crate) const fn new(telemetry: Metrics) -> Self {
        Self { telemetry }
    }
}

impl<S> Layer<S> for HttpMetricsLayer {
    type Service = HttpMetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpMetricsService {
            inner,
            telemetry: self.telemetry.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct HttpMetricsService<S> {
    inner: S,
    telemetry: Metrics,
}

impl<S, B> Service<Request<B>> for HttpMetricsService<S>
where
    S: Service<Request<B>, Response = axum::response::Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let route = req.extensions().get::<MatchedPath>().map_or_else(
            || req.uri().path().to_string(),
            |matched| matched.as_str().to_string(),
        );
        let request_id = req
            .headers()
            .get(HEADER_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let telemetry = self.telemetry.clone();
        let fut = self.inner.call(req);

        Box::pin(async move {
            with_request_context(request_id, route.clone(), async move {
                let response = fut.await?;
                let status = response.status();
                telemetry.inc_http_request(&route, status.as_u16());
                if status.is_server_error() {
                    warn!(
                        route = %route,
                        status = status.as_u16(),
                        request_id = %request_id_for_log(),
                        "request failed"
                    );
                }
                Ok(response)
            })
            .await
        })
    }
}

fn request_id_for_log() -> String {
    corn_telemetry::current_request_id().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use std::convert::Infallible;
    use tower::ServiceExt;

    #[tokio::test]
    async fn counts_requests_by_path_and_status() -> Result<()> {
        let metrics = Metrics::new()?;
        let inner = tower::service_fn(|_req: Request<Body>| async {
            Ok::<Response, Infallible>(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        });
        let service = HttpMetricsLayer::new(metrics.clone()).layer(inner);

        let request = Request::builder()
            .uri("/service/zip")
            .header(HEADER_REQUEST_ID, "req-1")
            .body(Body::empty())?;
        let response = service.oneshot(request).await?;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let rendered = metrics.render()?;
        assert!(rendered.contains("route=\"/service/zip\""));
        assert!(rendered.contains("code=\"500\""));
        Ok(())
    }
}

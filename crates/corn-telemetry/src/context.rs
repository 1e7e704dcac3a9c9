//! Span context shared by the HTTP surface and the archive pipeline.
//!
//! # Design
//! - The request id and matched route live in task-local storage for the
//!   lifetime of one HTTP request.
//! - Pipeline work runs on the blocking pool, where task-locals are not
//!   visible; [`pipeline_span`] captures them into a span before the hop.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tracing::Span;
use tracing::span::EnteredSpan;

use crate::init::build_sha;

/// Keeps the process-wide `corn` span entered while the service runs.
pub struct ServiceSpanGuard {
    _span: EnteredSpan,
}

impl ServiceSpanGuard {
    /// Enter the service span, tagged with the workspace root and build.
    #[must_use]
    pub fn enter(target_root: &Path) -> Self {
        let span = tracing::info_span!(
            "corn",
            target_root = %target_root.display(),
            build_sha = %build_sha()
        );
        Self {
            _span: span.entered(),
        }
    }
}

/// Request identifier of the current task, if one is set.
#[must_use]
pub fn current_request_id() -> Option<String> {
    ACTIVE_REQUEST_CONTEXT
        .try_with(|ctx| ctx.request_id.to_string())
        .ok()
}

/// Run `fut` with the request id and route visible to [`current_request_id`]
/// and [`pipeline_span`].
pub async fn with_request_context<Fut, T>(
    request_id: impl Into<String>,
    route: impl Into<String>,
    fut: Fut,
) -> T
where
    Fut: Future<Output = T>,
{
    let context = RequestContext {
        request_id: Arc::from(request_id.into()),
        route: Arc::from(route.into()),
    };
    ACTIVE_REQUEST_CONTEXT.scope(context, fut).await
}

/// Span for one pipeline call, carrying the current request's id and route.
///
/// Outside a request context both fields are empty.
#[must_use]
pub fn pipeline_span(operation: &'static str) -> Span {
    let (request_id, route) = ACTIVE_REQUEST_CONTEXT
        .try_with(|ctx| (Arc::clone(&ctx.request_id), Arc::clone(&ctx.route)))
        .unwrap_or_else(|_| (Arc::from(""), Arc::from("")));
    tracing::info_span!(
        "pipeline",
        operation,
        request_id = %request_id,
        route = %route
    )
}

#[derive(Clone)]
struct RequestContext {
    request_id: Arc<str>,
    route: Arc<str>,
}

tokio::task_local! {
    static ACTIVE_REQUEST_CONTEXT: RequestContext;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_span_guard_enters_and_exits() {
        let guard = ServiceSpanGuard::enter(Path::new("target"));
        drop(guard);
    }

    #[tokio::test]
    async fn request_context_is_scoped_to_the_future() {
        let output = with_request_context("req-42", "/service/zip", async {
            assert_eq!(current_request_id().as_deref(), Some("req-42"));
            let span = pipeline_span("create_zip");
            span.in_scope(|| "archived")
        })
        .await;
        assert_eq!(output, "archived");
        assert!(current_request_id().is_none());
    }

    #[test]
    fn pipeline_span_outside_request_is_usable() {
        let span = pipeline_span("load_data");
        assert_eq!(span.in_scope(|| 7), 7);
    }
}

//! Task-local trace id for the request being served.
//!
//! `RequestTrace` opens the scope; error responses and logs read it back.
//! Outside a request the id is `"unknown"`.

use tokio::task_local;

task_local! {
    static TRACE_ID: String;
}

const UNKNOWN: &str = "unknown";

pub fn trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

/// Run `future` with `trace_id` as the current trace id.
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_outside_a_request() {
        assert_eq!(trace_id(), "unknown");
    }

    #[tokio::test]
    async fn scoped_id_is_visible_and_restored() {
        let seen = with_trace_id("req-1".to_string(), async {
            let inner = with_trace_id("req-2".to_string(), async { trace_id() }).await;
            (trace_id(), inner)
        })
        .await;

        assert_eq!(seen, ("req-1".to_string(), "req-2".to_string()));
        assert_eq!(trace_id(), "unknown");
    }
}

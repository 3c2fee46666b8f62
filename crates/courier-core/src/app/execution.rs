//! Capability invocation under a wall-clock timeout.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::TaskError;
use crate::ports::{Capability, ExecutionContext};

/// Run `capability` on its own tokio task and wait at most `timeout` for it.
///
/// On expiry the join handle is dropped: the call keeps running detached and
/// its eventual result is discarded. A panic inside the capability surfaces
/// as a `CapabilityError`.
pub(crate) async fn invoke(
    capability: Arc<dyn Capability>,
    payload: serde_json::Value,
    context: ExecutionContext,
    timeout: Duration,
) -> Result<serde_json::Value, TaskError> {
    let task_type = context.task_type();
    let handle = tokio::spawn(async move { capability.execute(payload, context).await });

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(failure))) => {
            debug!(task_type = %task_type, error = %failure, "capability failed");
            Err(TaskError::capability(failure.message()))
        }
        Ok(Err(join_err)) => {
            warn!(task_type = %task_type, error = %join_err, "capability panicked");
            Err(TaskError::capability("capability panicked"))
        }
        Err(_elapsed) => {
            warn!(task_type = %task_type, timeout_ms = timeout.as_millis() as u64, "capability timed out");
            Err(TaskError::timeout(timeout))
        }
    }
}

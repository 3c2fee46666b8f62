//! Handler trait - typed capabilities.
//!
//! `Handler<P>` is the surface capability authors write against; it is
//! generic and therefore not object-safe. `TypedCapability<P, H>` erases the
//! type so the registry can store it as `Arc<dyn Capability>`.

use async_trait::async_trait;
use serde::Serialize;
use std::marker::PhantomData;

use super::payload::Payload;
use crate::ports::{Capability, CapabilityFailure, ExecutionContext};

/// Handles a decoded payload of type `P`.
///
/// # Usage
/// ```ignore
/// struct ChatAgent;
///
/// #[async_trait]
/// impl Handler<ChatRequest> for ChatAgent {
///     type Output = ChatReply;
///
///     async fn handle(&self, req: ChatRequest, ctx: ExecutionContext) -> Result<ChatReply, CapabilityFailure> {
///         Ok(ChatReply { text: req.message })
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<P: Payload>: Send + Sync {
    type Output: Serialize + Send;

    async fn handle(
        &self,
        payload: P,
        context: ExecutionContext,
    ) -> Result<Self::Output, CapabilityFailure>;
}

/// Type-erased adapter from `Handler<P>` to `Capability`.
///
/// A payload that does not decode as `P` fails the task with a capability
/// error; the handler is not called.
pub struct TypedCapability<P: Payload, H: Handler<P>> {
    handler: H,
    _marker: PhantomData<fn() -> P>,
}

impl<P: Payload, H: Handler<P>> TypedCapability<P, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<P: Payload, H: Handler<P>> Capability for TypedCapability<P, H> {
    async fn execute(
        &self,
        payload: serde_json::Value,
        context: ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityFailure> {
        let decoded: P = serde_json::from_value(payload).map_err(|e| {
            CapabilityFailure::new(format!("invalid {} payload: {e}", P::TASK_TYPE))
        })?;
        let output = self.handler.handle(decoded, context).await?;
        Ok(serde_json::to_value(output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskType;
    use serde::Deserialize;
    use serde_json::json;
    use std::time::{Duration, Instant};

    #[derive(Debug, Serialize, Deserialize)]
    struct SearchRequest {
        query: String,
        #[serde(default)]
        limit: Option<usize>,
    }

    impl Payload for SearchRequest {
        const TASK_TYPE: TaskType = TaskType::DocumentSearch;
    }

    #[derive(Serialize)]
    struct SearchHits {
        hits: Vec<String>,
    }

    struct FakeSearch;

    #[async_trait]
    impl Handler<SearchRequest> for FakeSearch {
        type Output = SearchHits;

        async fn handle(
            &self,
            payload: SearchRequest,
            _context: ExecutionContext,
        ) -> Result<SearchHits, CapabilityFailure> {
            let limit = payload.limit.unwrap_or(2);
            Ok(SearchHits {
                hits: (0..limit).map(|i| format!("{}#{i}", payload.query)).collect(),
            })
        }
    }

    fn context() -> ExecutionContext {
        ExecutionContext::new(
            TaskType::DocumentSearch,
            None,
            Vec::new(),
            Instant::now() + Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn typed_capability_decodes_and_encodes() {
        let cap = TypedCapability::<SearchRequest, _>::new(FakeSearch);
        let out = cap
            .execute(json!({"query": "tokio", "limit": 1}), context())
            .await
            .unwrap();
        assert_eq!(out, json!({"hits": ["tokio#0"]}));
    }

    #[tokio::test]
    async fn undecodable_payload_is_a_capability_failure() {
        let cap = TypedCapability::<SearchRequest, _>::new(FakeSearch);
        let err = cap.execute(json!({"limit": 3}), context()).await.unwrap_err();
        assert!(err.message().contains("invalid document_search payload"));
    }

    #[test]
    fn payload_encodes_itself() {
        let req = SearchRequest {
            query: "rust".into(),
            limit: None,
        };
        assert_eq!(req.to_payload().unwrap()["query"], "rust");
    }
}

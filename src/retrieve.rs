//! Retrieval stages
//!
//! Orchestrates one resource or relationship read: merge the declarative
//! and explicit access-control models, authorize, invoke the pluggable
//! supplier, and normalize the outcome. A supplier returning `None` is a
//! valid "not found" and propagates as `None`; a supplier that raises
//! becomes [`Error::DataRetrieval`] with the cause preserved.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::auth::{AccessControlModel, AccessEvaluator};
use crate::types::{BoxError, Error, RequestContext, ResourceRequest, Result};

/// Fetches one backing record for a single-item read.
///
/// Implemented by the persistence/downstream adapters; the core never
/// knows where records come from.
#[async_trait]
pub trait SingleDataItemSupplier: Send + Sync {
    async fn fetch_one(
        &self,
        ctx: &RequestContext,
        request: &ResourceRequest,
    ) -> std::result::Result<Option<JsonValue>, BoxError>;
}

/// Fetches a page of backing records for a collection read.
#[async_trait]
pub trait MultipleDataItemsSupplier: Send + Sync {
    async fn fetch_many(
        &self,
        ctx: &RequestContext,
        request: &ResourceRequest,
    ) -> std::result::Result<CursorPage, BoxError>;
}

/// One page of records plus whether more pages exist.
///
/// `has_more` is the authoritative pagination signal and feeds the
/// `links.next` member of collection documents.
#[derive(Debug, Clone, Default)]
pub struct CursorPage {
    pub items: Vec<JsonValue>,
    pub has_more: bool,
}

impl CursorPage {
    pub fn new(items: Vec<JsonValue>, has_more: bool) -> Self {
        Self { items, has_more }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// A registered fetch operation - the closed set of supplier kinds.
///
/// Dispatch is by tagged variant over an operation key, not by runtime
/// class lookup; a mapping that lands on the wrong kind is a
/// configuration defect caught at validation.
#[derive(Clone)]
pub enum Operation {
    Single(Arc<dyn SingleDataItemSupplier>),
    Multi(Arc<dyn MultipleDataItemsSupplier>),
}

/// Process-wide catalog of operations, keyed by operation key.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: HashMap<String, Operation>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_single(
        &mut self,
        key: impl Into<String>,
        supplier: Arc<dyn SingleDataItemSupplier>,
    ) {
        self.operations.insert(key.into(), Operation::Single(supplier));
    }

    pub fn register_multi(
        &mut self,
        key: impl Into<String>,
        supplier: Arc<dyn MultipleDataItemsSupplier>,
    ) {
        self.operations.insert(key.into(), Operation::Multi(supplier));
    }

    pub fn get(&self, key: &str) -> Option<&Operation> {
        self.operations.get(key)
    }

    /// The single-item supplier behind `key`, as the compound resolver
    /// needs it. Anything else is a configuration defect.
    pub fn require_single(&self, key: &str) -> Result<&Arc<dyn SingleDataItemSupplier>> {
        match self.operations.get(key) {
            Some(Operation::Single(supplier)) => Ok(supplier),
            Some(Operation::Multi(_)) => Err(Error::Config(format!(
                "Operation {} is a collection fetch, expected single-item",
                key
            ))),
            None => Err(Error::Config(format!("Unregistered operation: {}", key))),
        }
    }
}

/// Runs retrieval stages: authorize, fetch, normalize.
#[derive(Debug, Clone, Default)]
pub struct Retriever {
    evaluator: AccessEvaluator,
}

impl Retriever {
    pub fn new(evaluator: AccessEvaluator) -> Self {
        Self { evaluator }
    }

    /// Single-item stage. `Ok(None)` means the record does not exist -
    /// that is not an error at this layer.
    pub async fn retrieve_one(
        &self,
        ctx: &RequestContext,
        request: &ResourceRequest,
        supplier: &dyn SingleDataItemSupplier,
        declarative: Option<&AccessControlModel>,
        explicit: Option<&AccessControlModel>,
    ) -> Result<Option<JsonValue>> {
        let model = AccessControlModel::merge(declarative, explicit);
        self.evaluator.authorize(&ctx.principal, request, &model)?;
        supplier
            .fetch_one(ctx, request)
            .await
            .map_err(Error::DataRetrieval)
    }

    /// Multi-item stage for collection reads.
    pub async fn retrieve_many(
        &self,
        ctx: &RequestContext,
        request: &ResourceRequest,
        supplier: &dyn MultipleDataItemsSupplier,
        declarative: Option<&AccessControlModel>,
        explicit: Option<&AccessControlModel>,
    ) -> Result<CursorPage> {
        let model = AccessControlModel::merge(declarative, explicit);
        self.evaluator.authorize(&ctx.principal, request, &model)?;
        supplier
            .fetch_many(ctx, request)
            .await
            .map_err(Error::DataRetrieval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessTier, Principal};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MapSupplier {
        records: HashMap<String, JsonValue>,
        invoked: AtomicBool,
    }

    impl MapSupplier {
        fn with(records: &[(&str, JsonValue)]) -> Self {
            Self {
                records: records
                    .iter()
                    .map(|(id, record)| (id.to_string(), record.clone()))
                    .collect(),
                invoked: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl SingleDataItemSupplier for MapSupplier {
        async fn fetch_one(
            &self,
            _ctx: &RequestContext,
            request: &ResourceRequest,
        ) -> std::result::Result<Option<JsonValue>, BoxError> {
            self.invoked.store(true, Ordering::SeqCst);
            Ok(request
                .id
                .as_ref()
                .and_then(|id| self.records.get(id))
                .cloned())
        }
    }

    struct FailingSupplier;

    #[async_trait]
    impl SingleDataItemSupplier for FailingSupplier {
        async fn fetch_one(
            &self,
            _ctx: &RequestContext,
            _request: &ResourceRequest,
        ) -> std::result::Result<Option<JsonValue>, BoxError> {
            Err("connection refused".into())
        }
    }

    fn ctx(tier: AccessTier) -> RequestContext {
        RequestContext::new(Principal::new("u-1", tier), "https://api.example.org", "/x")
    }

    #[tokio::test]
    async fn test_found_and_not_found() {
        let retriever = Retriever::default();
        let supplier = MapSupplier::with(&[("1", json!({"id": "1"}))]);
        let ctx = ctx(AccessTier::public());

        let hit = retriever
            .retrieve_one(&ctx, &ResourceRequest::single("articles", "1"), &supplier, None, None)
            .await
            .unwrap();
        assert!(hit.is_some());

        // absent record propagates as None, not as an error
        let miss = retriever
            .retrieve_one(&ctx, &ResourceRequest::single("articles", "404"), &supplier, None, None)
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_supplier_failure_preserves_cause() {
        let retriever = Retriever::default();
        let ctx = ctx(AccessTier::public());

        let err = retriever
            .retrieve_one(&ctx, &ResourceRequest::single("articles", "1"), &FailingSupplier, None, None)
            .await
            .unwrap_err();
        match &err {
            Error::DataRetrieval(cause) => assert_eq!(cause.to_string(), "connection refused"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_denial_never_reaches_supplier() {
        let retriever = Retriever::default();
        let supplier = MapSupplier::with(&[("1", json!({"id": "1"}))]);
        let ctx = ctx(AccessTier::public());
        let explicit = AccessControlModel::new().require_tier(AccessTier::admin());

        let err = retriever
            .retrieve_one(
                &ctx,
                &ResourceRequest::single("articles", "1"),
                &supplier,
                None,
                Some(&explicit),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientAccessTier { .. }));
        assert!(!supplier.invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_declarative_model_applies_when_no_explicit() {
        let retriever = Retriever::default();
        let supplier = MapSupplier::with(&[("1", json!({"id": "1"}))]);
        let ctx = ctx(AccessTier::public());
        let declarative = AccessControlModel::new().require_tier(AccessTier::partner());

        let err = retriever
            .retrieve_one(
                &ctx,
                &ResourceRequest::single("articles", "1"),
                &supplier,
                Some(&declarative),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientAccessTier { .. }));
    }

    #[test]
    fn test_operation_registry_kind_mismatch() {
        let mut registry = OperationRegistry::new();
        registry.register_single(
            "articles.by_id",
            Arc::new(MapSupplier::with(&[])) as Arc<dyn SingleDataItemSupplier>,
        );

        assert!(registry.require_single("articles.by_id").is_ok());
        assert!(matches!(
            registry.require_single("missing"),
            Err(Error::Config(_))
        ));
    }
}

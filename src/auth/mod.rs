//! Authentication and authorization primitives
//!
//! The inbound adapter authenticates the caller and builds a
//! [`Principal`]; this module decides what that principal may do. Checks
//! run in a fixed sequence - tier, scopes, ownership - against a model
//! merged from declarative (registration-time) and explicit
//! (call-site) settings.

pub mod evaluator;
pub mod model;
pub mod scopes;
pub mod tier;

pub use evaluator::AccessEvaluator;
pub use model::{AccessControlModel, Action, OwnerIdExtractor, RequestIdOwner};
pub use scopes::ScopeExpr;
pub use tier::{AccessTier, AccessTierRegistry};

use std::collections::HashSet;

/// The authenticated caller's identity and authorization attributes.
///
/// Supplied per-request by the inbound adapter; never persisted by the
/// core and never stored in ambient state.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub access_tier: AccessTier,
    pub scopes: HashSet<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, access_tier: AccessTier) -> Self {
        Self {
            user_id: user_id.into(),
            access_tier,
            scopes: HashSet::new(),
        }
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }
}

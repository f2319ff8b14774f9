//! Access-control models
//!
//! A model describes what a read or write requires: a minimum tier, a
//! scope expression, and optionally an ownership rule. Models come from
//! two places - declarative settings attached to a resource definition at
//! registration time, and explicit settings passed by the calling stage -
//! and merge with explicit fields winning per field.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::tier::AccessTier;
use crate::types::ResourceRequest;

/// What the caller is trying to do to the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    #[default]
    Read,
    Write,
}

/// Pulls the owning user's id out of a request, for ownership checks.
///
/// Closures work directly: any `Fn(&ResourceRequest) -> Option<String>`
/// is an extractor.
pub trait OwnerIdExtractor: Send + Sync {
    fn from_request(&self, request: &ResourceRequest) -> Option<String>;
}

impl<F> OwnerIdExtractor for F
where
    F: Fn(&ResourceRequest) -> Option<String> + Send + Sync,
{
    fn from_request(&self, request: &ResourceRequest) -> Option<String> {
        self(request)
    }
}

/// Extractor treating the requested resource id as the owner id - the
/// common case for user-owned resources addressed by user id.
pub struct RequestIdOwner;

impl OwnerIdExtractor for RequestIdOwner {
    fn from_request(&self, request: &ResourceRequest) -> Option<String> {
        request.id.clone()
    }
}

/// Requirements for one read or write.
///
/// Every field is optional; an all-`None` model grants the request
/// without checks. Unset fields fall back during [`merge`].
///
/// [`merge`]: AccessControlModel::merge
#[derive(Clone, Default)]
pub struct AccessControlModel {
    /// Minimum tier by weight
    pub required_tier: Option<AccessTier>,
    /// Scope requirement expression, see [`crate::auth::scopes`]
    pub required_scopes: Option<String>,
    /// Ownership rule; presence makes the check apply
    pub owner_id_extractor: Option<Arc<dyn OwnerIdExtractor>>,
    /// Action being authorized; treated as Read when unset
    pub action: Option<Action>,
}

impl AccessControlModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_tier(mut self, tier: AccessTier) -> Self {
        self.required_tier = Some(tier);
        self
    }

    pub fn require_scopes(mut self, expression: impl Into<String>) -> Self {
        self.required_scopes = Some(expression.into());
        self
    }

    pub fn owned_by(mut self, extractor: impl OwnerIdExtractor + 'static) -> Self {
        self.owner_id_extractor = Some(Arc::new(extractor));
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// True when no check applies
    pub fn is_empty(&self) -> bool {
        self.required_tier.is_none()
            && self.required_scopes.is_none()
            && self.owner_id_extractor.is_none()
    }

    /// Merge declarative and explicit settings: each field takes the
    /// explicit value when set, otherwise the declarative one.
    pub fn merge(declarative: Option<&Self>, explicit: Option<&Self>) -> Self {
        let empty = Self::default();
        let d = declarative.unwrap_or(&empty);
        let e = explicit.unwrap_or(&empty);
        Self {
            required_tier: e.required_tier.clone().or_else(|| d.required_tier.clone()),
            required_scopes: e
                .required_scopes
                .clone()
                .or_else(|| d.required_scopes.clone()),
            owner_id_extractor: e
                .owner_id_extractor
                .clone()
                .or_else(|| d.owner_id_extractor.clone()),
            action: e.action.or(d.action),
        }
    }
}

impl fmt::Debug for AccessControlModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessControlModel")
            .field("required_tier", &self.required_tier)
            .field("required_scopes", &self.required_scopes)
            .field(
                "owner_id_extractor",
                &self.owner_id_extractor.as_ref().map(|_| "<extractor>"),
            )
            .field("action", &self.action)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_explicit_wins_per_field() {
        let declarative = AccessControlModel::new()
            .require_tier(AccessTier::public())
            .require_scopes("hasScope('read')")
            .with_action(Action::Read);
        let explicit = AccessControlModel::new().require_tier(AccessTier::admin());

        let merged = AccessControlModel::merge(Some(&declarative), Some(&explicit));
        // explicit tier wins
        assert_eq!(merged.required_tier.unwrap().weight, 30);
        // unset explicit fields fall back to declarative values
        assert_eq!(merged.required_scopes.as_deref(), Some("hasScope('read')"));
        assert_eq!(merged.action, Some(Action::Read));
    }

    #[test]
    fn test_merge_with_either_side_absent() {
        let model = AccessControlModel::new().require_scopes("hasScope('x')");

        let merged = AccessControlModel::merge(Some(&model), None);
        assert_eq!(merged.required_scopes.as_deref(), Some("hasScope('x')"));

        let merged = AccessControlModel::merge(None, Some(&model));
        assert_eq!(merged.required_scopes.as_deref(), Some("hasScope('x')"));

        let merged = AccessControlModel::merge(None, None);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_merge_keeps_owner_extractor() {
        let declarative = AccessControlModel::new().owned_by(RequestIdOwner);
        let merged = AccessControlModel::merge(Some(&declarative), None);
        let request = ResourceRequest::single("profile", "u-7");
        let owner = merged
            .owner_id_extractor
            .unwrap()
            .from_request(&request);
        assert_eq!(owner.as_deref(), Some("u-7"));
    }

    #[test]
    fn test_empty_model() {
        assert!(AccessControlModel::new().is_empty());
        assert!(!AccessControlModel::new()
            .require_tier(AccessTier::public())
            .is_empty());
    }
}

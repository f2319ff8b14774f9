//! Access-control evaluation
//!
//! Runs the check sequence for one request against a merged model:
//! tier, then scopes, then ownership. Denials carry the failing rule and
//! are never retried. Authorization is synchronous; supplier invocation
//! composes around it in the retrieval stages.

use tracing::debug;

use crate::auth::model::{AccessControlModel, Action};
use crate::auth::scopes;
use crate::auth::tier::AccessTier;
use crate::auth::Principal;
use crate::types::{Error, ResourceRequest, Result};

/// Evaluates access-control models against principals.
///
/// The ownership-override threshold is policy, not a hard-coded bypass:
/// principals at or above `override_tier` (default ADMIN) pass ownership
/// checks on resources they do not own.
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    override_tier: AccessTier,
}

impl AccessEvaluator {
    pub fn new() -> Self {
        Self {
            override_tier: AccessTier::admin(),
        }
    }

    /// Use a different ownership-override threshold
    pub fn with_override_tier(override_tier: AccessTier) -> Self {
        Self { override_tier }
    }

    /// Check a principal against a model. `Ok(())` means the supplier may
    /// be invoked; any `Err` terminates the request.
    pub fn authorize(
        &self,
        principal: &Principal,
        request: &ResourceRequest,
        model: &AccessControlModel,
    ) -> Result<()> {
        if model.is_empty() {
            return Ok(());
        }

        if let Some(required) = &model.required_tier {
            if principal.access_tier < *required {
                debug!(
                    user = %principal.user_id,
                    required = %required,
                    actual = %principal.access_tier,
                    "Denied: insufficient access tier"
                );
                return Err(Error::InsufficientAccessTier {
                    required: required.name.clone(),
                    actual: principal.access_tier.name.clone(),
                });
            }
        }

        if let Some(expression) = &model.required_scopes {
            if !scopes::evaluate(expression, &principal.scopes)? {
                debug!(
                    user = %principal.user_id,
                    expression = %expression,
                    "Denied: scope requirement not met"
                );
                return Err(Error::InsufficientScopes(expression.clone()));
            }
        }

        if let Some(extractor) = &model.owner_id_extractor {
            let action = model.action.unwrap_or(Action::Read);
            if principal.access_tier >= self.override_tier {
                debug!(
                    user = %principal.user_id,
                    tier = %principal.access_tier,
                    ?action,
                    "Ownership check bypassed by override tier"
                );
            } else {
                let owner = extractor.from_request(request);
                if owner.as_deref() != Some(principal.user_id.as_str()) {
                    debug!(
                        user = %principal.user_id,
                        owner = ?owner,
                        ?action,
                        "Denied: principal does not own the resource"
                    );
                    return Err(Error::Forbidden(format!(
                        "{} on {} requires ownership",
                        match action {
                            Action::Read => "Read",
                            Action::Write => "Write",
                        },
                        request.resource_type
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for AccessEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::model::RequestIdOwner;

    fn principal(tier: AccessTier, scopes: &[&str]) -> Principal {
        Principal {
            user_id: "u-1".into(),
            access_tier: tier,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_model_allows() {
        let evaluator = AccessEvaluator::new();
        let p = principal(AccessTier::no_access(), &[]);
        let request = ResourceRequest::single("article", "1");
        assert!(evaluator
            .authorize(&p, &request, &AccessControlModel::new())
            .is_ok());
    }

    #[test]
    fn test_tier_denial() {
        let evaluator = AccessEvaluator::new();
        let p = principal(AccessTier::public(), &[]);
        let model = AccessControlModel::new().require_tier(AccessTier::admin());
        let request = ResourceRequest::single("article", "1");

        let err = evaluator.authorize(&p, &request, &model).unwrap_err();
        match err {
            Error::InsufficientAccessTier { required, actual } => {
                assert_eq!(required, "ADMIN");
                assert_eq!(actual, "PUBLIC");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tier_met_by_alias_weight() {
        let evaluator = AccessEvaluator::new();
        let p = principal(AccessTier::new("SUPERUSER", 30), &[]);
        let model = AccessControlModel::new().require_tier(AccessTier::admin());
        let request = ResourceRequest::single("article", "1");
        assert!(evaluator.authorize(&p, &request, &model).is_ok());
    }

    #[test]
    fn test_scope_denial() {
        let evaluator = AccessEvaluator::new();
        let p = principal(AccessTier::admin(), &["read"]);
        let model = AccessControlModel::new()
            .require_scopes("hasScope('read') AND hasScope('export')");
        let request = ResourceRequest::single("article", "1");

        let err = evaluator.authorize(&p, &request, &model).unwrap_err();
        assert!(matches!(err, Error::InsufficientScopes(_)));
    }

    #[test]
    fn test_ownership_check() {
        let evaluator = AccessEvaluator::new();
        let p = principal(AccessTier::public(), &[]);
        let model = AccessControlModel::new()
            .owned_by(RequestIdOwner)
            .with_action(Action::Write);

        // owns the resource
        let request = ResourceRequest::single("profile", "u-1");
        assert!(evaluator.authorize(&p, &request, &model).is_ok());

        // someone else's resource
        let request = ResourceRequest::single("profile", "u-2");
        let err = evaluator.authorize(&p, &request, &model).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[test]
    fn test_ownership_override_threshold_is_admin_weight() {
        // Pins the exact default threshold: weight 29 denied, 30 allowed.
        let evaluator = AccessEvaluator::new();
        let model = AccessControlModel::new()
            .owned_by(RequestIdOwner)
            .with_action(Action::Write);
        let request = ResourceRequest::single("profile", "u-2");

        let below = principal(AccessTier::new("ALMOST_ADMIN", 29), &[]);
        assert!(evaluator.authorize(&below, &request, &model).is_err());

        let at = principal(AccessTier::admin(), &[]);
        assert!(evaluator.authorize(&at, &request, &model).is_ok());

        let above = principal(AccessTier::root_admin(), &[]);
        assert!(evaluator.authorize(&above, &request, &model).is_ok());
    }

    #[test]
    fn test_override_tier_is_configurable() {
        let evaluator = AccessEvaluator::with_override_tier(AccessTier::root_admin());
        let model = AccessControlModel::new()
            .owned_by(RequestIdOwner)
            .with_action(Action::Write);
        let request = ResourceRequest::single("profile", "u-2");

        // plain ADMIN no longer bypasses ownership under the raised policy
        let admin = principal(AccessTier::admin(), &[]);
        assert!(evaluator.authorize(&admin, &request, &model).is_err());

        let root = principal(AccessTier::root_admin(), &[]);
        assert!(evaluator.authorize(&root, &request, &model).is_ok());
    }

    #[test]
    fn test_owner_scoped_read() {
        let evaluator = AccessEvaluator::new();
        let model = AccessControlModel::new().owned_by(RequestIdOwner);
        let p = principal(AccessTier::public(), &[]);

        let request = ResourceRequest::single("profile", "u-1");
        assert!(evaluator.authorize(&p, &request, &model).is_ok());

        let request = ResourceRequest::single("profile", "u-9");
        assert!(evaluator.authorize(&p, &request, &model).is_err());
    }
}

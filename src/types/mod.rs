//! Shared types for the assembly pipeline
//!
//! Request-scoped plumbing types plus the crate-wide error enum. The
//! request context is always passed explicitly through the call chain -
//! there is no ambient per-thread principal state.

pub mod error;

pub use error::{BoxError, Error, Result};

use std::collections::HashMap;

use crate::auth::Principal;
use crate::cursor::CursorState;

/// Request-scoped context carried through every stage of one assembly.
///
/// Built once by the inbound adapter when a request arrives, discarded at
/// response completion. Nothing in here outlives the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated caller
    pub principal: Principal,
    /// Scheme and authority for generated links (e.g. "https://api.example.org")
    pub base_url: String,
    /// Path of the active request, used for self links
    pub path: String,
}

impl RequestContext {
    pub fn new(principal: Principal, base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            principal,
            base_url: base_url.into(),
            path: path.into(),
        }
    }
}

/// One resource or relationship read, as handed to data suppliers.
///
/// Suppliers treat this as the full description of what to fetch: the
/// resource type, an id for single-item reads, free-form parameters from
/// the inbound adapter, and the decoded pagination window for
/// multi-item reads.
#[derive(Debug, Clone, Default)]
pub struct ResourceRequest {
    /// Target resource type name
    pub resource_type: String,
    /// Target id for single-item reads; None for collection reads
    pub id: Option<String>,
    /// Pass-through request parameters (filters etc.)
    pub params: HashMap<String, String>,
    /// Decoded pagination window for collection reads
    pub page: Option<CursorState>,
}

impl ResourceRequest {
    /// A single-item read for `resource_type`/`id`
    pub fn single(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// A collection read for `resource_type` over the given page window
    pub fn collection(resource_type: impl Into<String>, page: CursorState) -> Self {
        Self {
            resource_type: resource_type.into(),
            page: Some(page),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

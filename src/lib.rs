//! Lintel - JSON:API document assembly
//!
//! The beam over the doorway: takes records from pluggable data
//! suppliers and assembles specification-compliant JSON:API documents,
//! enforcing access control, paginating with opaque reversible cursors,
//! and optionally sideloading related resources into one compound
//! response.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     DocumentAssembler                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────────┐   ┌──────────────┐   ┌────────────────┐   │
//! │  │ Retrieval     │──▶│ Rendering    │──▶│ Compound       │   │
//! │  │ (authorize →  │   │ (records →   │   │ Resolver       │   │
//! │  │  supplier)    │   │  resources)  │   │ (bounded BFS)  │   │
//! │  └───────────────┘   └──────────────┘   └────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate owns no transport and no storage: the inbound adapter
//! builds a [`RequestContext`] per request, suppliers fetch records, and
//! everything in between - tiers, scopes, ownership, cursors, links,
//! relationship linkages, the `included` set - is assembled here.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lintel::{
//!     AccessTier, CompoundDocsConfig, DocumentAssembler, OperationRegistry, Principal,
//!     RelationshipDef, RequestContext, ResourceDefinition, ResourceRegistry,
//! };
//!
//! let mut resources = ResourceRegistry::new();
//! resources.register(
//!     ResourceDefinition::new("articles")
//!         .with_relationship(RelationshipDef::to_one("author", "people").with_source_field("author_id")),
//! );
//! resources.register(ResourceDefinition::new("people"));
//!
//! let operations = OperationRegistry::new();
//! let assembler = DocumentAssembler::new(
//!     Arc::new(resources),
//!     Arc::new(operations),
//!     CompoundDocsConfig::default(),
//! );
//! assembler.validate().expect("valid registration");
//!
//! let ctx = RequestContext::new(
//!     Principal::new("u-1", AccessTier::public()),
//!     "https://api.example.org",
//!     "/articles/1",
//! );
//! # let _ = ctx;
//! ```

pub mod assemble;
pub mod auth;
pub mod config;
pub mod cursor;
pub mod document;
pub mod links;
pub mod registry;
pub mod retrieve;
pub mod types;

pub use assemble::compound::IncludedSet;
pub use assemble::DocumentAssembler;
pub use auth::{
    AccessControlModel, AccessEvaluator, AccessTier, AccessTierRegistry, Action, OwnerIdExtractor,
    Principal, RequestIdOwner, ScopeExpr,
};
pub use config::{CompoundDocsConfig, ErrorStrategy};
pub use cursor::CursorState;
pub use document::{
    Document, ErrorObject, ErrorSource, LinkageData, LinksObject, PrimaryData,
    RelationshipLinkage, ResourceIdentifier, ResourceObject,
};
pub use registry::{RelationshipDef, ResourceDefinition, ResourceRegistry};
pub use retrieve::{
    CursorPage, MultipleDataItemsSupplier, Operation, OperationRegistry, Retriever,
    SingleDataItemSupplier,
};
pub use types::{BoxError, Error, RequestContext, ResourceRequest, Result};

//! Compound document resolution
//!
//! Breadth-first expansion of the relationship graph from the rendered
//! primary resources, bounded by the configured hop count. Linkages
//! within one hop resolve concurrently against their suppliers; results
//! merge into the included set sequentially after each batch, so the
//! dedup invariant never depends on synchronized writes. Dropping the
//! returned future abandons in-flight fetches and no partial included
//! set escapes, since results only surface when the whole pass finishes.

use std::collections::HashSet;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::config::ErrorStrategy;
use crate::document::{ResourceIdentifier, ResourceObject};
use crate::types::{Error, RequestContext, ResourceRequest, Result};

use super::DocumentAssembler;

/// Deduplicated accumulation of rendered resources across hops.
///
/// Keyed by `(type, id)`; membership is unique, order is insertion
/// order, which becomes the order of the document's `included` member.
#[derive(Debug, Default)]
pub struct IncludedSet {
    resources: Vec<ResourceObject>,
    seen: HashSet<ResourceIdentifier>,
}

impl IncludedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the `(type, id)` key is already present. Returns
    /// whether the resource was actually added.
    pub fn insert(&mut self, resource: ResourceObject) -> bool {
        if self.seen.insert(resource.identifier()) {
            self.resources.push(resource);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, identifier: &ResourceIdentifier) -> bool {
        self.seen.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn into_resources(self) -> Vec<ResourceObject> {
        self.resources
    }
}

/// Walks the relationship graph outward from a primary document.
pub(crate) struct CompoundResolver<'a> {
    assembler: &'a DocumentAssembler,
    ctx: &'a RequestContext,
}

impl<'a> CompoundResolver<'a> {
    pub(crate) fn new(assembler: &'a DocumentAssembler, ctx: &'a RequestContext) -> Self {
        Self { assembler, ctx }
    }

    /// Resolve the `included` set for the given primary resources.
    ///
    /// Terminates for any graph: each hop consumes its whole frontier,
    /// the enqueued-set keeps any `(type, id)` from being fetched twice,
    /// and the hop counter is bounded by `max_hops`.
    pub(crate) async fn resolve(&self, primary: &[ResourceObject]) -> Result<Vec<ResourceObject>> {
        let config = self.assembler.compound_config();
        let mut included = IncludedSet::new();
        let mut enqueued: HashSet<ResourceIdentifier> = HashSet::new();

        let mut frontier = Vec::new();
        for resource in primary {
            collect_linkages(resource, &mut enqueued, &mut frontier);
        }

        let mut hop = 0;
        while hop < config.max_hops && !frontier.is_empty() {
            debug!(hop, linkages = frontier.len(), "Resolving compound hop");

            // fan out the whole hop, then merge sequentially
            let outcomes = join_all(
                frontier
                    .iter()
                    .map(|target| self.resolve_linkage(target)),
            )
            .await;

            let mut next_frontier = Vec::new();
            for (target, outcome) in frontier.iter().zip(outcomes) {
                match outcome {
                    Ok(resource) => {
                        if included.insert(resource.clone()) {
                            collect_linkages(&resource, &mut enqueued, &mut next_frontier);
                        }
                    }
                    Err(error) => match config.error_strategy {
                        ErrorStrategy::Ignore => {
                            warn!(
                                resource_type = %target.resource_type,
                                id = %target.id,
                                %error,
                                "Dropping failed linkage from compound document"
                            );
                        }
                        ErrorStrategy::Fail => {
                            return Err(Error::CompoundResolution {
                                resource_type: target.resource_type.clone(),
                                id: target.id.clone(),
                                cause: Box::new(error),
                            });
                        }
                    },
                }
            }

            frontier = next_frontier;
            hop += 1;
        }

        Ok(included.into_resources())
    }

    /// Fetch and render one referenced resource through its mapped
    /// operation, applying the target type's declarative access control.
    async fn resolve_linkage(&self, target: &ResourceIdentifier) -> Result<ResourceObject> {
        let config = self.assembler.compound_config();
        let operation_key = config
            .mapping
            .get(&target.resource_type)
            .ok_or_else(|| {
                Error::Config(format!(
                    "No compound mapping for resource type: {}",
                    target.resource_type
                ))
            })?;
        let supplier = self.assembler.operations().require_single(operation_key)?;
        let definition = self.assembler.resources().require(&target.resource_type)?;

        let request = ResourceRequest::single(&target.resource_type, &target.id);
        let record = self
            .assembler
            .retriever()
            .retrieve_one(
                self.ctx,
                &request,
                supplier.as_ref(),
                definition.access_control.as_ref(),
                None,
            )
            .await?
            .ok_or_else(|| Error::ResourceNotFound {
                resource_type: target.resource_type.clone(),
                id: target.id.clone(),
            })?;

        self.assembler.render(self.ctx, definition, &record)
    }
}

/// Queue every linkage of `resource` not already enqueued this pass
fn collect_linkages(
    resource: &ResourceObject,
    enqueued: &mut HashSet<ResourceIdentifier>,
    frontier: &mut Vec<ResourceIdentifier>,
) {
    for linkage in resource.relationships.values() {
        for identifier in linkage.identifiers() {
            if enqueued.insert(identifier.clone()) {
                frontier.push(identifier.clone());
            }
        }
    }
}

//! Document assembly
//!
//! The pipeline entry points. Each fetch runs the same sequence: merge
//! access-control models, authorize, invoke the supplier, render the
//! records into resource objects with links and relationship linkages,
//! and - when compound documents are enabled - hand the rendered primary
//! data to the resolver to build the `included` member.

pub mod compound;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::auth::{AccessControlModel, AccessEvaluator, ScopeExpr};
use crate::config::CompoundDocsConfig;
use crate::cursor;
use crate::document::{
    Document, LinksObject, PrimaryData, RelationshipLinkage, ResourceIdentifier, ResourceObject,
};
use crate::links;
use crate::registry::{ResourceDefinition, ResourceRegistry};
use crate::retrieve::{
    MultipleDataItemsSupplier, OperationRegistry, Retriever, SingleDataItemSupplier,
};
use crate::types::{Error, RequestContext, ResourceRequest, Result};

/// Assembles JSON:API documents from registered definitions, operations,
/// and compound-document settings. Built once at startup; all per-request
/// state arrives through the [`RequestContext`].
#[derive(Clone)]
pub struct DocumentAssembler {
    resources: Arc<ResourceRegistry>,
    operations: Arc<OperationRegistry>,
    compound: CompoundDocsConfig,
    retriever: Retriever,
}

impl DocumentAssembler {
    pub fn new(
        resources: Arc<ResourceRegistry>,
        operations: Arc<OperationRegistry>,
        compound: CompoundDocsConfig,
    ) -> Self {
        Self {
            resources,
            operations,
            compound,
            retriever: Retriever::default(),
        }
    }

    /// Replace the default access evaluator (e.g. to change the
    /// ownership-override tier policy)
    pub fn with_evaluator(mut self, evaluator: AccessEvaluator) -> Self {
        self.retriever = Retriever::new(evaluator);
        self
    }

    /// Startup sanity check: every compound mapping entry must name a
    /// registered resource type and a registered single-item operation,
    /// and every declarative scope expression must parse. Call after
    /// registration, before serving.
    pub fn validate(&self) -> Result<()> {
        for (type_name, operation_key) in &self.compound.mapping {
            self.resources.require(type_name)?;
            self.operations.require_single(operation_key)?;
        }
        for definition in self.resources.types() {
            if let Some(model) = &definition.access_control {
                if let Some(expression) = &model.required_scopes {
                    ScopeExpr::parse(expression)?;
                }
            }
        }
        Ok(())
    }

    /// Fetch and render one resource: `{ data, included?, links }`.
    ///
    /// An absent record is [`Error::ResourceNotFound`]; the boundary
    /// renders it via [`Document::from_error`].
    pub async fn fetch_resource(
        &self,
        ctx: &RequestContext,
        request: &ResourceRequest,
        supplier: &dyn SingleDataItemSupplier,
        explicit: Option<&AccessControlModel>,
    ) -> Result<Document> {
        let definition = self.resources.require(&request.resource_type)?;
        let record = self
            .retriever
            .retrieve_one(ctx, request, supplier, definition.access_control.as_ref(), explicit)
            .await?
            .ok_or_else(|| Error::ResourceNotFound {
                resource_type: request.resource_type.clone(),
                id: request.id.clone().unwrap_or_default(),
            })?;

        let resource = self.render_resource(ctx, definition, &record)?;
        let mut document =
            Document::single(resource).with_links(LinksObject::self_only(links::self_link(ctx)));
        self.attach_included(ctx, &mut document).await?;
        Ok(document)
    }

    /// Fetch and render a page of resources. The cursor parameter is
    /// decoded here so a malformed token fails the request up front,
    /// naming `page[cursor]`; `links.next` is present only when the
    /// supplier reports more pages.
    pub async fn fetch_collection(
        &self,
        ctx: &RequestContext,
        mut request: ResourceRequest,
        cursor_param: Option<&str>,
        default_limit: u32,
        supplier: &dyn MultipleDataItemsSupplier,
        explicit: Option<&AccessControlModel>,
    ) -> Result<Document> {
        let definition = self.resources.require(&request.resource_type)?;
        let page_state = cursor::decode_or_default(cursor_param, default_limit)?;
        request.page = Some(page_state);

        let page = self
            .retriever
            .retrieve_many(ctx, &request, supplier, definition.access_control.as_ref(), explicit)
            .await?;

        let resources: Vec<ResourceObject> = page
            .items
            .iter()
            .map(|record| self.render_resource(ctx, definition, record))
            .collect::<Result<_>>()?;

        let mut doc_links = LinksObject::self_only(links::self_link(ctx));
        if page.has_more {
            doc_links.next = Some(links::next_link(ctx, &page_state.advance()));
        }

        let mut document = Document::collection(resources).with_links(doc_links);
        self.attach_included(ctx, &mut document).await?;
        Ok(document)
    }

    /// Fetch a relationship itself: bare resource identifiers plus
    /// `self`/`related` links. The supplier fetches the owning resource;
    /// linkage extraction happens against its record.
    pub async fn fetch_relationship(
        &self,
        ctx: &RequestContext,
        request: &ResourceRequest,
        relationship: &str,
        supplier: &dyn SingleDataItemSupplier,
        explicit: Option<&AccessControlModel>,
    ) -> Result<Document> {
        let definition = self.resources.require(&request.resource_type)?;
        let relationship_def = definition.relationship(relationship).ok_or_else(|| {
            Error::Config(format!(
                "Resource type {} declares no relationship {:?}",
                request.resource_type, relationship
            ))
        })?;

        let record = self
            .retriever
            .retrieve_one(ctx, request, supplier, definition.access_control.as_ref(), explicit)
            .await?
            .ok_or_else(|| Error::ResourceNotFound {
                resource_type: request.resource_type.clone(),
                id: request.id.clone().unwrap_or_default(),
            })?;

        let owner_id = definition.extract_id(&record)?;
        let targets: Vec<ResourceIdentifier> = relationship_def
            .extract(&record)?
            .into_iter()
            .map(|id| ResourceIdentifier::new(relationship_def.target_type.clone(), id))
            .collect();

        let data = if relationship_def.to_many {
            PrimaryData::ManyIdentifiers(targets)
        } else {
            PrimaryData::OneIdentifier(targets.into_iter().next())
        };

        let doc_links = LinksObject {
            self_link: Some(links::relationship_link(
                ctx,
                &request.resource_type,
                &owner_id,
                relationship,
            )),
            related: Some(links::related_link(
                ctx,
                &request.resource_type,
                &owner_id,
                relationship,
            )),
            next: None,
        };
        Ok(Document::relationship(data).with_links(doc_links))
    }

    /// Run compound resolution over the document's primary resources
    /// when enabled, merging the result into `included`.
    async fn attach_included(&self, ctx: &RequestContext, document: &mut Document) -> Result<()> {
        if !self.compound.enabled {
            return Ok(());
        }
        let primary = match &document.data {
            Some(data) => data.resources(),
            None => return Ok(()),
        };
        let included = compound::CompoundResolver::new(self, ctx)
            .resolve(primary)
            .await?;
        debug!(count = included.len(), "Compound resolution complete");
        document.included = included;
        Ok(())
    }

    /// Render one backing record into an immutable resource object with
    /// self links and relationship linkages.
    fn render_resource(
        &self,
        ctx: &RequestContext,
        definition: &ResourceDefinition,
        record: &JsonValue,
    ) -> Result<ResourceObject> {
        let id = definition.extract_id(record)?;
        let attributes = definition.map_attributes(record)?;

        let mut relationships = BTreeMap::new();
        for relationship in &definition.relationships {
            let targets: Vec<ResourceIdentifier> = relationship
                .extract(record)?
                .into_iter()
                .map(|target_id| {
                    ResourceIdentifier::new(relationship.target_type.clone(), target_id)
                })
                .collect();

            let linkage = if relationship.to_many {
                RelationshipLinkage::to_many(targets)
            } else {
                RelationshipLinkage::to_one(targets.into_iter().next())
            };
            let linkage = linkage.with_links(LinksObject {
                self_link: Some(links::relationship_link(
                    ctx,
                    &definition.resource_type,
                    &id,
                    &relationship.name,
                )),
                related: Some(links::related_link(
                    ctx,
                    &definition.resource_type,
                    &id,
                    &relationship.name,
                )),
                next: None,
            });
            relationships.insert(relationship.name.clone(), linkage);
        }

        Ok(ResourceObject {
            resource_type: definition.resource_type.clone(),
            id: id.clone(),
            attributes,
            links: Some(LinksObject::self_only(links::resource_link(
                ctx,
                &definition.resource_type,
                &id,
            ))),
            relationships,
        })
    }

    pub(crate) fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub(crate) fn operations(&self) -> &OperationRegistry {
        &self.operations
    }

    pub(crate) fn compound_config(&self) -> &CompoundDocsConfig {
        &self.compound
    }

    pub(crate) fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub(crate) fn render(
        &self,
        ctx: &RequestContext,
        definition: &ResourceDefinition,
        record: &JsonValue,
    ) -> Result<ResourceObject> {
        self.render_resource(ctx, definition, record)
    }
}

//! Resource and relationship catalog
//!
//! Startup-time registry of resource definitions: how to pull an id out
//! of a backing record, how to map the record into attributes, which
//! relationships the type declares, and the declarative access-control
//! settings for reads of that type. Populated once during startup and
//! shared read-only afterwards; the assembler consumes definitions
//! identically however they were populated.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::auth::AccessControlModel;
use crate::types::{Error, Result};

/// Custom id extraction over a backing record
pub type IdExtractorFn = Arc<dyn Fn(&JsonValue) -> Result<String> + Send + Sync>;

/// Custom record-to-attributes mapping
pub type AttributeMapperFn = Arc<dyn Fn(&JsonValue) -> Result<JsonValue> + Send + Sync>;

/// Custom linkage extraction: target ids referenced by a record
pub type LinkageExtractorFn = Arc<dyn Fn(&JsonValue) -> Result<Vec<String>> + Send + Sync>;

/// One declared relationship, scoped to its owning resource type.
#[derive(Clone)]
pub struct RelationshipDef {
    pub name: String,
    /// Resource type the linkage points at
    pub target_type: String,
    pub to_many: bool,
    /// Record member holding the target id(s); defaults to the
    /// relationship name
    pub source_field: String,
    extractor: Option<LinkageExtractorFn>,
}

impl RelationshipDef {
    pub fn to_one(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_field: name.clone(),
            name,
            target_type: target_type.into(),
            to_many: false,
            extractor: None,
        }
    }

    pub fn to_many(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            to_many: true,
            ..Self::to_one(name, target_type)
        }
    }

    /// Read target ids from a different record member than the name
    pub fn with_source_field(mut self, field: impl Into<String>) -> Self {
        self.source_field = field.into();
        self
    }

    /// Replace the default member-based extraction entirely
    pub fn with_extractor(mut self, extractor: LinkageExtractorFn) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Target ids this record references through the relationship.
    ///
    /// Default extraction reads `source_field`: absent or null means no
    /// linkage, a string or number is one target, an array is many.
    pub fn extract(&self, record: &JsonValue) -> Result<Vec<String>> {
        if let Some(extractor) = &self.extractor {
            return extractor(record);
        }
        match record.get(&self.source_field) {
            None | Some(JsonValue::Null) => Ok(Vec::new()),
            Some(value) => linkage_ids(value).ok_or_else(|| {
                Error::Mapping(format!(
                    "Relationship {} of {}: member {:?} is not an id or array of ids",
                    self.name, self.target_type, self.source_field
                ))
            }),
        }
    }
}

fn linkage_ids(value: &JsonValue) -> Option<Vec<String>> {
    match value {
        JsonValue::String(s) => Some(vec![s.clone()]),
        JsonValue::Number(n) => Some(vec![n.to_string()]),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

/// Everything the assembler needs to know about one resource type.
#[derive(Clone)]
pub struct ResourceDefinition {
    pub resource_type: String,
    pub relationships: Vec<RelationshipDef>,
    /// Declarative access control applied to every read of this type
    pub access_control: Option<AccessControlModel>,
    id_extractor: Option<IdExtractorFn>,
    attribute_mapper: Option<AttributeMapperFn>,
}

impl ResourceDefinition {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            relationships: Vec::new(),
            access_control: None,
            id_extractor: None,
            attribute_mapper: None,
        }
    }

    pub fn with_relationship(mut self, relationship: RelationshipDef) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn with_access_control(mut self, model: AccessControlModel) -> Self {
        self.access_control = Some(model);
        self
    }

    pub fn with_id_extractor(mut self, extractor: IdExtractorFn) -> Self {
        self.id_extractor = Some(extractor);
        self
    }

    pub fn with_attribute_mapper(mut self, mapper: AttributeMapperFn) -> Self {
        self.attribute_mapper = Some(mapper);
        self
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipDef> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Extract the record's id. Default: the `"id"` member, string or
    /// numeric. Failure is a definition defect, not a runtime condition.
    pub fn extract_id(&self, record: &JsonValue) -> Result<String> {
        if let Some(extractor) = &self.id_extractor {
            return extractor(record);
        }
        match record.get("id") {
            Some(JsonValue::String(s)) => Ok(s.clone()),
            Some(JsonValue::Number(n)) => Ok(n.to_string()),
            _ => Err(Error::Mapping(format!(
                "Record of type {} has no usable \"id\" member",
                self.resource_type
            ))),
        }
    }

    /// Map the record into the `attributes` member. Default: the record's
    /// object members minus `id` and the relationship source fields.
    pub fn map_attributes(&self, record: &JsonValue) -> Result<JsonValue> {
        if let Some(mapper) = &self.attribute_mapper {
            return mapper(record);
        }
        let object = record.as_object().ok_or_else(|| {
            Error::Mapping(format!(
                "Record of type {} is not an object",
                self.resource_type
            ))
        })?;
        let attributes: Map<String, JsonValue> = object
            .iter()
            .filter(|(key, _)| {
                key.as_str() != "id"
                    && !self
                        .relationships
                        .iter()
                        .any(|r| &r.source_field == *key)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(JsonValue::Object(attributes))
    }
}

/// Process-wide catalog of resource definitions, keyed by type name.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    resources: HashMap<String, ResourceDefinition>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Re-registering a type replaces it.
    pub fn register(&mut self, definition: ResourceDefinition) {
        self.resources
            .insert(definition.resource_type.clone(), definition);
    }

    pub fn get(&self, resource_type: &str) -> Option<&ResourceDefinition> {
        self.resources.get(resource_type)
    }

    /// Lookup that treats an unknown type as a configuration defect
    pub fn require(&self, resource_type: &str) -> Result<&ResourceDefinition> {
        self.get(resource_type).ok_or_else(|| {
            Error::Config(format!("Unregistered resource type: {}", resource_type))
        })
    }

    pub fn types(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.values()
    }
}

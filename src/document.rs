//! JSON:API document shapes
//!
//! Serde types for the rendered output: top-level documents, resource
//! objects, relationship linkages, links, and error objects. Absent
//! members are omitted from serialization rather than emitted as null,
//! except the `data` member of an empty to-one linkage, which is an
//! explicit null per the JSON:API document shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::types::Error;

/// A `(type, id)` reference to a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// Links member of a document, resource, or relationship
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinksObject {
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
    /// Present only when more pages exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl LinksObject {
    pub fn self_only(self_link: impl Into<String>) -> Self {
        Self {
            self_link: Some(self_link.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.self_link.is_none() && self.related.is_none() && self.next.is_none()
    }
}

/// Linkage data - one nullable identifier or a list of identifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkageData {
    ToOne(Option<ResourceIdentifier>),
    ToMany(Vec<ResourceIdentifier>),
}

/// A relationship entry on a resource object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipLinkage {
    pub data: LinkageData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<LinksObject>,
}

impl RelationshipLinkage {
    pub fn to_one(target: Option<ResourceIdentifier>) -> Self {
        Self {
            data: LinkageData::ToOne(target),
            links: None,
        }
    }

    pub fn to_many(targets: Vec<ResourceIdentifier>) -> Self {
        Self {
            data: LinkageData::ToMany(targets),
            links: None,
        }
    }

    pub fn with_links(mut self, links: LinksObject) -> Self {
        self.links = Some(links);
        self
    }

    /// All identifiers referenced by this linkage
    pub fn identifiers(&self) -> Vec<&ResourceIdentifier> {
        match &self.data {
            LinkageData::ToOne(Some(id)) => vec![id],
            LinkageData::ToOne(None) => vec![],
            LinkageData::ToMany(ids) => ids.iter().collect(),
        }
    }
}

/// A rendered resource. Immutable once built - the assembler constructs
/// one per render call and never mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(skip_serializing_if = "JsonValue::is_null", default)]
    pub attributes: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<LinksObject>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub relationships: BTreeMap<String, RelationshipLinkage>,
}

impl ResourceObject {
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.resource_type.clone(), self.id.clone())
    }
}

/// Primary `data` member - resource objects for resource documents,
/// bare identifiers for relationship documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    One(Option<ResourceObject>),
    Many(Vec<ResourceObject>),
    OneIdentifier(Option<ResourceIdentifier>),
    ManyIdentifiers(Vec<ResourceIdentifier>),
}

impl PrimaryData {
    /// Resource objects present in the primary data
    pub fn resources(&self) -> &[ResourceObject] {
        match self {
            Self::One(Some(resource)) => std::slice::from_ref(resource),
            Self::Many(resources) => resources,
            _ => &[],
        }
    }
}

/// Top-level JSON:API document: either `data` (with optional `included`,
/// `links`, `meta`) or `errors` - never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub included: Vec<ResourceObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<LinksObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<JsonValue>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<ErrorObject>,
}

impl Document {
    /// Document carrying one resource
    pub fn single(resource: ResourceObject) -> Self {
        Self {
            data: Some(PrimaryData::One(Some(resource))),
            included: Vec::new(),
            links: None,
            meta: None,
            errors: Vec::new(),
        }
    }

    /// Document carrying a page of resources
    pub fn collection(resources: Vec<ResourceObject>) -> Self {
        Self {
            data: Some(PrimaryData::Many(resources)),
            included: Vec::new(),
            links: None,
            meta: None,
            errors: Vec::new(),
        }
    }

    /// Relationship document carrying bare identifiers
    pub fn relationship(data: PrimaryData) -> Self {
        Self {
            data: Some(data),
            included: Vec::new(),
            links: None,
            meta: None,
            errors: Vec::new(),
        }
    }

    /// Error document for a failed request
    pub fn from_error(error: &Error) -> Self {
        Self {
            data: None,
            included: Vec::new(),
            links: None,
            meta: None,
            errors: vec![ErrorObject::from(error)],
        }
    }

    pub fn with_links(mut self, links: LinksObject) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_included(mut self, included: Vec<ResourceObject>) -> Self {
        self.included = included;
        self
    }

    pub fn with_meta(mut self, meta: JsonValue) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Pointer from an error object to the offending request parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// JSON:API error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// HTTP status code class, as a string per the document shape
    pub status: String,
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable detail
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

impl From<&Error> for ErrorObject {
    fn from(error: &Error) -> Self {
        Self {
            status: error.status_code().to_string(),
            code: error.code().to_string(),
            detail: error.to_string(),
            source: error.source_parameter().map(|parameter| ErrorSource {
                parameter: Some(parameter.to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article() -> ResourceObject {
        ResourceObject {
            resource_type: "articles".into(),
            id: "1".into(),
            attributes: json!({"title": "Assembly"}),
            links: Some(LinksObject::self_only("https://api.example.org/articles/1")),
            relationships: BTreeMap::from([(
                "author".to_string(),
                RelationshipLinkage::to_one(Some(ResourceIdentifier::new("people", "9"))),
            )]),
        }
    }

    #[test]
    fn test_single_document_shape() {
        let value = serde_json::to_value(Document::single(article())).unwrap();
        assert_eq!(value["data"]["type"], "articles");
        assert_eq!(value["data"]["id"], "1");
        assert_eq!(value["data"]["attributes"]["title"], "Assembly");
        assert_eq!(
            value["data"]["relationships"]["author"]["data"]["type"],
            "people"
        );
        // absent members stay absent
        assert!(value.get("included").is_none());
        assert!(value.get("errors").is_none());
        assert!(value["data"].get("meta").is_none());
    }

    #[test]
    fn test_empty_to_one_linkage_serializes_null_data() {
        let linkage = RelationshipLinkage::to_one(None);
        let value = serde_json::to_value(&linkage).unwrap();
        assert!(value["data"].is_null());
    }

    #[test]
    fn test_collection_document_with_next_link() {
        let doc = Document::collection(vec![article()]).with_links(LinksObject {
            self_link: Some("https://api.example.org/articles".into()),
            related: None,
            next: Some("https://api.example.org/articles?page[cursor]=abc".into()),
        });
        let value = serde_json::to_value(doc).unwrap();
        assert!(value["data"].is_array());
        assert_eq!(
            value["links"]["next"],
            "https://api.example.org/articles?page[cursor]=abc"
        );
    }

    #[test]
    fn test_error_document_shape() {
        let doc = Document::from_error(&Error::InvalidCursor("zzz".into()));
        let value = serde_json::to_value(doc).unwrap();
        assert!(value.get("data").is_none());
        assert_eq!(value["errors"][0]["status"], "400");
        assert_eq!(value["errors"][0]["code"], "invalid_cursor");
        assert_eq!(value["errors"][0]["source"]["parameter"], "page[cursor]");
    }

    #[test]
    fn test_relationship_document_identifiers() {
        let doc = Document::relationship(PrimaryData::ManyIdentifiers(vec![
            ResourceIdentifier::new("tags", "t1"),
            ResourceIdentifier::new("tags", "t2"),
        ]));
        let value = serde_json::to_value(doc).unwrap();
        assert_eq!(value["data"][0]["type"], "tags");
        assert!(value["data"][0].get("attributes").is_none());
    }
}

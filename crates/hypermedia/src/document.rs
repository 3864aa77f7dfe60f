//! Wire document model: the JSON:API top level and resource objects.
//!
//! [`Document::from_json`] checks only the document's shape. Types, ids and
//! attribute values are interpreted later by the codec against a resolver.

use indexmap::IndexMap;
use hypermedia_json::JsonValue;

use crate::error::{DocumentError, Result};
use crate::naming::FieldNaming;

/// Named link URLs (`self`, `related`, ...).
pub type Links = IndexMap<String, String>;

/// `{type, id}` reference to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
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

    fn to_json(&self) -> JsonValue {
        JsonValue::object([
            ("type", JsonValue::from(self.resource_type.as_str())),
            ("id", JsonValue::from(self.id.as_str())),
        ])
    }
}

/// Relationship `data`.
#[derive(Debug, Clone, PartialEq)]
pub enum Linkage {
    Null,
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

impl Linkage {
    pub fn identifiers(&self) -> &[ResourceIdentifier] {
        match self {
            Linkage::Null => &[],
            Linkage::One(id) => std::slice::from_ref(id),
            Linkage::Many(ids) => ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationshipObject {
    /// `None` when the member has no `data` key (links only).
    pub data: Option<Linkage>,
    pub links: Links,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceObject {
    pub resource_type: String,
    /// Absent on client-generated creates.
    pub id: Option<String>,
    pub attributes: IndexMap<String, JsonValue>,
    pub relationships: IndexMap<String, RelationshipObject>,
    pub links: Links,
}

impl ResourceObject {
    pub fn new(resource_type: impl Into<String>, id: Option<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id,
            ..Self::default()
        }
    }

    /// The `{type, id}` key used for deduplication, if the object has an id.
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id
            .as_ref()
            .map(|id| ResourceIdentifier::new(self.resource_type.clone(), id.clone()))
    }
}

/// Top-level `data`.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryData {
    Null,
    Single(ResourceObject),
    Many(Vec<ResourceObject>),
}

impl PrimaryData {
    pub fn resources(&self) -> &[ResourceObject] {
        match self {
            PrimaryData::Null => &[],
            PrimaryData::Single(r) => std::slice::from_ref(r),
            PrimaryData::Many(rs) => rs,
        }
    }

    fn resources_mut(&mut self) -> &mut [ResourceObject] {
        match self {
            PrimaryData::Null => &mut [],
            PrimaryData::Single(r) => std::slice::from_mut(r),
            PrimaryData::Many(rs) => rs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// `None` when the document has no `data` member, as opposed to
    /// `data: null`.
    pub data: Option<PrimaryData>,
    pub included: Vec<ResourceObject>,
    pub links: Links,
    pub meta: Option<JsonValue>,
}

impl Document {
    /// Parses JSON text into a document.
    pub fn parse(text: &str) -> Result<Self> {
        let value = hypermedia_json::parse(text)?;
        Ok(Self::from_json(&value)?)
    }

    pub fn from_json(value: &JsonValue) -> Result<Self, DocumentError> {
        if value.as_object().is_none() {
            return Err(DocumentError::NotAnObject);
        }
        let data = match value.get("data") {
            None => None,
            Some(JsonValue::Null) => Some(PrimaryData::Null),
            Some(JsonValue::Array(items)) => Some(PrimaryData::Many(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| read_resource(item, &format!("data[{i}]")))
                    .collect::<Result<_, _>>()?,
            )),
            Some(item) => Some(PrimaryData::Single(read_resource(item, "data")?)),
        };
        let included = match value.get("included") {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| read_resource(item, &format!("included[{i}]")))
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(DocumentError::ExpectedArray("included".into())),
        };
        let links = read_links(value.get("links"), "links")?;
        let meta = match value.get("meta") {
            None | Some(JsonValue::Null) => None,
            Some(meta @ JsonValue::Object(_)) => Some(meta.clone()),
            Some(_) => return Err(DocumentError::ExpectedObject("meta".into())),
        };
        Ok(Self {
            data,
            included,
            links,
            meta,
        })
    }

    pub fn to_json(&self) -> JsonValue {
        let mut out = JsonValue::Object(Vec::new());
        if let Some(data) = &self.data {
            let data = match data {
                PrimaryData::Null => JsonValue::Null,
                PrimaryData::Single(r) => write_resource(r),
                PrimaryData::Many(rs) => JsonValue::Array(rs.iter().map(write_resource).collect()),
            };
            out.insert("data", data);
        }
        if !self.included.is_empty() {
            out.insert(
                "included",
                JsonValue::Array(self.included.iter().map(write_resource).collect()),
            );
        }
        if !self.links.is_empty() {
            out.insert("links", write_links(&self.links));
        }
        if let Some(meta) = &self.meta {
            out.insert("meta", meta.clone());
        }
        out
    }

    /// Every resource object, primary first, then included.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceObject> {
        self.data
            .iter()
            .flat_map(PrimaryData::resources)
            .chain(self.included.iter())
    }

    /// Rewrites every attribute and relationship key from whatever casing it
    /// has to `naming`.
    pub fn recase(&mut self, naming: FieldNaming) {
        let recase_key = |key: &str| naming.to_wire(&FieldNaming::Camel.from_wire(key));
        let primary = self.data.iter_mut().flat_map(PrimaryData::resources_mut);
        for resource in primary.chain(self.included.iter_mut()) {
            resource.attributes = std::mem::take(&mut resource.attributes)
                .into_iter()
                .map(|(k, v)| (recase_key(&k), v))
                .collect();
            resource.relationships = std::mem::take(&mut resource.relationships)
                .into_iter()
                .map(|(k, v)| (recase_key(&k), v))
                .collect();
        }
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hypermedia_json::to_string(&self.to_json()))
    }
}

fn read_resource(value: &JsonValue, path: &str) -> Result<ResourceObject, DocumentError> {
    if value.as_object().is_none() {
        return Err(DocumentError::ExpectedObject(path.to_owned()));
    }
    let resource_type = value
        .get("type")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| DocumentError::MissingType(path.to_owned()))?
        .to_owned();
    let id = match value.get("id") {
        None | Some(JsonValue::Null) => None,
        Some(id) => Some(read_id(id).ok_or_else(|| DocumentError::InvalidId(path.to_owned()))?),
    };
    let attributes = match value.get("attributes") {
        None | Some(JsonValue::Null) => IndexMap::new(),
        Some(JsonValue::Object(entries)) => entries.iter().cloned().collect(),
        Some(_) => return Err(DocumentError::ExpectedObject(format!("{path}.attributes"))),
    };
    let relationships = match value.get("relationships") {
        None | Some(JsonValue::Null) => IndexMap::new(),
        Some(JsonValue::Object(entries)) => entries
            .iter()
            .map(|(name, rel)| {
                read_relationship(rel, &format!("{path}.relationships.{name}"))
                    .map(|rel| (name.clone(), rel))
            })
            .collect::<Result<_, _>>()?,
        Some(_) => {
            return Err(DocumentError::ExpectedObject(format!(
                "{path}.relationships"
            )))
        }
    };
    let links = read_links(value.get("links"), &format!("{path}.links"))?;
    Ok(ResourceObject {
        resource_type,
        id,
        attributes,
        relationships,
        links,
    })
}

fn read_id(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Str(s) => Some(s.clone()),
        JsonValue::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

fn read_identifier(value: &JsonValue, path: &str) -> Result<ResourceIdentifier, DocumentError> {
    let invalid = || DocumentError::InvalidLinkage(path.to_owned());
    let resource_type = value.get("type").and_then(JsonValue::as_str).ok_or_else(invalid)?;
    let id = value.get("id").and_then(read_id).ok_or_else(invalid)?;
    Ok(ResourceIdentifier::new(resource_type, id))
}

fn read_relationship(value: &JsonValue, path: &str) -> Result<RelationshipObject, DocumentError> {
    if value.as_object().is_none() {
        return Err(DocumentError::ExpectedObject(path.to_owned()));
    }
    let data_path = format!("{path}.data");
    let data = match value.get("data") {
        None => None,
        Some(JsonValue::Null) => Some(Linkage::Null),
        Some(JsonValue::Array(items)) => Some(Linkage::Many(
            items
                .iter()
                .map(|item| read_identifier(item, &data_path))
                .collect::<Result<_, _>>()?,
        )),
        Some(item @ JsonValue::Object(_)) => Some(Linkage::One(read_identifier(item, &data_path)?)),
        Some(_) => return Err(DocumentError::InvalidLinkage(data_path)),
    };
    let links = read_links(value.get("links"), &format!("{path}.links"))?;
    Ok(RelationshipObject { data, links })
}

fn read_links(value: Option<&JsonValue>, path: &str) -> Result<Links, DocumentError> {
    let entries = match value {
        None | Some(JsonValue::Null) => return Ok(Links::new()),
        Some(JsonValue::Object(entries)) => entries,
        Some(_) => return Err(DocumentError::ExpectedObject(path.to_owned())),
    };
    let mut links = Links::new();
    for (name, link) in entries {
        let href = match link {
            JsonValue::Null => continue,
            JsonValue::Str(s) => s.clone(),
            other => other
                .get("href")
                .and_then(JsonValue::as_str)
                .map(str::to_owned)
                .ok_or_else(|| DocumentError::InvalidLink(format!("{path}.{name}")))?,
        };
        links.insert(name.clone(), href);
    }
    Ok(links)
}

fn write_links(links: &Links) -> JsonValue {
    JsonValue::object(links.iter().map(|(k, v)| (k.as_str(), JsonValue::from(v.as_str()))))
}

fn write_resource(resource: &ResourceObject) -> JsonValue {
    let mut out = JsonValue::object([("type", JsonValue::from(resource.resource_type.as_str()))]);
    if let Some(id) = &resource.id {
        out.insert("id", JsonValue::from(id.as_str()));
    }
    if !resource.attributes.is_empty() {
        out.insert(
            "attributes",
            JsonValue::object(resource.attributes.iter().map(|(k, v)| (k.as_str(), v.clone()))),
        );
    }
    if !resource.relationships.is_empty() {
        let relationships = resource.relationships.iter().map(|(name, rel)| {
            let mut obj = JsonValue::Object(Vec::new());
            if let Some(data) = &rel.data {
                let data = match data {
                    Linkage::Null => JsonValue::Null,
                    Linkage::One(id) => id.to_json(),
                    Linkage::Many(ids) => {
                        JsonValue::Array(ids.iter().map(ResourceIdentifier::to_json).collect())
                    }
                };
                obj.insert("data", data);
            }
            if !rel.links.is_empty() {
                obj.insert("links", write_links(&rel.links));
            }
            (name.as_str(), obj)
        });
        out.insert("relationships", JsonValue::object(relationships));
    }
    if !resource.links.is_empty() {
        out.insert("links", write_links(&resource.links));
    }
    out
}

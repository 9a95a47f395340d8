use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Cardinality of a relation field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    ManyToOne,
    OneToOne,
    ManyToMany,
    OneToMany,
}

impl RelationKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "manyToOne" => Some(RelationKind::ManyToOne),
            "oneToOne" => Some(RelationKind::OneToOne),
            "manyToMany" => Some(RelationKind::ManyToMany),
            "oneToMany" => Some(RelationKind::OneToMany),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::ManyToOne => "manyToOne",
            RelationKind::OneToOne => "oneToOne",
            RelationKind::ManyToMany => "manyToMany",
            RelationKind::OneToMany => "oneToMany",
        }
    }

    pub fn is_to_one(&self) -> bool {
        matches!(self, RelationKind::ManyToOne | RelationKind::OneToOne)
    }

    pub fn is_to_many(&self) -> bool {
        !self.is_to_one()
    }
}

/// Storage type of a field: one of the relation kinds or a scalar type name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DbType {
    Relation(RelationKind),
    Scalar(String),
}

impl DbType {
    pub fn relation_kind(&self) -> Option<RelationKind> {
        match self {
            DbType::Relation(kind) => Some(*kind),
            DbType::Scalar(_) => None,
        }
    }

    pub fn is_scalar(&self, name: &str) -> bool {
        matches!(self, DbType::Scalar(s) if s == name)
    }
}

impl Default for DbType {
    fn default() -> Self {
        DbType::Scalar("varchar".to_string())
    }
}

impl From<String> for DbType {
    fn from(raw: String) -> Self {
        match RelationKind::parse(&raw) {
            Some(kind) => DbType::Relation(kind),
            None => DbType::Scalar(raw),
        }
    }
}

impl From<DbType> for String {
    fn from(db_type: DbType) -> Self {
        match db_type {
            DbType::Relation(kind) => kind.as_str().to_string(),
            DbType::Scalar(name) => name,
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::Relation(kind) => f.write_str(kind.as_str()),
            DbType::Scalar(name) => f.write_str(name),
        }
    }
}

/// Statically configured choice of an enumerated field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub label: String,
    pub db_type: DbType,
    /// UI type such as `images` or `files`
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub related_entity_definition_id: Option<String>,
    pub filterable_in_list: bool,
    pub searchable: bool,
    pub display_in_table: bool,
    pub is_option_title_field: bool,
    pub options: Option<Vec<FieldOption>>,
    pub section_index: Option<u32>,
}

impl Field {
    /// Relation kind when the field points at another entity definition
    pub fn relation_kind(&self) -> Option<RelationKind> {
        let related = self.related_entity_definition_id.as_deref().unwrap_or("");
        if related.is_empty() {
            return None;
        }
        self.db_type.relation_kind()
    }

    pub fn is_relation(&self) -> bool {
        self.relation_kind().is_some()
    }

    pub fn has_static_options(&self) -> bool {
        self.options.as_ref().map_or(false, |opts| !opts.is_empty())
    }

    pub fn is_field_type(&self, name: &str) -> bool {
        self.field_type.as_deref() == Some(name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityDefinition {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub page_size: Option<u32>,
    pub title_section0: Option<String>,
    pub title_section1: Option<String>,
    pub title_section2: Option<String>,
    pub title_section3: Option<String>,
    pub fields: Vec<Field>,
}

impl EntityDefinition {
    pub fn page_size(&self) -> u32 {
        match self.page_size {
            Some(size) if size > 0 => size,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn section_title(&self, section: u32) -> Option<&str> {
        let title = match section {
            0 => self.title_section0.as_deref(),
            1 => self.title_section1.as_deref(),
            2 => self.title_section2.as_deref(),
            3 => self.title_section3.as_deref(),
            _ => None,
        };
        title.filter(|t| !t.trim().is_empty())
    }
}

/// One record of an entity definition, fields flattened at the top level
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instance(pub Map<String, Value>);

impl Instance {
    pub fn id(&self) -> String {
        match self.0.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn slug(&self) -> Option<&str> {
        self.0.get("slug").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Value> for Instance {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Instance(map),
            _ => Instance::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstancesPage {
    pub data: Vec<Instance>,
    pub pagination: Pagination,
}

/// ANY: at least one selected option matches. ALL: every selected option matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Any,
    All,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Any => "any",
            FilterMode::All => "all",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "any" => Some(FilterMode::Any),
            "all" => Some(FilterMode::All),
            _ => None,
        }
    }
}

/// Parameters of a paginated, filtered, searched instances request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_filter_modes: Option<BTreeMap<String, FilterMode>>,
}

impl InstanceQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlugLookup {
    /// Relations as bare ids instead of projections
    pub relations_as_ids: bool,
    pub load_files: bool,
}

impl Default for SlugLookup {
    fn default() -> Self {
        Self {
            relations_as_ids: false,
            load_files: true,
        }
    }
}

/// File attached to an `images` or `files` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub file_name: String,
    pub file_url: String,
}

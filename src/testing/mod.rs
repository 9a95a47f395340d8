use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::sdk::{
    DbType, EntityApi, EntityDefinition, Field, Instance, InstanceQuery, InstancesPage, Pagination,
    RelationKind, SdkError, SdkResult, SlugLookup,
};

/// In-memory entity service for unit tests
#[derive(Default)]
pub struct FakeEntityApi {
    project_id: String,
    definitions: Vec<EntityDefinition>,
    instances: HashMap<String, Vec<Instance>>,
    failures_remaining: AtomicUsize,
    calls: Mutex<Vec<String>>,
    queries: Mutex<Vec<(String, InstanceQuery)>>,
    total_override: Option<u64>,
}

impl FakeEntityApi {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_definition(mut self, definition: EntityDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_instances(mut self, definition_id: &str, records: Vec<Value>) -> Self {
        self.instances
            .insert(definition_id.to_string(), records.into_iter().map(Instance::from).collect());
        self
    }

    /// Fail the next `count` calls
    pub fn failing(self, count: usize) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    pub fn reporting_total(mut self, total: u64) -> Self {
        self.total_override = Some(total);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn queries(&self) -> Vec<(String, InstanceQuery)> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> SdkResult<()> {
        self.calls.lock().unwrap().push(call);
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(SdkError::Status {
                status: 503,
                message: "upstream unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EntityApi for FakeEntityApi {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn get_all_entity_definitions(&self) -> SdkResult<Vec<EntityDefinition>> {
        self.record("definitions".to_string())?;
        Ok(self.definitions.clone())
    }

    async fn get_entity_definition_config(&self, entity_definition_id: &str) -> SdkResult<EntityDefinition> {
        self.record(format!("config:{}", entity_definition_id))?;
        self.definitions
            .iter()
            .find(|d| d.id == entity_definition_id)
            .cloned()
            .ok_or_else(|| SdkError::NotFound(entity_definition_id.to_string()))
    }

    async fn get_instance_by_slug(
        &self,
        entity_definition_id: &str,
        slug: &str,
        _lookup: SlugLookup,
    ) -> SdkResult<Option<Instance>> {
        self.record(format!("slug:{}:{}", entity_definition_id, slug))?;
        Ok(self
            .instances
            .get(entity_definition_id)
            .and_then(|records| records.iter().find(|r| r.slug() == Some(slug)).cloned()))
    }

    async fn get_instances(&self, entity_definition_id: &str, query: &InstanceQuery) -> SdkResult<InstancesPage> {
        self.record(format!("instances:{}", entity_definition_id))?;
        self.queries
            .lock()
            .unwrap()
            .push((entity_definition_id.to_string(), query.clone()));

        let records = self.instances.get(entity_definition_id).cloned().unwrap_or_default();
        let limit = query.limit.max(1) as usize;
        let page = query.page.max(1) as usize;
        let total = self.total_override.unwrap_or(records.len() as u64);
        let total_pages = ((total as usize) + limit - 1) / limit;
        let data = records.into_iter().skip((page - 1) * limit).take(limit).collect();

        Ok(InstancesPage {
            data,
            pagination: Pagination {
                page: page as u32,
                limit: limit as u32,
                total,
                total_pages: total_pages as u32,
                has_next_page: page < total_pages,
                has_previous_page: page > 1,
            },
        })
    }
}

pub fn relation_field(name: &str, kind: RelationKind, related: &str) -> Field {
    Field {
        id: format!("field-{}", name),
        name: name.to_string(),
        label: capitalize(name),
        db_type: DbType::Relation(kind),
        related_entity_definition_id: Some(related.to_string()),
        ..Default::default()
    }
}

pub fn scalar_field(name: &str, db_type: &str) -> Field {
    Field {
        id: format!("field-{}", name),
        name: name.to_string(),
        label: capitalize(name),
        db_type: DbType::Scalar(db_type.to_string()),
        ..Default::default()
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// "Products" with a displayed name and a filterable category relation
pub fn products_definition() -> EntityDefinition {
    let mut name = scalar_field("name", "varchar");
    name.display_in_table = true;
    name.searchable = true;

    let mut category = relation_field("category", RelationKind::ManyToOne, "categories-def");
    category.filterable_in_list = true;
    category.display_in_table = true;

    EntityDefinition {
        id: "products-def".to_string(),
        name: "Products".to_string(),
        slug: "products".to_string(),
        page_size: Some(2),
        fields: vec![name, category],
        ..Default::default()
    }
}

pub fn categories_definition() -> EntityDefinition {
    let mut title = scalar_field("title", "varchar");
    title.is_option_title_field = true;

    EntityDefinition {
        id: "categories-def".to_string(),
        name: "Categories".to_string(),
        slug: "categories".to_string(),
        fields: vec![scalar_field("code", "varchar"), title],
        ..Default::default()
    }
}

pub fn shop_api() -> FakeEntityApi {
    FakeEntityApi::new("proj-1")
        .with_definition(products_definition())
        .with_definition(categories_definition())
        .with_instances(
            "products-def",
            vec![
                json!({"id": "p1", "slug": "boots", "name": "Boots", "category": {"id": "c1", "title": "Shoes"}}),
                json!({"id": "p2", "slug": "cap", "name": "Cap", "category": {"id": "c2", "title": "Hats"}}),
                json!({"id": "p3", "slug": "scarf", "name": "Scarf", "category": null}),
            ],
        )
        .with_instances(
            "categories-def",
            vec![
                json!({"id": "c1", "code": "S", "title": "Shoes"}),
                json!({"id": "c2", "code": "H", "title": "Hats"}),
            ],
        )
}

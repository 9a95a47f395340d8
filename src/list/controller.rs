use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::facet::FacetEvent;
use super::field::FilterField;
use super::params::ListParams;
use super::query::{FilterState, InstancesCache, QueryKey};
use crate::cache::QueryError;
use crate::display::{format_list_cell, value_to_string};
use crate::sdk::{EntityDefinition, Field, FilterMode, Instance, InstanceQuery, InstancesPage, Pagination};

/// Default number of data columns next to the identity column
pub const MAX_DISPLAY_COLUMNS: usize = 5;

pub const LOAD_ERROR_TEXT: &str = "Error loading data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ListStatus {
    /// Nothing to show yet and a fetch is running
    InitialLoading,
    /// Previous results stay visible under an overlay
    Refetching,
    Ready,
}

/// Handle of a started fetch; its result is committed only while its key is current
#[derive(Debug, Clone)]
pub struct FetchTicket {
    key: QueryKey,
    query: InstanceQuery,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn query(&self) -> &InstanceQuery {
        &self.query
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub href: String,
    pub cells: Vec<String>,
}

/// Coordinates search, filters, modes and paging of one entity list.
///
/// Field-derived lists are computed once since definitions never change while
/// a controller is alive. Results of the previous query stay in `data` until
/// the result of the current key arrives.
#[derive(Debug, Clone)]
pub struct EntityListController {
    project_id: String,
    definition: Arc<EntityDefinition>,
    display_fields: Vec<Field>,
    filter_fields: Vec<FilterField>,
    searchable_fields: Vec<Field>,
    params: ListParams,
    deferred_search: String,
    data: Option<InstancesPage>,
    fetching: bool,
    error: Option<QueryError>,
    committed: Option<QueryKey>,
}

impl EntityListController {
    pub fn new(project_id: impl Into<String>, definition: Arc<EntityDefinition>, max_columns: usize) -> Self {
        let display_fields = definition
            .fields
            .iter()
            .filter(|f| f.display_in_table)
            .take(max_columns)
            .cloned()
            .collect();

        let filter_fields = definition
            .fields
            .iter()
            .filter(|f| f.filterable_in_list && (f.is_relation() || f.has_static_options()))
            .cloned()
            .map(FilterField::new)
            .collect();

        let searchable_fields = definition.fields.iter().filter(|f| f.searchable).cloned().collect();

        Self {
            project_id: project_id.into(),
            definition,
            display_fields,
            filter_fields,
            searchable_fields,
            params: ListParams::default(),
            deferred_search: String::new(),
            data: None,
            fetching: false,
            error: None,
            committed: None,
        }
    }

    /// Controller restored from URL state; the search text is taken as already committed
    pub fn from_params(
        project_id: impl Into<String>,
        definition: Arc<EntityDefinition>,
        max_columns: usize,
        params: ListParams,
    ) -> Self {
        let mut controller = Self::new(project_id, definition, max_columns);
        for field in &mut controller.filter_fields {
            if params.is_open(field.name()) {
                field.set_open(true);
                field.facet_mut().set_search_query(params.facet_search.clone());
            }
        }
        controller.deferred_search = params.search.clone();
        controller.params = params;
        controller
    }

    pub fn definition(&self) -> &EntityDefinition {
        &self.definition
    }

    pub fn params(&self) -> &ListParams {
        &self.params
    }

    pub fn search(&self) -> &str {
        &self.params.search
    }

    pub fn deferred_search(&self) -> &str {
        &self.deferred_search
    }

    pub fn page(&self) -> u32 {
        self.params.page
    }

    pub fn filters(&self) -> &FilterState {
        &self.params.filters
    }

    pub fn filter_mode(&self, field: &str) -> FilterMode {
        self.params.mode(field)
    }

    pub fn display_fields(&self) -> &[Field] {
        &self.display_fields
    }

    pub fn filter_fields(&self) -> &[FilterField] {
        &self.filter_fields
    }

    pub fn filterable_fields(&self) -> Vec<&Field> {
        self.filter_fields.iter().map(FilterField::field).collect()
    }

    pub fn searchable_fields(&self) -> &[Field] {
        &self.searchable_fields
    }

    pub fn show_search(&self) -> bool {
        !self.searchable_fields.is_empty()
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.params.set_search(search);
    }

    pub fn commit_search(&mut self) {
        self.deferred_search = self.params.search.clone();
    }

    pub fn set_filter(&mut self, field: &str, values: Vec<String>) {
        self.params.set_filter(field, values);
    }

    pub fn set_filter_mode(&mut self, field: &str, mode: FilterMode) {
        self.params.set_filter_mode(field, mode);
    }

    pub fn set_open(&mut self, field: &str, open: bool) {
        if let Some(filter) = self.filter_fields.iter_mut().find(|f| f.name() == field) {
            filter.set_open(open);
            self.params.set_open(field, open);
        }
    }

    pub fn set_facet_search(&mut self, field: &str, text: &str) {
        if let Some(filter) = self.filter_fields.iter_mut().find(|f| f.name() == field) {
            filter.facet_mut().set_search_query(text);
            if self.params.is_open(field) {
                self.params.set_facet_search(text);
            }
        }
    }

    /// Route an event emitted by the facet of `field`
    pub fn apply(&mut self, field: &str, event: FacetEvent) {
        match event {
            FacetEvent::OpenChanged(open) => self.set_open(field, open),
            FacetEvent::SelectionChanged(values) => self.set_filter(field, values),
            FacetEvent::ModeChanged(mode) => self.set_filter_mode(field, mode),
        }
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.data.as_ref().map(|d| &d.pagination)
    }

    pub fn can_go_previous(&self) -> bool {
        !self.fetching && self.pagination().map_or(false, |p| p.has_previous_page)
    }

    pub fn can_go_next(&self) -> bool {
        !self.fetching && self.pagination().map_or(false, |p| p.has_next_page)
    }

    pub fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.params.set_page(self.params.page + 1);
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.params.set_page(self.params.page.saturating_sub(1));
        true
    }

    pub fn query_key(&self) -> QueryKey {
        QueryKey {
            project_id: self.project_id.clone(),
            entity_definition_id: self.definition.id.clone(),
            page: self.params.page,
            search: self.deferred_search.clone(),
            filters: self.params.filters.clone(),
            filter_modes: self.params.filter_modes.clone(),
        }
    }

    /// Request for the current key. Every field with a selection carries a mode.
    pub fn instance_query(&self) -> InstanceQuery {
        let filters = &self.params.filters;
        let search = Some(self.deferred_search.clone()).filter(|s| !s.is_empty());

        let (filters, modes) = if filters.is_empty() {
            (None, None)
        } else {
            let values: BTreeMap<String, Vec<String>> = filters
                .iter()
                .map(|(field, ids)| (field.clone(), ids.iter().cloned().collect()))
                .collect();
            let modes: BTreeMap<String, FilterMode> = filters
                .keys()
                .map(|field| (field.clone(), self.params.mode(field)))
                .collect();
            (Some(values), Some(modes))
        };

        InstanceQuery {
            page: self.params.page,
            limit: self.definition.page_size(),
            search,
            filters,
            relation_filter_modes: modes,
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetching = true;
        FetchTicket {
            key: self.query_key(),
            query: self.instance_query(),
        }
    }

    /// Commit a result; returns false when the ticket was superseded
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<InstancesPage, QueryError>) -> bool {
        if ticket.key != self.query_key() {
            tracing::debug!("discarding result of superseded query: {:?}", ticket.key);
            return false;
        }

        self.fetching = false;
        match result {
            Ok(page) => {
                self.data = Some(page);
                self.error = None;
                self.committed = Some(ticket.key);
            }
            Err(err) => {
                tracing::warn!("list query for '{}' failed: {}", self.definition.slug, err);
                self.error = Some(err);
            }
        }
        true
    }

    /// Fetch the current key through the shared cache and commit the result
    pub async fn refresh(&mut self, cache: &InstancesCache) -> bool {
        let ticket = self.begin_fetch();
        let result = cache.load(ticket.key.clone(), ticket.query.clone()).await;
        self.complete_fetch(ticket, result)
    }

    pub fn status(&self) -> ListStatus {
        match (self.fetching, self.data.is_some()) {
            (true, false) => ListStatus::InitialLoading,
            (true, true) => ListStatus::Refetching,
            (false, _) => ListStatus::Ready,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn data(&self) -> Option<&InstancesPage> {
        self.data.as_ref()
    }

    pub fn committed_key(&self) -> Option<&QueryKey> {
        self.committed.as_ref()
    }

    pub fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    pub fn error_text(&self) -> Option<&'static str> {
        self.error.as_ref().map(|_| LOAD_ERROR_TEXT)
    }

    pub fn rows(&self) -> Vec<ListRow> {
        let instances = self.data.as_ref().map(|d| d.data.as_slice()).unwrap_or(&[]);
        instances.iter().map(|instance| self.row(instance)).collect()
    }

    fn row(&self, instance: &Instance) -> ListRow {
        let id = instance.id();
        let title = match instance.get("name").map(value_to_string) {
            Some(name) if !name.is_empty() => name,
            _ => id.clone(),
        };
        let instance_slug = instance.slug().map(str::to_string).unwrap_or_else(|| id.clone());

        ListRow {
            href: format!("/entities/{}/{}", self.definition.slug, instance_slug),
            cells: self
                .display_fields
                .iter()
                .map(|field| format_list_cell(field, instance.get(&field.name)))
                .collect(),
            id,
            title,
        }
    }
}

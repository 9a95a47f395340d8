use serde::Serialize;

use super::facet::{FacetEvent, FacetOption, FacetProps, FacetView, FacetedFilter};
use crate::cache::QueryStatus;
use crate::options::{EntityOptionsData, OptionsCache};
use crate::sdk::{Field, FilterMode};

/// Options handed to a facet together with their load state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FieldOptionsState {
    pub options: Vec<FacetOption>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Binds one filterable field to a faceted filter.
///
/// Relation fields take their options from the shared options cache, and only
/// once the facet is open. Other fields use their static choice list.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterField {
    field: Field,
    facet: FacetedFilter,
}

impl FilterField {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            facet: FacetedFilter::new(),
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn facet(&self) -> &FacetedFilter {
        &self.facet
    }

    pub fn facet_mut(&mut self) -> &mut FacetedFilter {
        &mut self.facet
    }

    pub fn is_relation(&self) -> bool {
        self.field.is_relation()
    }

    /// ANY/ALL only means something for relation fields
    pub fn show_mode_toggle(&self) -> bool {
        self.is_relation()
    }

    pub fn related_id(&self) -> &str {
        self.field.related_entity_definition_id.as_deref().unwrap_or("")
    }

    pub fn set_open(&mut self, open: bool) -> FacetEvent {
        self.facet.set_open(open)
    }

    pub fn should_load_options(&self) -> bool {
        self.facet.is_open() && self.is_relation()
    }

    pub fn static_options(&self) -> Vec<FacetOption> {
        self.field
            .options
            .as_ref()
            .map(|opts| opts.iter().map(|o| FacetOption::new(&o.id, &o.name)).collect())
            .unwrap_or_default()
    }

    /// Options and load state for a given cache status of the related entity.
    ///
    /// Loading and error are reported only while the lazy-load condition holds,
    /// so a closed or non-relation field never shows a stale banner.
    pub fn options_state(&self, status: &QueryStatus<EntityOptionsData>) -> FieldOptionsState {
        let options = match (self.is_relation(), status.data()) {
            (true, Some(data)) => data
                .options
                .iter()
                .map(|o| FacetOption::new(&o.id, &o.title))
                .collect(),
            _ => self.static_options(),
        };

        let active = self.should_load_options();
        FieldOptionsState {
            options,
            loading: active && status.is_loading(),
            error: if active {
                status.error().map(|e| e.message().to_string())
            } else {
                None
            },
        }
    }

    /// Resolve options, fetching through the cache only when the facet is open
    pub async fn load_options(&self, cache: &OptionsCache) -> FieldOptionsState {
        if !self.should_load_options() {
            return self.options_state(&cache.status(self.related_id()));
        }

        let status = match cache.load(self.related_id()).await {
            Ok(data) => QueryStatus::Success(data),
            Err(err) => QueryStatus::Error(err),
        };
        self.options_state(&status)
    }

    pub fn view(&self, state: &FieldOptionsState, selection: &[String], mode: FilterMode) -> FacetView {
        self.facet.view(FacetProps {
            title: &self.field.label,
            options: &state.options,
            selection,
            show_mode_toggle: self.show_mode_toggle(),
            filter_mode: mode,
            loading: state.loading,
            error: state.error.as_deref(),
        })
    }
}

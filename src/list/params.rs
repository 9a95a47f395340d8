//! URL query codec of the list state.
//!
//! `q` search text, `page`, `f.<field>` once per selected id, `m.<field>`
//! filter mode, `open` the field whose facet is expanded and `fq` the local
//! search inside that facet. Defaults are omitted so the bare list URL is the
//! initial state.

use std::collections::BTreeMap;

use url::form_urlencoded;

use super::facet::FacetEvent;
use super::query::FilterState;
use crate::sdk::FilterMode;

const FILTER_PREFIX: &str = "f.";
const MODE_PREFIX: &str = "m.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub search: String,
    pub page: u32,
    pub filters: FilterState,
    pub filter_modes: BTreeMap<String, FilterMode>,
    pub open: Option<String>,
    pub facet_search: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            filters: FilterState::new(),
            filter_modes: BTreeMap::new(),
            open: None,
            facet_search: String::new(),
        }
    }
}

impl ListParams {
    /// Lenient parse: unknown keys, bad pages and bad modes are ignored
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "q" => params.search = value.into_owned(),
                "page" => params.page = value.parse::<u32>().ok().filter(|p| *p > 0).unwrap_or(1),
                "open" if !value.is_empty() => params.open = Some(value.into_owned()),
                "fq" => params.facet_search = value.into_owned(),
                k => {
                    if let Some(field) = k.strip_prefix(FILTER_PREFIX) {
                        if !field.is_empty() && !value.is_empty() {
                            params
                                .filters
                                .entry(field.to_string())
                                .or_default()
                                .insert(value.into_owned());
                        }
                    } else if let Some(field) = k.strip_prefix(MODE_PREFIX) {
                        if let Some(mode) = FilterMode::parse(&value) {
                            params.filter_modes.insert(field.to_string(), mode);
                        }
                    }
                }
            }
        }
        params
    }

    pub fn to_query(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if !self.search.is_empty() {
            out.append_pair("q", &self.search);
        }
        if self.page > 1 {
            out.append_pair("page", &self.page.to_string());
        }
        for (field, values) in &self.filters {
            let key = format!("{}{}", FILTER_PREFIX, field);
            for value in values {
                out.append_pair(&key, value);
            }
        }
        for (field, mode) in &self.filter_modes {
            out.append_pair(&format!("{}{}", MODE_PREFIX, field), mode.as_str());
        }
        if let Some(open) = &self.open {
            out.append_pair("open", open);
            if !self.facet_search.is_empty() {
                out.append_pair("fq", &self.facet_search);
            }
        }
        out.finish()
    }

    pub fn href(&self, path: &str) -> String {
        let query = self.to_query();
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query)
        }
    }

    pub fn selection(&self, field: &str) -> Vec<String> {
        self.filters
            .get(field)
            .map(|values| values.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn mode(&self, field: &str) -> FilterMode {
        self.filter_modes.get(field).copied().unwrap_or_default()
    }

    pub fn is_open(&self, field: &str) -> bool {
        self.open.as_deref() == Some(field)
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// An empty selection removes the field from the filters
    pub fn set_filter(&mut self, field: &str, values: Vec<String>) {
        if values.is_empty() {
            self.filters.remove(field);
        } else {
            self.filters.insert(field.to_string(), values.into_iter().collect());
        }
        self.page = 1;
    }

    pub fn set_filter_mode(&mut self, field: &str, mode: FilterMode) {
        self.filter_modes.insert(field.to_string(), mode);
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Opening or closing a facet discards the facet search text
    pub fn set_open(&mut self, field: &str, open: bool) {
        if open {
            if !self.is_open(field) {
                self.facet_search.clear();
            }
            self.open = Some(field.to_string());
        } else if self.is_open(field) {
            self.open = None;
            self.facet_search.clear();
        }
    }

    pub fn set_facet_search(&mut self, text: impl Into<String>) {
        self.facet_search = text.into();
    }

    pub fn apply(&mut self, field: &str, event: FacetEvent) {
        match event {
            FacetEvent::OpenChanged(open) => self.set_open(field, open),
            FacetEvent::SelectionChanged(values) => self.set_filter(field, values),
            FacetEvent::ModeChanged(mode) => self.set_filter_mode(field, mode),
        }
    }

    /// Copy with one event applied, for rendering links to the next state
    pub fn with(&self, field: &str, event: FacetEvent) -> Self {
        let mut next = self.clone();
        next.apply(field, event);
        next
    }
}

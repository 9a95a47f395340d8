use serde::Serialize;

use crate::sdk::FilterMode;

/// Selectable value of a facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
}

impl FacetOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// What a facet reports back to its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetEvent {
    OpenChanged(bool),
    SelectionChanged(Vec<String>),
    ModeChanged(FilterMode),
}

/// Inputs the owner supplies when rendering a facet
#[derive(Debug, Clone, Copy)]
pub struct FacetProps<'a> {
    pub title: &'a str,
    pub options: &'a [FacetOption],
    pub selection: &'a [String],
    pub show_mode_toggle: bool,
    pub filter_mode: FilterMode,
    pub loading: bool,
    pub error: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetRow {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "items", rename_all = "lowercase")]
pub enum FacetBody {
    Loading,
    Error(String),
    Empty,
    Options(Vec<FacetRow>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetFooter {
    /// Current mode when the ANY/ALL switch is shown
    pub mode_toggle: Option<FilterMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetView {
    pub title: String,
    pub open: bool,
    pub search_query: String,
    pub selected_count: usize,
    pub badges: Vec<String>,
    pub body: FacetBody,
    pub footer: Option<FacetFooter>,
}

/// Multi-select filter control.
///
/// Holds nothing but its open flag and the local search text; the selection
/// and mode belong to the owner and change only through returned events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetedFilter {
    open: bool,
    search_query: String,
}

impl FacetedFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Closing discards the local search text, never the selection
    pub fn set_open(&mut self, open: bool) -> FacetEvent {
        self.open = open;
        if !open {
            self.search_query.clear();
        }
        FacetEvent::OpenChanged(open)
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Selection with `id` added or removed; the input is left untouched
    pub fn toggle_option(&self, selection: &[String], id: &str) -> FacetEvent {
        let mut next: Vec<String> = Vec::with_capacity(selection.len() + 1);
        for value in selection {
            if !next.contains(value) {
                next.push(value.clone());
            }
        }

        if let Some(pos) = next.iter().position(|v| v == id) {
            next.remove(pos);
        } else {
            next.push(id.to_string());
        }
        FacetEvent::SelectionChanged(next)
    }

    pub fn clear_all(&self) -> FacetEvent {
        FacetEvent::SelectionChanged(Vec::new())
    }

    pub fn toggle_mode(&self, checked: bool) -> FacetEvent {
        FacetEvent::ModeChanged(if checked { FilterMode::All } else { FilterMode::Any })
    }

    /// Options whose label contains the local search text, ignoring case
    pub fn filtered_options<'a>(&self, options: &'a [FacetOption]) -> Vec<&'a FacetOption> {
        if self.search_query.is_empty() {
            return options.iter().collect();
        }
        let query = self.search_query.to_lowercase();
        options
            .iter()
            .filter(|option| option.label.to_lowercase().contains(&query))
            .collect()
    }

    pub fn mode_toggle_visible(show_mode_toggle: bool, selection: &[String]) -> bool {
        show_mode_toggle && selected_count(selection) > 1
    }

    pub fn view(&self, props: FacetProps<'_>) -> FacetView {
        let count = selected_count(props.selection);
        let is_selected = |value: &str| props.selection.iter().any(|s| s == value);

        let badges = if count == 0 {
            Vec::new()
        } else if count > 2 {
            vec![format!("{} selected", count)]
        } else {
            props
                .options
                .iter()
                .filter(|option| is_selected(&option.value))
                .map(|option| option.label.clone())
                .collect()
        };

        let body = if props.loading {
            FacetBody::Loading
        } else if let Some(err) = props.error {
            FacetBody::Error(err.to_string())
        } else {
            let rows: Vec<FacetRow> = self
                .filtered_options(props.options)
                .into_iter()
                .map(|option| FacetRow {
                    value: option.value.clone(),
                    label: option.label.clone(),
                    selected: is_selected(&option.value),
                })
                .collect();
            if rows.is_empty() {
                FacetBody::Empty
            } else {
                FacetBody::Options(rows)
            }
        };

        let footer = (count > 0).then(|| FacetFooter {
            mode_toggle: Self::mode_toggle_visible(props.show_mode_toggle, props.selection)
                .then_some(props.filter_mode),
        });

        FacetView {
            title: props.title.to_string(),
            open: self.open,
            search_query: self.search_query.clone(),
            selected_count: count,
            badges,
            body,
            footer,
        }
    }
}

fn selected_count(selection: &[String]) -> usize {
    let mut seen: Vec<&String> = Vec::with_capacity(selection.len());
    for value in selection {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<FacetOption> {
        vec![
            FacetOption::new("c1", "Shoes"),
            FacetOption::new("c2", "Hats"),
            FacetOption::new("c3", "Shirts"),
        ]
    }

    fn props<'a>(options: &'a [FacetOption], selection: &'a [String]) -> FacetProps<'a> {
        FacetProps {
            title: "Category",
            options,
            selection,
            show_mode_toggle: true,
            filter_mode: FilterMode::Any,
            loading: false,
            error: None,
        }
    }

    fn selection(event: FacetEvent) -> Vec<String> {
        match event {
            FacetEvent::SelectionChanged(values) => values,
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn double_toggle_restores_selection() {
        let facet = FacetedFilter::new();
        let original = vec!["c1".to_string(), "c3".to_string()];

        let once = selection(facet.toggle_option(&original, "c2"));
        let twice = selection(facet.toggle_option(&once, "c2"));

        assert_eq!(once, vec!["c1", "c3", "c2"]);
        assert_eq!(twice, original);
    }

    #[test]
    fn toggle_removes_present_value_without_touching_input() {
        let facet = FacetedFilter::new();
        let original = vec!["c1".to_string(), "c2".to_string()];

        let next = selection(facet.toggle_option(&original, "c1"));

        assert_eq!(next, vec!["c2"]);
        assert_eq!(original, vec!["c1", "c2"]);
    }

    #[test]
    fn clear_all_emits_empty_selection() {
        assert_eq!(FacetedFilter::new().clear_all(), FacetEvent::SelectionChanged(vec![]));
    }

    #[test]
    fn closing_discards_search_but_not_selection() {
        let mut facet = FacetedFilter::new();
        assert_eq!(facet.set_open(true), FacetEvent::OpenChanged(true));
        facet.set_search_query("sh");

        assert_eq!(facet.set_open(false), FacetEvent::OpenChanged(false));
        assert_eq!(facet.search_query(), "");
        assert!(!facet.is_open());
    }

    #[test]
    fn local_search_is_case_insensitive_substring() {
        let mut facet = FacetedFilter::new();
        facet.set_search_query("SH");
        let opts = options();

        let labels: Vec<_> = facet.filtered_options(&opts).iter().map(|o| o.label.as_str()).collect();

        assert_eq!(labels, vec!["Shoes", "Shirts"]);
    }

    #[test]
    fn mode_toggle_requires_enabled_flag_and_two_values() {
        let one = vec!["c1".to_string()];
        let two = vec!["c1".to_string(), "c2".to_string()];
        assert!(!FacetedFilter::mode_toggle_visible(true, &[]));
        assert!(!FacetedFilter::mode_toggle_visible(true, &one));
        assert!(FacetedFilter::mode_toggle_visible(true, &two));
        assert!(!FacetedFilter::mode_toggle_visible(false, &two));
    }

    #[test]
    fn toggle_mode_maps_switch_to_mode() {
        let facet = FacetedFilter::new();
        assert_eq!(facet.toggle_mode(true), FacetEvent::ModeChanged(FilterMode::All));
        assert_eq!(facet.toggle_mode(false), FacetEvent::ModeChanged(FilterMode::Any));
    }

    #[test]
    fn view_without_selection_has_no_footer() {
        let opts = options();
        let view = FacetedFilter::new().view(props(&opts, &[]));
        assert_eq!(view.selected_count, 0);
        assert!(view.badges.is_empty());
        assert!(view.footer.is_none());
    }

    #[test]
    fn single_selection_shows_clear_but_no_mode_switch() {
        let opts = options();
        let sel = vec!["c2".to_string()];
        let view = FacetedFilter::new().view(props(&opts, &sel));
        assert_eq!(view.badges, vec!["Hats"]);
        assert_eq!(view.footer, Some(FacetFooter { mode_toggle: None }));
    }

    #[test]
    fn many_selections_collapse_badges_and_show_mode_switch() {
        let opts = options();
        let sel = vec!["c1".to_string(), "c2".to_string(), "c3".to_string()];
        let mut p = props(&opts, &sel);
        p.filter_mode = FilterMode::All;

        let view = FacetedFilter::new().view(p);

        assert_eq!(view.badges, vec!["3 selected"]);
        assert_eq!(view.footer, Some(FacetFooter { mode_toggle: Some(FilterMode::All) }));
    }

    #[test]
    fn loading_replaces_options_but_count_follows_selection() {
        let sel = vec!["c1".to_string(), "c2".to_string()];
        let mut p = props(&[], &sel);
        p.loading = true;

        let view = FacetedFilter::new().view(p);

        assert_eq!(view.body, FacetBody::Loading);
        assert_eq!(view.selected_count, 2);
        assert!(view.footer.is_some());
    }

    #[test]
    fn error_and_empty_bodies() {
        let mut p = props(&[], &[]);
        p.error = Some("Failed to load options: boom");
        assert_eq!(
            FacetedFilter::new().view(p).body,
            FacetBody::Error("Failed to load options: boom".into())
        );

        let opts = options();
        let mut facet = FacetedFilter::new();
        facet.set_search_query("zzz");
        assert_eq!(facet.view(props(&opts, &[])).body, FacetBody::Empty);
    }
}

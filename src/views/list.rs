use super::{escape, layout, Chrome};
use crate::list::{
    EntityListController, FacetBody, FacetEvent, FacetView, FieldOptionsState, FilterField, ListParams, ListStatus,
};
use crate::sdk::FilterMode;

pub const SEARCH_PLACEHOLDER: &str = "Search...";
pub const LOADING_TEXT: &str = "Loading...";
pub const NO_ITEMS_TEXT: &str = "No items found";
pub const NO_OPTIONS_TEXT: &str = "No results found.";

/// Entity list page.
///
/// `options` holds the options state of each filter field, in the order of
/// `controller.filter_fields()`. Every control is a link or a GET form that
/// re-encodes the list state into the query string.
pub fn list_page(chrome: Chrome<'_>, controller: &EntityListController, options: &[FieldOptionsState]) -> String {
    let definition = controller.definition();
    let path = format!("/entities/{}", definition.slug);
    let params = controller.params();

    let mut content = format!("<h1>{}</h1>", escape(&definition.name));
    if let Some(description) = definition.description.as_deref().filter(|d| !d.is_empty()) {
        content.push_str(&format!("<p class=\"muted\">{}</p>", escape(description)));
    }

    content.push_str("<div class=\"toolbar\">");
    if controller.show_search() {
        content.push_str(&search_form(&path, params));
    }
    for (field, state) in controller.filter_fields().iter().zip(options) {
        let view = field.view(state, &params.selection(field.name()), params.mode(field.name()));
        content.push_str(&facet_html(&path, params, field, &view));
    }
    content.push_str("</div>");

    if let Some(text) = controller.error_text() {
        content.push_str(&format!("<p class=\"error\">{}</p>", text));
    }

    match controller.status() {
        ListStatus::InitialLoading => {
            content.push_str(&format!("<p class=\"muted\">{}</p>", LOADING_TEXT));
        }
        status => {
            let class = if status == ListStatus::Refetching { " class=\"overlay\"" } else { "" };
            content.push_str(&format!("<div{}>{}</div>", class, table_html(controller)));
            content.push_str(&pagination_html(&path, controller));
        }
    }

    layout(&definition.name, chrome, &content)
}

fn search_form(path: &str, params: &ListParams) -> String {
    let mut hidden = String::new();
    for (field, values) in &params.filters {
        for value in values {
            hidden.push_str(&hidden_input(&format!("f.{}", field), value));
        }
    }
    for (field, mode) in &params.filter_modes {
        hidden.push_str(&hidden_input(&format!("m.{}", field), mode.as_str()));
    }

    format!(
        "<form method=\"get\" action=\"{}\"><input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"{}\">{}</form>",
        escape(path),
        escape(&params.search),
        SEARCH_PLACEHOLDER,
        hidden
    )
}

fn hidden_input(name: &str, value: &str) -> String {
    format!("<input type=\"hidden\" name=\"{}\" value=\"{}\">", escape(name), escape(value))
}

fn link(path: &str, params: &ListParams, field: &str, event: FacetEvent) -> String {
    escape(&params.with(field, event).href(path))
}

fn facet_html(path: &str, params: &ListParams, filter: &FilterField, view: &FacetView) -> String {
    let field = filter.name();
    let badges: String = view
        .badges
        .iter()
        .map(|label| format!("<span class=\"badge\">{}</span>", escape(label)))
        .collect();

    let mut html = format!(
        "<div class=\"facet\" data-field=\"{}\"><a href=\"{}\">{}</a>{}",
        escape(field),
        link(path, params, field, FacetEvent::OpenChanged(!view.open)),
        escape(&view.title),
        badges
    );

    if !view.open {
        html.push_str("</div>");
        return html;
    }

    // The facet search form keeps the facet open and carries the rest of the state
    let mut keep = params.clone();
    keep.set_facet_search("");
    let mut hidden = String::new();
    for (name, value) in url::form_urlencoded::parse(keep.to_query().as_bytes()) {
        hidden.push_str(&hidden_input(&name, &value));
    }
    html.push_str(&format!(
        "<form method=\"get\" action=\"{}\">{}<input type=\"search\" name=\"fq\" value=\"{}\" placeholder=\"Search {}...\"></form>",
        escape(path),
        hidden,
        escape(&view.search_query),
        escape(&view.title.to_lowercase())
    ));

    let selection = params.selection(field);
    match &view.body {
        FacetBody::Loading => html.push_str(&format!("<p class=\"muted\">{}</p>", LOADING_TEXT)),
        FacetBody::Error(message) => html.push_str(&format!("<p class=\"error\">{}</p>", escape(message))),
        FacetBody::Empty => html.push_str(&format!("<p class=\"muted\">{}</p>", NO_OPTIONS_TEXT)),
        FacetBody::Options(rows) => {
            html.push_str("<ul>");
            for row in rows {
                let event = filter.facet().toggle_option(&selection, &row.value);
                html.push_str(&format!(
                    "<li><a href=\"{}\">{} {}</a></li>",
                    link(path, params, field, event),
                    if row.selected { "&#9745;" } else { "&#9744;" },
                    escape(&row.label)
                ));
            }
            html.push_str("</ul>");
        }
    }

    if let Some(footer) = &view.footer {
        html.push_str("<div class=\"muted\">");
        if let Some(mode) = footer.mode_toggle {
            let next = match mode {
                FilterMode::Any => FilterMode::All,
                FilterMode::All => FilterMode::Any,
            };
            html.push_str(&format!(
                "<a href=\"{}\">Match: {}</a> · ",
                link(path, params, field, FacetEvent::ModeChanged(next)),
                mode.as_str().to_uppercase()
            ));
        }
        html.push_str(&format!(
            "<a href=\"{}\">Clear filters</a></div>",
            link(path, params, field, FacetEvent::SelectionChanged(Vec::new()))
        ));
    }

    html.push_str("</div>");
    html
}

fn table_html(controller: &EntityListController) -> String {
    let rows = controller.rows();
    if rows.is_empty() {
        return format!("<p class=\"muted\">{}</p>", NO_ITEMS_TEXT);
    }

    let mut html = String::from("<table><thead><tr><th>Name</th>");
    for field in controller.display_fields() {
        html.push_str(&format!("<th>{}</th>", escape(&field.label)));
    }
    html.push_str("<th>Actions</th></tr></thead><tbody>");

    for row in rows {
        let href = escape(&row.href);
        html.push_str(&format!("<tr><td><a href=\"{}\">{}</a></td>", href, escape(&row.title)));
        for cell in &row.cells {
            html.push_str(&format!("<td>{}</td>", escape(cell)));
        }
        html.push_str(&format!("<td><a href=\"{}\">View</a></td></tr>", href));
    }
    html.push_str("</tbody></table>");
    html
}

fn pagination_html(path: &str, controller: &EntityListController) -> String {
    let pagination = match controller.pagination() {
        Some(p) if p.total_pages > 1 => p,
        _ => return String::new(),
    };

    let page_link = |enabled: bool, page: u32, label: &str| {
        if enabled {
            let mut params = controller.params().clone();
            params.set_page(page);
            format!("<a href=\"{}\">{}</a>", escape(&params.href(path)), label)
        } else {
            format!("<span class=\"muted\">{}</span>", label)
        }
    };

    format!(
        "<div class=\"pagination\">{} <span>Page {} of {} ({} total)</span> {}</div>",
        page_link(controller.can_go_previous(), pagination.page.saturating_sub(1), "Previous"),
        pagination.page,
        pagination.total_pages,
        pagination.total,
        page_link(controller.can_go_next(), pagination.page + 1, "Next"),
    )
}

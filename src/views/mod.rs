//! Server-rendered HTML.
//!
//! Pages are plain strings built from render models of the `list`, `display`
//! and `catalog` modules; every dynamic value goes through [`escape`].

pub mod auth;
pub mod detail;
pub mod home;
pub mod list;

use crate::auth::ServerUser;
use crate::catalog::DefinitionCatalog;

pub const APP_NAME: &str = "Entity Browser";

const STYLES: &str = "\
body{font-family:system-ui,sans-serif;margin:0;color:#111}\
.shell{display:flex;min-height:100vh}\
.sidebar{width:220px;border-right:1px solid #e5e5e5;padding:1rem}\
.sidebar a{display:block;padding:.25rem 0;color:inherit;text-decoration:none}\
.sidebar a.active{font-weight:600}\
main{flex:1;padding:1.5rem}\
.muted{color:#6b7280}\
.error{color:#b91c1c}\
.success{color:#15803d}\
.overlay{opacity:.5}\
.facet{display:inline-block;border:1px solid #e5e5e5;border-radius:6px;padding:.25rem .5rem;margin:0 .5rem .5rem 0;vertical-align:top}\
.badge{background:#f3f4f6;border-radius:4px;padding:0 .25rem;margin-left:.25rem}\
table{border-collapse:collapse;width:100%}\
th,td{text-align:left;padding:.4rem;border-bottom:1px solid #f0f0f0}\
.card{border:1px solid #e5e5e5;border-radius:8px;padding:1rem;margin-bottom:1rem}";

/// HTML-escape text and attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Shared context of authenticated pages
#[derive(Debug, Clone, Copy)]
pub struct Chrome<'a> {
    pub catalog: &'a DefinitionCatalog,
    pub user: Option<&'a ServerUser>,
    pub active_slug: Option<&'a str>,
}

pub fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{title} | {app}</title><style>{styles}</style></head><body>{body}</body></html>",
        title = escape(title),
        app = APP_NAME,
        styles = STYLES,
        body = body,
    )
}

/// Page with the entity sidebar and the user bar
pub fn layout(title: &str, chrome: Chrome<'_>, content: &str) -> String {
    let user_bar = match chrome.user {
        Some(user) => format!(
            "<div class=\"muted\"><a href=\"/profile\">{}</a> · <a href=\"/logout\">Sign out</a></div>",
            escape(&user.display_name())
        ),
        None => String::new(),
    };

    document(
        title,
        &format!(
            "<div class=\"shell\">{sidebar}<main>{user_bar}{content}</main></div>",
            sidebar = sidebar(chrome.catalog, chrome.active_slug),
            user_bar = user_bar,
            content = content,
        ),
    )
}

fn sidebar(catalog: &DefinitionCatalog, active_slug: Option<&str>) -> String {
    let mut html = format!("<nav class=\"sidebar\"><a href=\"/\"><strong>{}</strong></a><hr>", APP_NAME);
    if !catalog.is_empty() {
        html.push_str("<div class=\"muted\">Entities</div>");
        for definition in catalog.iter() {
            let class = if active_slug == Some(definition.slug.as_str()) { " class=\"active\"" } else { "" };
            html.push_str(&format!(
                "<a href=\"/entities/{}\"{}>{}</a>",
                escape(&definition.slug),
                class,
                escape(&definition.name)
            ));
        }
    }
    html.push_str("</nav>");
    html
}

pub fn not_found_page() -> String {
    document(
        "Not found",
        "<main><h1>404</h1><p class=\"muted\">This page could not be found.</p><a href=\"/\">Back to home</a></main>",
    )
}

pub fn error_page(status: u16, message: &str) -> String {
    document(
        "Error",
        &format!(
            "<main><h1>{}</h1><p class=\"error\">{}</p><a href=\"/\">Back to home</a></main>",
            status,
            escape(message)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::EntityDefinition;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn sidebar_marks_active_entity() {
        let catalog = DefinitionCatalog::new(
            "p",
            vec![EntityDefinition {
                id: "1".into(),
                name: "Products".into(),
                slug: "products".into(),
                ..Default::default()
            }],
        );
        let html = sidebar(&catalog, Some("products"));
        assert!(html.contains("<a href=\"/entities/products\" class=\"active\">Products</a>"));
        assert!(!sidebar(&DefinitionCatalog::default(), None).contains("Entities"));
    }
}

use super::{escape, layout, Chrome};

pub const NO_ENTITIES_TEXT: &str = "No entities available. Please configure entities in the admin panel.";

pub fn home_page(chrome: Chrome<'_>) -> String {
    let mut content = String::from("<h1>Welcome</h1>");

    if chrome.catalog.is_empty() {
        content.push_str(&format!("<p class=\"muted\">{}</p>", NO_ENTITIES_TEXT));
        return layout("Home", chrome, &content);
    }

    content.push_str("<p class=\"muted\">Browse available entities below</p><div class=\"cards\">");
    for definition in chrome.catalog.iter() {
        let description = definition
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| format!("<p class=\"muted\">{}</p>", escape(d)))
            .unwrap_or_default();
        content.push_str(&format!(
            "<a class=\"card\" href=\"/entities/{}\"><h3>{}</h3>{}</a>",
            escape(&definition.slug),
            escape(&definition.name),
            description
        ));
    }
    content.push_str("</div>");

    layout("Home", chrome, &content)
}

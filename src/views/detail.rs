use super::{escape, layout, Chrome};
use crate::display::{DetailSection, DisplayValue, EMPTY_MARKER};
use crate::sdk::EntityDefinition;

/// Instance page: one card per field section
pub fn detail_page(chrome: Chrome<'_>, definition: &EntityDefinition, sections: &[DetailSection]) -> String {
    let mut content = format!(
        "<p><a href=\"/entities/{}\">&larr; {}</a></p><h1>{}</h1>",
        escape(&definition.slug),
        escape(&definition.name),
        escape(&definition.name)
    );
    if let Some(description) = definition.description.as_deref().filter(|d| !d.is_empty()) {
        content.push_str(&format!("<p class=\"muted\">{}</p>", escape(description)));
    }

    for section in sections {
        content.push_str("<section class=\"card\">");
        if let Some(title) = &section.title {
            content.push_str(&format!("<h2>{}</h2>", escape(title)));
        }
        for field in &section.fields {
            content.push_str(&format!(
                "<div class=\"field\"><label>{}</label><div>{}</div></div>",
                escape(&field.label),
                value_html(&field.value)
            ));
        }
        content.push_str("</section>");
    }

    layout(&definition.name, chrome, &content)
}

fn value_html(value: &DisplayValue) -> String {
    match value {
        DisplayValue::Empty => format!("<span class=\"muted\">{}</span>", EMPTY_MARKER),
        DisplayValue::Text(text) => escape(text),
        DisplayValue::Lines(lines) => lines
            .iter()
            .map(|line| format!("<div>{}</div>", escape(line)))
            .collect(),
        DisplayValue::Images(files) => files
            .iter()
            .map(|file| {
                format!(
                    "<img src=\"{}\" alt=\"{}\" width=\"160\">",
                    escape(&file.file_url),
                    escape(&file.file_name)
                )
            })
            .collect(),
        DisplayValue::Files(files) => files
            .iter()
            .map(|file| {
                format!(
                    "<div><a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\" download=\"{name}\">{name}</a></div>",
                    url = escape(&file.file_url),
                    name = escape(&file.file_name)
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::EntityFile;

    #[test]
    fn renders_each_kind_of_value() {
        assert_eq!(value_html(&DisplayValue::Empty), "<span class=\"muted\">—</span>");
        assert_eq!(value_html(&DisplayValue::Text("a<b".into())), "a&lt;b");
        assert_eq!(
            value_html(&DisplayValue::Lines(vec!["Shoes".into(), "Hats".into()])),
            "<div>Shoes</div><div>Hats</div>"
        );

        let file = EntityFile {
            id: "f1".into(),
            file_url: "https://cdn/x.pdf".into(),
            file_name: "x.pdf".into(),
        };
        let html = value_html(&DisplayValue::Files(vec![file.clone()]));
        assert!(html.contains("href=\"https://cdn/x.pdf\""));
        assert!(html.contains("download=\"x.pdf\""));
        assert!(value_html(&DisplayValue::Images(vec![file])).starts_with("<img src=\"https://cdn/x.pdf\""));
    }
}

use crate::elements::{Form, FormInput, Link};
use crate::page::Document;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements extracted from an HTML document
#[derive(Debug, Default)]
pub struct HtmlElements {
    pub document: Document,
    pub forms: Vec<Form>,
    pub links: Vec<Link>,
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Parses HTML content to extract the document summary, forms and links
pub fn parse(html: &str, url: &Url) -> HtmlElements {
    let doc = Html::parse_document(html);
    let base = base_url(&doc, url);

    let elements = HtmlElements {
        document: extract_document(&doc),
        forms: extract_forms(&doc, &base),
        links: extract_links(&doc, &base),
    };

    ::log::debug!(
        "HTML parser found {} forms and {} links",
        elements.forms.len(),
        elements.links.len()
    );
    elements
}

/// Honors `<base href>` when present
fn base_url(doc: &Html, url: &Url) -> Url {
    doc.select(&selector("base[href]"))
        .next()
        .and_then(|e| e.value().attr("href"))
        .and_then(|href| url.join(href).ok())
        .unwrap_or_else(|| url.clone())
}

fn extract_document(doc: &Html) -> Document {
    let title = doc
        .select(&selector("title"))
        .next()
        .map(|t| normalize_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let text = doc
        .select(&selector("body"))
        .flat_map(|n| n.text())
        .collect::<Vec<_>>()
        .join(" ");

    Document {
        title,
        text: normalize_whitespace(&text),
    }
}

fn extract_forms(doc: &Html, base: &Url) -> Vec<Form> {
    let input_selector = selector("input[name], select[name], textarea[name], button[name]");

    doc.select(&selector("form"))
        .filter_map(|form| {
            let action = form.value().attr("action").unwrap_or_default().trim();
            let mut action = base.join(action).ok()?;
            action.set_fragment(None);

            let method = form.value().attr("method").unwrap_or("GET");
            let mut parsed = Form::new(action.as_str(), method);
            parsed.inputs = form
                .select(&input_selector)
                .filter_map(|input| form_input(&input))
                .collect();
            Some(parsed)
        })
        .collect()
}

fn form_input(input: &ElementRef<'_>) -> Option<FormInput> {
    let element = input.value();
    let name = element.attr("name")?.trim();
    if name.is_empty() {
        return None;
    }

    let input_type = match element.name() {
        "input" => element.attr("type").unwrap_or("text").to_ascii_lowercase(),
        other => other.to_string(),
    };

    Some(FormInput {
        name: name.to_string(),
        input_type,
        value: element.attr("value").map(str::to_string),
    })
}

fn extract_links(doc: &Html, base: &Url) -> Vec<Link> {
    doc.select(&selector("a[href], area[href]"))
        .filter_map(|e| e.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| Link::from_url(&url))
        .collect()
}

/// Collapses runs of whitespace into single spaces
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("http://example.com/shop/index.html").unwrap()
    }

    #[test]
    fn test_document_summary() {
        let html = "<html><head><title> My   Shop </title></head><body><p>Hello,\n world!</p></body></html>";
        let parsed = parse(html, &page_url());
        assert_eq!(parsed.document.title.as_deref(), Some("My Shop"));
        assert_eq!(parsed.document.text, "Hello, world!");
    }

    #[test]
    fn test_forms_resolve_action_and_collect_inputs() {
        let html = r#"<body>
            <form action="cart#add" method="post">
                <input type="HIDDEN" name="token" value="x1">
                <input name="qty">
                <select name="size"></select>
                <textarea name="note"></textarea>
                <input type="submit">
            </form>
            <form><input name="q"></form>
        </body>"#;
        let parsed = parse(html, &page_url());

        assert_eq!(parsed.forms.len(), 2);
        let cart = &parsed.forms[0];
        assert_eq!(cart.action, "http://example.com/shop/cart");
        assert_eq!(cart.method, "POST");
        let names: Vec<&str> = cart.inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["token", "qty", "size", "note"]);
        assert_eq!(cart.inputs[0].input_type, "hidden");
        assert_eq!(cart.inputs[0].value.as_deref(), Some("x1"));
        assert_eq!(cart.inputs[2].input_type, "select");

        // No action submits to the document itself
        assert_eq!(parsed.forms[1].action, "http://example.com/shop/index.html");
        assert_eq!(parsed.forms[1].method, "GET");
    }

    #[test]
    fn test_links_skip_fragments_and_foreign_schemes() {
        let html = r##"<body>
            <a href="item?id=1">one</a>
            <a href="#top">top</a>
            <a href="mailto:x@example.com">mail</a>
            <a href="javascript:void(0)">js</a>
            <a href="https://other.org/">other</a>
        </body>"##;
        let parsed = parse(html, &page_url());

        let urls: Vec<String> = parsed.links.iter().map(Link::full_url).collect();
        assert_eq!(
            urls,
            vec!["http://example.com/shop/item?id=1", "https://other.org/"]
        );
    }

    #[test]
    fn test_base_href_is_honored() {
        let html = r#"<html><head><base href="/static/"></head><body><a href="a.html">a</a></body></html>"#;
        let parsed = parse(html, &page_url());
        assert_eq!(parsed.links[0].url, "http://example.com/static/a.html");
    }
}

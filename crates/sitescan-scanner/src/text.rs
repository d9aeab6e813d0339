//! Visible text extraction from static markup.

use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;

/// Elements whose subtrees never count as visible text.
const NON_CONTENT_TAGS: [&str; 4] = ["script", "style", "noscript", "iframe"];

/// Text of the document body with script/style/noscript/iframe subtrees
/// removed, lower-cased.
pub fn visible_text(html: &str) -> String {
    static BODY: OnceLock<Selector> = OnceLock::new();
    let body_selector = BODY.get_or_init(|| Selector::parse("body").expect("valid selector"));

    let document = Html::parse_document(html);
    let mut text = String::new();

    if let Some(body) = document.select(body_selector).next() {
        collect_text(body, &mut text);
    }

    text.to_lowercase()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if NON_CONTENT_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_non_content_subtrees() {
        let html = r#"
            <html>
              <head><title>Title Widget</title><style>.widget { color: red }</style></head>
              <body>
                <h1>Hello World</h1>
                <script>var widget = 1;</script>
                <noscript>Enable JS for widget</noscript>
                <iframe src="/ad">widget ad</iframe>
                <p>Plain <b>Text</b></p>
              </body>
            </html>
        "#;

        let text = visible_text(html);
        assert!(text.contains("hello world"));
        assert!(text.contains("plain text"));
        assert!(!text.contains("widget"));
    }

    #[test]
    fn test_lower_cases_output() {
        assert!(visible_text("<p>MiXeD CaSe</p>").contains("mixed case"));
    }

    #[test]
    fn test_fragment_without_body_tag() {
        assert_eq!(visible_text("just text").trim(), "just text");
    }
}

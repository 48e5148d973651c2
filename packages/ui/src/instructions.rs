//! Task instructions are written in markdown by administrators.

use dioxus::prelude::*;
use pulldown_cmark::{Event, Options, Parser};

/// Render instructions to HTML. Raw HTML in the source is shown as text.
pub fn instructions_html(source: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(source, opts).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        other => other,
    });
    let mut out = String::new();
    pulldown_cmark::html::push_html(&mut out, events);
    out
}

#[component]
pub fn Instructions(source: String) -> Element {
    if source.trim().is_empty() {
        return rsx! {};
    }
    let html = instructions_html(&source);
    rsx! {
        div { class: "instructions", dangerous_inner_html: "{html}" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_lists() {
        let html = instructions_html("1. Check the **boiler**\n2. Log the reading");
        assert!(html.contains("<ol>"));
        assert!(html.contains("<strong>boiler</strong>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = instructions_html("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}

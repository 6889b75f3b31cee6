//! Markdown to HTML for agent prose and insights.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Renders markdown as an HTML fragment.
///
/// Raw HTML in the source is emitted as escaped text. Link and image targets
/// with a scheme other than http, https or mailto are replaced by `#`.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Keeps relative targets and the safe schemes.
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    // Browsers ignore whitespace and control characters inside a scheme.
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    let scheme = match compact.find(':') {
        Some(colon) if !compact[..colon].contains(['/', '?', '#']) => &compact[..colon],
        _ => return url,
    };

    if SAFE_SCHEMES
        .iter()
        .any(|safe| scheme.eq_ignore_ascii_case(safe))
    {
        url
    } else {
        CowStr::Borrowed("#")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let html = to_html("Revenue grew **12%**.\n\n- EMEA\n- APAC");
        assert!(html.contains("<strong>12%</strong>"));
        assert!(html.contains("<li>EMEA</li>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = to_html("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_script_links_are_neutralized() {
        let html = to_html("[click](javascript:alert(document.cookie))");
        assert_eq!(html, "<p><a href=\"#\">click</a></p>\n");

        let html = to_html("![x](data:text/html;base64,PHNjcmlwdD4=) [y](JavaScript:void(0))");
        assert!(!html.contains("data:"));
        assert!(!html.to_lowercase().contains("javascript:"));
    }

    #[test]
    fn test_safe_links_are_kept() {
        let html = to_html("[docs](https://example.com/a?b=c) [mail](mailto:a@b.c) [rel](/tables/1)");
        assert!(html.contains("href=\"https://example.com/a?b=c\""));
        assert!(html.contains("href=\"mailto:a@b.c\""));
        assert!(html.contains("href=\"/tables/1\""));
    }
}

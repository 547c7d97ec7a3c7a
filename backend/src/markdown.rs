use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use vivacripto_shared::{text::remove_duplicate_title, Article};

/// Convert article Markdown into sanitized HTML.
///
/// Level-1 headings are demoted to `<h2>` because the page already renders
/// the article title as its only `<h1>`.
pub fn markdown_to_html(content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(content, options).map(|event| match event {
        Event::Start(Tag::Heading {
            level: HeadingLevel::H1,
            id,
            classes,
            attrs,
        }) => Event::Start(Tag::Heading {
            level: HeadingLevel::H2,
            id,
            classes,
            attrs,
        }),
        Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
            Event::End(TagEnd::Heading(HeadingLevel::H2))
        },
        _ => event,
    });

    let mut html_output = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut html_output, parser);
    sanitize_html(&html_output)
}

/// Strip scripts, event handlers, and unsafe URLs from CMS-provided HTML.
pub fn sanitize_html(raw: &str) -> String {
    ammonia::clean(raw)
}

/// Body HTML for the detail page. Markdown wins when present; otherwise the
/// pre-rendered HTML from the CMS is sanitized and used as-is.
pub fn article_body_html(article: &Article) -> String {
    let markdown = remove_duplicate_title(&article.content_markdown, &article.title);
    if !markdown.trim().is_empty() {
        return markdown_to_html(&markdown);
    }
    sanitize_html(&article.content_html)
}

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

/// Renders revealed message text to HTML.
///
/// Raw HTML in model output is shown as text, never injected. When the
/// markdown produces nothing visible (for instance a half-streamed link
/// reference definition) the raw text is shown instead.
pub fn render_markdown(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    let events = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events);

    if out.trim().is_empty() {
        log::debug!("markdown produced no output, falling back to raw text");
        return render_raw(text);
    }
    out
}

/// Escaped plain-text paragraph.
pub fn render_raw(text: &str) -> String {
    let events = [
        Event::Start(Tag::Paragraph),
        Event::Text(text.into()),
        Event::End(TagEnd::Paragraph),
    ];
    let mut out = String::with_capacity(text.len() + 8);
    html::push_html(&mut out, events.into_iter());
    out
}

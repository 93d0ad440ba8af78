//! HTML pages for the browser-facing routes.

use finder_core::{JobId, ListingView, ResultView};

const NEW_REQUEST_LINK: &str = r#"<a href="/">New request</a>"#;
const LISTING_LINK: &str = r#"<a href="/result/check">All results</a>"#;

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"UTF-8\"><title>Phrase finder</title></head><body>\n{body}\n</body></html>\n"
    )
}

pub fn form() -> String {
    page(&format!(
        r#"<form action="/" method="post">
<label for="query">Search request:</label>
<textarea rows="10" cols="45" name="query" id="query" placeholder='{{"Search": "hello", "URLs": ["https://example.com"]}}'></textarea>
<input type="submit" value="Search">
</form>
{LISTING_LINK}"#
    ))
}

pub fn submitted(id: JobId) -> String {
    page(&format!(
        "Processing started (request {id}).<br>\n<a href=\"/url/{id}\">View this result</a><br>\n{LISTING_LINK}"
    ))
}

pub fn listing(view: &ListingView) -> String {
    let mut body = String::from("<b>Results:</b><br>\n");
    if view.is_empty() {
        body.push_str("No requests yet.<br>\n");
    }
    for row in &view.rows {
        let status = if row.complete { "done" } else { "in progress" };
        body.push_str(&format!(
            "Search for {phrase}. URLs: {count} ({status}). <a href=\"/url/{id}\">View results</a><br>\n",
            phrase = escape_html(&row.phrase),
            count = row.url_count,
            id = row.id,
        ));
    }
    body.push_str("<br>");
    body.push_str(NEW_REQUEST_LINK);
    page(&body)
}

pub fn result(view: &ResultView) -> String {
    match view {
        ResultView::Pending {
            outstanding, total, ..
        } => page(&format!(
            "Processing not finished ({outstanding} of {total} URLs outstanding).<br>\n{LISTING_LINK}"
        )),
        ResultView::Complete {
            phrase, matched, ..
        } => {
            let mut body = format!(
                "Search phrase: {}.<br><br>\n<b>URLs containing the phrase:</b><br>\n",
                escape_html(phrase)
            );
            if matched.is_empty() {
                body.push_str("None.<br>\n");
            }
            for url in matched {
                let url = escape_html(url);
                body.push_str(&format!("<a href=\"{url}\">{url}</a><br>\n"));
            }
            body.push_str(&format!("<br>{LISTING_LINK}<br><br>{NEW_REQUEST_LINK}"));
            page(&body)
        }
    }
}

pub fn error(message: &str) -> String {
    page(&format!(
        "Error: {}<br>\n{NEW_REQUEST_LINK}",
        escape_html(message)
    ))
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

use chrono::Datelike;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use web_sys::Document;

use crate::dom;

const FOOTER_TEXT_SELECTOR: &str = ".footer-bottom p";

static COPYRIGHT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"© \d{4}").expect("copyright pattern is valid"));

/// Rewrites `© <year>` in `text` to the given year. Returns `None` when the
/// text has no copyright notice or already shows that year.
pub fn refresh_copyright(text: &str, year: i32) -> Option<String> {
    if !text.contains('©') {
        return None;
    }
    let updated = COPYRIGHT_YEAR.replace_all(text, format!("© {year}").as_str());
    (updated != text).then(|| updated.into_owned())
}

/// Updates every footer copyright line to the current year.
pub fn update_copyright_year(document: &Document) {
    let year = chrono::Local::now().year();
    let mut updated = 0;

    for paragraph in dom::query_all(document, FOOTER_TEXT_SELECTOR) {
        let Some(text) = paragraph.text_content() else {
            continue;
        };
        if let Some(fresh) = refresh_copyright(&text, year) {
            paragraph.set_text_content(Some(&fresh));
            updated += 1;
        }
    }

    debug!("Updated {} copyright line(s) to {}", updated, year);
}

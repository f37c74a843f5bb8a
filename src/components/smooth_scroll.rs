use std::borrow::Cow;

use log::warn;
use web_sys::{Document, HtmlElement, ScrollBehavior, ScrollToOptions};

use super::Behavior;
use crate::config::SiteConfig;
use crate::dom::{self, Listener};

const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";
const HEADER_SELECTOR: &str = ".site-header";
const STRIP_SELECTOR: &str = ".trust-strip";

/// The element id an in-page href points at. `#` and `#!` are placeholders
/// and point nowhere.
pub fn fragment_target(href: &str) -> Option<Cow<'_, str>> {
    let fragment = href.strip_prefix('#')?;
    if fragment.is_empty() || fragment == "!" {
        return None;
    }
    urlencoding::decode(fragment)
        .ok()
        .filter(|id| !id.is_empty())
}

/// Document-relative scroll position that puts the target just below the
/// fixed header and trust strip.
pub fn scroll_top(target_top: f64, page_y_offset: f64, header_height: f64, strip_height: f64) -> f64 {
    target_top + page_y_offset - (header_height + strip_height)
}

fn height(element: Option<&HtmlElement>) -> f64 {
    element.map(|el| f64::from(el.offset_height())).unwrap_or(0.0)
}

pub struct SmoothScroll {
    _listeners: Vec<Listener>,
}

impl Behavior for SmoothScroll {
    const NAME: &'static str = "smooth anchor scroll";

    fn attach(document: &Document, _config: &SiteConfig) -> Option<Self> {
        let window = web_sys::window()?;
        let anchors = dom::query_all(document, ANCHOR_SELECTOR);
        if anchors.is_empty() {
            return None;
        }

        let header = dom::query_html(document, HEADER_SELECTOR);
        let strip = dom::query_html(document, STRIP_SELECTOR);

        let mut listeners = Vec::with_capacity(anchors.len());
        for anchor in anchors {
            let document = document.clone();
            let window = window.clone();
            let (header, strip) = (header.clone(), strip.clone());
            let link = anchor.clone();

            let listener = Listener::new(&anchor, "click", move |event| {
                let Some(href) = link.get_attribute("href") else {
                    return;
                };
                let Some(id) = fragment_target(&href) else {
                    return;
                };
                let Some(target) = document.get_element_by_id(&id) else {
                    return;
                };

                event.prevent_default();

                let top = scroll_top(
                    target.get_bounding_client_rect().top(),
                    window.page_y_offset().unwrap_or(0.0),
                    height(header.as_ref()),
                    height(strip.as_ref()),
                );

                let options = ScrollToOptions::new();
                options.set_top(top);
                options.set_behavior(ScrollBehavior::Smooth);
                window.scroll_to_with_scroll_to_options(&options);
            });

            match listener {
                Ok(listener) => listeners.push(listener),
                Err(e) => warn!("Failed to bind anchor listener: {:?}", e),
            }
        }

        Some(Self {
            _listeners: listeners,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_hashes_are_ignored() {
        assert_eq!(fragment_target("#"), None);
        assert_eq!(fragment_target("#!"), None);
    }

    #[test]
    fn non_fragment_links_are_ignored() {
        assert_eq!(fragment_target("/contact"), None);
        assert_eq!(fragment_target("https://example.com/#services"), None);
        assert_eq!(fragment_target(""), None);
    }

    #[test]
    fn fragment_is_decoded_to_an_id() {
        assert_eq!(fragment_target("#services").as_deref(), Some("services"));
        assert_eq!(fragment_target("#family%20law").as_deref(), Some("family law"));
        assert_eq!(fragment_target("#!contact").as_deref(), Some("!contact"));
    }

    #[test]
    fn offset_subtracts_header_and_strip() {
        assert_eq!(scroll_top(400.0, 1000.0, 80.0, 40.0), 1280.0);
    }

    #[test]
    fn missing_header_elements_contribute_nothing() {
        assert_eq!(height(None), 0.0);
        assert_eq!(scroll_top(250.0, 0.0, height(None), height(None)), 250.0);
    }
}

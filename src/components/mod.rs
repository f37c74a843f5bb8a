pub mod accordion;
pub mod contact_form;
pub mod footer;
pub mod nav_toggle;
pub mod reveal;
pub mod service_cards;
pub mod smooth_scroll;

use web_sys::Document;

use crate::config::SiteConfig;

/// A page behavior bound to the elements it needs.
///
/// `attach` returns `None` when the behavior's anchor elements are not on the
/// page. Dropping the value (or calling `detach`) removes every listener it
/// installed.
pub trait Behavior: Sized {
    const NAME: &'static str;

    fn attach(document: &Document, config: &SiteConfig) -> Option<Self>;

    fn detach(self) {
        drop(self);
    }
}

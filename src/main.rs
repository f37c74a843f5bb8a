use std::cell::RefCell;

use log::{debug, info, warn, Level};
use wasm_bindgen::JsCast;
use web_sys::{Document, PageTransitionEvent, Window};

mod components;
mod config;
mod diagnostics;
mod dom;
mod error;

use components::{
    accordion::FaqAccordion,
    contact_form::ContactFormBinding,
    footer,
    nav_toggle::NavToggle,
    reveal::Reveal,
    service_cards::ServiceCards,
    smooth_scroll::SmoothScroll,
    Behavior,
};
use config::SiteConfig;
use diagnostics::LoadTimer;
use dom::Listener;

#[cfg(debug_assertions)]
const LOG_LEVEL: Level = Level::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: Level = Level::Info;

fn mount<B: Behavior>(document: &Document, config: &SiteConfig) -> Option<B> {
    let behavior = B::attach(document, config);
    match &behavior {
        Some(_) => info!("Attached {}", B::NAME),
        None => debug!("Skipped {}: elements not on page", B::NAME),
    }
    behavior
}

fn unmount<B: Behavior>(behavior: Option<B>) {
    if let Some(behavior) = behavior {
        behavior.detach();
        debug!("Detached {}", B::NAME);
    }
}

/// Every behavior bound to the current page.
struct Site {
    nav: Option<NavToggle>,
    reveal: Option<Reveal>,
    accordion: Option<FaqAccordion>,
    contact: Option<ContactFormBinding>,
    anchors: Option<SmoothScroll>,
    cards: Option<ServiceCards>,
    load_timer: Option<LoadTimer>,
}

impl Site {
    fn mount(window: &Window, document: &Document, config: &SiteConfig) -> Self {
        footer::update_copyright_year(document);

        Self {
            nav: mount(document, config),
            reveal: mount(document, config),
            accordion: mount(document, config),
            contact: mount(document, config),
            anchors: mount(document, config),
            cards: mount(document, config),
            load_timer: LoadTimer::attach(window, config),
        }
    }

    fn unmount(self) {
        unmount(self.nav);
        unmount(self.reveal);
        unmount(self.accordion);
        unmount(self.contact);
        unmount(self.anchors);
        unmount(self.cards);
        drop(self.load_timer);
    }
}

thread_local! {
    static SITE: RefCell<Option<Site>> = const { RefCell::new(None) };
    static PAGE_HIDE: RefCell<Option<Listener>> = const { RefCell::new(None) };
}

/// Tears the behaviors down when the page is discarded. Pages kept in the
/// back/forward cache stay attached so they work again on return.
fn unmount_on_pagehide(window: &Window) {
    let listener = Listener::new(window, "pagehide", |event| {
        let persisted = event
            .dyn_ref::<PageTransitionEvent>()
            .is_some_and(|e| e.persisted());
        if persisted {
            return;
        }
        if let Some(site) = SITE.with(|slot| slot.borrow_mut().take()) {
            info!("Page discarded, detaching behaviors");
            site.unmount();
        }
    });

    match listener {
        Ok(listener) => PAGE_HIDE.with(|slot| *slot.borrow_mut() = Some(listener)),
        Err(e) => warn!("Failed to bind pagehide listener: {:?}", e),
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(LOG_LEVEL).expect("error initializing log");

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let config = SiteConfig::from_document(&document);
    diagnostics::print_banners(&config);

    info!("Starting site behaviors");
    let site = Site::mount(&window, &document, &config);
    SITE.with(|slot| *slot.borrow_mut() = Some(site));
    unmount_on_pagehide(&window);
}

use std::cell::Cell;
use std::rc::Rc;

use log::warn;
use web_sys::{Document, Element, Window};

use super::Behavior;
use crate::config::SiteConfig;
use crate::dom::{self, Listener};

const TOGGLE_SELECTOR: &str = ".mobile-menu-toggle";
const PANEL_SELECTOR: &str = ".main-nav";
const DROPDOWN_ITEM_SELECTOR: &str = ".nav-item-dropdown";
const DROPDOWN_LINK_SELECTOR: &str = ".nav-link";
const OPEN_CLASS: &str = "is-open";

/// Open/closed state of the mobile navigation panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavState {
    expanded: bool,
}

/// Everything the DOM shows for a given [`NavState`]. All three fields come
/// from the one flag so they cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavView {
    pub aria_expanded: bool,
    pub panel_open: bool,
    pub scroll_locked: bool,
}

impl NavState {
    pub fn from_aria(value: Option<&str>) -> Self {
        Self {
            expanded: value == Some("true"),
        }
    }

    pub fn toggle(&mut self) -> NavView {
        self.expanded = !self.expanded;
        self.view()
    }

    pub fn collapse(&mut self) -> NavView {
        self.expanded = false;
        self.view()
    }

    pub fn view(&self) -> NavView {
        NavView {
            aria_expanded: self.expanded,
            panel_open: self.expanded,
            scroll_locked: self.expanded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Plain,
    /// The top link of a `.nav-item-dropdown`.
    DropdownParent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkClick {
    pub prevent_default: bool,
    pub toggle_submenu: bool,
    pub collapse_panel: bool,
}

/// Decides what a click on a navigation link does at the current viewport
/// width. Every link click collapses the panel. Dropdown parents on narrow
/// screens also toggle their submenu instead of navigating.
pub fn link_click(kind: LinkKind, viewport_width: f64, breakpoint: f64) -> LinkClick {
    let submenu = kind == LinkKind::DropdownParent && viewport_width <= breakpoint;
    LinkClick {
        prevent_default: submenu,
        toggle_submenu: submenu,
        collapse_panel: true,
    }
}

fn render(view: NavView, document: &Document, toggle: &Element, panel: &Element) {
    dom::set_expanded(toggle, view.aria_expanded);
    dom::set_class(panel, OPEN_CLASS, view.panel_open);
    dom::set_scroll_lock(document, view.scroll_locked);
}

fn viewport_width(window: &Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or(f64::INFINITY)
}

pub struct NavToggle {
    _listeners: Vec<Listener>,
}

impl Behavior for NavToggle {
    const NAME: &'static str = "navigation toggle";

    fn attach(document: &Document, config: &SiteConfig) -> Option<Self> {
        let window = web_sys::window()?;
        let toggle = dom::query(document, TOGGLE_SELECTOR)?;
        let panel = dom::query(document, PANEL_SELECTOR)?;

        let state = Rc::new(Cell::new(NavState::from_aria(
            toggle.get_attribute("aria-expanded").as_deref(),
        )));
        let mut listeners = Vec::new();

        {
            let state = state.clone();
            let document = document.clone();
            let (toggle_el, panel_el) = (toggle.clone(), panel.clone());
            let listener = Listener::new(&toggle, "click", move |_| {
                let mut current = state.get();
                let view = current.toggle();
                state.set(current);
                render(view, &document, &toggle_el, &panel_el);
            });
            push_listener(&mut listeners, listener);
        }

        let dropdown_links: Vec<(Element, Element)> = dom::query_all(document, DROPDOWN_ITEM_SELECTOR)
            .into_iter()
            .filter_map(|item| dom::query(&item, DROPDOWN_LINK_SELECTOR).map(|link| (item, link)))
            .collect();

        let mut links = dom::query_all(&panel, "a");
        for (_, link) in &dropdown_links {
            if !links.contains(link) {
                links.push(link.clone());
            }
        }

        for link in links {
            let item = dropdown_links
                .iter()
                .find(|(_, parent)| *parent == link)
                .map(|(item, _)| item.clone());
            let kind = if item.is_some() {
                LinkKind::DropdownParent
            } else {
                LinkKind::Plain
            };

            let state = state.clone();
            let document = document.clone();
            let window = window.clone();
            let (toggle_el, panel_el) = (toggle.clone(), panel.clone());
            let breakpoint = config.narrow_breakpoint_px;

            let listener = Listener::new(&link, "click", move |event| {
                let outcome = link_click(kind, viewport_width(&window), breakpoint);
                if outcome.prevent_default {
                    event.prevent_default();
                }
                if outcome.toggle_submenu {
                    if let Some(item) = &item {
                        if let Err(e) = item.class_list().toggle(OPEN_CLASS) {
                            warn!("Failed to toggle submenu: {:?}", e);
                        }
                    }
                }
                if outcome.collapse_panel {
                    let mut current = state.get();
                    let view = current.collapse();
                    state.set(current);
                    render(view, &document, &toggle_el, &panel_el);
                }
            });
            push_listener(&mut listeners, listener);
        }

        Some(Self {
            _listeners: listeners,
        })
    }
}

fn push_listener(listeners: &mut Vec<Listener>, listener: Result<Listener, wasm_bindgen::JsValue>) {
    match listener {
        Ok(listener) => listeners.push(listener),
        Err(e) => warn!("Failed to bind navigation listener: {:?}", e),
    }
}

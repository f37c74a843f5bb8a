//! Thin helpers over `web-sys` shared by the behavior bindings.

use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, NodeList};

/// An event listener that is removed from its target when dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;

        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
        {
            warn!("Failed to remove {} listener: {:?}", self.event, e);
        }
    }
}

/// Anything `querySelector` can be called on.
pub trait Scope {
    fn select(&self, selector: &str) -> Result<Option<Element>, JsValue>;
    fn select_all(&self, selector: &str) -> Result<NodeList, JsValue>;
}

impl Scope for Document {
    fn select(&self, selector: &str) -> Result<Option<Element>, JsValue> {
        self.query_selector(selector)
    }

    fn select_all(&self, selector: &str) -> Result<NodeList, JsValue> {
        self.query_selector_all(selector)
    }
}

impl Scope for Element {
    fn select(&self, selector: &str) -> Result<Option<Element>, JsValue> {
        self.query_selector(selector)
    }

    fn select_all(&self, selector: &str) -> Result<NodeList, JsValue> {
        self.query_selector_all(selector)
    }
}

pub fn query<S: Scope>(scope: &S, selector: &str) -> Option<Element> {
    scope.select(selector).ok().flatten()
}

pub fn query_html<S: Scope>(scope: &S, selector: &str) -> Option<HtmlElement> {
    query(scope, selector).and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

pub fn query_all<S: Scope>(scope: &S, selector: &str) -> Vec<Element> {
    let Ok(list) = scope.select_all(selector) else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn set_expanded(element: &Element, expanded: bool) {
    let value = if expanded { "true" } else { "false" };
    if let Err(e) = element.set_attribute("aria-expanded", value) {
        warn!("Failed to set aria-expanded: {:?}", e);
    }
}

pub fn is_expanded(element: &Element) -> bool {
    element.get_attribute("aria-expanded").as_deref() == Some("true")
}

pub fn set_class(element: &Element, class: &str, on: bool) {
    if let Err(e) = element.class_list().toggle_with_force(class, on) {
        warn!("Failed to toggle class {}: {:?}", class, e);
    }
}

/// Locks or unlocks page scrolling by writing `overflow` on `<body>`.
pub fn set_scroll_lock(document: &Document, locked: bool) {
    let Some(body) = document.body() else {
        return;
    };

    let style = body.style();
    let result = if locked {
        style.set_property("overflow", "hidden")
    } else {
        style.remove_property("overflow").map(|_| ())
    };

    if let Err(e) = result {
        warn!("Failed to update body scroll lock: {:?}", e);
    }
}

/// The event's target as an element, if it is one.
pub fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent};

use super::Behavior;
use crate::config::SiteConfig;
use crate::dom::{self, Listener};

const CARD_SELECTOR: &str = ".service-card";
const CARD_LINK_SELECTOR: &str = ".service-card-link";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardInput<'a> {
    /// `from_link` is set when the click landed on or inside an `<a>`.
    Click { from_link: bool },
    /// `on_card` is set when the card itself, not a descendant, has focus.
    Key { key: &'a str, on_card: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardResponse {
    pub activate: bool,
    pub prevent_default: bool,
}

pub fn respond(input: CardInput<'_>) -> CardResponse {
    match input {
        CardInput::Click { from_link } => CardResponse {
            activate: !from_link,
            prevent_default: false,
        },
        // Enter on a focused link follows it natively; Space does not.
        CardInput::Key { key: " ", .. } | CardInput::Key { key: "Enter", on_card: true } => {
            CardResponse {
                activate: true,
                prevent_default: true,
            }
        }
        CardInput::Key { .. } => CardResponse::default(),
    }
}

fn activate(link: Option<&HtmlElement>) {
    if let Some(link) = link {
        link.click();
    }
}

pub struct ServiceCards {
    _listeners: Vec<Listener>,
}

impl ServiceCards {
    fn bind(card: &Element, listeners: &mut Vec<Listener>) {
        if let Err(e) = card.set_attribute("tabindex", "0") {
            warn!("Failed to make service card focusable: {:?}", e);
        }

        let link = dom::query_html(card, CARD_LINK_SELECTOR);

        let on_click = {
            let link = link.clone();
            Listener::new(card, "click", move |event| {
                let from_link = dom::event_element(&event)
                    .and_then(|target| target.closest("a").ok().flatten())
                    .is_some();
                if respond(CardInput::Click { from_link }).activate {
                    activate(link.as_ref());
                }
            })
        };

        let on_key = {
            let card_el = card.clone();
            Listener::new(card, "keydown", move |event| {
                let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let on_card = dom::event_element(&event).is_some_and(|target| target == card_el);
                let key = key_event.key();
                let response = respond(CardInput::Key { key: &key, on_card });
                if response.prevent_default {
                    event.prevent_default();
                }
                if response.activate {
                    activate(link.as_ref());
                }
            })
        };

        for listener in [on_click, on_key] {
            match listener {
                Ok(listener) => listeners.push(listener),
                Err(e) => warn!("Failed to bind service card listener: {:?}", e),
            }
        }
    }
}

impl Behavior for ServiceCards {
    const NAME: &'static str = "service cards";

    fn attach(document: &Document, _config: &SiteConfig) -> Option<Self> {
        let cards = dom::query_all(document, CARD_SELECTOR);
        if cards.is_empty() {
            return None;
        }

        let mut listeners = Vec::with_capacity(cards.len() * 2);
        for card in &cards {
            Self::bind(card, &mut listeners);
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
    fn click_on_card_body_activates_link() {
        let response = respond(CardInput::Click { from_link: false });
        assert!(response.activate);
        assert!(!response.prevent_default);
    }

    #[test]
    fn click_on_nested_link_is_left_alone() {
        assert_eq!(respond(CardInput::Click { from_link: true }), CardResponse::default());
    }

    #[test]
    fn enter_and_space_on_card_activate_once() {
        for key in ["Enter", " "] {
            let response = respond(CardInput::Key { key, on_card: true });
            assert_eq!(
                response,
                CardResponse {
                    activate: true,
                    prevent_default: true,
                }
            );
        }
    }

    #[test]
    fn space_on_nested_link_activates_instead_of_scrolling() {
        let response = respond(CardInput::Key {
            key: " ",
            on_card: false,
        });
        assert_eq!(
            response,
            CardResponse {
                activate: true,
                prevent_default: true,
            }
        );
    }

    #[test]
    fn enter_from_nested_link_is_not_doubled() {
        let response = respond(CardInput::Key {
            key: "Enter",
            on_card: false,
        });
        assert_eq!(response, CardResponse::default());
    }

    #[test]
    fn other_keys_are_ignored() {
        for key in ["Tab", "Escape", "a", "Spacebar"] {
            assert_eq!(
                respond(CardInput::Key { key, on_card: true }),
                CardResponse::default()
            );
        }
    }

    #[test]
    fn enter_then_synthetic_click_activates_exactly_once() {
        // `link.click()` dispatches a click that bubbles back to the card with
        // the link as its target.
        let mut activations = 0;
        if respond(CardInput::Key { key: "Enter", on_card: true }).activate {
            activations += 1;
            if respond(CardInput::Click { from_link: true }).activate {
                activations += 1;
            }
        }
        assert_eq!(activations, 1);
    }
}

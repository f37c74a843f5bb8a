use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use super::Behavior;
use crate::config::SiteConfig;
use crate::dom::{self, Listener};

const QUESTION_SELECTOR: &str = ".faq-question";

/// Single-open disclosure group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accordion {
    expanded: Vec<bool>,
}

impl Accordion {
    /// Builds a group from the flags found in markup. If several items claim
    /// to be open, the first one wins.
    pub fn from_flags<I: IntoIterator<Item = bool>>(flags: I) -> Self {
        let mut seen_open = false;
        let expanded = flags
            .into_iter()
            .map(|open| {
                let keep = open && !seen_open;
                seen_open |= keep;
                keep
            })
            .collect();
        Self { expanded }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(index).copied().unwrap_or(false)
    }

    #[cfg(test)]
    pub fn open_index(&self) -> Option<usize> {
        self.expanded.iter().position(|open| *open)
    }

    /// Collapses every other item, then flips `index`.
    pub fn activate(&mut self, index: usize) {
        let Some(was_open) = self.expanded.get(index).copied() else {
            return;
        };
        for (i, open) in self.expanded.iter_mut().enumerate() {
            *open = i == index && !was_open;
        }
    }
}

struct FaqItem {
    question: Element,
    answer: Option<HtmlElement>,
}

fn render(state: &Accordion, items: &[FaqItem]) {
    for (i, item) in items.iter().enumerate() {
        let open = state.is_expanded(i);
        dom::set_expanded(&item.question, open);
        if let Some(answer) = &item.answer {
            answer.set_hidden(!open);
        }
    }
}

pub struct FaqAccordion {
    _listeners: Vec<Listener>,
}

impl Behavior for FaqAccordion {
    const NAME: &'static str = "FAQ accordion";

    fn attach(document: &Document, _config: &SiteConfig) -> Option<Self> {
        let questions = dom::query_all(document, QUESTION_SELECTOR);
        if questions.is_empty() {
            return None;
        }

        let state = Accordion::from_flags(questions.iter().map(dom::is_expanded));
        let items: Rc<Vec<FaqItem>> = Rc::new(
            questions
                .into_iter()
                .map(|question| {
                    let answer = question
                        .next_element_sibling()
                        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
                    FaqItem { question, answer }
                })
                .collect(),
        );
        render(&state, &items);

        let state = Rc::new(RefCell::new(state));
        let mut listeners = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let state = state.clone();
            let all = items.clone();
            match Listener::new(&item.question, "click", move |_| {
                let mut state = state.borrow_mut();
                state.activate(index);
                render(&state, &all);
            }) {
                Ok(listener) => listeners.push(listener),
                Err(e) => warn!("Failed to bind FAQ question {}: {:?}", index, e),
            }
        }

        Some(Self {
            _listeners: listeners,
        })
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use super::Behavior;
use crate::config::SiteConfig;
use crate::dom;

const REVEAL_SELECTOR: &str = ".reveal";
const VISIBLE_CLASS: &str = "is-visible";
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Tracks which of a fixed set of elements have been revealed.
///
/// An element becomes visible on its first intersecting entry and is dropped
/// from observation at the same moment. Nothing ever makes it invisible again.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    visible: Vec<bool>,
    observed: Vec<bool>,
}

impl RevealTracker {
    pub fn new(count: usize) -> Self {
        Self {
            visible: vec![false; count],
            observed: vec![true; count],
        }
    }

    /// Everything visible up front, nothing to observe.
    pub fn reduced_motion(count: usize) -> Self {
        Self {
            visible: vec![true; count],
            observed: vec![false; count],
        }
    }

    /// Applies one observer batch of `(index, is_intersecting)` entries and
    /// returns the indices revealed by it, in entry order.
    pub fn on_entries<I>(&mut self, entries: I) -> Vec<usize>
    where
        I: IntoIterator<Item = (usize, bool)>,
    {
        let mut revealed = Vec::new();
        for (index, intersecting) in entries {
            if !intersecting || !self.observed.get(index).copied().unwrap_or(false) {
                continue;
            }
            self.visible[index] = true;
            self.observed[index] = false;
            revealed.push(index);
        }
        revealed
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    #[cfg(test)]
    pub fn is_observed(&self, index: usize) -> bool {
        self.observed.get(index).copied().unwrap_or(false)
    }

    #[cfg(test)]
    pub fn observed_count(&self) -> usize {
        self.observed.iter().filter(|o| **o).count()
    }
}

fn prefers_reduced_motion() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media(REDUCED_MOTION_QUERY).ok().flatten())
        .map(|query| query.matches())
        .unwrap_or(false)
}

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

pub struct Reveal {
    observer: Option<IntersectionObserver>,
    _callback: Option<ObserverCallback>,
}

impl Reveal {
    fn observe(elements: Vec<Element>, config: &SiteConfig) -> Result<Self, JsValue> {
        let tracker = Rc::new(RefCell::new(RevealTracker::new(elements.len())));
        let elements = Rc::new(elements);

        let callback: ObserverCallback = {
            let elements = elements.clone();
            Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
                let batch: Vec<(usize, bool)> = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(|entry| {
                        let target = entry.target();
                        elements
                            .iter()
                            .position(|el| *el == target)
                            .map(|index| (index, entry.is_intersecting()))
                    })
                    .collect();

                for index in tracker.borrow_mut().on_entries(batch) {
                    let element = &elements[index];
                    dom::set_class(element, VISIBLE_CLASS, true);
                    observer.unobserve(element);
                }
            }) as Box<dyn FnMut(Array, IntersectionObserver)>)
        };

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(config.reveal_threshold));
        options.set_root_margin(&config.reveal_root_margin);

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
        for element in elements.iter() {
            observer.observe(element);
        }

        Ok(Self {
            observer: Some(observer),
            _callback: Some(callback),
        })
    }
}

impl Behavior for Reveal {
    const NAME: &'static str = "scroll reveal";

    fn attach(document: &Document, config: &SiteConfig) -> Option<Self> {
        let elements = dom::query_all(document, REVEAL_SELECTOR);
        if elements.is_empty() {
            return None;
        }

        if prefers_reduced_motion() {
            debug!("Reduced motion requested, revealing {} elements", elements.len());
            let tracker = RevealTracker::reduced_motion(elements.len());
            for (index, element) in elements.iter().enumerate() {
                dom::set_class(element, VISIBLE_CLASS, tracker.is_visible(index));
            }
            return Some(Self {
                observer: None,
                _callback: None,
            });
        }

        match Self::observe(elements, config) {
            Ok(reveal) => Some(reveal),
            Err(e) => {
                warn!("IntersectionObserver unavailable: {:?}", e);
                None
            }
        }
    }
}

impl Drop for Reveal {
    fn drop(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn two_elements_in_one_batch_are_both_revealed() {
        let mut tracker = RevealTracker::new(3);
        let revealed = tracker.on_entries([(0, true), (2, true)]);

        assert_eq!(revealed, vec![0, 2]);
        assert!(tracker.is_visible(0) && tracker.is_visible(2));
        assert!(!tracker.is_observed(0) && !tracker.is_observed(2));
        assert!(!tracker.is_visible(1));
        assert_eq!(tracker.observed_count(), 1);
    }

    #[test]
    fn non_intersecting_entries_change_nothing() {
        let mut tracker = RevealTracker::new(2);
        assert!(tracker.on_entries([(0, false), (1, false)]).is_empty());
        assert_eq!(tracker.observed_count(), 2);
    }

    #[test]
    fn element_is_revealed_only_once() {
        let mut tracker = RevealTracker::new(1);
        assert_eq!(tracker.on_entries([(0, true)]), vec![0]);
        assert!(tracker.on_entries([(0, true)]).is_empty());
        assert!(tracker.on_entries([(0, false)]).is_empty());
        assert!(tracker.is_visible(0));
    }

    #[test]
    fn reduced_motion_shows_everything_without_observing() {
        let tracker = RevealTracker::reduced_motion(4);
        assert!((0..4).all(|i| tracker.is_visible(i)));
        assert_eq!(tracker.observed_count(), 0);
    }

    #[test]
    fn unknown_index_is_ignored() {
        let mut tracker = RevealTracker::new(1);
        assert!(tracker.on_entries([(5, true)]).is_empty());
    }

    proptest! {
        #[test]
        fn visibility_is_monotonic(
            batches in proptest::collection::vec(
                proptest::collection::vec((0usize..6, any::<bool>()), 0..6),
                0..20,
            )
        ) {
            let mut tracker = RevealTracker::new(6);
            let mut seen = vec![false; 6];
            for batch in batches {
                tracker.on_entries(batch);
                for i in 0..6 {
                    if seen[i] {
                        prop_assert!(tracker.is_visible(i));
                    }
                    seen[i] = tracker.is_visible(i);
                    prop_assert_eq!(tracker.is_visible(i), !tracker.is_observed(i));
                }
            }
        }
    }
}

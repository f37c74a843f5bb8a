use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys::{self, Array};
use web_sys::{
    Document, Element, FormData, HtmlElement, HtmlFormElement, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Window,
};

use super::payload::FormPayload;
use super::{submitter, ContactForm, Outcome, SubmitView};
use crate::components::Behavior;
use crate::config::SiteConfig;
use crate::dom::{self, Listener};

const FORM_ID: &str = "contact-form";
const SUCCESS_ID: &str = "form-success";
const TRIGGER_SELECTOR: &str = ".form-submit";

const SUCCESS_STYLES: &[(&str, &str)] = &[
    ("background", "#d4edda"),
    ("color", "#155724"),
    ("padding", "var(--space-md)"),
    ("border-radius", "var(--border-radius)"),
    ("margin-top", "var(--space-md)"),
    ("text-align", "center"),
];

/// Reads every string entry of the form. File inputs are skipped.
fn capture(form: &HtmlFormElement) -> FormPayload {
    let mut payload = FormPayload::default();

    let data = match FormData::new_with_form(form) {
        Ok(data) => data,
        Err(e) => {
            warn!("Could not read contact form: {:?}", e);
            return payload;
        }
    };

    let entries = match js_sys::try_iter(&data) {
        Ok(Some(entries)) => entries,
        _ => return payload,
    };

    for entry in entries.flatten() {
        let pair: Array = entry.unchecked_into();
        if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
            payload.push(name, value);
        }
    }
    if payload.is_empty() {
        debug!("Contact form has no text fields to send");
    }
    payload
}

struct DomFormView {
    window: Window,
    form: HtmlFormElement,
    trigger: Option<HtmlElement>,
    success: Option<HtmlElement>,
}

impl SubmitView for DomFormView {
    fn trigger_label(&self) -> String {
        self.trigger
            .as_ref()
            .and_then(|t| t.text_content())
            .unwrap_or_default()
    }

    fn set_trigger(&self, enabled: bool, label: &str) {
        let Some(trigger) = &self.trigger else {
            return;
        };
        let result = if enabled {
            trigger.remove_attribute("disabled")
        } else {
            trigger.set_attribute("disabled", "")
        };
        if let Err(e) = result {
            warn!("Failed to update submit button: {:?}", e);
        }
        trigger.set_text_content(Some(label));
    }

    fn show_success(&self) {
        let Some(success) = &self.success else {
            return;
        };
        success.set_hidden(false);
        let style = success.style();
        for (property, value) in SUCCESS_STYLES {
            if let Err(e) = style.set_property(property, value) {
                warn!("Failed to style success message: {:?}", e);
            }
        }
    }

    fn reset_fields(&self) {
        self.form.reset();
    }

    fn scroll_to_success(&self) {
        if let Some(success) = &self.success {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Nearest);
            success.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            warn!("Failed to show alert: {:?}", e);
        }
    }
}

pub struct ContactFormBinding {
    _submit: Listener,
}

impl Behavior for ContactFormBinding {
    const NAME: &'static str = "contact form";

    fn attach(document: &Document, config: &SiteConfig) -> Option<Self> {
        let window = web_sys::window()?;
        let form = document
            .get_element_by_id(FORM_ID)?
            .dyn_into::<HtmlFormElement>()
            .ok()?;

        let view = Rc::new(DomFormView {
            window,
            trigger: dom::query_html::<Element>(&form, TRIGGER_SELECTOR),
            success: document
                .get_element_by_id(SUCCESS_ID)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok()),
            form: form.clone(),
        });
        let controller = ContactForm::new(view, submitter::from_config(config), &config.fallback_phone);

        let target = form.clone();
        let listener = Listener::new(&form, "submit", move |event| {
            event.prevent_default();

            let payload = capture(&target);
            if let Some(submission) = controller.submit(payload) {
                spawn_local(async move {
                    if submission.await == Outcome::Succeeded {
                        info!("Contact form submitted");
                    }
                });
            }
        });

        match listener {
            Ok(listener) => Some(Self { _submit: listener }),
            Err(e) => {
                warn!("Failed to bind contact form: {:?}", e);
                None
            }
        }
    }
}

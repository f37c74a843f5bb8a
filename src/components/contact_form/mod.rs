//! Contact form submission.
//!
//! [`ContactForm`] drives one submission: it disables the trigger before the
//! outbound operation exists, awaits the [`Submitter`], shows the outcome and
//! restores the trigger through a drop guard so every exit path (including a
//! panic while unwinding) re-enables it exactly once.

mod binding;
pub mod payload;
pub mod submitter;

use std::cell::Cell;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use log::{debug, error};

pub use binding::ContactFormBinding;
pub use payload::FormPayload;
pub use submitter::Submitter;

use crate::error::SubmitError;

pub const BUSY_LABEL: &str = "Sending...";

/// What the submission flow needs from the page.
pub trait SubmitView {
    fn trigger_label(&self) -> String;
    fn set_trigger(&self, enabled: bool, label: &str);
    /// Unhides and styles the success region.
    fn show_success(&self);
    fn reset_fields(&self);
    fn scroll_to_success(&self);
    fn alert(&self, message: &str);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(SubmitError),
}

pub fn failure_message(phone: &str) -> String {
    format!(
        "Sorry, there was an error submitting your form. Please try calling us directly at {}.",
        phone
    )
}

/// Holds the trigger disabled for as long as it lives.
struct TriggerGuard<V: SubmitView> {
    view: Rc<V>,
    state: Rc<Cell<SubmissionState>>,
    label: String,
}

impl<V: SubmitView> TriggerGuard<V> {
    fn engage(view: Rc<V>, state: Rc<Cell<SubmissionState>>) -> Self {
        let label = view.trigger_label();
        view.set_trigger(false, BUSY_LABEL);
        state.set(SubmissionState::Submitting);
        Self { view, state, label }
    }

    fn settle(&self, state: SubmissionState) {
        self.state.set(state);
    }
}

impl<V: SubmitView> Drop for TriggerGuard<V> {
    fn drop(&mut self) {
        self.view.set_trigger(true, &self.label);
        self.state.set(SubmissionState::Idle);
    }
}

pub struct ContactForm<V: SubmitView> {
    view: Rc<V>,
    submitter: Rc<dyn Submitter>,
    state: Rc<Cell<SubmissionState>>,
    fallback_phone: Rc<str>,
}

impl<V: SubmitView + 'static> ContactForm<V> {
    pub fn new(view: Rc<V>, submitter: Rc<dyn Submitter>, fallback_phone: &str) -> Self {
        Self {
            view,
            submitter,
            state: Rc::new(Cell::new(SubmissionState::Idle)),
            fallback_phone: fallback_phone.into(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SubmissionState {
        self.state.get()
    }

    /// Starts a submission.
    ///
    /// The trigger is disabled before this returns. Returns `None` while a
    /// previous submission is still in flight.
    pub fn submit(&self, payload: FormPayload) -> Option<LocalBoxFuture<'static, Outcome>> {
        if self.state.get() == SubmissionState::Submitting {
            debug!("Ignoring submit while a submission is in flight");
            return None;
        }

        let guard = TriggerGuard::engage(self.view.clone(), self.state.clone());
        let operation = self.submitter.submit(payload);
        let view = self.view.clone();
        let phone = self.fallback_phone.clone();

        Some(
            async move {
                let outcome = match operation.await {
                    Ok(()) => {
                        guard.settle(SubmissionState::Succeeded);
                        view.show_success();
                        view.reset_fields();
                        view.scroll_to_success();
                        Outcome::Succeeded
                    }
                    Err(err) => {
                        guard.settle(SubmissionState::Failed);
                        error!("Form submission error: {}", err);
                        view.alert(&failure_message(&phone));
                        Outcome::Failed(err)
                    }
                };
                drop(guard);
                outcome
            }
            .boxed_local(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future;
    use std::cell::RefCell;
    use std::panic::{self, AssertUnwindSafe};

    use super::submitter::SubmitFuture;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Trigger { enabled: bool, label: String },
        ShowSuccess,
        Reset,
        Scroll,
        Alert(String),
    }

    #[derive(Default)]
    struct RecordingView {
        label: RefCell<String>,
        disabled: Cell<bool>,
        fields: RefCell<Vec<String>>,
        calls: RefCell<Vec<Call>>,
        panic_on_success: bool,
    }

    impl RecordingView {
        fn new(label: &str) -> Rc<Self> {
            Rc::new(Self {
                label: RefCell::new(label.to_string()),
                fields: RefCell::new(vec!["Jane".to_string(), "jane@example.com".to_string()]),
                ..Self::default()
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn enable_count(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::Trigger { enabled: true, .. }))
                .count()
        }
    }

    impl SubmitView for RecordingView {
        fn trigger_label(&self) -> String {
            self.label.borrow().clone()
        }

        fn set_trigger(&self, enabled: bool, label: &str) {
            self.disabled.set(!enabled);
            *self.label.borrow_mut() = label.to_string();
            self.calls.borrow_mut().push(Call::Trigger {
                enabled,
                label: label.to_string(),
            });
        }

        fn show_success(&self) {
            self.calls.borrow_mut().push(Call::ShowSuccess);
            if self.panic_on_success {
                panic!("success region missing");
            }
        }

        fn reset_fields(&self) {
            self.fields.borrow_mut().iter_mut().for_each(String::clear);
            self.calls.borrow_mut().push(Call::Reset);
        }

        fn scroll_to_success(&self) {
            self.calls.borrow_mut().push(Call::Scroll);
        }

        fn alert(&self, message: &str) {
            self.calls.borrow_mut().push(Call::Alert(message.to_string()));
        }
    }

    fn accepted(_: FormPayload) -> SubmitFuture {
        future::ready(Ok(())).boxed_local()
    }

    fn refused(_: FormPayload) -> SubmitFuture {
        future::ready(Err(SubmitError::Network("connection reset".to_string()))).boxed_local()
    }

    fn exploding(_: FormPayload) -> SubmitFuture {
        panic!("submitter blew up before returning a future");
    }

    fn payload() -> FormPayload {
        [("name", "Jane"), ("email", "jane@example.com")].into_iter().collect()
    }

    #[test]
    fn successful_submission_shows_success_and_restores_trigger() {
        let view = RecordingView::new("Send Enquiry");
        let form = ContactForm::new(view.clone(), Rc::new(accepted), "(02) 8626 5171");

        let pending = form.submit(payload()).expect("form was idle");

        assert!(view.disabled.get(), "trigger disabled before the future runs");
        assert_eq!(view.trigger_label(), BUSY_LABEL);
        assert_eq!(form.state(), SubmissionState::Submitting);

        assert_eq!(block_on(pending), Outcome::Succeeded);

        assert_eq!(
            view.calls(),
            vec![
                Call::Trigger {
                    enabled: false,
                    label: BUSY_LABEL.to_string()
                },
                Call::ShowSuccess,
                Call::Reset,
                Call::Scroll,
                Call::Trigger {
                    enabled: true,
                    label: "Send Enquiry".to_string()
                },
            ]
        );
        assert!(view.fields.borrow().iter().all(String::is_empty));
        assert!(!view.disabled.get());
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn failed_submission_alerts_and_keeps_fields() {
        let view = RecordingView::new("Send");
        let form = ContactForm::new(view.clone(), Rc::new(refused), "(02) 8626 5171");

        let outcome = block_on(form.submit(payload()).unwrap());

        assert_eq!(
            outcome,
            Outcome::Failed(SubmitError::Network("connection reset".to_string()))
        );
        assert!(view
            .calls()
            .contains(&Call::Alert(failure_message("(02) 8626 5171"))));
        assert!(!view.calls().contains(&Call::Reset));
        assert_eq!(view.fields.borrow()[0], "Jane");
        assert_eq!(view.enable_count(), 1);
        assert_eq!(view.trigger_label(), "Send");
    }

    #[test]
    fn second_submit_while_in_flight_is_ignored() {
        let view = RecordingView::new("Send");
        let stalled = |_: FormPayload| -> SubmitFuture { future::pending().boxed_local() };
        let form = ContactForm::new(view.clone(), Rc::new(stalled), "");

        let first = form.submit(payload());
        assert!(first.is_some());
        assert!(form.submit(payload()).is_none());

        drop(first);
        assert_eq!(view.enable_count(), 1);
        assert_eq!(form.state(), SubmissionState::Idle);
        assert!(form.submit(payload()).is_some());
    }

    #[test]
    fn synchronous_submitter_panic_still_restores_trigger() {
        let view = RecordingView::new("Send");
        let form = ContactForm::new(view.clone(), Rc::new(exploding), "");

        let result = panic::catch_unwind(AssertUnwindSafe(|| form.submit(payload())));

        assert!(result.is_err());
        assert_eq!(view.enable_count(), 1);
        assert!(!view.disabled.get());
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn panic_while_showing_success_still_restores_trigger() {
        let view = Rc::new(RecordingView {
            label: RefCell::new("Send".to_string()),
            panic_on_success: true,
            ..RecordingView::default()
        });
        let form = ContactForm::new(view.clone(), Rc::new(accepted), "");
        let pending = form.submit(payload()).unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| block_on(pending)));

        assert!(result.is_err());
        assert_eq!(view.enable_count(), 1);
        assert_eq!(view.trigger_label(), "Send");
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn failure_message_names_the_fallback_number() {
        assert!(failure_message("(02) 8626 5171").contains("(02) 8626 5171"));
    }
}

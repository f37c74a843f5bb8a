use std::rc::Rc;

use futures::future::{self, Either, FutureExt, LocalBoxFuture};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use log::debug;

use super::payload::FormPayload;
use crate::config::{SiteConfig, SubmitMode, WireFormat};
use crate::error::SubmitError;

pub type SubmitFuture = LocalBoxFuture<'static, Result<(), SubmitError>>;

/// The outbound half of a contact submission.
///
/// Implementations return a future that settles once the backend has
/// accepted or rejected the payload. Any `Fn(FormPayload) -> SubmitFuture`
/// is a submitter, which is how tests inject deterministic outcomes.
pub trait Submitter {
    fn submit(&self, payload: FormPayload) -> SubmitFuture;
}

impl<F> Submitter for F
where
    F: Fn(FormPayload) -> SubmitFuture,
{
    fn submit(&self, payload: FormPayload) -> SubmitFuture {
        self(payload)
    }
}

/// Waits a fixed delay and reports success.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedSubmitter {
    delay_ms: u32,
}

impl SimulatedSubmitter {
    pub fn new(delay_ms: u32) -> Self {
        Self { delay_ms }
    }
}

impl Submitter for SimulatedSubmitter {
    fn submit(&self, payload: FormPayload) -> SubmitFuture {
        let delay_ms = self.delay_ms;
        async move {
            debug!("Simulating submission of {} field(s)", payload.len());
            TimeoutFuture::new(delay_ms).await;
            Ok(())
        }
        .boxed_local()
    }
}

/// Maps an HTTP status to a submission outcome. Only 2xx counts as accepted.
pub fn classify_status(status: u16) -> Result<(), SubmitError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(SubmitError::Status(status))
    }
}

/// POSTs the payload to the contact endpoint.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    endpoint: Rc<str>,
    format: WireFormat,
}

impl HttpSubmitter {
    pub fn new(endpoint: &str, format: WireFormat) -> Self {
        Self {
            endpoint: endpoint.into(),
            format,
        }
    }
}

impl Submitter for HttpSubmitter {
    fn submit(&self, payload: FormPayload) -> SubmitFuture {
        let endpoint = self.endpoint.clone();
        let format = self.format;
        async move {
            let request = match format {
                WireFormat::Form => Request::post(&endpoint)
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(payload.to_urlencoded()),
                WireFormat::Json => Request::post(&endpoint)
                    .json(&payload)
                    .map_err(|e| SubmitError::Encode(e.to_string()))?,
            };

            let response = request
                .send()
                .await
                .map_err(|e| SubmitError::Network(e.to_string()))?;

            classify_status(response.status())
        }
        .boxed_local()
    }
}

pub type Sleep = fn(u32) -> LocalBoxFuture<'static, ()>;

fn browser_sleep(ms: u32) -> LocalBoxFuture<'static, ()> {
    TimeoutFuture::new(ms).boxed_local()
}

/// Fails the wrapped submission with [`SubmitError::Timeout`] if it has not
/// settled within the deadline. The abandoned future is dropped.
pub struct Timed<S> {
    inner: S,
    timeout_ms: u32,
    sleep: Sleep,
}

impl<S> Timed<S> {
    pub fn new(inner: S, timeout_ms: u32) -> Self {
        Self::with_sleep(inner, timeout_ms, browser_sleep)
    }

    pub fn with_sleep(inner: S, timeout_ms: u32, sleep: Sleep) -> Self {
        Self {
            inner,
            timeout_ms,
            sleep,
        }
    }
}

impl<S: Submitter> Submitter for Timed<S> {
    fn submit(&self, payload: FormPayload) -> SubmitFuture {
        let operation = self.inner.submit(payload);
        let deadline = (self.sleep)(self.timeout_ms);
        let timeout_ms = self.timeout_ms;

        async move {
            match future::select(operation, deadline).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => Err(SubmitError::Timeout(timeout_ms)),
            }
        }
        .boxed_local()
    }
}

/// Builds the submitter the page should use.
pub fn from_config(config: &SiteConfig) -> Rc<dyn Submitter> {
    match config.submit_mode {
        SubmitMode::Simulated => Rc::new(Timed::new(
            SimulatedSubmitter::new(config.simulated_delay_ms),
            config.submit_timeout_ms,
        )),
        SubmitMode::Http => Rc::new(Timed::new(
            HttpSubmitter::new(&config.contact_endpoint, config.wire_format),
            config.submit_timeout_ms,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn never(_: u32) -> LocalBoxFuture<'static, ()> {
        future::pending().boxed_local()
    }

    fn immediately(_: u32) -> LocalBoxFuture<'static, ()> {
        future::ready(()).boxed_local()
    }

    fn accepted(_: FormPayload) -> SubmitFuture {
        future::ready(Ok(())).boxed_local()
    }

    fn stalled(_: FormPayload) -> SubmitFuture {
        future::pending().boxed_local()
    }

    #[test]
    fn only_2xx_is_success() {
        assert_eq!(classify_status(200), Ok(()));
        assert_eq!(classify_status(204), Ok(()));
        assert_eq!(classify_status(302), Err(SubmitError::Status(302)));
        assert_eq!(classify_status(422), Err(SubmitError::Status(422)));
        assert_eq!(classify_status(503), Err(SubmitError::Status(503)));
    }

    #[test]
    fn timed_passes_through_a_settled_result() {
        let timed = Timed::with_sleep(accepted, 1_000, never);
        assert_eq!(block_on(timed.submit(FormPayload::default())), Ok(()));
    }

    #[test]
    fn timed_reports_a_stalled_submission_as_timeout() {
        let timed = Timed::with_sleep(stalled, 250, immediately);
        assert_eq!(
            block_on(timed.submit(FormPayload::default())),
            Err(SubmitError::Timeout(250))
        );
    }

    #[test]
    fn timed_keeps_inner_failures() {
        let refused = |_: FormPayload| -> SubmitFuture {
            future::ready(Err(SubmitError::Status(500))).boxed_local()
        };
        let timed = Timed::with_sleep(refused, 1_000, never);
        assert_eq!(
            block_on(timed.submit(FormPayload::default())),
            Err(SubmitError::Status(500))
        );
    }
}
